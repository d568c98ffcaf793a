//! Error types for the switch coordinator.

use thiserror::Error;

/// Result type for switch operations.
pub type Result<T> = std::result::Result<T, SwitchError>;

/// Configuration misuse caught at the render boundary. These fail fast; the
/// coordinator never guesses which child was meant.
#[derive(Error, Debug)]
pub enum SwitchError {
    /// The caller supplied no child for the current render.
    #[error("switch requires exactly one child, none was supplied")]
    MissingChild,

    /// The caller supplied more than one child for the current render.
    #[error("switch requires exactly one child, several were supplied")]
    MultipleChildren,
}
