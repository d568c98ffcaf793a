//! veil-core: capability layer between the transition engine and its host.
//!
//! The engine never touches a concrete UI element. It works against the
//! [`ElementSurface`] capability (tag classes, read connectivity, subscribe to
//! completion signals, schedule timeouts), receives its render cadence through
//! [`RenderHost`], and finds the mounted element through a [`SurfaceRef`] the
//! host populates. A web binding would back these with a DOM element and
//! `transitionend`/`animationend`; a native binding can use discrete style
//! flags and its own timer wheel.

mod events;
mod host;
mod surface;

pub use events::{CompletionEvent, CompletionKind};
pub use host::{HostHandle, RenderHost};
pub use surface::{
    CompletionListener, ElementSurface, SubscriptionId, SurfaceHandle, SurfaceRef, TimeoutId,
    same_surface,
};
