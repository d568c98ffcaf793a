//! veil-host: reference in-process host binding for the transition engine.
//!
//! Responsibilities:
//! - Drive the render/commit cadence (coalesced render requests, settle loop).
//! - Own a manual clock and timer queue backing the surface timeout capability.
//! - Provide [`SimElement`], a surface with a class set, a completion-listener
//!   table, and an operation log for inspecting mutation order.
//! - Reconcile mounted elements against slot output via [`MountSlot`].
//!
//! Everything is single-threaded and deterministic; time only moves through
//! [`SimHost::advance`], and completion signals only arrive when fired
//! explicitly. That makes this binding the natural target for tests and
//! scripted demos, and a template for real bindings.

mod element;
mod host;
mod mount;

pub use element::{SimElement, SurfaceOp};
pub use host::SimHost;
pub use mount::MountSlot;
