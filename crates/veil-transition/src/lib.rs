//! Phase-driven transition engine for retained-mode UI trees.
//!
//! A [`Transition`] walks one element through enter/exit phases from a boolean
//! "should be shown" signal, tagging it with CSS-style classes and detecting
//! completion from native signals with a safety-timeout fallback. A
//! [`Switch`] layers two transitions to crossfade contents when an identity
//! key changes. Both work against the capability interfaces in `veil-core`;
//! nothing here knows about a concrete element or event system.

pub mod callback;
pub mod classes;
pub mod error;
pub mod switch;
pub mod transition;
mod watch;

pub use callback::{
    CompletionPolicy, CreateTransitionCallbackInput, EndContext, SafetyTimeout, ShouldEndFn,
    create_transition_callback, default_safety_timeout, set_default_safety_timeout,
};
pub use classes::{
    ClassPrefix, ClassSelectors, CreateClassSelectorsOptions, DEFAULT_CLASS_PREFIX,
    TransitionClass, classes_for, create_class_selectors, selector_for, staging_class,
};
pub use error::SwitchError;
pub use switch::{
    SlotKey, SlotRender, Switch, SwitchConfig, SwitchKey, SwitchRender, SwitchTiming,
};
pub use transition::{PhaseCallback, Transition, TransitionConfig, TransitionPhase};
