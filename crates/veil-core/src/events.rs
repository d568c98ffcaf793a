//! Completion signals delivered by the host to surface subscribers.

/// Which family of style animation produced a completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// A property transition finished (`transitionend` on a web target).
    Transition,
    /// A keyframe animation finished (`animationend` on a web target).
    Animation,
}

/// A native notification that a style-driven transition or animation has
/// finished on a surface.
///
/// Hosts deliver events only to listeners subscribed on the surface the event
/// targeted; bindings over bubbling event systems must filter out events from
/// descendant elements before delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    /// One transitioned property finished.
    TransitionEnd { property: String },
    /// One named keyframe animation finished.
    AnimationEnd { name: String },
}

impl CompletionEvent {
    pub fn kind(&self) -> CompletionKind {
        match self {
            CompletionEvent::TransitionEnd { .. } => CompletionKind::Transition,
            CompletionEvent::AnimationEnd { .. } => CompletionKind::Animation,
        }
    }

    /// The transitioned property name or the animation name.
    pub fn ident(&self) -> &str {
        match self {
            CompletionEvent::TransitionEnd { property } => property,
            CompletionEvent::AnimationEnd { name } => name,
        }
    }
}
