//! Completion-detection policy: decides, per received signal, whether an
//! entering/exiting phase is done, and carries the safety-timeout fallback.
//!
//! The default ends on the first transition or animation signal. Multi-step
//! styles (several sub-properties finishing at different times) supply their
//! own decision closures via [`create_transition_callback`] and typically key
//! off [`EndContext::index`] or [`EndContext::ident`]. Whether an index-based
//! policy stays in range when the animated property set changes between states
//! is the caller's concern; a policy that never matches is rescued by the
//! safety timeout.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use veil_core::CompletionKind;

/// Process-wide fallback deadline, read by every watcher without an explicit
/// override. Millisecond granularity is plenty for a correctness net.
static DEFAULT_SAFETY_TIMEOUT_MS: AtomicU64 = AtomicU64::new(4_000);

/// Change the process-wide safety timeout. Intended to be called once at
/// startup; changing it mid-flight only affects watchers armed afterwards.
pub fn set_default_safety_timeout(timeout: Duration) {
    DEFAULT_SAFETY_TIMEOUT_MS.store(timeout.as_millis() as u64, Ordering::Relaxed);
}

/// The current process-wide safety timeout.
pub fn default_safety_timeout() -> Duration {
    Duration::from_millis(DEFAULT_SAFETY_TIMEOUT_MS.load(Ordering::Relaxed))
}

/// Context handed to a decision closure for one received completion signal.
#[derive(Debug, Clone)]
pub struct EndContext<'a> {
    pub kind: CompletionKind,
    /// Zero-based count of signals of this kind seen since the watcher armed.
    /// Transition and animation signals are counted separately.
    pub index: usize,
    /// Transitioned property name or animation name.
    pub ident: &'a str,
    /// Whether the watched phase is an entry.
    pub is_entering: bool,
}

/// Decision closure: `true` ends the phase.
pub type ShouldEndFn = Rc<dyn Fn(&EndContext<'_>) -> bool>;

/// Fallback deadline for one watcher.
#[derive(Debug, Clone, Default)]
pub enum SafetyTimeout {
    /// Use the process-wide default.
    #[default]
    Default,
    /// No fallback; only a completion signal ends the phase.
    Disabled,
    /// Explicit deadline for this watcher.
    After(Duration),
}

impl SafetyTimeout {
    pub fn resolve(&self) -> Option<Duration> {
        match self {
            SafetyTimeout::Default => Some(default_safety_timeout()),
            SafetyTimeout::Disabled => None,
            SafetyTimeout::After(duration) => Some(*duration),
        }
    }
}

/// Caller-facing input for [`create_transition_callback`]. The default input
/// reproduces the stock behavior: first signal of either kind ends the phase,
/// with the process-wide safety timeout.
#[derive(Clone, Default)]
pub struct CreateTransitionCallbackInput {
    pub on_transition_end: Option<ShouldEndFn>,
    pub on_animation_end: Option<ShouldEndFn>,
    pub safety_timeout: SafetyTimeout,
}

/// Decides when an entering/exiting phase completes.
#[derive(Clone, Default)]
pub struct CompletionPolicy {
    should_end_transition: Option<ShouldEndFn>,
    should_end_animation: Option<ShouldEndFn>,
    pub(crate) safety_timeout: SafetyTimeout,
}

impl CompletionPolicy {
    /// Judge one signal. With no custom closures, any signal ends the phase.
    /// Once any closure is supplied, signals of a kind without one are
    /// ignored, so an index-counting policy is not derailed by stray signals
    /// of the other kind.
    pub(crate) fn judge(&self, context: &EndContext<'_>) -> bool {
        let customized =
            self.should_end_transition.is_some() || self.should_end_animation.is_some();
        let decide = match context.kind {
            CompletionKind::Transition => &self.should_end_transition,
            CompletionKind::Animation => &self.should_end_animation,
        };
        match decide {
            Some(should_end) => should_end(context),
            None => !customized,
        }
    }
}

/// Build a completion policy from caller closures.
pub fn create_transition_callback(input: CreateTransitionCallbackInput) -> CompletionPolicy {
    CompletionPolicy {
        should_end_transition: input.on_transition_end,
        should_end_animation: input.on_animation_end,
        safety_timeout: input.safety_timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(kind: CompletionKind, index: usize) -> EndContext<'static> {
        EndContext {
            kind,
            index,
            ident: "opacity",
            is_entering: true,
        }
    }

    #[test]
    fn default_policy_ends_on_first_signal_of_either_kind() {
        let policy = CompletionPolicy::default();
        assert!(policy.judge(&context(CompletionKind::Transition, 0)));
        assert!(policy.judge(&context(CompletionKind::Animation, 0)));
    }

    #[test]
    fn nth_event_policy_counts_only_its_kind() {
        let policy = create_transition_callback(CreateTransitionCallbackInput {
            on_transition_end: Some(Rc::new(|ctx| ctx.index == 2)),
            ..Default::default()
        });
        assert!(!policy.judge(&context(CompletionKind::Transition, 0)));
        assert!(!policy.judge(&context(CompletionKind::Transition, 1)));
        assert!(policy.judge(&context(CompletionKind::Transition, 2)));
        // Animation signals are ignored once a transition closure exists.
        assert!(!policy.judge(&context(CompletionKind::Animation, 0)));
    }

    #[test]
    fn property_name_policy_sees_ident() {
        let policy = create_transition_callback(CreateTransitionCallbackInput {
            on_transition_end: Some(Rc::new(|ctx| ctx.ident == "transform")),
            ..Default::default()
        });
        assert!(!policy.judge(&context(CompletionKind::Transition, 0)));
        let ctx = EndContext {
            kind: CompletionKind::Transition,
            index: 1,
            ident: "transform",
            is_entering: false,
        };
        assert!(policy.judge(&ctx));
    }

    #[test]
    fn safety_timeout_resolution() {
        assert_eq!(
            SafetyTimeout::Default.resolve(),
            Some(Duration::from_millis(4_000))
        );
        assert_eq!(SafetyTimeout::Disabled.resolve(), None);
        assert_eq!(
            SafetyTimeout::After(Duration::from_millis(250)).resolve(),
            Some(Duration::from_millis(250))
        );
    }
}
