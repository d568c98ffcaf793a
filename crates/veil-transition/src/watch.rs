//! Single-shot completion watcher: listens for completion signals and the
//! safety timeout on one surface, fires `done` exactly once, and tears its
//! listeners down on finish or cancel.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use veil_core::{CompletionEvent, CompletionKind, SubscriptionId, SurfaceHandle, TimeoutId};

use crate::callback::{CompletionPolicy, EndContext};

struct WatchState {
    surface: SurfaceHandle,
    is_entering: bool,
    finished: bool,
    transition_count: usize,
    animation_count: usize,
    subscription: Option<SubscriptionId>,
    timeout: Option<TimeoutId>,
    done: Option<Box<dyn FnOnce()>>,
}

/// Owner handle for an armed watcher. Cancel is idempotent and also runs on
/// drop, so replacing the guard is always cancel-before-replace.
pub(crate) struct WatchGuard {
    state: Rc<RefCell<WatchState>>,
}

impl WatchGuard {
    pub(crate) fn cancel(&self) {
        settle(&self.state, true);
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Arm a watcher on `surface`. Each received signal is judged by `policy`
/// (with separately counted per-kind indices); a `true` verdict or the safety
/// timeout fires `done` once. Firing is suppressed when the surface has been
/// detached by the time completion would land.
pub(crate) fn arm(
    surface: &SurfaceHandle,
    is_entering: bool,
    policy: &CompletionPolicy,
    done: impl FnOnce() + 'static,
) -> WatchGuard {
    let state = Rc::new(RefCell::new(WatchState {
        surface: surface.clone(),
        is_entering,
        finished: false,
        transition_count: 0,
        animation_count: 0,
        subscription: None,
        timeout: None,
        done: Some(Box::new(done)),
    }));

    let listener_state = Rc::clone(&state);
    let listener_policy = policy.clone();
    let subscription = surface.subscribe_completion(Rc::new(move |event: &CompletionEvent| {
        let should_end = {
            let mut state = listener_state.borrow_mut();
            if state.finished {
                return;
            }
            let (kind, index) = match event.kind() {
                CompletionKind::Transition => {
                    let index = state.transition_count;
                    state.transition_count += 1;
                    (CompletionKind::Transition, index)
                }
                CompletionKind::Animation => {
                    let index = state.animation_count;
                    state.animation_count += 1;
                    (CompletionKind::Animation, index)
                }
            };
            listener_policy.judge(&EndContext {
                kind,
                index,
                ident: event.ident(),
                is_entering: state.is_entering,
            })
        };
        if should_end {
            settle(&listener_state, false);
        }
    }));
    state.borrow_mut().subscription = Some(subscription);

    if let Some(delay) = policy.safety_timeout.resolve() {
        let timeout_state = Rc::clone(&state);
        let timeout = surface.set_timeout(
            delay,
            Box::new(move || {
                if !timeout_state.borrow().finished {
                    debug!(
                        is_entering,
                        "no completion signal arrived; safety timeout advancing the phase"
                    );
                }
                settle(&timeout_state, false);
            }),
        );
        state.borrow_mut().timeout = Some(timeout);
    }

    WatchGuard { state }
}

/// Tear down the subscription and timeout, then run `done` unless canceling,
/// already finished, or the surface is no longer attached to the tree.
fn settle(state: &Rc<RefCell<WatchState>>, cancel: bool) {
    let done = {
        let mut state = state.borrow_mut();
        if let Some(id) = state.subscription.take() {
            state.surface.unsubscribe_completion(id);
        }
        if let Some(id) = state.timeout.take() {
            state.surface.clear_timeout(id);
        }
        if state.finished {
            return;
        }
        state.finished = true;
        if cancel || !state.surface.is_connected() {
            None
        } else {
            state.done.take()
        }
    };
    if let Some(done) = done {
        done();
    }
}
