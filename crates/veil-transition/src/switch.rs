//! Dual-slot switch coordinator: crossfades between contents when an identity
//! key changes, by sequencing two [`Transition`] controllers.
//!
//! The coordinator looks one render into the future: when the incoming key
//! differs from the stored `in` key, this render mounts the new content
//! inactive and the frozen previous content in its final state, and the next
//! pass (requested from the commit step) flips the activations so both slots
//! animate. Slot controllers are recreated whenever their render key changes,
//! which is what lets an outgoing slot start `MountAsEntered` and an incoming
//! slot start unmounted.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;
use veil_core::{HostHandle, SurfaceRef};

use crate::callback::CompletionPolicy;
use crate::classes::ClassPrefix;
use crate::error::{Result, SwitchError};
use crate::transition::{PhaseCallback, Transition, TransitionConfig};

/// Identity deciding whether the coordinator's content has logically changed.
///
/// Booleans canonicalize to sentinel tokens so all identities compare
/// uniformly. An explicit [`SwitchKey::Null`] means "nothing": transitions
/// touching the empty identity resolve immediately. "No change requested" is
/// expressed by leaving [`SwitchConfig::key`] unset, which is distinct from
/// `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SwitchKey {
    Key(String),
    Index(i64),
    /// Explicit empty identity.
    Null,
}

impl From<&str> for SwitchKey {
    fn from(value: &str) -> Self {
        SwitchKey::Key(value.to_string())
    }
}

impl From<String> for SwitchKey {
    fn from(value: String) -> Self {
        SwitchKey::Key(value)
    }
}

impl From<i64> for SwitchKey {
    fn from(value: i64) -> Self {
        SwitchKey::Index(value)
    }
}

impl From<bool> for SwitchKey {
    fn from(value: bool) -> Self {
        SwitchKey::Key(if value { "_true_" } else { "_false_" }.to_string())
    }
}

/// Render key of one slot; the out slot idles under a private "none" identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotKey {
    OutNone,
    Key(SwitchKey),
}

/// When each slot animates relative to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchTiming {
    /// Both slots animate at once; the first completion collapses the state
    /// and the second is a no-op.
    #[default]
    Simultaneous,
    /// The incoming content enters first; the outgoing content holds until
    /// the entry completes, then exits.
    EnterFirst,
    /// The outgoing content exits first; the incoming content stays unmounted
    /// until the exit completes, then enters.
    ExitFirst,
}

/// Per-render configuration for the coordinator.
#[derive(Clone)]
pub struct SwitchConfig<C> {
    /// Identity for this render. `None` reuses the previous identity.
    pub key: Option<SwitchKey>,
    /// Exactly one child. Transitions trigger on key changes, not on child
    /// changes; the child may freely re-render under a stable key.
    pub children: Vec<C>,
    /// Content transitioned out instead of the cached previous child. Useful
    /// when the cached child can no longer render safely.
    pub out_render: Option<C>,
    pub timing: SwitchTiming,
    pub class_prefix: ClassPrefix,
    /// Force both slots to resolve without animating (silent reset).
    pub skip_transitioning: bool,
    pub on_entering: Option<PhaseCallback>,
    pub on_entered: Option<PhaseCallback>,
    pub on_exiting: Option<PhaseCallback>,
    pub on_exited: Option<PhaseCallback>,
    pub in_on_transitioning: Option<CompletionPolicy>,
    pub out_on_transitioning: Option<CompletionPolicy>,
}

impl<C> Default for SwitchConfig<C> {
    fn default() -> Self {
        Self {
            key: None,
            children: Vec::new(),
            out_render: None,
            timing: SwitchTiming::default(),
            class_prefix: ClassPrefix::default(),
            skip_transitioning: false,
            on_entering: None,
            on_entered: None,
            on_exiting: None,
            on_exited: None,
            in_on_transitioning: None,
            out_on_transitioning: None,
        }
    }
}

/// What the host mounts for one slot this pass.
pub struct SlotRender<C> {
    pub key: SlotKey,
    /// Content for the slot; `None` renders nothing.
    pub content: Option<C>,
    /// Whether the slot's controller wants its subtree in the tree.
    pub should_render: bool,
    /// Where the host attaches the mounted element.
    pub surface: SurfaceRef,
    /// The slot was recreated: the host must rebuild the subtree and attach a
    /// fresh element to `surface`.
    pub remounted: bool,
}

/// Both slots for one render pass.
pub struct SwitchRender<C> {
    pub in_slot: SlotRender<C>,
    pub out_slot: SlotRender<C>,
}

#[derive(Clone)]
struct SwitchState {
    in_key: SwitchKey,
    out_key: SwitchKey,
    is_first_timing_phase_complete: bool,
}

struct Slot {
    key: SlotKey,
    controller: Transition,
}

struct SwitchInner<C> {
    host: HostHandle,
    state: Option<SwitchState>,
    /// Last real identity, for renders that leave the key unset.
    last_key: Option<SwitchKey>,
    /// Key seen by the latest render, consumed by the commit-step update.
    this_key: Option<SwitchKey>,
    previous_child: Option<C>,
    /// Frozen copy of the child from before the key change.
    out_child: Option<C>,
    in_slot: Option<Slot>,
    out_slot: Option<Slot>,
}

/// Dual-slot switch coordinator. Cloning shares the coordinator.
#[derive(Clone)]
pub struct Switch<C> {
    inner: Rc<RefCell<SwitchInner<C>>>,
}

impl<C: Clone + 'static> Switch<C> {
    pub fn new(host: HostHandle) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SwitchInner {
                host,
                state: None,
                last_key: None,
                this_key: None,
                previous_child: None,
                out_child: None,
                in_slot: None,
                out_slot: None,
            })),
        }
    }

    /// Current `(in, out)` identities, once the first render has happened.
    /// Equal keys mean no transition is in flight.
    pub fn keys(&self) -> Option<(SwitchKey, SwitchKey)> {
        self.inner
            .borrow()
            .state
            .as_ref()
            .map(|state| (state.in_key.clone(), state.out_key.clone()))
    }

    /// Whether a transition is currently in flight.
    pub fn is_transitioning(&self) -> bool {
        self.inner
            .borrow()
            .state
            .as_ref()
            .is_some_and(|state| state.in_key != state.out_key)
    }

    /// Compute both slots for this render. Fails fast on a violated one-child
    /// contract.
    pub fn render(&self, config: SwitchConfig<C>) -> Result<SwitchRender<C>> {
        let SwitchConfig {
            key,
            children,
            out_render,
            timing,
            class_prefix,
            skip_transitioning,
            on_entering,
            on_entered,
            on_exiting,
            on_exited,
            in_on_transitioning,
            out_on_transitioning,
        } = config;

        let mut children = children.into_iter();
        let child = children.next().ok_or(SwitchError::MissingChild)?;
        if children.next().is_some() {
            return Err(SwitchError::MultipleChildren);
        }

        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();

        let this_key = key
            .or_else(|| inner.last_key.clone())
            .unwrap_or(SwitchKey::Null);
        inner.this_key = Some(this_key.clone());
        inner.last_key = Some(this_key.clone());

        let state = match inner.state.clone() {
            Some(state) => state,
            None => {
                let state = SwitchState {
                    in_key: this_key.clone(),
                    out_key: this_key.clone(),
                    is_first_timing_phase_complete: true,
                };
                inner.state = Some(state.clone());
                state
            }
        };
        let is_about_to_change = this_key != state.in_key;
        let is_transitioning = state.in_key != state.out_key;

        // Freeze the outgoing content at the instant the change is detected,
        // before the stored child is overwritten with the new one.
        if is_about_to_change {
            inner.out_child = inner.previous_child.clone();
            debug!(from = ?state.in_key, to = ?this_key, "switch key change detected");
        }
        inner.previous_child = Some(child.clone());

        let mut in_render_key = SlotKey::Key(state.in_key.clone());
        let mut in_active = true;
        let mut in_skip_entering = true;
        let mut in_finished: Option<PhaseCallback> = None;

        let mut out_render_key = SlotKey::OutNone;
        let mut out_content: Option<C> = None;
        let mut out_active = false;
        let mut out_skip_exiting = true;
        let mut out_finished: Option<PhaseCallback> = None;

        if is_about_to_change || is_transitioning {
            in_render_key = SlotKey::Key(if is_about_to_change {
                this_key.clone()
            } else {
                state.in_key.clone()
            });
            out_render_key = SlotKey::Key(if is_about_to_change {
                state.in_key.clone()
            } else {
                state.out_key.clone()
            });
            out_content = out_render.or_else(|| inner.out_child.clone());
            in_skip_entering = false;
            out_skip_exiting = false;

            // "In" starts inactive and becomes active to run its entry;
            // "out" starts active and becomes inactive. The timing policy
            // decides when each flip happens and which completion collapses
            // the state.
            match timing {
                SwitchTiming::EnterFirst => {
                    in_active = is_transitioning && !is_about_to_change;
                    in_finished = Some(internal_callback(&weak, Finish::FirstPhase));
                    out_active =
                        is_about_to_change || !state.is_first_timing_phase_complete;
                    out_finished = Some(internal_callback(&weak, Finish::Switch));
                }
                SwitchTiming::ExitFirst => {
                    in_active = is_transitioning
                        && !is_about_to_change
                        && state.is_first_timing_phase_complete;
                    in_finished = Some(internal_callback(&weak, Finish::Switch));
                    out_active = is_about_to_change;
                    out_finished = Some(internal_callback(&weak, Finish::FirstPhase));
                }
                SwitchTiming::Simultaneous => {
                    in_active = is_transitioning && !is_about_to_change;
                    in_finished = Some(internal_callback(&weak, Finish::Simultaneous));
                    out_active = is_about_to_change;
                    out_finished = Some(internal_callback(&weak, Finish::Simultaneous));
                }
            }

            // Empty identities resolve immediately. Switching to "nothing"
            // also cuts the outgoing exit so the whole switch collapses at
            // once; switching from "nothing" only mutes the empty side.
            let in_is_null = matches!(in_render_key, SlotKey::Key(SwitchKey::Null));
            let out_is_null = matches!(out_render_key, SlotKey::Key(SwitchKey::Null));
            if in_is_null {
                in_skip_entering = true;
                out_skip_exiting = true;
            }
            if out_is_null {
                out_skip_exiting = true;
            }
            if skip_transitioning {
                in_skip_entering = true;
                out_skip_exiting = true;
            }
        }

        let in_config = TransitionConfig {
            is_active: in_active,
            class_prefix: class_prefix.clone(),
            render_while_exited: false,
            skip_entering: in_skip_entering,
            skip_exiting: true,
            on_entering,
            on_entered: chain(in_finished, on_entered),
            on_exiting: None,
            on_exited: None,
            on_transitioning: in_on_transitioning,
        };
        let out_config = TransitionConfig {
            is_active: out_active,
            class_prefix,
            render_while_exited: false,
            skip_entering: true,
            skip_exiting: out_skip_exiting,
            on_entering: None,
            on_entered: None,
            on_exiting,
            on_exited: chain(out_finished, on_exited),
            on_transitioning: out_on_transitioning,
        };

        let SwitchInner {
            host,
            in_slot,
            out_slot,
            ..
        } = &mut *inner;
        let (in_should, in_remounted, in_surface) =
            reconcile_slot(in_slot, in_render_key.clone(), in_config, host);
        let (out_should, out_remounted, out_surface) =
            reconcile_slot(out_slot, out_render_key.clone(), out_config, host);

        Ok(SwitchRender {
            in_slot: SlotRender {
                key: in_render_key,
                content: Some(child),
                should_render: in_should,
                surface: in_surface,
                remounted: in_remounted,
            },
            out_slot: SlotRender {
                key: out_render_key,
                content: out_content,
                should_render: out_should,
                surface: out_surface,
                remounted: out_remounted,
            },
        })
    }

    /// Pre-paint pass: commit both slot controllers, then fold the latest key
    /// into the stored state (looking one render ahead) and request the pass
    /// that starts the animations.
    pub fn commit(&self) {
        let (in_controller, out_controller) = {
            let inner = self.inner.borrow();
            (
                inner.in_slot.as_ref().map(|slot| slot.controller.clone()),
                inner.out_slot.as_ref().map(|slot| slot.controller.clone()),
            )
        };
        if let Some(controller) = in_controller {
            controller.commit();
        }
        if let Some(controller) = out_controller {
            controller.commit();
        }

        let mut inner = self.inner.borrow_mut();
        let mut changed = false;
        if let (Some(this_key), Some(state)) = (inner.this_key.clone(), inner.state.as_mut()) {
            if this_key != state.in_key {
                state.out_key = state.in_key.clone();
                state.in_key = this_key;
                state.is_first_timing_phase_complete = false;
                changed = true;
            }
        }
        if changed {
            inner.host.request_render();
        }
    }
}

/// Which internal completion handler a slot reports to.
#[derive(Clone, Copy)]
enum Finish {
    /// Collapse the state: the switch is fully resolved.
    Switch,
    /// Mark the first timing phase complete; the other slot may proceed.
    FirstPhase,
    /// Simultaneous timing: first completion collapses, the second is a no-op.
    Simultaneous,
}

fn internal_callback<C: Clone + 'static>(
    weak: &Weak<RefCell<SwitchInner<C>>>,
    finish: Finish,
) -> PhaseCallback {
    let weak = weak.clone();
    Rc::new(move || {
        let Some(inner_rc) = weak.upgrade() else {
            return;
        };
        let mut inner = inner_rc.borrow_mut();
        if let Some(state) = inner.state.as_mut() {
            match finish {
                Finish::Switch => {
                    state.out_key = state.in_key.clone();
                    state.is_first_timing_phase_complete = true;
                }
                Finish::FirstPhase => {
                    state.is_first_timing_phase_complete = true;
                }
                Finish::Simultaneous => {
                    if !state.is_first_timing_phase_complete {
                        state.out_key = state.in_key.clone();
                        state.is_first_timing_phase_complete = true;
                    }
                }
            }
        }
        inner.host.request_render();
    })
}

/// Run the internal completion handler, then the caller's observer.
fn chain(internal: Option<PhaseCallback>, user: Option<PhaseCallback>) -> Option<PhaseCallback> {
    match (internal, user) {
        (None, None) => None,
        (internal, user) => Some(Rc::new(move || {
            if let Some(callback) = &internal {
                callback();
            }
            if let Some(callback) = &user {
                callback();
            }
        })),
    }
}

/// Keep a slot's controller when its render key is unchanged; otherwise drop
/// it (canceling any watcher) and start a fresh one under the new key.
fn reconcile_slot(
    slot: &mut Option<Slot>,
    key: SlotKey,
    config: TransitionConfig,
    host: &HostHandle,
) -> (bool, bool, SurfaceRef) {
    match slot {
        Some(existing) if existing.key == key => {
            let should_render = existing.controller.render(config);
            (should_render, false, existing.controller.surface_ref())
        }
        _ => {
            let controller = Transition::new(host.clone(), config);
            let should_render = controller.should_render();
            let surface = controller.surface_ref();
            *slot = Some(Slot { key, controller });
            (should_render, true, surface)
        }
    }
}
