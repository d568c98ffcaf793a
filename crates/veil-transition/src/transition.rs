//! Single-element transition controller.
//!
//! The host drives the controller with a two-step pass on every signal
//! change: [`Transition::render`] stores the next desired state and reports
//! whether the child belongs in the tree. After reconciling the subtree and
//! attaching the mounted element to the controller's [`SurfaceRef`], the host
//! calls [`Transition::commit`], which runs the state machine, mutates
//! classes synchronously, and reconciles the completion watcher. Internal
//! state changes that need another pass go through
//! [`veil_core::RenderHost::request_render`]; the host loops until quiescent
//! before painting.
//!
//! Completion signals arrive later from the host's dispatch and re-enter
//! through the watcher, which revalidates surface identity and connectivity
//! before any state is touched.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;
use veil_core::{HostHandle, SurfaceHandle, SurfaceRef, same_surface};

use crate::callback::CompletionPolicy;
use crate::classes::{ClassPrefix, TransitionClass, classes_for, staging_class};
use crate::watch::{self, WatchGuard};

/// One discrete state in the transition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Nothing rendered; the slot is empty.
    Unmounted,
    /// Bootstrap for controllers that start active: show in the final state,
    /// with no entry animation.
    MountAsEntered,
    Entering,
    Entered,
    Exiting,
    Exited,
}

/// Observer invoked at a phase boundary, exactly once per phase entry.
pub type PhaseCallback = Rc<dyn Fn()>;

/// Per-render configuration. Owned by the caller each render; the controller
/// treats it as the next desired state and never mutates it.
#[derive(Clone, Default)]
pub struct TransitionConfig {
    /// Whether the child should be shown.
    pub is_active: bool,
    pub class_prefix: ClassPrefix,
    /// Keep the child rendered (tagged inactive/exited) instead of unmounting
    /// it once fully exited.
    pub render_while_exited: bool,
    /// Jump straight to `Entered` with no animation or watcher.
    pub skip_entering: bool,
    /// Jump straight to `Exited` with no animation or watcher.
    pub skip_exiting: bool,
    pub on_entering: Option<PhaseCallback>,
    pub on_entered: Option<PhaseCallback>,
    pub on_exiting: Option<PhaseCallback>,
    pub on_exited: Option<PhaseCallback>,
    /// Completion detection for the animated phases. Defaults to "first
    /// transition or animation signal ends the phase" with the process-wide
    /// safety timeout.
    pub on_transitioning: Option<CompletionPolicy>,
}

struct Inner {
    host: HostHandle,
    config: TransitionConfig,
    phase: TransitionPhase,
    surface_ref: SurfaceRef,
    /// Surface currently carrying this controller's class tags.
    tagged: Option<SurfaceHandle>,
    /// At most one armed watcher; replacing it always cancels the old one.
    watcher: Option<WatchGuard>,
}

/// Single-element transition controller. Cloning shares the controller.
#[derive(Clone)]
pub struct Transition {
    inner: Rc<RefCell<Inner>>,
}

impl Transition {
    pub fn new(host: HostHandle, config: TransitionConfig) -> Self {
        let phase = if config.is_active {
            TransitionPhase::MountAsEntered
        } else if config.render_while_exited {
            TransitionPhase::Exited
        } else {
            TransitionPhase::Unmounted
        };
        Self {
            inner: Rc::new(RefCell::new(Inner {
                host,
                config,
                phase,
                surface_ref: SurfaceRef::new(),
                tagged: None,
                watcher: None,
            })),
        }
    }

    /// Retained ref the host points at the mounted element.
    pub fn surface_ref(&self) -> SurfaceRef {
        self.inner.borrow().surface_ref.clone()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.inner.borrow().phase
    }

    /// Whether the child belongs in the tree right now.
    pub fn should_render(&self) -> bool {
        self.inner.borrow().phase != TransitionPhase::Unmounted
    }

    /// Store the next desired state. Returns [`Transition::should_render`].
    pub fn render(&self, config: TransitionConfig) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.config = config;
        inner.phase != TransitionPhase::Unmounted
    }

    /// Pre-paint pass: run the state machine against the latest config,
    /// mutate classes, then reconcile the watcher.
    pub fn commit(&self) {
        Self::evaluate(&self.inner);
    }

    fn evaluate(inner_rc: &Rc<RefCell<Inner>>) {
        let fired: Option<PhaseCallback>;
        {
            let mut inner = inner_rc.borrow_mut();
            let is_active = inner.config.is_active;

            // Bootstrap: step off Unmounted and ask for another pass so the
            // host mounts the child; the surface must exist before any class
            // is applied.
            if is_active && inner.phase == TransitionPhase::Unmounted {
                inner.phase = TransitionPhase::Exited;
                debug!("phase bootstrap: unmounted -> exited");
                inner.host.request_render();
                return;
            }

            let Some(surface) = inner.surface_ref.get() else {
                return;
            };

            // A freshly mounted or swapped-in element carries no tags yet.
            let swapped = match &inner.tagged {
                Some(prev) => !same_surface(prev, &surface),
                None => true,
            };
            if swapped {
                apply_steady(&surface, inner.phase, &inner.config.class_prefix);
                inner.tagged = Some(surface.clone());
            }

            match (is_active, inner.phase) {
                (false, TransitionPhase::Exited) if !inner.config.render_while_exited => {
                    // Teardown: the child leaves the tree on the next pass.
                    inner.phase = TransitionPhase::Unmounted;
                    inner.watcher = None;
                    inner.tagged = None;
                    debug!("phase teardown: exited -> unmounted");
                    inner.host.request_render();
                    fired = None;
                }
                (true, TransitionPhase::MountAsEntered) => {
                    fired = set_entered(&mut inner, &surface);
                }
                (true, phase)
                    if phase != TransitionPhase::Entering && phase != TransitionPhase::Entered =>
                {
                    if inner.config.skip_entering {
                        fired = set_entered(&mut inner, &surface);
                    } else {
                        fired = begin_transitioning(inner_rc, &mut inner, &surface, true);
                    }
                }
                (false, TransitionPhase::Entering | TransitionPhase::Entered) => {
                    if inner.config.skip_exiting {
                        fired = set_exited(&mut inner, &surface);
                    } else {
                        fired = begin_transitioning(inner_rc, &mut inner, &surface, false);
                    }
                }
                _ => {
                    // Steady. If the element instance changed mid-flight, the
                    // old watcher is listening on a dead surface; re-arm.
                    if swapped
                        && matches!(
                            inner.phase,
                            TransitionPhase::Entering | TransitionPhase::Exiting
                        )
                    {
                        let entering = inner.phase == TransitionPhase::Entering;
                        arm_watcher(inner_rc, &mut inner, &surface, entering);
                    }
                    fired = None;
                }
            }
        }
        if let Some(callback) = fired {
            callback();
        }
    }

    /// Watcher `done` entry point: advance out of an animated phase, unless
    /// the result is stale.
    fn finish_transitioning(weak: &Weak<RefCell<Inner>>, armed: &SurfaceHandle, entering: bool) {
        let Some(inner_rc) = weak.upgrade() else {
            return;
        };
        let fired = {
            let mut inner = inner_rc.borrow_mut();
            let Some(current) = inner.surface_ref.get() else {
                return;
            };
            // A watcher armed on a replaced element must never advance the
            // phase; neither may one whose element has left the tree.
            if !same_surface(&current, armed) || !current.is_connected() {
                debug!(entering, "stale completion suppressed");
                return;
            }
            match (entering, inner.phase) {
                (true, TransitionPhase::Entering) => set_entered(&mut inner, &current),
                (false, TransitionPhase::Exiting) => set_exited(&mut inner, &current),
                _ => None,
            }
        };
        if let Some(callback) = fired {
            callback();
        }
    }
}

fn set_entered(inner: &mut Inner, surface: &SurfaceHandle) -> Option<PhaseCallback> {
    inner.phase = TransitionPhase::Entered;
    inner.watcher = None;
    apply_steady(surface, TransitionPhase::Entered, &inner.config.class_prefix);
    debug!("phase -> entered");
    inner.host.request_render();
    inner.config.on_entered.clone()
}

fn set_exited(inner: &mut Inner, surface: &SurfaceHandle) -> Option<PhaseCallback> {
    inner.phase = TransitionPhase::Exited;
    inner.watcher = None;
    apply_steady(surface, TransitionPhase::Exited, &inner.config.class_prefix);
    debug!("phase -> exited");
    inner.host.request_render();
    inner.config.on_exited.clone()
}

fn begin_transitioning(
    inner_rc: &Rc<RefCell<Inner>>,
    inner: &mut Inner,
    surface: &SurfaceHandle,
    entering: bool,
) -> Option<PhaseCallback> {
    let phase = if entering {
        TransitionPhase::Entering
    } else {
        TransitionPhase::Exiting
    };
    inner.phase = phase;
    apply_transitioning(surface, phase, &inner.config.class_prefix);
    arm_watcher(inner_rc, inner, surface, entering);
    debug!(entering, "phase -> transitioning");
    if entering {
        inner.config.on_entering.clone()
    } else {
        inner.config.on_exiting.clone()
    }
}

fn arm_watcher(
    inner_rc: &Rc<RefCell<Inner>>,
    inner: &mut Inner,
    surface: &SurfaceHandle,
    entering: bool,
) {
    let policy = inner.config.on_transitioning.clone().unwrap_or_default();
    let weak = Rc::downgrade(inner_rc);
    let armed = surface.clone();
    // Cancel-before-replace: the old guard tears down on drop.
    inner.watcher = None;
    inner.watcher = Some(watch::arm(surface, entering, &policy, move || {
        Transition::finish_transitioning(&weak, &armed, entering);
    }));
}

/// Tag `surface` with the steady classes for `phase`, clearing every other
/// tag this controller could have applied.
fn apply_steady(surface: &SurfaceHandle, phase: TransitionPhase, prefix: &ClassPrefix) {
    let keep = classes_for(phase);
    for tag in TransitionClass::ALL {
        if !keep.contains(&tag) {
            surface.remove_class(&prefix.class(tag));
        }
    }
    for tag in keep {
        surface.add_class(&prefix.class(*tag));
    }
}

/// Two-step application for the animated phases: stage the start class on top
/// of the previous steady state, flush so the style engine registers it, then
/// swap to the transitioning set it animates toward.
fn apply_transitioning(surface: &SurfaceHandle, phase: TransitionPhase, prefix: &ClassPrefix) {
    if let Some(start) = staging_class(phase) {
        surface.add_class(&prefix.class(start));
        surface.flush_styles();
    }
    // The steady pass clears the start class along with the previous state.
    apply_steady(surface, phase, prefix);
}
