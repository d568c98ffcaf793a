//! The target-surface capability: everything a transition controller may do
//! to the element it animates.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::events::CompletionEvent;

/// Handle for one completion-event subscription on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Handle for one pending timeout scheduled through a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeoutId(pub u64);

/// Listener invoked for each completion signal delivered to a surface.
pub type CompletionListener = Rc<dyn Fn(&CompletionEvent)>;

/// Capability interface over the concrete renderable element.
///
/// Controllers only tag the surface with class tokens and observe it; they
/// never create or destroy it. Implementations must tolerate listener
/// mutations during dispatch (unsubscribe from inside a listener) and ignore
/// unknown ids in [`ElementSurface::unsubscribe_completion`] and
/// [`ElementSurface::clear_timeout`].
pub trait ElementSurface {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Whether the element is still attached to the visible tree.
    fn is_connected(&self) -> bool;

    /// Force pending style/class changes to be observed before the next
    /// mutation. On a web target this is the forced-reflow step; bindings
    /// without synchronous layout may make this a no-op.
    fn flush_styles(&self);

    fn subscribe_completion(&self, listener: CompletionListener) -> SubscriptionId;
    fn unsubscribe_completion(&self, id: SubscriptionId);

    /// Schedule `callback` to run once after `delay` on the host scheduler.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimeoutId;
    fn clear_timeout(&self, id: TimeoutId);
}

/// Shared handle to a mounted surface.
pub type SurfaceHandle = Rc<dyn ElementSurface>;

/// Pointer identity of two surface handles. Class state plays no part here;
/// a swapped-in element with identical tags is still a different surface.
pub fn same_surface(a: &SurfaceHandle, b: &SurfaceHandle) -> bool {
    Rc::ptr_eq(a, b)
}

/// Retained reference the host points at the mounted element.
///
/// A controller hands one of these out; the host attaches the element once the
/// subtree mounts and detaches it on unmount. Cloning shares the cell, so the
/// controller always observes the latest attachment.
#[derive(Clone, Default)]
pub struct SurfaceRef {
    current: Rc<RefCell<Option<SurfaceHandle>>>,
}

impl SurfaceRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, surface: SurfaceHandle) {
        *self.current.borrow_mut() = Some(surface);
    }

    pub fn detach(&self) {
        *self.current.borrow_mut() = None;
    }

    pub fn get(&self) -> Option<SurfaceHandle> {
        self.current.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.current.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSurface;

    impl ElementSurface for NullSurface {
        fn add_class(&self, _class: &str) {}
        fn remove_class(&self, _class: &str) {}
        fn has_class(&self, _class: &str) -> bool {
            false
        }
        fn is_connected(&self) -> bool {
            true
        }
        fn flush_styles(&self) {}
        fn subscribe_completion(&self, _listener: CompletionListener) -> SubscriptionId {
            SubscriptionId(0)
        }
        fn unsubscribe_completion(&self, _id: SubscriptionId) {}
        fn set_timeout(&self, _delay: Duration, _callback: Box<dyn FnOnce()>) -> TimeoutId {
            TimeoutId(0)
        }
        fn clear_timeout(&self, _id: TimeoutId) {}
    }

    #[test]
    fn surface_ref_shares_attachment_across_clones() {
        let a = SurfaceRef::new();
        let b = a.clone();
        assert!(!b.is_attached());

        let surface: SurfaceHandle = Rc::new(NullSurface);
        a.attach(surface.clone());
        let seen = b.get().expect("clone should observe attachment");
        assert!(same_surface(&seen, &surface));

        b.detach();
        assert!(!a.is_attached());
    }

    #[test]
    fn same_surface_is_pointer_identity() {
        let a: SurfaceHandle = Rc::new(NullSurface);
        let b: SurfaceHandle = Rc::new(NullSurface);
        assert!(same_surface(&a, &a.clone()));
        assert!(!same_surface(&a, &b));
    }
}
