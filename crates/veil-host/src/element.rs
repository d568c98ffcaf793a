use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;
use veil_core::{
    CompletionEvent, CompletionListener, ElementSurface, SubscriptionId, TimeoutId,
};

use crate::host::SimHost;

/// One recorded surface mutation, in call order. Class ops are recorded only
/// when they changed the set, matching class-list semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    AddClass(String),
    RemoveClass(String),
    FlushStyles,
}

/// Simulated element surface: class set, connectivity flag, completion
/// listeners, and an operation log.
pub struct SimElement {
    name: String,
    host: SimHost,
    classes: RefCell<BTreeSet<String>>,
    connected: Cell<bool>,
    listeners: RefCell<Vec<(SubscriptionId, CompletionListener)>>,
    next_subscription: Cell<u64>,
    ops: RefCell<Vec<SurfaceOp>>,
}

impl SimElement {
    pub fn new(host: &SimHost, name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            host: host.clone(),
            classes: RefCell::new(BTreeSet::new()),
            connected: Cell::new(true),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
            ops: RefCell::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detach from the visible tree. Armed watchers treat completions on a
    /// disconnected element as stale.
    pub fn disconnect(&self) {
        self.connected.set(false);
    }

    pub fn connect(&self) {
        self.connected.set(true);
    }

    /// Snapshot of the current class set.
    pub fn classes(&self) -> BTreeSet<String> {
        self.classes.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Total completion subscriptions ever made on this element, live or not.
    pub fn total_subscriptions(&self) -> u64 {
        self.next_subscription.get()
    }

    /// Recorded mutations since the last [`SimElement::clear_ops`].
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    /// Deliver a style-transition completion for one property.
    pub fn fire_transition_end(&self, property: &str) {
        self.dispatch(CompletionEvent::TransitionEnd {
            property: property.to_string(),
        });
    }

    /// Deliver a keyframe-animation completion.
    pub fn fire_animation_end(&self, name: &str) {
        self.dispatch(CompletionEvent::AnimationEnd {
            name: name.to_string(),
        });
    }

    fn dispatch(&self, event: CompletionEvent) {
        trace!(element = %self.name, ?event, "dispatching completion");
        // Snapshot the table so listeners may unsubscribe during dispatch.
        let listeners: Vec<CompletionListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

impl ElementSurface for SimElement {
    fn add_class(&self, class: &str) {
        if self.classes.borrow_mut().insert(class.to_string()) {
            trace!(element = %self.name, class, "add class");
            self.ops
                .borrow_mut()
                .push(SurfaceOp::AddClass(class.to_string()));
        }
    }

    fn remove_class(&self, class: &str) {
        if self.classes.borrow_mut().remove(class) {
            trace!(element = %self.name, class, "remove class");
            self.ops
                .borrow_mut()
                .push(SurfaceOp::RemoveClass(class.to_string()));
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn flush_styles(&self) {
        self.ops.borrow_mut().push(SurfaceOp::FlushStyles);
    }

    fn subscribe_completion(&self, listener: CompletionListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe_completion(&self, id: SubscriptionId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimeoutId {
        self.host.schedule(delay, callback)
    }

    fn clear_timeout(&self, id: TimeoutId) {
        self.host.cancel(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ops_record_only_effective_changes() {
        let host = SimHost::new();
        let element = SimElement::new(&host, "panel");
        element.add_class("veil-active");
        element.add_class("veil-active"); // no-op
        element.flush_styles();
        element.remove_class("veil-active");
        element.remove_class("veil-active"); // no-op

        assert_eq!(
            element.ops(),
            vec![
                SurfaceOp::AddClass("veil-active".into()),
                SurfaceOp::FlushStyles,
                SurfaceOp::RemoveClass("veil-active".into()),
            ]
        );
        assert!(element.classes().is_empty());
    }

    #[test]
    fn listeners_may_unsubscribe_during_dispatch() {
        let host = SimHost::new();
        let element = SimElement::new(&host, "panel");
        let seen = Rc::new(Cell::new(0u32));

        let element_inner = Rc::clone(&element);
        let id_cell: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let id_inner = Rc::clone(&id_cell);
        let seen_inner = Rc::clone(&seen);
        let id = element.subscribe_completion(Rc::new(move |_event| {
            seen_inner.set(seen_inner.get() + 1);
            if let Some(id) = id_inner.get() {
                element_inner.unsubscribe_completion(id);
            }
        }));
        id_cell.set(Some(id));

        element.fire_transition_end("opacity");
        element.fire_transition_end("opacity");
        assert_eq!(seen.get(), 1, "listener removed itself after first event");
        assert_eq!(element.listener_count(), 0);
    }

    #[test]
    fn timeouts_route_through_the_host_clock() {
        let host = SimHost::new();
        let element = SimElement::new(&host, "panel");
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        element.set_timeout(
            Duration::from_millis(100),
            Box::new(move || flag.set(true)),
        );
        host.advance(Duration::from_millis(50));
        assert!(!fired.get());
        host.advance(Duration::from_millis(50));
        assert!(fired.get());
    }
}
