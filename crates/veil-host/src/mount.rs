use std::cell::RefCell;
use std::rc::Rc;

use veil_core::SurfaceRef;

use crate::element::SimElement;
use crate::host::SimHost;

/// Minimal reconciler for one controller slot: keeps a mounted [`SimElement`]
/// in sync with a controller's render output (`should_render` / `remounted`)
/// and its [`SurfaceRef`]. Interior-mutable so render-pass closures and later
/// inspection can share it.
pub struct MountSlot {
    label: String,
    element: RefCell<Option<Rc<SimElement>>>,
}

impl MountSlot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            element: RefCell::new(None),
        }
    }

    /// The currently mounted element, if any.
    pub fn element(&self) -> Option<Rc<SimElement>> {
        self.element.borrow().clone()
    }

    /// Apply one render pass for this slot.
    ///
    /// A remounted slot drops its old element (the old controller and its ref
    /// are gone) before mounting a fresh one; a slot that stops rendering
    /// disconnects its element and detaches the ref.
    pub fn sync(&self, host: &SimHost, should_render: bool, remounted: bool, surface: &SurfaceRef) {
        let mut element = self.element.borrow_mut();
        if remounted {
            if let Some(old) = element.take() {
                old.disconnect();
            }
        }
        if should_render {
            if element.is_none() {
                let fresh = SimElement::new(host, self.label.clone());
                surface.attach(fresh.clone());
                *element = Some(fresh);
            }
        } else if let Some(old) = element.take() {
            old.disconnect();
            surface.detach();
        }
    }
}
