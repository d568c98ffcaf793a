use std::rc::Rc;

/// The view layer driving the engine's render cadence.
pub trait RenderHost {
    /// Ask the host to schedule another render/commit pass.
    ///
    /// Must be coalesced and deferred: the host records the request and runs
    /// the pass after the current dispatch returns, never synchronously from
    /// inside this call.
    fn request_render(&self);
}

/// Shared handle to the host. The engine is single-threaded by contract.
pub type HostHandle = Rc<dyn RenderHost>;
