use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use veil_core::{HostHandle, RenderHost, TimeoutId};

struct Timer {
    id: TimeoutId,
    deadline: Duration,
    callback: Box<dyn FnOnce()>,
}

struct HostState {
    now: Duration,
    timers: Vec<Timer>,
    next_timeout: u64,
    render_requested: bool,
}

/// Deterministic single-threaded host: manual clock, timer queue, and a
/// coalesced render-request flag. Cloning shares the host.
#[derive(Clone)]
pub struct SimHost {
    state: Rc<RefCell<HostState>>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                now: Duration::ZERO,
                timers: Vec::new(),
                next_timeout: 0,
                render_requested: false,
            })),
        }
    }

    /// Shared handle controllers hold to request render passes.
    pub fn handle(&self) -> HostHandle {
        Rc::new(self.clone())
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Move the clock forward, firing due timers in deadline order. Callbacks
    /// run outside the host borrow, so they may schedule or cancel freely.
    pub fn advance(&self, delta: Duration) {
        let target = self.state.borrow().now + delta;
        loop {
            let due = {
                let mut state = self.state.borrow_mut();
                let found = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.deadline <= target)
                    .min_by_key(|(_, timer)| (timer.deadline, timer.id))
                    .map(|(index, _)| index);
                match found {
                    Some(index) => {
                        let timer = state.timers.remove(index);
                        state.now = state.now.max(timer.deadline);
                        Some(timer.callback)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };
            match due {
                Some(callback) => callback(),
                None => break,
            }
        }
    }

    /// Read and clear the coalesced render request.
    pub fn take_render_request(&self) -> bool {
        let mut state = self.state.borrow_mut();
        std::mem::replace(&mut state.render_requested, false)
    }

    pub fn render_requested(&self) -> bool {
        self.state.borrow().render_requested
    }

    /// Run one render/commit pass, then keep re-running it while controllers
    /// request further passes. Mirrors a view layer settling synchronously
    /// before paint.
    pub fn run_to_idle(&self, mut pass: impl FnMut()) {
        pass();
        let mut rounds = 0;
        while self.take_render_request() {
            rounds += 1;
            assert!(rounds < 64, "render loop failed to settle after 64 passes");
            pass();
        }
    }

    pub fn active_timer_count(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub(crate) fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimeoutId {
        let mut state = self.state.borrow_mut();
        let id = TimeoutId(state.next_timeout);
        state.next_timeout += 1;
        let deadline = state.now + delay;
        state.timers.push(Timer {
            id,
            deadline,
            callback,
        });
        id
    }

    /// Unknown ids (already fired or canceled) are ignored.
    pub(crate) fn cancel(&self, id: TimeoutId) {
        self.state.borrow_mut().timers.retain(|timer| timer.id != id);
    }
}

impl RenderHost for SimHost {
    fn request_render(&self) {
        self.state.borrow_mut().render_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn timers_fire_in_deadline_order() {
        let host = SimHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (name, delay_ms) in [("late", 30u64), ("early", 10), ("mid", 20)] {
            let log = Rc::clone(&log);
            host.schedule(
                Duration::from_millis(delay_ms),
                Box::new(move || log.borrow_mut().push(name)),
            );
        }

        host.advance(Duration::from_millis(15));
        assert_eq!(*log.borrow(), vec!["early"]);
        host.advance(Duration::from_millis(100));
        assert_eq!(*log.borrow(), vec!["early", "mid", "late"]);
        assert_eq!(host.active_timer_count(), 0);
    }

    #[test]
    fn canceled_timers_do_not_fire() {
        let host = SimHost::new();
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        let id = host.schedule(
            Duration::from_millis(5),
            Box::new(move || *flag.borrow_mut() = true),
        );
        host.cancel(id);
        host.cancel(id); // second cancel is a no-op
        host.advance(Duration::from_millis(10));
        assert!(!*fired.borrow());
    }

    #[test]
    fn timer_callbacks_may_schedule_more_timers() {
        let host = SimHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let host_inner = host.clone();
            let log = Rc::clone(&log);
            host.schedule(
                Duration::from_millis(5),
                Box::new(move || {
                    log.borrow_mut().push("first");
                    let log = Rc::clone(&log);
                    host_inner.schedule(
                        Duration::from_millis(5),
                        Box::new(move || log.borrow_mut().push("second")),
                    );
                }),
            );
        }
        host.advance(Duration::from_millis(20));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn render_requests_coalesce() {
        let host = SimHost::new();
        host.request_render();
        host.request_render();
        assert!(host.take_render_request());
        assert!(!host.take_render_request());

        let passes = Rc::new(RefCell::new(0u32));
        {
            let host_inner = host.clone();
            let passes = Rc::clone(&passes);
            host.run_to_idle(move || {
                *passes.borrow_mut() += 1;
                // Request one follow-up pass on the first round only.
                if *passes.borrow() == 1 {
                    host_inner.request_render();
                }
            });
        }
        assert_eq!(*passes.borrow(), 2);
    }
}
