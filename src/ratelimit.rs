use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::env::{Environment, TimerId};

/// Leading-edge throttle: the first call passes, later calls within
/// `interval` of the last pass are dropped.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last_pass: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_pass: None,
        }
    }

    pub fn try_pass(&mut self, now: Duration) -> bool {
        match self.last_pass {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last_pass = Some(now);
                true
            }
        }
    }
}

/// Runs only the most recent task once `wait` has passed without another call.
pub struct Debounce<E: Environment> {
    env: Rc<E>,
    wait: Duration,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl<E: Environment> Debounce<E> {
    pub fn new(env: Rc<E>, wait: Duration) -> Self {
        Self {
            env,
            wait,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn call(&self, task: impl FnOnce() + 'static) {
        self.cancel();

        let pending = Rc::clone(&self.pending);
        let id = self.env.set_timeout(
            self.wait,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(id));
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.env.clear_timeout(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}
