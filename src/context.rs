use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SiteConfig;
use crate::env::{DomEvent, Environment, Flow, Listener};
use crate::logging::{log_event, LogLevel};

/// Shared handles every component is constructed with.
pub struct Context<E: Environment> {
    pub env: Rc<E>,
    pub config: Rc<SiteConfig>,
}

impl<E: Environment> Clone for Context<E> {
    fn clone(&self) -> Self {
        Self {
            env: Rc::clone(&self.env),
            config: Rc::clone(&self.config),
        }
    }
}

impl<E: Environment> Context<E> {
    pub fn new(env: Rc<E>, config: SiteConfig) -> Self {
        Self {
            env,
            config: Rc::new(config),
        }
    }

    pub fn log(&self, level: LogLevel, event: &str, fields: serde_json::Value) {
        log_event(&*self.env, self.config.log_level, level, event, fields);
    }
}

/// Wraps a component method as a DOM listener without keeping the component alive.
pub(crate) fn bound<T, N>(
    this: &Rc<RefCell<T>>,
    mut handler: impl FnMut(&mut T, &DomEvent<N>) -> Flow + 'static,
) -> Listener<N>
where
    T: 'static,
    N: 'static,
{
    let weak = Rc::downgrade(this);
    Box::new(move |event: &DomEvent<N>| match weak.upgrade() {
        Some(this) => handler(&mut this.borrow_mut(), event),
        None => Flow::Continue,
    })
}
