use std::rc::Rc;

use crate::env::Environment;

/// What an observer on a channel is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverChannel {
    Reveal,
    SkillBar,
    LazyImage,
}

impl ObserverChannel {
    pub fn threshold(self) -> f64 {
        match self {
            Self::Reveal => 0.1,
            Self::SkillBar => 0.5,
            Self::LazyImage => 0.0,
        }
    }

    pub fn root_margin(self) -> &'static str {
        match self {
            Self::Reveal => "0px 0px -50px 0px",
            Self::SkillBar | Self::LazyImage => "0px",
        }
    }

    pub fn options(self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.threshold(),
            root_margin: self.root_margin(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reveal => "reveal",
            Self::SkillBar => "skill_bar",
            Self::LazyImage => "lazy_image",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Intersection<N> {
    pub target: N,
    pub is_intersecting: bool,
    pub ratio: f64,
}

pub type IntersectionHandler<N> = Box<dyn FnMut(&[Intersection<N>])>;

/// A set of watched nodes on one observer, each delivered at most once.
///
/// [`Subscription::release`] is the one-shot gate: it answers `true` only the
/// first time for a watched node and stops observing it. Dropping the
/// subscription disconnects the observer.
pub struct Subscription<E: Environment> {
    env: Rc<E>,
    id: ObserverId,
    channel: ObserverChannel,
    watched: Vec<E::Node>,
}

impl<E: Environment> Subscription<E> {
    pub fn open(
        env: &Rc<E>,
        channel: ObserverChannel,
        handler: IntersectionHandler<E::Node>,
    ) -> Option<Self> {
        let id = env.create_observer(channel, handler)?;
        Some(Self {
            env: Rc::clone(env),
            id,
            channel,
            watched: Vec::new(),
        })
    }

    pub fn channel(&self) -> ObserverChannel {
        self.channel
    }

    pub fn watch(&mut self, node: E::Node) {
        if self.watched.contains(&node) {
            return;
        }
        self.env.observe(self.id, &node);
        self.watched.push(node);
    }

    pub fn release(&mut self, node: &E::Node) -> bool {
        let Some(index) = self.watched.iter().position(|watched| watched == node) else {
            return false;
        };

        let node = self.watched.swap_remove(index);
        self.env.unobserve(self.id, &node);
        true
    }

    pub fn release_all(&mut self) {
        for node in self.watched.drain(..) {
            self.env.unobserve(self.id, &node);
        }
    }

    pub fn watched(&self) -> usize {
        self.watched.len()
    }
}

impl<E: Environment> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.release_all();
        self.env.disconnect(self.id);
    }
}
