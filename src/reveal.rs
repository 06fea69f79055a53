use std::cell::RefCell;
use std::rc::Rc;

use crate::context::Context;
use crate::env::Environment;
use crate::logging::LogLevel;
use crate::observer::{Intersection, ObserverChannel, Subscription};

const REVEAL_SELECTOR: &str = ".animate-on-scroll";
const SKILL_BAR_SELECTOR: &str = ".skill-progress";
const ANIMATED_CLASS: &str = "animated";

/// Reveals tagged elements and fills skill bars the first time each one
/// scrolls into view.
pub struct ScrollAnimations<E: Environment> {
    ctx: Context<E>,
    reveal: Option<Subscription<E>>,
    skill_bars: Option<Subscription<E>>,
}

impl<E: Environment> ScrollAnimations<E> {
    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(ctx: Context<E>) -> Rc<RefCell<Self>> {
        let env = Rc::clone(&ctx.env);
        let targets = env.query_selector_all(REVEAL_SELECTOR);
        let bars = env.query_selector_all(SKILL_BAR_SELECTOR);
        let this = Rc::new(RefCell::new(Self {
            ctx: ctx.clone(),
            reveal: None,
            skill_bars: None,
        }));

        let weak = Rc::downgrade(&this);
        let reveal = Subscription::open(
            &env,
            ObserverChannel::Reveal,
            Box::new(move |entries: &[Intersection<E::Node>]| {
                if let Some(this) = weak.upgrade() {
                    this.borrow_mut().on_reveal(entries);
                }
            }),
        );

        let weak = Rc::downgrade(&this);
        let skill_bars = Subscription::open(
            &env,
            ObserverChannel::SkillBar,
            Box::new(move |entries: &[Intersection<E::Node>]| {
                if let Some(this) = weak.upgrade() {
                    this.borrow_mut().on_skill_bar(entries);
                }
            }),
        );

        let degraded = reveal.is_none() || skill_bars.is_none();
        {
            let mut animations = this.borrow_mut();
            animations.reveal = watch_all(reveal, targets, |node| {
                env.add_class(&node, ANIMATED_CLASS);
            });
            animations.skill_bars = watch_all(skill_bars, bars, |node| {
                fill_skill_bar(&*env, &node);
            });
        }

        if degraded {
            ctx.log(
                LogLevel::Debug,
                "scroll_animations_eager",
                serde_json::json!({ "reason": "intersection_observer_unavailable" }),
            );
        }
        this
    }

    pub fn on_reveal(&mut self, entries: &[Intersection<E::Node>]) {
        let Some(reveal) = self.reveal.as_mut() else {
            return;
        };
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            if reveal.release(&entry.target) {
                self.ctx.env.add_class(&entry.target, ANIMATED_CLASS);
            }
        }
    }

    pub fn on_skill_bar(&mut self, entries: &[Intersection<E::Node>]) {
        let Some(skill_bars) = self.skill_bars.as_mut() else {
            return;
        };
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            if !skill_bars.release(&entry.target) {
                continue;
            }

            let env = Rc::clone(&self.ctx.env);
            let bar = entry.target.clone();
            self.ctx.env.set_timeout(
                self.ctx.config.skill_bar_delay,
                Box::new(move || fill_skill_bar(&*env, &bar)),
            );
        }
    }

    pub fn pending_reveals(&self) -> usize {
        self.reveal.as_ref().map_or(0, Subscription::watched)
    }

    pub fn pending_skill_bars(&self) -> usize {
        self.skill_bars.as_ref().map_or(0, Subscription::watched)
    }
}

fn watch_all<E: Environment>(
    subscription: Option<Subscription<E>>,
    nodes: Vec<E::Node>,
    mut eager: impl FnMut(E::Node),
) -> Option<Subscription<E>> {
    match subscription {
        Some(mut subscription) => {
            for node in nodes {
                subscription.watch(node);
            }
            Some(subscription)
        }
        None => {
            nodes.into_iter().for_each(&mut eager);
            None
        }
    }
}

fn fill_skill_bar<E: Environment>(env: &E, bar: &E::Node) {
    if let Some(width) = env.attribute(bar, "data-width") {
        env.set_style(bar, "width", &width);
    }
}
