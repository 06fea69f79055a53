use std::cell::RefCell;
use std::rc::Rc;

use crate::context::Context;
use crate::env::Environment;
use crate::logging::LogLevel;
use crate::observer::{Intersection, ObserverChannel, Subscription};

const DEFERRED_IMAGE_SELECTOR: &str = "img[data-src]";
const LAZY_CLASS: &str = "lazy";

pub struct LazyLoader<E: Environment> {
    ctx: Context<E>,
    images: Option<Subscription<E>>,
    loaded: usize,
}

impl<E: Environment> LazyLoader<E> {
    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(ctx: Context<E>) -> Rc<RefCell<Self>> {
        let env = Rc::clone(&ctx.env);
        let images = env.query_selector_all(DEFERRED_IMAGE_SELECTOR);
        let this = Rc::new(RefCell::new(Self {
            ctx,
            images: None,
            loaded: 0,
        }));

        let weak = Rc::downgrade(&this);
        let subscription = Subscription::open(
            &env,
            ObserverChannel::LazyImage,
            Box::new(move |entries: &[Intersection<E::Node>]| {
                if let Some(this) = weak.upgrade() {
                    this.borrow_mut().on_intersections(entries);
                }
            }),
        );

        let mut loader = this.borrow_mut();
        match subscription {
            Some(mut subscription) => {
                for image in images {
                    env.add_class(&image, LAZY_CLASS);
                    subscription.watch(image);
                }
                loader.images = Some(subscription);
            }
            None => {
                for image in &images {
                    loader.load(image);
                }
                loader.ctx.log(
                    LogLevel::Debug,
                    "lazy_images_loaded_eagerly",
                    serde_json::json!({ "count": images.len() }),
                );
            }
        }
        drop(loader);
        this
    }

    pub fn on_intersections(&mut self, entries: &[Intersection<E::Node>]) {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            let released = self
                .images
                .as_mut()
                .is_some_and(|images| images.release(&entry.target));
            if released {
                self.load(&entry.target);
                self.ctx.env.remove_class(&entry.target, LAZY_CLASS);
            }
        }
    }

    fn load(&mut self, image: &E::Node) {
        if let Some(source) = self.ctx.env.attribute(image, "data-src") {
            self.ctx.env.set_attribute(image, "src", &source);
            self.loaded += 1;
        }
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn pending(&self) -> usize {
        self.images.as_ref().map_or(0, Subscription::watched)
    }
}
