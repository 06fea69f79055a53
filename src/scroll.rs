use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{bound, Context};
use crate::env::{DomEvent, Environment, EventKind, Flow, ListenTarget};
use crate::logging::LogLevel;

pub const IN_PAGE_LINK_SELECTOR: &str = "a[href^=\"#\"]";

/// Resolves `#id` (or a bare `id`) to its element on the page.
pub fn anchor_target<E: Environment>(env: &E, href: &str) -> Option<E::Node> {
    let id = href.trim().trim_start_matches('#');
    if id.is_empty() {
        return None;
    }
    env.element_by_id(id)
}

/// Smooth-scrolls so the target sits just below the fixed navigation bar.
pub fn scroll_to_anchor<E: Environment>(ctx: &Context<E>, href: &str) -> bool {
    let Some(target) = anchor_target(&*ctx.env, href) else {
        ctx.log(LogLevel::Debug, "scroll_target_missing", serde_json::json!({ "href": href }));
        return false;
    };

    let top = ctx.env.offset_top(&target) - ctx.config.nav_offset;
    ctx.env.smooth_scroll_to(top);
    true
}

/// Intercepts every in-page anchor click on the document.
pub struct SmoothScroll<E: Environment> {
    ctx: Context<E>,
}

impl<E: Environment> SmoothScroll<E> {
    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(ctx: Context<E>) -> Rc<RefCell<Self>> {
        let env = Rc::clone(&ctx.env);
        let this = Rc::new(RefCell::new(Self { ctx }));

        env.listen(
            ListenTarget::Document,
            EventKind::Click,
            bound(&this, |this: &mut Self, event: &DomEvent<E::Node>| {
                this.on_document_click(event)
            }),
        );

        this
    }

    pub fn on_document_click(&mut self, event: &DomEvent<E::Node>) -> Flow {
        let Some(target) = event.target.as_ref() else {
            return Flow::Continue;
        };
        let Some(link) = self.ctx.env.closest(target, IN_PAGE_LINK_SELECTOR) else {
            return Flow::Continue;
        };

        if let Some(href) = self.ctx.env.attribute(&link, "href") {
            scroll_to_anchor(&self.ctx, &href);
        }
        Flow::PreventDefault
    }
}
