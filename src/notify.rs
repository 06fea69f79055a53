//! Transient toast notifications pinned to the top-right corner.
//!
//! Each toast owns its timers: it slides in shortly after insertion and
//! slides out either on its close control or after its lifetime, then is
//! removed once the exit transition has had time to play.

use std::cell::Cell;
use std::rc::Rc;

use crate::context::Context;
use crate::env::{DomEvent, Environment, EventKind, Flow, ListenTarget, TimerId};
use crate::logging::LogLevel;

const OFFSCREEN_TRANSFORM: &str = "translateX(100%)";
const ONSCREEN_TRANSFORM: &str = "translateX(0)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Self::Success => "#10b981",
            Self::Error => "#ef4444",
        }
    }
}

pub struct Notifier<E: Environment> {
    ctx: Context<E>,
}

impl<E: Environment> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
        }
    }
}

impl<E: Environment> Notifier<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self { ctx }
    }

    pub fn show(&self, message: &str, severity: Severity) -> Option<E::Node> {
        let env = &self.ctx.env;
        let page = env.body()?;
        let node = env.create_element("div")?;

        let class = format!("notification notification-{}", severity.as_str());
        env.set_attribute(&node, "class", &class);
        env.set_attribute(&node, "role", "status");
        if let Some(text) = env.create_element("span") {
            env.set_text_content(&text, message);
            env.append_child(&node, &text);
        }
        let close_control = env.create_element("button");
        if let Some(close_control) = close_control.as_ref() {
            env.set_attribute(close_control, "class", "notification-close");
            env.set_attribute(close_control, "aria-label", "Dismiss notification");
            env.set_text_content(close_control, "\u{00d7}");
            env.append_child(&node, close_control);
        }

        for (property, value) in [
            ("position", "fixed"),
            ("top", "20px"),
            ("right", "20px"),
            ("padding", "16px 20px"),
            ("border-radius", "8px"),
            ("color", "white"),
            ("background-color", severity.background()),
            ("box-shadow", "0 4px 6px -1px rgb(0 0 0 / 0.1)"),
            ("z-index", "1001"),
            ("max-width", "400px"),
            ("transform", OFFSCREEN_TRANSFORM),
            ("transition", "transform 0.3s ease-in-out"),
        ] {
            env.set_style(&node, property, value);
        }
        env.append_child(&page, &node);

        let toast = Rc::new(Toast {
            ctx: self.ctx.clone(),
            node: node.clone(),
            dismissed: Cell::new(false),
            auto_dismiss: Cell::new(None),
        });

        let entering = Rc::clone(&toast);
        env.set_timeout(
            self.ctx.config.notification_enter_delay,
            Box::new(move || entering.slide_in()),
        );

        let expiring = Rc::clone(&toast);
        let auto_dismiss = env.set_timeout(
            self.ctx.config.notification_lifetime,
            Box::new(move || Toast::dismiss(&expiring)),
        );
        toast.auto_dismiss.set(Some(auto_dismiss));

        if let Some(close_control) = close_control {
            let clicked = Rc::clone(&toast);
            env.listen(
                ListenTarget::Node(close_control),
                EventKind::Click,
                Box::new(move |_: &DomEvent<E::Node>| {
                    Toast::dismiss(&clicked);
                    Flow::Continue
                }),
            );
        }

        self.ctx.log(
            LogLevel::Debug,
            "notification_shown",
            serde_json::json!({ "severity": severity.as_str() }),
        );
        Some(node)
    }
}

struct Toast<E: Environment> {
    ctx: Context<E>,
    node: E::Node,
    dismissed: Cell<bool>,
    auto_dismiss: Cell<Option<TimerId>>,
}

impl<E: Environment> Toast<E> {
    fn slide_in(&self) {
        if !self.dismissed.get() {
            self.ctx.env.set_style(&self.node, "transform", ONSCREEN_TRANSFORM);
        }
    }

    fn dismiss(toast: &Rc<Self>) {
        if toast.dismissed.replace(true) {
            return;
        }
        if let Some(timer) = toast.auto_dismiss.take() {
            toast.ctx.env.clear_timeout(timer);
        }

        toast.ctx.env.set_style(&toast.node, "transform", OFFSCREEN_TRANSFORM);

        let leaving = Rc::clone(toast);
        toast.ctx.env.set_timeout(
            toast.ctx.config.notification_exit,
            Box::new(move || {
                if leaving.ctx.env.is_attached(&leaving.node) {
                    leaving.ctx.env.remove_node(&leaving.node);
                }
            }),
        );
    }
}
