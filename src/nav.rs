//! Navigation bar: the mobile menu, the "scrolled" look and the link that
//! tracks which section is under the viewport.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{bound, Context};
use crate::env::{DomEvent, Environment, EventKind, Flow, ListenTarget};
use crate::logging::LogLevel;
use crate::ratelimit::{Debounce, Throttle};
use crate::scroll::scroll_to_anchor;

const ACTIVE_CLASS: &str = "active";
const SCROLLED_CLASS: &str = "scrolled";

pub struct Navigation<E: Environment> {
    ctx: Context<E>,
    navbar: Option<E::Node>,
    toggle: Option<E::Node>,
    menu: Option<E::Node>,
    links: Vec<E::Node>,
    menu_open: bool,
    active_section: Option<String>,
    scrolled: bool,
    scroll_throttle: Throttle,
}

impl<E: Environment> Navigation<E> {
    pub fn new(ctx: Context<E>) -> Self {
        let env = &ctx.env;
        let scroll_throttle = Throttle::new(ctx.config.scroll_throttle);

        Self {
            navbar: env.element_by_id("navbar"),
            toggle: env.element_by_id("nav-toggle"),
            menu: env.element_by_id("nav-menu"),
            links: env.query_selector_all(".nav-link"),
            menu_open: false,
            active_section: None,
            scrolled: false,
            scroll_throttle,
            ctx,
        }
    }

    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(ctx: Context<E>) -> Rc<RefCell<Self>> {
        let env = Rc::clone(&ctx.env);
        let resize_debounce = Debounce::new(Rc::clone(&env), ctx.config.resize_debounce);
        let this = Rc::new(RefCell::new(Self::new(ctx)));
        let (toggle, links) = {
            let nav = this.borrow();
            (nav.toggle.clone(), nav.links.clone())
        };

        if let Some(toggle) = toggle {
            env.listen(
                ListenTarget::Node(toggle),
                EventKind::Click,
                bound(&this, |nav: &mut Self, _: &DomEvent<E::Node>| {
                    nav.toggle_menu();
                    Flow::Continue
                }),
            );
        }

        for link in links {
            let clicked = link.clone();
            env.listen(
                ListenTarget::Node(link),
                EventKind::Click,
                bound(&this, move |nav: &mut Self, _: &DomEvent<E::Node>| {
                    nav.on_link_click(&clicked)
                }),
            );
        }

        env.listen(
            ListenTarget::Document,
            EventKind::Click,
            bound(&this, |nav: &mut Self, event: &DomEvent<E::Node>| {
                if let Some(target) = event.target.as_ref() {
                    nav.on_document_click(target);
                }
                Flow::Continue
            }),
        );

        env.listen(
            ListenTarget::Window,
            EventKind::Scroll,
            bound(&this, |nav: &mut Self, _: &DomEvent<E::Node>| {
                nav.on_scroll();
                Flow::Continue
            }),
        );

        let weak = Rc::downgrade(&this);
        env.listen(
            ListenTarget::Window,
            EventKind::Resize,
            Box::new(move |_: &DomEvent<E::Node>| {
                let weak = weak.clone();
                resize_debounce.call(move || {
                    if let Some(nav) = weak.upgrade() {
                        nav.borrow_mut().refresh_active_section();
                    }
                });
                Flow::Continue
            }),
        );

        this.borrow_mut().refresh_active_section();
        this
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
        self.sync_menu_classes();
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
        self.sync_menu_classes();
    }

    fn sync_menu_classes(&self) {
        let env = &self.ctx.env;
        for node in [&self.menu, &self.toggle].into_iter().flatten() {
            if self.menu_open {
                env.add_class(node, ACTIVE_CLASS);
            } else {
                env.remove_class(node, ACTIVE_CLASS);
            }
        }
    }

    pub fn on_link_click(&mut self, link: &E::Node) -> Flow {
        self.close_menu();

        let Some(href) = self.ctx.env.attribute(link, "href") else {
            return Flow::Continue;
        };
        if !href.starts_with('#') {
            return Flow::Continue;
        }

        scroll_to_anchor(&self.ctx, &href);
        Flow::PreventDefault
    }

    /// Closes the menu for clicks outside both the menu and its toggle.
    pub fn on_document_click(&mut self, target: &E::Node) {
        let env = &self.ctx.env;
        let inside_menu = self.menu.as_ref().is_some_and(|menu| env.contains(menu, target));
        let inside_toggle = self
            .toggle
            .as_ref()
            .is_some_and(|toggle| env.contains(toggle, target));

        if !inside_menu && !inside_toggle {
            self.close_menu();
        }
    }

    pub fn on_scroll(&mut self) {
        if !self.scroll_throttle.try_pass(self.ctx.env.now()) {
            return;
        }
        self.update_scrolled();
        self.refresh_active_section();
    }

    fn update_scrolled(&mut self) {
        self.scrolled = self.ctx.env.scroll_y() > self.ctx.config.scrolled_threshold;

        let Some(navbar) = self.navbar.as_ref() else {
            return;
        };
        if self.scrolled {
            self.ctx.env.add_class(navbar, SCROLLED_CLASS);
        } else {
            self.ctx.env.remove_class(navbar, SCROLLED_CLASS);
        }
    }

    /// The first section in document order whose bounds contain the marker
    /// line wins; every link is cleared before the winner's link is marked.
    pub fn refresh_active_section(&mut self) -> Option<String> {
        let env = &self.ctx.env;
        let marker = env.scroll_y() + self.ctx.config.section_marker_offset;

        let active = env
            .query_selector_all("section[id]")
            .into_iter()
            .find_map(|section| {
                let top = env.offset_top(&section);
                let bottom = top + env.offset_height(&section);
                if marker < top || marker >= bottom {
                    return None;
                }
                env.attribute(&section, "id").filter(|id| !id.is_empty())
            });

        for link in &self.links {
            env.remove_class(link, ACTIVE_CLASS);
        }

        if let Some(id) = active.as_deref() {
            let href = format!("#{id}");
            if let Some(link) = self
                .links
                .iter()
                .find(|link| env.attribute(link, "href").as_deref() == Some(href.as_str()))
            {
                env.add_class(link, ACTIVE_CLASS);
            }
        }

        if active != self.active_section {
            self.ctx.log(
                LogLevel::Debug,
                "active_section_changed",
                serde_json::json!({ "from": self.active_section, "to": active }),
            );
        }
        self.active_section = active.clone();
        active
    }
}
