use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{bound, Context};
use crate::env::{DomEvent, Environment, EventKind, Flow, ListenTarget};
use crate::logging::LogLevel;

pub const TOGGLE_LABEL: &str = "Toggle dark mode";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Points at the theme the next click switches to.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "<i class=\"fas fa-moon\"></i>",
            Self::Dark => "<i class=\"fas fa-sun\"></i>",
        }
    }

    pub fn palette(self) -> [(&'static str, &'static str); 4] {
        match self {
            Self::Light => [
                ("--bg-primary", "#ffffff"),
                ("--bg-secondary", "#f8fafc"),
                ("--text-primary", "#1e293b"),
                ("--text-secondary", "#64748b"),
            ],
            Self::Dark => [
                ("--bg-primary", "#1e293b"),
                ("--bg-secondary", "#334155"),
                ("--text-primary", "#f8fafc"),
                ("--text-secondary", "#cbd5e1"),
            ],
        }
    }
}

pub struct ThemeToggle<E: Environment> {
    ctx: Context<E>,
    theme: Theme,
    button: Option<E::Node>,
}

impl<E: Environment> ThemeToggle<E> {
    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(ctx: Context<E>) -> Rc<RefCell<Self>> {
        let env = Rc::clone(&ctx.env);
        let theme = resolve_theme(&ctx);
        let button = create_toggle_button(&ctx);

        let this = Rc::new(RefCell::new(Self {
            ctx,
            theme,
            button: button.clone(),
        }));
        this.borrow().apply();

        if let Some(button) = button {
            env.listen(
                ListenTarget::Node(button),
                EventKind::Click,
                bound(&this, |toggle: &mut Self, _: &DomEvent<E::Node>| {
                    toggle.toggle();
                    Flow::Continue
                }),
            );
        }

        this
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.apply();

        if let Err(error) = self
            .ctx
            .env
            .store_preference(&self.ctx.config.theme_storage_key, self.theme.as_str())
        {
            self.ctx.log(
                LogLevel::Warn,
                "theme_persist_failed",
                serde_json::json!({ "theme": self.theme.as_str(), "error": error.to_string() }),
            );
        }

        self.ctx.log(
            LogLevel::Debug,
            "theme_changed",
            serde_json::json!({ "theme": self.theme.as_str() }),
        );
        self.theme
    }

    fn apply(&self) {
        let env = &self.ctx.env;
        if let Some(root) = env.root_element() {
            for (variable, value) in self.theme.palette() {
                env.set_style(&root, variable, value);
            }
        }
        if let Some(button) = self.button.as_ref() {
            env.set_inner_html(button, self.theme.icon());
        }
    }
}

fn resolve_theme<E: Environment>(ctx: &Context<E>) -> Theme {
    let key = &ctx.config.theme_storage_key;
    match ctx.env.load_preference(key) {
        Ok(Some(value)) => Theme::from_str(&value).unwrap_or_else(|| {
            ctx.log(
                LogLevel::Warn,
                "theme_preference_invalid",
                serde_json::json!({ "value": value }),
            );
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(error) => {
            ctx.log(
                LogLevel::Warn,
                "theme_preference_unavailable",
                serde_json::json!({ "error": error.to_string() }),
            );
            Theme::default()
        }
    }
}

fn create_toggle_button<E: Environment>(ctx: &Context<E>) -> Option<E::Node> {
    let env = &ctx.env;
    let page = env.body()?;
    let button = env.create_element("button")?;

    env.set_attribute(&button, "class", "theme-toggle");
    env.set_attribute(&button, "type", "button");
    env.set_attribute(&button, "aria-label", TOGGLE_LABEL);
    for (property, value) in [
        ("position", "fixed"),
        ("bottom", "20px"),
        ("left", "20px"),
        ("width", "50px"),
        ("height", "50px"),
        ("border-radius", "50%"),
        ("border", "none"),
        ("background", "var(--primary-color)"),
        ("color", "white"),
        ("cursor", "pointer"),
        ("z-index", "1000"),
    ] {
        env.set_style(&button, property, value);
    }
    env.append_child(&page, &button);
    Some(button)
}
