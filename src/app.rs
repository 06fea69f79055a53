//! Startup wiring and the small scripting surface the page exposes.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SiteConfig;
use crate::contact::{ContactForm, SimulatedTransport};
use crate::context::Context;
use crate::env::Environment;
use crate::error::ModalError;
use crate::lazy::LazyLoader;
use crate::logging::LogLevel;
use crate::modal::ProjectModal;
use crate::nav::Navigation;
use crate::notify::Notifier;
use crate::perf::PerformanceMonitor;
use crate::projects::ProjectRecord;
use crate::reveal::ScrollAnimations;
use crate::scroll::{scroll_to_anchor, SmoothScroll};
use crate::theme::ThemeToggle;

const GREETING: &str = "Hi there, fellow developer! Like the code? Let's talk.";

/// Owns every mounted component. Listeners only hold weak handles, so the
/// page behaviour lives exactly as long as this value.
pub struct App<E: Environment> {
    ctx: Context<E>,
    navigation: Rc<RefCell<Navigation<E>>>,
    smooth_scroll: Rc<RefCell<SmoothScroll<E>>>,
    animations: Rc<RefCell<ScrollAnimations<E>>>,
    modal: Rc<RefCell<ProjectModal<E>>>,
    contact: Option<Rc<RefCell<ContactForm<E>>>>,
    lazy_images: Rc<RefCell<LazyLoader<E>>>,
    theme: Rc<RefCell<ThemeToggle<E>>>,
}

impl<E: Environment> App<E> {
    pub fn start(env: Rc<E>) -> Self {
        let (config, config_error) = match SiteConfig::from_document(&*env) {
            Ok(config) => (config, None),
            Err(error) => (SiteConfig::default(), Some(error)),
        };
        let ctx = Context::new(Rc::clone(&env), config);
        if let Some(error) = config_error {
            ctx.log(
                LogLevel::Warn,
                "site_config_ignored",
                serde_json::json!({ "error": error.to_string() }),
            );
        }

        let notifier = Notifier::new(ctx.clone());
        let transport = Rc::new(SimulatedTransport::new(ctx.clone()));

        let app = Self {
            navigation: Navigation::mount(ctx.clone()),
            animations: ScrollAnimations::mount(ctx.clone()),
            modal: ProjectModal::mount(ctx.clone()),
            contact: ContactForm::mount(ctx.clone(), notifier, transport),
            smooth_scroll: SmoothScroll::mount(ctx.clone()),
            lazy_images: LazyLoader::mount(ctx.clone()),
            theme: ThemeToggle::mount(ctx.clone()),
            ctx,
        };
        PerformanceMonitor::mount(&app.ctx);
        app.register_worker_after_load();

        if let Some(hero) = env.query_selector(".hero") {
            env.add_class(&hero, "fade-in");
        }
        app.ctx.log(
            LogLevel::Info,
            "greeting",
            serde_json::json!({ "message": GREETING }),
        );
        app
    }

    pub fn context(&self) -> &Context<E> {
        &self.ctx
    }

    pub fn navigation(&self) -> &Rc<RefCell<Navigation<E>>> {
        &self.navigation
    }

    pub fn smooth_scroll(&self) -> &Rc<RefCell<SmoothScroll<E>>> {
        &self.smooth_scroll
    }

    pub fn animations(&self) -> &Rc<RefCell<ScrollAnimations<E>>> {
        &self.animations
    }

    pub fn modal(&self) -> &Rc<RefCell<ProjectModal<E>>> {
        &self.modal
    }

    pub fn contact_form(&self) -> Option<&Rc<RefCell<ContactForm<E>>>> {
        self.contact.as_ref()
    }

    pub fn lazy_images(&self) -> &Rc<RefCell<LazyLoader<E>>> {
        &self.lazy_images
    }

    pub fn theme(&self) -> &Rc<RefCell<ThemeToggle<E>>> {
        &self.theme
    }

    /// Accepts `#about` or `about`.
    pub fn scroll_to_section(&self, section: &str) -> bool {
        scroll_to_anchor(&self.ctx, section)
    }

    pub fn open_project(&self, project_id: u32) -> Result<&'static ProjectRecord, ModalError> {
        let result = self.modal.borrow_mut().open(project_id);
        if let Err(error) = &result {
            self.ctx.log(
                LogLevel::Warn,
                "project_modal_open_ignored",
                serde_json::json!({ "reason": error.reason(), "error": error.to_string() }),
            );
        }
        result
    }

    pub fn download_cv(&self) {
        let env = &self.ctx.env;
        let tracked = env.track_event("download", "CV", "PDF Download");
        let opened = env.open_window(&self.ctx.config.cv_path, "_blank");
        self.ctx.log(
            LogLevel::Info,
            "cv_download",
            serde_json::json!({ "tracked": tracked, "opened": opened }),
        );
    }

    fn register_worker_after_load(&self) {
        let ctx = self.ctx.clone();
        self.ctx.env.when_loaded(Box::new(move || register_worker(&ctx)));
    }
}

fn register_worker<E: Environment>(ctx: &Context<E>) {
    let script = ctx.config.worker_script.clone();
    let outcome_ctx = ctx.clone();
    ctx.env.register_worker(
        &script,
        Box::new(move |outcome| match outcome {
            Ok(scope) => outcome_ctx.log(
                LogLevel::Info,
                "worker_registered",
                serde_json::json!({ "script": outcome_ctx.config.worker_script, "scope": scope }),
            ),
            Err(error) => outcome_ctx.log(
                LogLevel::Warn,
                "worker_registration_failed",
                serde_json::json!({
                    "script": outcome_ctx.config.worker_script,
                    "error": error.to_string(),
                }),
            ),
        }),
    );
}
