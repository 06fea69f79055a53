use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{bound, Context};
use crate::env::{DomEvent, Environment, EventKind, Flow, ListenTarget};
use crate::error::ModalError;
use crate::logging::LogLevel;
use crate::projects::{find_project, render_project_detail, ProjectRecord};

pub struct ProjectModal<E: Environment> {
    ctx: Context<E>,
    modal: Option<E::Node>,
    body: Option<E::Node>,
    close_control: Option<E::Node>,
    visible: bool,
}

impl<E: Environment> ProjectModal<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self {
            modal: ctx.env.element_by_id("project-modal"),
            body: ctx.env.element_by_id("modal-body"),
            close_control: ctx.env.query_selector(".modal-close"),
            visible: false,
            ctx,
        }
    }

    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(ctx: Context<E>) -> Rc<RefCell<Self>> {
        let env = Rc::clone(&ctx.env);
        let this = Rc::new(RefCell::new(Self::new(ctx)));
        let (modal, close_control) = {
            let modal = this.borrow();
            (modal.modal.clone(), modal.close_control.clone())
        };

        for button in env.query_selector_all(".btn-details") {
            let clicked = button.clone();
            env.listen(
                ListenTarget::Node(button),
                EventKind::Click,
                bound(&this, move |modal: &mut Self, _: &DomEvent<E::Node>| {
                    modal.open_from_button(&clicked);
                    Flow::Continue
                }),
            );
        }

        if let Some(close_control) = close_control {
            env.listen(
                ListenTarget::Node(close_control),
                EventKind::Click,
                bound(&this, |modal: &mut Self, _: &DomEvent<E::Node>| {
                    modal.close();
                    Flow::Continue
                }),
            );
        }

        if let Some(container) = modal {
            env.listen(
                ListenTarget::Node(container),
                EventKind::Click,
                bound(&this, |modal: &mut Self, event: &DomEvent<E::Node>| {
                    modal.on_backdrop_click(event.target.as_ref());
                    Flow::Continue
                }),
            );
        }

        env.listen(
            ListenTarget::Document,
            EventKind::KeyDown,
            bound(&this, |modal: &mut Self, event: &DomEvent<E::Node>| {
                if event.key.as_deref() == Some("Escape") && modal.is_open() {
                    modal.close();
                }
                Flow::Continue
            }),
        );

        this
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Renders the project into the modal body and shows it. Unknown IDs
    /// leave the modal untouched and are reported to the caller only.
    pub fn open(&mut self, project_id: u32) -> Result<&'static ProjectRecord, ModalError> {
        let project = find_project(project_id).ok_or(ModalError::UnknownProject(project_id))?;
        let (Some(modal), Some(body)) = (self.modal.as_ref(), self.body.as_ref()) else {
            return Err(ModalError::MissingMarkup("#project-modal / #modal-body"));
        };

        let env = &self.ctx.env;
        env.set_inner_html(body, &render_project_detail(project));
        env.set_style(modal, "display", "block");
        if let Some(page) = env.body() {
            env.set_style(&page, "overflow", "hidden");
        }
        self.visible = true;

        self.ctx.log(
            LogLevel::Info,
            "project_modal_opened",
            serde_json::json!({ "project_id": project_id }),
        );
        Ok(project)
    }

    pub fn open_from_button(&mut self, button: &E::Node) {
        let raw = self.ctx.env.attribute(button, "data-project").unwrap_or_default();
        let result = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ModalError::InvalidProjectId(raw.clone()))
            .and_then(|project_id| self.open(project_id).map(|_| ()));

        if let Err(error) = result {
            self.ctx.log(
                LogLevel::Warn,
                "project_modal_open_ignored",
                serde_json::json!({ "reason": error.reason(), "error": error.to_string() }),
            );
        }
    }

    /// Hides the modal and always gives page scrolling back.
    pub fn close(&mut self) {
        let env = &self.ctx.env;
        if let Some(modal) = self.modal.as_ref() {
            env.set_style(modal, "display", "none");
        }
        if let Some(page) = env.body() {
            env.set_style(&page, "overflow", "");
        }
        self.visible = false;
    }

    pub fn on_backdrop_click(&mut self, target: Option<&E::Node>) {
        if target.is_some() && target == self.modal.as_ref() {
            self.close();
        }
    }
}
