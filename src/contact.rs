use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::context::{bound, Context};
use crate::env::{DomEvent, Environment, EventKind, Flow, ListenTarget};
use crate::error::SubmissionError;
use crate::logging::LogLevel;
use crate::notify::{Notifier, Severity};

pub const SUCCESS_MESSAGE: &str = "Message sent! I'll get back to you soon.";
pub const ERROR_MESSAGE: &str =
    "Your message could not be sent. Please try again or reach me by email.";
const SENDING_LABEL_HTML: &str = "<span class=\"spinner\"></span> Sending...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
}

/// Form fields keyed by control name; a repeated name keeps its last value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactMessage {
    fields: BTreeMap<String, String>,
}

impl ContactMessage {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            fields: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

pub type Completion = Box<dyn FnOnce(Result<ContactMessage, SubmissionError>)>;

pub trait SubmissionTransport {
    fn send(&self, message: ContactMessage, done: Completion);
}

/// Stand-in for a real endpoint: resolves after a fixed delay and succeeds
/// with the configured probability.
pub struct SimulatedTransport<E: Environment> {
    ctx: Context<E>,
}

impl<E: Environment> SimulatedTransport<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self { ctx }
    }
}

impl<E: Environment> SubmissionTransport for SimulatedTransport<E> {
    fn send(&self, message: ContactMessage, done: Completion) {
        let payload_bytes = serde_json::to_string(&message).map_or(0, |body| body.len());
        self.ctx.log(
            LogLevel::Debug,
            "contact_submission_simulated",
            serde_json::json!({ "payload_bytes": payload_bytes }),
        );

        let ctx = self.ctx.clone();
        self.ctx.env.set_timeout(
            self.ctx.config.submission_delay,
            Box::new(move || {
                if ctx.env.random() < ctx.config.submission_success_rate {
                    done(Ok(message));
                } else {
                    done(Err(SubmissionError::Simulated));
                }
            }),
        );
    }
}

/// Puts the submit control into its busy state and restores it on drop, so
/// the original label and enabled state come back however the submission ends.
struct SubmitGuard<E: Environment> {
    env: Rc<E>,
    button: Option<E::Node>,
    original_label: String,
    phase: Rc<Cell<SubmitPhase>>,
}

impl<E: Environment> SubmitGuard<E> {
    fn engage(env: Rc<E>, button: Option<E::Node>, phase: Rc<Cell<SubmitPhase>>) -> Self {
        let original_label = button
            .as_ref()
            .map(|button| env.text_content(button))
            .unwrap_or_default();
        if let Some(button) = button.as_ref() {
            env.set_inner_html(button, SENDING_LABEL_HTML);
            env.set_disabled(button, true);
        }
        phase.set(SubmitPhase::Submitting);

        Self {
            env,
            button,
            original_label,
            phase,
        }
    }
}

impl<E: Environment> Drop for SubmitGuard<E> {
    fn drop(&mut self) {
        if let Some(button) = self.button.as_ref() {
            self.env.set_text_content(button, &self.original_label);
            self.env.set_disabled(button, false);
        }
        self.phase.set(SubmitPhase::Idle);
    }
}

pub struct ContactForm<E: Environment> {
    ctx: Context<E>,
    form: E::Node,
    notifier: Notifier<E>,
    transport: Rc<dyn SubmissionTransport>,
    phase: Rc<Cell<SubmitPhase>>,
}

impl<E: Environment> ContactForm<E> {
    /// `None` when the page has no contact form.
    #[must_use = "listeners detach when the handle is dropped"]
    pub fn mount(
        ctx: Context<E>,
        notifier: Notifier<E>,
        transport: Rc<dyn SubmissionTransport>,
    ) -> Option<Rc<RefCell<Self>>> {
        let form = ctx.env.element_by_id("contact-form")?;
        let env = Rc::clone(&ctx.env);
        let this = Rc::new(RefCell::new(Self {
            ctx,
            form: form.clone(),
            notifier,
            transport,
            phase: Rc::new(Cell::new(SubmitPhase::Idle)),
        }));

        env.listen(
            ListenTarget::Node(form),
            EventKind::Submit,
            bound(&this, |form: &mut Self, _: &DomEvent<E::Node>| {
                // Rejected overlaps are logged inside submit.
                let _ = form.submit();
                Flow::PreventDefault
            }),
        );

        Some(this)
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase.get()
    }

    pub fn submit(&self) -> Result<(), SubmissionError> {
        if self.phase.get() == SubmitPhase::Submitting {
            self.ctx.log(
                LogLevel::Debug,
                "contact_submission_rejected",
                serde_json::json!({ "reason": "in_flight" }),
            );
            return Err(SubmissionError::InFlight);
        }

        let env = Rc::clone(&self.ctx.env);
        let message = ContactMessage::from_pairs(env.form_values(&self.form));
        self.ctx.log(
            LogLevel::Info,
            "contact_submission_started",
            serde_json::json!({ "fields": message.field_names() }),
        );

        let button = env.query_within(&self.form, "button[type=\"submit\"]");
        let guard = SubmitGuard::engage(Rc::clone(&env), button, Rc::clone(&self.phase));

        let ctx = self.ctx.clone();
        let notifier = self.notifier.clone();
        let form = self.form.clone();
        self.transport.send(
            message,
            Box::new(move |outcome| {
                let _guard = guard;
                match outcome {
                    Ok(_) => {
                        notifier.show(SUCCESS_MESSAGE, Severity::Success);
                        ctx.env.reset_form(&form);
                        ctx.log(
                            LogLevel::Info,
                            "contact_submission_succeeded",
                            serde_json::json!({}),
                        );
                    }
                    Err(error) => {
                        notifier.show(ERROR_MESSAGE, Severity::Error);
                        ctx.log(
                            LogLevel::Error,
                            "contact_submission_failed",
                            serde_json::json!({ "error": error.to_string() }),
                        );
                    }
                }
            }),
        );

        Ok(())
    }
}
