//! The page-facing capabilities every component is built on.
//!
//! Lookups return `Option` and writes are best-effort: a missing element or
//! an absent browser capability makes the caller do less, never fail.

use std::fmt;
use std::time::Duration;

use crate::error::EnvError;
use crate::logging::LogLevel;
use crate::observer::{IntersectionHandler, ObserverChannel, ObserverId};
use crate::perf::NavigationTiming;

#[derive(Clone, Debug, PartialEq)]
pub enum ListenTarget<N> {
    Node(N),
    Document,
    Window,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Scroll,
    Resize,
    KeyDown,
    Load,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::KeyDown => "keydown",
            Self::Load => "load",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomEvent<N> {
    pub target: Option<N>,
    pub key: Option<String>,
}

impl<N> DomEvent<N> {
    pub fn on(target: N) -> Self {
        Self {
            target: Some(target),
            key: None,
        }
    }

    pub fn key(key: &str) -> Self {
        Self {
            target: None,
            key: Some(key.to_string()),
        }
    }

    pub fn bare() -> Self {
        Self {
            target: None,
            key: None,
        }
    }
}

/// What a listener wants done with the browser's default action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    PreventDefault,
}

pub type Listener<N> = Box<dyn FnMut(&DomEvent<N>) -> Flow>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;
    /// Matches in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;
    /// First descendant of `root` matching `selector`.
    fn query_within(&self, root: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// `node` itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
    fn body(&self) -> Option<Self::Node>;
    fn root_element(&self) -> Option<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    /// Inline style value, empty when unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;
    /// An empty `value` clears the inline property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    fn text_content(&self, node: &Self::Node) -> String;
    fn set_text_content(&self, node: &Self::Node, text: &str);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);

    /// Named form controls with their current values, in form order.
    fn form_values(&self, form: &Self::Node) -> Vec<(String, String)>;
    fn reset_form(&self, form: &Self::Node);

    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove_node(&self, node: &Self::Node);
    fn is_attached(&self, node: &Self::Node) -> bool;

    fn offset_top(&self, node: &Self::Node) -> f64;
    fn offset_height(&self, node: &Self::Node) -> f64;
    fn scroll_y(&self) -> f64;
    fn smooth_scroll_to(&self, top: f64);
    /// True once the window `load` event has fired.
    fn is_loaded(&self) -> bool;

    fn listen(
        &self,
        target: ListenTarget<Self::Node>,
        kind: EventKind,
        listener: Listener<Self::Node>,
    );

    /// Runs `task` now if the page has already loaded, otherwise on `load`.
    fn when_loaded(&self, task: Box<dyn FnOnce()>) {
        if self.is_loaded() {
            task();
            return;
        }
        let mut task = Some(task);
        self.listen(
            ListenTarget::Window,
            EventKind::Load,
            Box::new(move |_: &DomEvent<Self::Node>| {
                if let Some(task) = task.take() {
                    task();
                }
                Flow::Continue
            }),
        );
    }
}

pub trait Timers {
    /// Monotonic time since the page started.
    fn now(&self) -> Duration;
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId;
    fn clear_timeout(&self, id: TimerId);
}

pub trait PreferenceStore {
    fn load_preference(&self, key: &str) -> Result<Option<String>, EnvError>;
    fn store_preference(&self, key: &str, value: &str) -> Result<(), EnvError>;
}

pub type RegistrationCallback = Box<dyn FnOnce(Result<String, EnvError>)>;

pub trait Host: Dom {
    fn console(&self, level: LogLevel, line: &str);
    /// Uniform in `[0, 1)`.
    fn random(&self) -> f64;
    fn open_window(&self, url: &str, target: &str) -> bool;
    /// Returns `false` when the page carries no analytics hook.
    fn track_event(&self, action: &str, category: &str, label: &str) -> bool;
    fn navigation_timing(&self) -> Option<NavigationTiming>;
    /// Resolves with the registration scope.
    fn register_worker(&self, script: &str, done: RegistrationCallback);

    /// `None` when the page cannot observe intersections.
    fn create_observer(
        &self,
        channel: ObserverChannel,
        handler: IntersectionHandler<Self::Node>,
    ) -> Option<ObserverId>;
    fn observe(&self, observer: ObserverId, node: &Self::Node);
    fn unobserve(&self, observer: ObserverId, node: &Self::Node);
    fn disconnect(&self, observer: ObserverId);
}

pub trait Environment: Dom + Timers + PreferenceStore + Host + 'static {}

impl<T> Environment for T where T: Dom + Timers + PreferenceStore + Host + 'static {}
