use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    console, window, Document, Element, Event, EventTarget, FormData,
    HtmlButtonElement, HtmlElement, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, ScrollBehavior,
    ScrollToOptions, ServiceWorkerRegistration, Storage, Window,
};

use crate::app::App;
use crate::env::{
    Dom, DomEvent, EventKind, Flow, Host, ListenTarget, Listener, PreferenceStore,
    RegistrationCallback, TimerId, Timers,
};
use crate::error::EnvError;
use crate::logging::LogLevel;
use crate::observer::{
    Intersection, IntersectionHandler, ObserverChannel, ObserverId, ObserverOptions,
};
use crate::perf::NavigationTiming;

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;
type TimerCallbacks = Rc<RefCell<HashMap<i32, Closure<dyn FnMut()>>>>;

thread_local! {
    static APP: RefCell<Option<App<BrowserEnv>>> = const { RefCell::new(None) };
}

/// The live page.
pub struct BrowserEnv {
    window: Window,
    document: Document,
    timers: TimerCallbacks,
    observers: RefCell<HashMap<u32, (IntersectionObserver, ObserverCallback)>>,
    next_observer: Cell<u32>,
}

impl BrowserEnv {
    pub fn new() -> Option<Self> {
        let window = window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            timers: Rc::new(RefCell::new(HashMap::new())),
            observers: RefCell::new(HashMap::new()),
            next_observer: Cell::new(1),
        })
    }

    fn local_storage(&self) -> Result<Storage, EnvError> {
        self.window
            .local_storage()
            .ok()
            .flatten()
            .ok_or(EnvError::StorageUnavailable)
    }

    fn has_global(&self, name: &str) -> bool {
        Reflect::has(self.window.as_ref(), &JsValue::from_str(name)).unwrap_or(false)
    }
}

fn html_element(node: &Element) -> Option<&HtmlElement> {
    node.dyn_ref::<HtmlElement>()
}

fn collect_elements(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Dom for BrowserEnv {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(collect_elements)
            .unwrap_or_default()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Option<Element> {
        root.query_selector(selector).ok().flatten()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &web_sys::Node = node;
        ancestor.contains(Some(node))
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn root_element(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn style(&self, node: &Element, property: &str) -> String {
        html_element(node)
            .and_then(|element| element.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(element) = html_element(node) else {
            return;
        };
        let style = element.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if disabled {
            let _ = node.set_attribute("disabled", "");
        } else {
            let _ = node.remove_attribute("disabled");
        }
    }

    fn form_values(&self, form: &Element) -> Vec<(String, String)> {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return Vec::new();
        };
        let Ok(data) = FormData::new_with_form(form) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(data.as_ref()) else {
            return Vec::new();
        };

        // File inputs carry no string value and are skipped.
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let pair = Array::from(&entry);
                Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
            })
            .collect()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove_node(&self, node: &Element) {
        node.remove();
    }

    fn is_attached(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn offset_top(&self, node: &Element) -> f64 {
        html_element(node).map_or(0.0, |element| f64::from(element.offset_top()))
    }

    fn offset_height(&self, node: &Element) -> f64 {
        html_element(node).map_or(0.0, |element| f64::from(element.offset_height()))
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn is_loaded(&self) -> bool {
        self.document.ready_state() == "complete"
    }

    fn listen(
        &self,
        target: ListenTarget<Element>,
        kind: EventKind,
        mut listener: Listener<Element>,
    ) {
        let event_target: EventTarget = match target {
            ListenTarget::Node(node) => node.into(),
            ListenTarget::Document => self.document.clone().into(),
            ListenTarget::Window => self.window.clone().into(),
        };

        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let dom_event = DomEvent {
                target: event.target().and_then(|target| target.dyn_into::<Element>().ok()),
                key: event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key),
            };
            if listener(&dom_event) == Flow::PreventDefault {
                event.prevent_default();
            }
        });

        // Listeners live as long as the page.
        if event_target
            .add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
            .is_ok()
        {
            callback.forget();
        }
    }
}

impl Timers for BrowserEnv {
    fn now(&self) -> Duration {
        let elapsed_ms = self.window.performance().map_or(0.0, |performance| performance.now());
        Duration::from_micros((elapsed_ms * 1_000.0).max(0.0) as u64)
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let timers = Rc::clone(&self.timers);
        let handle_slot = Rc::new(Cell::new(None::<i32>));
        let own_handle = Rc::clone(&handle_slot);
        let mut task = Some(task);

        let callback = Closure::<dyn FnMut()>::new(move || {
            let finished = own_handle
                .get()
                .and_then(|handle| timers.borrow_mut().remove(&handle));
            if let Some(task) = task.take() {
                task();
            }
            // Still on this closure's stack; release it once the task unwinds.
            if let Some(finished) = finished {
                spawn_local(async move { drop(finished) });
            }
        });

        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let Ok(handle) = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms,
        ) else {
            return TimerId(0);
        };
        handle_slot.set(Some(handle));
        self.timers.borrow_mut().insert(handle, callback);
        TimerId(handle as u64)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Ok(handle) = i32::try_from(id.0) {
            self.window.clear_timeout_with_handle(handle);
            self.timers.borrow_mut().remove(&handle);
        }
    }
}

impl PreferenceStore for BrowserEnv {
    fn load_preference(&self, key: &str) -> Result<Option<String>, EnvError> {
        self.local_storage()?
            .get_item(key)
            .map_err(|_| EnvError::StorageUnavailable)
    }

    fn store_preference(&self, key: &str, value: &str) -> Result<(), EnvError> {
        self.local_storage()?
            .set_item(key, value)
            .map_err(|error| EnvError::StorageWrite(format!("{error:?}")))
    }
}

impl Host for BrowserEnv {
    fn console(&self, level: LogLevel, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            LogLevel::Debug => console::debug_1(&line),
            LogLevel::Info => console::log_1(&line),
            LogLevel::Warn => console::warn_1(&line),
            LogLevel::Error => console::error_1(&line),
        }
    }

    fn random(&self) -> f64 {
        js_sys::Math::random()
    }

    fn open_window(&self, url: &str, target: &str) -> bool {
        self.window
            .open_with_url_and_target(url, target)
            .ok()
            .flatten()
            .is_some()
    }

    fn track_event(&self, action: &str, category: &str, label: &str) -> bool {
        let Ok(gtag) = Reflect::get(self.window.as_ref(), &JsValue::from_str("gtag")) else {
            return false;
        };
        let Some(gtag) = gtag.dyn_ref::<Function>() else {
            return false;
        };

        let params = Object::new();
        let _ = Reflect::set(&params, &"event_category".into(), &category.into());
        let _ = Reflect::set(&params, &"event_label".into(), &label.into());
        gtag.call3(&JsValue::UNDEFINED, &"event".into(), &action.into(), &params)
            .is_ok()
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        let performance = self.window.performance()?;
        let timing = performance.timing();
        let navigation_start = timing.navigation_start();
        // loadEventEnd is still zero while load listeners run.
        let load_event_end = match timing.load_event_end() {
            end if end > 0.0 => end,
            _ => navigation_start + performance.now(),
        };
        Some(NavigationTiming {
            navigation_start,
            load_event_end,
        })
    }

    fn register_worker(&self, script: &str, done: RegistrationCallback) {
        let navigator = self.window.navigator();
        let supported =
            Reflect::has(navigator.as_ref(), &JsValue::from_str("serviceWorker")).unwrap_or(false);
        if !supported {
            done(Err(EnvError::Unsupported("serviceWorker")));
            return;
        }

        let registration = navigator.service_worker().register(script);
        spawn_local(async move {
            let outcome = match JsFuture::from(registration).await {
                Ok(registration) => registration
                    .dyn_into::<ServiceWorkerRegistration>()
                    .map(|registration| registration.scope())
                    .map_err(|value| EnvError::Registration(format!("{value:?}"))),
                Err(error) => Err(EnvError::Registration(format!("{error:?}"))),
            };
            done(outcome);
        });
    }

    fn create_observer(
        &self,
        channel: ObserverChannel,
        mut handler: IntersectionHandler<Element>,
    ) -> Option<ObserverId> {
        if !self.has_global("IntersectionObserver") {
            return None;
        }

        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch: Vec<Intersection<Element>> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| Intersection {
                        target: entry.target(),
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    })
                    .collect();
                handler(&batch);
            },
        );

        let ObserverOptions {
            threshold,
            root_margin,
        } = channel.options();
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        options.set_root_margin(root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .ok()?;

        let id = self.next_observer.get();
        self.next_observer.set(id + 1);
        self.observers.borrow_mut().insert(id, (observer, callback));
        Some(ObserverId(id))
    }

    fn observe(&self, observer: ObserverId, node: &Element) {
        if let Some((observer, _)) = self.observers.borrow().get(&observer.0) {
            observer.observe(node);
        }
    }

    fn unobserve(&self, observer: ObserverId, node: &Element) {
        if let Some((observer, _)) = self.observers.borrow().get(&observer.0) {
            observer.unobserve(node);
        }
    }

    fn disconnect(&self, observer: ObserverId) {
        let removed = self.observers.borrow_mut().remove(&observer.0);
        if let Some((observer, _callback)) = removed {
            observer.disconnect();
        }
    }
}

fn with_app<T>(f: impl FnOnce(&App<BrowserEnv>) -> T) -> Option<T> {
    APP.with(|slot| slot.borrow().as_ref().map(f))
}

#[wasm_bindgen(js_name = scrollToSection)]
pub fn scroll_to_section(section_id: &str) -> bool {
    with_app(|app| app.scroll_to_section(section_id)).unwrap_or(false)
}

#[wasm_bindgen(js_name = openProject)]
pub fn open_project(project_id: u32) -> bool {
    with_app(|app| app.open_project(project_id).is_ok()).unwrap_or(false)
}

#[wasm_bindgen(js_name = downloadCV)]
pub fn download_cv() {
    with_app(App::download_cv);
}

pub fn run() {
    let Some(env) = BrowserEnv::new() else {
        console::error_1(&JsValue::from_str("portfolio behaviour needs a window and document"));
        return;
    };

    let app = App::start(Rc::new(env));
    APP.with(|slot| *slot.borrow_mut() = Some(app));
}
