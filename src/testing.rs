//! In-memory page used by the unit tests: a small node tree, a virtual
//! clock, scripted randomness and observers driven by hand.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::context::Context;
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Default)]
struct FakeNode {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    inner_html: String,
    text: String,
    disabled: bool,
    offset_top: f64,
    offset_height: f64,
    form_values: Vec<(String, String)>,
}

struct PendingTimer {
    id: u64,
    due: Duration,
    task: Box<dyn FnOnce()>,
}

struct FakeObserver {
    channel: ObserverChannel,
    options: ObserverOptions,
    handler: Option<IntersectionHandler<NodeId>>,
    watched: Vec<NodeId>,
    connected: bool,
}

type SharedListener = Rc<RefCell<Listener<NodeId>>>;

pub struct FakeEnv {
    nodes: RefCell<Vec<FakeNode>>,
    root: NodeId,
    body: NodeId,
    scroll_y: Cell<f64>,
    scroll_requests: RefCell<Vec<f64>>,
    loaded: Cell<bool>,
    listeners: RefCell<Vec<(ListenTarget<NodeId>, EventKind, SharedListener)>>,
    now: Cell<Duration>,
    timers: RefCell<Vec<PendingTimer>>,
    next_timer: Cell<u64>,
    storage: RefCell<Option<BTreeMap<String, String>>>,
    storage_read_only: Cell<bool>,
    randoms: RefCell<VecDeque<f64>>,
    logs: RefCell<Vec<(LogLevel, String)>>,
    opened: RefCell<Vec<(String, String)>>,
    analytics: RefCell<Option<Vec<(String, String, String)>>>,
    timing: Cell<Option<NavigationTiming>>,
    worker_outcome: RefCell<Result<String, EnvError>>,
    registrations: RefCell<Vec<String>>,
    observers_supported: Cell<bool>,
    observers: RefCell<BTreeMap<u32, FakeObserver>>,
    next_observer: Cell<u32>,
}

pub fn test_context(env: &Rc<FakeEnv>) -> Context<FakeEnv> {
    let config = SiteConfig {
        log_level: LogLevel::Debug,
        ..SiteConfig::default()
    };
    Context::new(Rc::clone(env), config)
}

impl FakeEnv {
    pub fn new() -> Rc<Self> {
        let root = FakeNode {
            tag: "html".to_string(),
            children: vec![NodeId(1)],
            ..FakeNode::default()
        };
        let body = FakeNode {
            tag: "body".to_string(),
            parent: Some(NodeId(0)),
            ..FakeNode::default()
        };

        Rc::new(Self {
            nodes: RefCell::new(vec![root, body]),
            root: NodeId(0),
            body: NodeId(1),
            scroll_y: Cell::new(0.0),
            scroll_requests: RefCell::new(Vec::new()),
            loaded: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            now: Cell::new(Duration::ZERO),
            timers: RefCell::new(Vec::new()),
            next_timer: Cell::new(1),
            storage: RefCell::new(Some(BTreeMap::new())),
            storage_read_only: Cell::new(false),
            randoms: RefCell::new(VecDeque::new()),
            logs: RefCell::new(Vec::new()),
            opened: RefCell::new(Vec::new()),
            analytics: RefCell::new(None),
            timing: Cell::new(None),
            worker_outcome: RefCell::new(Ok("/".to_string())),
            registrations: RefCell::new(Vec::new()),
            observers_supported: Cell::new(true),
            observers: RefCell::new(BTreeMap::new()),
            next_observer: Cell::new(1),
        })
    }

    pub fn body_id(&self) -> NodeId {
        self.body
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Appends a new element; a `class` attribute is split into classes.
    pub fn element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.detached(tag);
        {
            let mut nodes = self.nodes.borrow_mut();
            for (name, value) in attributes {
                if *name == "class" {
                    nodes[node.0].classes =
                        value.split_whitespace().map(ToString::to_string).collect();
                } else {
                    nodes[node.0]
                        .attributes
                        .insert((*name).to_string(), (*value).to_string());
                }
            }
        }
        self.attach(parent, node);
        node
    }

    pub fn set_geometry(&self, node: NodeId, top: f64, height: f64) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].offset_top = top;
        nodes[node.0].offset_height = height;
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        self.set_text_content(&node, text);
    }

    pub fn set_form_values(&self, form: NodeId, values: &[(&str, &str)]) {
        self.nodes.borrow_mut()[form.0].form_values = values
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].inner_html.clone()
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.nodes.borrow()[node.0].disabled
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    pub fn class_count(&self, class: &str) -> usize {
        self.query_selector_all(&format!(".{class}")).len()
    }

    pub fn scroll_requests(&self) -> Vec<f64> {
        self.scroll_requests.borrow().clone()
    }

    // Events

    pub fn dispatch(
        &self,
        target: ListenTarget<NodeId>,
        kind: EventKind,
        event: &DomEvent<NodeId>,
    ) -> Flow {
        let matching: Vec<SharedListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(listen_target, listen_kind, _)| {
                *listen_target == target && *listen_kind == kind
            })
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();

        let mut flow = Flow::Continue;
        for listener in matching {
            let mut listener = listener.borrow_mut();
            if (*listener)(event) == Flow::PreventDefault {
                flow = Flow::PreventDefault;
            }
        }
        flow
    }

    /// Bubbles a click from `node` through its ancestors to the document.
    pub fn click(&self, node: NodeId) -> Flow {
        let event = DomEvent::on(node);
        let mut flow = Flow::Continue;
        let mut current = Some(node);

        while let Some(target) = current {
            let node_flow = self.dispatch(ListenTarget::Node(target), EventKind::Click, &event);
            if node_flow == Flow::PreventDefault {
                flow = Flow::PreventDefault;
            }
            current = self.nodes.borrow()[target.0].parent;
        }

        if self.dispatch(ListenTarget::Document, EventKind::Click, &event) == Flow::PreventDefault {
            flow = Flow::PreventDefault;
        }
        flow
    }

    pub fn submit(&self, form: NodeId) -> Flow {
        self.dispatch(ListenTarget::Node(form), EventKind::Submit, &DomEvent::on(form))
    }

    pub fn press_key(&self, key: &str) -> Flow {
        self.dispatch(ListenTarget::Document, EventKind::KeyDown, &DomEvent::key(key))
    }

    pub fn scroll_window_to(&self, y: f64) {
        self.scroll_y.set(y);
        self.dispatch(ListenTarget::Window, EventKind::Scroll, &DomEvent::bare());
    }

    /// Loads the page without dispatching `load`, as when listeners arrive late.
    pub fn mark_loaded(&self) {
        self.loaded.set(true);
    }

    pub fn resize_window(&self) {
        self.dispatch(ListenTarget::Window, EventKind::Resize, &DomEvent::bare());
    }

    pub fn fire_load(&self) {
        self.loaded.set(true);
        self.dispatch(ListenTarget::Window, EventKind::Load, &DomEvent::bare());
    }

    // Time

    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due_index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                due_index.map(|index| timers.remove(index))
            };

            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.task)();
        }

        self.now.set(target);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn push_random(&self, value: f64) {
        self.randoms.borrow_mut().push_back(value);
    }

    // Storage

    pub fn disable_storage(&self) {
        *self.storage.borrow_mut() = None;
    }

    pub fn make_storage_read_only(&self) {
        self.storage_read_only.set(true);
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.borrow().as_ref().and_then(|items| items.get(key).cloned())
    }

    pub fn seed_storage(&self, key: &str, value: &str) {
        if let Some(items) = self.storage.borrow_mut().as_mut() {
            items.insert(key.to_string(), value.to_string());
        }
    }

    // Logs

    pub fn logs_for(&self, event: &str) -> Vec<String> {
        let needle = format!("\"event\":\"{event}\"");
        self.logs
            .borrow()
            .iter()
            .filter(|(_, line)| line.contains(&needle))
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn log_count(&self, event: &str) -> usize {
        self.logs_for(event).len()
    }

    // Host

    pub fn opened_windows(&self) -> Vec<(String, String)> {
        self.opened.borrow().clone()
    }

    pub fn install_analytics_hook(&self) {
        *self.analytics.borrow_mut() = Some(Vec::new());
    }

    pub fn tracked_events(&self) -> Vec<(String, String, String)> {
        self.analytics.borrow().clone().unwrap_or_default()
    }

    pub fn set_navigation_timing(&self, timing: Option<NavigationTiming>) {
        self.timing.set(timing);
    }

    pub fn set_worker_outcome(&self, outcome: Result<String, EnvError>) {
        *self.worker_outcome.borrow_mut() = outcome;
    }

    pub fn worker_registrations(&self) -> Vec<String> {
        self.registrations.borrow().clone()
    }

    // Observers

    pub fn disable_observers(&self) {
        self.observers_supported.set(false);
    }

    pub fn watched(&self, channel: ObserverChannel) -> Vec<NodeId> {
        self.observers
            .borrow()
            .values()
            .filter(|observer| observer.connected && observer.channel == channel)
            .flat_map(|observer| observer.watched.clone())
            .collect()
    }

    /// Options of the connected observers on `channel`.
    pub fn observer_options(&self, channel: ObserverChannel) -> Vec<ObserverOptions> {
        self.observers
            .borrow()
            .values()
            .filter(|observer| observer.connected && observer.channel == channel)
            .map(|observer| observer.options)
            .collect()
    }

    /// Delivers one entry to every connected observer on `channel` watching `node`.
    pub fn intersect(&self, channel: ObserverChannel, node: NodeId, is_intersecting: bool) {
        let ids: Vec<u32> = self
            .observers
            .borrow()
            .iter()
            .filter(|(_, observer)| {
                observer.connected
                    && observer.channel == channel
                    && observer.watched.contains(&node)
            })
            .map(|(id, _)| *id)
            .collect();

        let entry = Intersection {
            target: node,
            is_intersecting,
            ratio: if is_intersecting { 1.0 } else { 0.0 },
        };

        for id in ids {
            let handler = self
                .observers
                .borrow_mut()
                .get_mut(&id)
                .and_then(|observer| observer.handler.take());
            let Some(mut handler) = handler else {
                continue;
            };

            handler(std::slice::from_ref(&entry));

            if let Some(observer) = self.observers.borrow_mut().get_mut(&id) {
                if observer.connected {
                    observer.handler = Some(handler);
                }
            }
        }
    }

    // Tree helpers

    fn detached(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(FakeNode {
            tag: tag.to_string(),
            ..FakeNode::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];

        if selector.tag.as_deref().is_some_and(|tag| tag != data.tag) {
            return false;
        }
        if selector
            .id
            .as_deref()
            .is_some_and(|id| data.attributes.get("id").map(String::as_str) != Some(id))
        {
            return false;
        }
        if !selector.classes.iter().all(|class| data.classes.contains(class)) {
            return false;
        }
        selector.attributes.iter().all(|(name, test)| {
            let value = data.attributes.get(name);
            match test {
                AttributeTest::Present => value.is_some(),
                AttributeTest::Equals(expected) => value == Some(expected),
                AttributeTest::Prefix(prefix) => {
                    value.is_some_and(|value| value.starts_with(prefix.as_str()))
                }
            }
        })
    }
}

enum AttributeTest {
    Present,
    Equals(String),
    Prefix(String),
}

#[derive(Default)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, AttributeTest)>,
}

/// Compound selectors only: `tag#id.class[attr][attr="v"][attr^="v"]`.
fn parse_selector(raw: &str) -> Selector {
    fn take_name(chars: &[char], mut index: usize) -> (String, usize) {
        let start = index;
        while index < chars.len() && !matches!(chars[index], '#' | '.' | '[') {
            index += 1;
        }
        (chars[start..index].iter().collect(), index)
    }

    let chars: Vec<char> = raw.trim().chars().collect();
    let mut selector = Selector::default();
    let mut index = 0;

    while index < chars.len() {
        match chars[index] {
            '#' => {
                let (name, next) = take_name(&chars, index + 1);
                selector.id = Some(name);
                index = next;
            }
            '.' => {
                let (name, next) = take_name(&chars, index + 1);
                selector.classes.push(name);
                index = next;
            }
            '[' => {
                let end = chars[index..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| index + offset)
                    .unwrap_or(chars.len());
                let body: String = chars[index + 1..end].iter().collect();
                let unquote =
                    |value: &str| value.trim().trim_matches('"').trim_matches('\'').to_string();
                let test = if let Some((name, value)) = body.split_once("^=") {
                    (name.trim().to_string(), AttributeTest::Prefix(unquote(value)))
                } else if let Some((name, value)) = body.split_once('=') {
                    (name.trim().to_string(), AttributeTest::Equals(unquote(value)))
                } else {
                    (body.trim().to_string(), AttributeTest::Present)
                };
                selector.attributes.push(test);
                index = end + 1;
            }
            _ => {
                let (name, next) = take_name(&chars, index);
                selector.tag = Some(name);
                index = next;
            }
        }
    }

    selector
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

impl Dom for FakeEnv {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_selector(&format!("#{id}"))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let parsed = parse_selector(selector);
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.matches(*node, &parsed))
            .collect()
    }

    fn query_within(&self, root: &NodeId, selector: &str) -> Option<NodeId> {
        let parsed = parse_selector(selector);
        self.descendants(*root)
            .into_iter()
            .find(|node| self.matches(*node, &parsed))
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let parsed = parse_selector(selector);
        let mut current = Some(*node);
        while let Some(candidate) = current {
            if self.matches(candidate, &parsed) {
                return Some(candidate);
            }
            current = self.parent_of(candidate);
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(*node);
        while let Some(candidate) = current {
            if candidate == *ancestor {
                return true;
            }
            current = self.parent_of(candidate);
        }
        false
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn root_element(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        if name == "class" {
            let classes = &nodes[node.0].classes;
            return (!classes.is_empty()).then(|| classes.join(" "));
        }
        nodes[node.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        if name == "class" {
            nodes[node.0].classes = value.split_whitespace().map(ToString::to_string).collect();
            return;
        }
        nodes[node.0].attributes.insert(name.to_string(), value.to_string());
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|existing| existing == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[node.0].classes;
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.nodes.borrow_mut()[node.0].classes.retain(|existing| existing != class);
    }

    fn style(&self, node: &NodeId, property: &str) -> String {
        self.nodes.borrow()[node.0]
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        if value.is_empty() {
            nodes[node.0].styles.remove(property);
        } else {
            nodes[node.0].styles.insert(property.to_string(), value.to_string());
        }
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].inner_html = html.to_string();
        nodes[node.0].text = strip_tags(html);
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.nodes.borrow()[node.0].text.clone()
    }

    fn set_text_content(&self, node: &NodeId, text: &str) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].text = text.to_string();
        nodes[node.0].inner_html = text.to_string();
    }

    fn set_disabled(&self, node: &NodeId, disabled: bool) {
        self.nodes.borrow_mut()[node.0].disabled = disabled;
    }

    fn form_values(&self, form: &NodeId) -> Vec<(String, String)> {
        self.nodes.borrow()[form.0].form_values.clone()
    }

    fn reset_form(&self, form: &NodeId) {
        for (_, value) in self.nodes.borrow_mut()[form.0].form_values.iter_mut() {
            value.clear();
        }
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.detached(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.attach(*parent, *child);
    }

    fn remove_node(&self, node: &NodeId) {
        self.detach(*node);
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.contains(&self.root, node)
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.nodes.borrow()[node.0].offset_top
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        self.nodes.borrow()[node.0].offset_height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.scroll_requests.borrow_mut().push(top);
    }

    fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    fn listen(&self, target: ListenTarget<NodeId>, kind: EventKind, listener: Listener<NodeId>) {
        self.listeners
            .borrow_mut()
            .push((target, kind, Rc::new(RefCell::new(listener))));
    }
}

impl Timers for FakeEnv {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let id = self.next_timer.get();
        self.next_timer.set(id + 1);
        self.timers.borrow_mut().push(PendingTimer {
            id,
            due: self.now.get() + delay,
            task,
        });
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        // Drop outside the borrow: a dropped task may clear other timers.
        let removed: Vec<PendingTimer> = {
            let mut timers = self.timers.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) =
                timers.drain(..).partition(|timer| timer.id == id.0);
            *timers = kept;
            removed
        };
        drop(removed);
    }
}

impl PreferenceStore for FakeEnv {
    fn load_preference(&self, key: &str) -> Result<Option<String>, EnvError> {
        self.storage
            .borrow()
            .as_ref()
            .map(|items| items.get(key).cloned())
            .ok_or(EnvError::StorageUnavailable)
    }

    fn store_preference(&self, key: &str, value: &str) -> Result<(), EnvError> {
        if self.storage_read_only.get() {
            return Err(EnvError::StorageWrite("quota exceeded".to_string()));
        }
        let mut storage = self.storage.borrow_mut();
        let items = storage.as_mut().ok_or(EnvError::StorageUnavailable)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl Host for FakeEnv {
    fn console(&self, level: LogLevel, line: &str) {
        self.logs.borrow_mut().push((level, line.to_string()));
    }

    fn random(&self) -> f64 {
        self.randoms.borrow_mut().pop_front().unwrap_or(0.5)
    }

    fn open_window(&self, url: &str, target: &str) -> bool {
        self.opened
            .borrow_mut()
            .push((url.to_string(), target.to_string()));
        true
    }

    fn track_event(&self, action: &str, category: &str, label: &str) -> bool {
        match self.analytics.borrow_mut().as_mut() {
            Some(events) => {
                events.push((action.to_string(), category.to_string(), label.to_string()));
                true
            }
            None => false,
        }
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        self.timing.get()
    }

    fn register_worker(&self, script: &str, done: RegistrationCallback) {
        self.registrations.borrow_mut().push(script.to_string());
        let outcome = self.worker_outcome.borrow().clone();
        done(outcome);
    }

    fn create_observer(
        &self,
        channel: ObserverChannel,
        handler: IntersectionHandler<NodeId>,
    ) -> Option<ObserverId> {
        if !self.observers_supported.get() {
            return None;
        }
        let id = self.next_observer.get();
        self.next_observer.set(id + 1);
        self.observers.borrow_mut().insert(
            id,
            FakeObserver {
                channel,
                options: channel.options(),
                handler: Some(handler),
                watched: Vec::new(),
                connected: true,
            },
        );
        Some(ObserverId(id))
    }

    fn observe(&self, observer: ObserverId, node: &NodeId) {
        if let Some(observer) = self.observers.borrow_mut().get_mut(&observer.0) {
            if !observer.watched.contains(node) {
                observer.watched.push(*node);
            }
        }
    }

    fn unobserve(&self, observer: ObserverId, node: &NodeId) {
        if let Some(observer) = self.observers.borrow_mut().get_mut(&observer.0) {
            observer.watched.retain(|watched| watched != node);
        }
    }

    fn disconnect(&self, observer: ObserverId) {
        let handler = self
            .observers
            .borrow_mut()
            .get_mut(&observer.0)
            .and_then(|observer| {
                observer.connected = false;
                observer.watched.clear();
                observer.handler.take()
            });
        drop(handler);
    }
}

/// Node handles for the markup the behaviour layer expects on the page.
pub struct PortfolioPage {
    pub navbar: NodeId,
    pub nav_toggle: NodeId,
    pub nav_menu: NodeId,
    pub nav_links: Vec<NodeId>,
    pub sections: Vec<NodeId>,
    pub hero: NodeId,
    pub reveal_targets: Vec<NodeId>,
    pub skill_bars: Vec<NodeId>,
    pub detail_buttons: Vec<NodeId>,
    pub modal: NodeId,
    pub modal_body: NodeId,
    pub modal_close: NodeId,
    pub contact_form: NodeId,
    pub submit_button: NodeId,
    pub lazy_images: Vec<NodeId>,
    pub outside: NodeId,
}

pub const SECTION_IDS: [&str; 4] = ["home", "about", "projects", "contact"];

/// Sections stack at 600px each from the top of the page.
pub fn portfolio_page(env: &FakeEnv) -> PortfolioPage {
    let body = env.body_id();

    let navbar = env.element(body, "nav", &[("id", "navbar"), ("class", "navbar")]);
    let nav_toggle = env.element(navbar, "div", &[("id", "nav-toggle"), ("class", "nav-toggle")]);
    env.element(nav_toggle, "span", &[("class", "bar")]);
    let nav_menu = env.element(navbar, "ul", &[("id", "nav-menu"), ("class", "nav-menu")]);
    let nav_links = SECTION_IDS
        .iter()
        .map(|id| {
            let item = env.element(nav_menu, "li", &[]);
            let href = format!("#{id}");
            env.element(item, "a", &[("class", "nav-link"), ("href", href.as_str())])
        })
        .collect();

    let main = env.element(body, "main", &[]);
    let sections: Vec<NodeId> = SECTION_IDS
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let section = env.element(main, "section", &[("id", *id)]);
            env.set_geometry(section, index as f64 * 600.0, 600.0);
            section
        })
        .collect();
    env.add_class(&sections[0], "hero");
    let hero = sections[0];

    let reveal_targets = (0..3)
        .map(|_| env.element(sections[1], "div", &[("class", "card animate-on-scroll")]))
        .collect();
    let skill_bars = ["90%", "75%"]
        .iter()
        .map(|width| {
            env.element(sections[1], "div", &[("class", "skill-progress"), ("data-width", *width)])
        })
        .collect();

    let detail_buttons = (1..=3)
        .map(|id| {
            let id = id.to_string();
            env.element(
                sections[2],
                "button",
                &[("class", "btn btn-details"), ("data-project", id.as_str())],
            )
        })
        .collect();
    let lazy_images = ["images/project1.jpg", "images/project2.jpg"]
        .iter()
        .map(|src| {
            let attributes = [("data-src", *src), ("src", "images/placeholder.svg")];
            env.element(sections[2], "img", &attributes)
        })
        .collect();

    let contact_form = env.element(sections[3], "form", &[("id", "contact-form")]);
    env.set_form_values(
        contact_form,
        &[("name", "Ada"), ("email", "ada@example.com"), ("message", "Hello there")],
    );
    let submit_button = env.element(
        contact_form,
        "button",
        &[("type", "submit"), ("class", "btn btn-primary")],
    );
    env.set_text(submit_button, "Send message");

    let modal = env.element(body, "div", &[("id", "project-modal"), ("class", "modal")]);
    let modal_content = env.element(modal, "div", &[("class", "modal-content")]);
    let modal_close = env.element(modal_content, "span", &[("class", "modal-close")]);
    let modal_body = env.element(modal_content, "div", &[("id", "modal-body")]);

    let outside = env.element(body, "footer", &[]);

    PortfolioPage {
        navbar,
        nav_toggle,
        nav_menu,
        nav_links,
        sections,
        hero,
        reveal_targets,
        skill_bars,
        detail_buttons,
        modal,
        modal_body,
        modal_close,
        contact_form,
        submit_button,
        lazy_images,
        outside,
    }
}
