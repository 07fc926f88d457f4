//! In-memory page and engine used by the integration tests

#![allow(dead_code)]

use afterglow_core::{
    EngineEvent, EngineInstance, EngineSettings, ElementNode, Environment, Error, HotkeyOptions,
    InstanceDirectory, Page, PlayerEngine, PlayerOptions, Result, PROCESSED_MARKER,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

// =============================================================================
// Elements
// =============================================================================

#[derive(Default)]
struct ElementState {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct MockElement(Rc<RefCell<ElementState>>);

impl MockElement {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementState {
            tag: tag.to_string(),
            ..Default::default()
        })))
    }

    /// `<video id=".." class="afterglow">`
    pub fn video(id: &str) -> Self {
        Self::new("video").with_attr("id", id).with_class("afterglow")
    }

    /// `<a class="afterglow" href="#target">`
    pub fn trigger(target: &str) -> Self {
        Self::new("a")
            .with_attr("href", &format!("#{}", target))
            .with_class("afterglow")
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.clone()
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().styles.get(property).cloned()
    }

    /// Shallow copy with its own state, like `cloneNode`
    pub fn duplicate(&self) -> Self {
        let state = self.0.borrow();
        Self(Rc::new(RefCell::new(ElementState {
            tag: state.tag.clone(),
            attributes: state.attributes.clone(),
            classes: state.classes.clone(),
            styles: state.styles.clone(),
        })))
    }

    pub fn same_node(&self, other: &MockElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Supports comma separated `tag.class` selectors
    fn matches(&self, selector: &str) -> bool {
        selector.split(',').any(|part| match part.trim().split_once('.') {
            Some((tag, class)) => self.tag() == tag && self.has_class(class),
            None => self.tag() == part.trim(),
        })
    }
}

impl ElementNode for MockElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.0.borrow_mut().attributes.remove(name);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.borrow_mut().classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    fn set_style(&self, property: &str, value: &str) {
        self.0
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
    }
}

// =============================================================================
// Page
// =============================================================================

#[derive(Default)]
pub struct MockPage {
    elements: RefCell<Vec<MockElement>>,
    env: Environment,
    lightbox: RefCell<Option<MockElement>>,
    pub opened: Cell<usize>,
    pub closed: Cell<usize>,
}

impl MockPage {
    pub fn new(elements: Vec<MockElement>) -> Self {
        Self {
            elements: RefCell::new(elements),
            ..Default::default()
        }
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn add(&self, element: MockElement) {
        self.elements.borrow_mut().push(element);
    }

    /// Element currently mounted in the lightbox overlay
    pub fn lightbox_video(&self) -> Option<MockElement> {
        self.lightbox.borrow().clone()
    }

    fn close_lightbox_element(&self) {
        if let Some(mounted) = self.lightbox.borrow_mut().take() {
            self.elements.borrow_mut().retain(|e| !e.same_node(&mounted));
        }
    }
}

impl Page for MockPage {
    type Element = MockElement;

    fn query_all(&self, selector: &str) -> Vec<MockElement> {
        self.elements
            .borrow()
            .iter()
            .filter(|e| e.matches(selector))
            .cloned()
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<MockElement> {
        self.elements
            .borrow()
            .iter()
            .find(|e| e.attribute("id").as_deref() == Some(id))
            .cloned()
    }

    fn environment(&self) -> Environment {
        self.env.clone()
    }

    /// Mounts a copy of `video` into the document, as the browser overlay does
    fn open_lightbox(&self, video: &MockElement) -> Option<MockElement> {
        self.close_lightbox_element();
        let mounted = video.duplicate();
        mounted.remove_attribute(PROCESSED_MARKER);
        if let Some(id) = video.attribute("id") {
            mounted.set_attribute("id", &format!("{}_lightbox", id));
        }
        self.elements.borrow_mut().push(mounted.clone());
        *self.lightbox.borrow_mut() = Some(mounted.clone());
        self.opened.set(self.opened.get() + 1);
        Some(mounted)
    }

    fn close_lightbox(&self) {
        self.close_lightbox_element();
        self.closed.set(self.closed.get() + 1);
    }
}

// =============================================================================
// Engine
// =============================================================================

type Log = Rc<RefCell<Vec<String>>>;

struct InstanceState {
    id: String,
    element_id: Option<String>,
    options: PlayerOptions,
    ready: bool,
    ready_callbacks: Vec<Box<dyn FnOnce(&MockInstance)>>,
    handlers: Vec<(EngineEvent, Box<dyn FnMut()>)>,
    paused: bool,
    fullscreen: bool,
    disposed: bool,
    volume: Option<f64>,
    hotkeys: Option<HotkeyOptions>,
    children: Vec<String>,
}

#[derive(Clone)]
pub struct MockInstance {
    state: Rc<RefCell<InstanceState>>,
    log: Log,
}

impl MockInstance {
    fn new(id: String, element_id: Option<String>, options: PlayerOptions, ready: bool, log: Log) -> Self {
        Self {
            state: Rc::new(RefCell::new(InstanceState {
                id,
                element_id,
                options,
                ready,
                ready_callbacks: Vec::new(),
                handlers: Vec::new(),
                paused: true,
                fullscreen: false,
                disposed: false,
                volume: None,
                hotkeys: None,
                children: Vec::new(),
            })),
            log,
        }
    }

    pub fn element_id(&self) -> Option<String> {
        self.state.borrow().element_id.clone()
    }

    pub fn options(&self) -> PlayerOptions {
        self.state.borrow().options.clone()
    }

    pub fn volume(&self) -> Option<f64> {
        self.state.borrow().volume
    }

    pub fn hotkey_options(&self) -> Option<HotkeyOptions> {
        self.state.borrow().hotkeys
    }

    pub fn children(&self) -> Vec<String> {
        self.state.borrow().children.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.state.borrow_mut().fullscreen = fullscreen;
    }

    pub fn same_instance(&self, other: &MockInstance) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Simulate the engine signalling readiness
    pub fn fire_ready(&self) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            state.ready = true;
            std::mem::take(&mut state.ready_callbacks)
        };
        for callback in callbacks {
            callback(self);
        }
    }

    /// Actions recorded for this instance, in order
    pub fn calls(&self) -> Vec<String> {
        let prefix = format!("{}:", self.id());
        self.log
            .borrow()
            .iter()
            .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    fn record(&self, action: &str) {
        let entry = format!("{}:{}", self.id(), action);
        self.log.borrow_mut().push(entry);
    }

    fn emit(&self, event: EngineEvent) {
        let mut handlers = std::mem::take(&mut self.state.borrow_mut().handlers);
        for (_, handler) in handlers.iter_mut().filter(|(e, _)| *e == event) {
            handler();
        }
        let mut state = self.state.borrow_mut();
        handlers.append(&mut state.handlers);
        state.handlers = handlers;
    }
}

impl EngineInstance for MockInstance {
    fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    fn ready(&self, callback: Box<dyn FnOnce(&Self)>) {
        let ready = self.state.borrow().ready;
        if ready {
            callback(self);
        } else {
            self.state.borrow_mut().ready_callbacks.push(callback);
        }
    }

    fn hotkeys(&self, options: &HotkeyOptions) {
        self.state.borrow_mut().hotkeys = Some(*options);
        self.record("hotkeys");
    }

    fn set_volume(&self, volume: f64) {
        self.state.borrow_mut().volume = Some(volume);
        self.record("volume");
    }

    fn add_child(&self, name: &str) {
        self.state.borrow_mut().children.push(name.to_string());
        self.record("add_child");
    }

    fn on(&self, event: EngineEvent, handler: Box<dyn FnMut()>) {
        self.state.borrow_mut().handlers.push((event, handler));
    }

    fn play(&self) {
        self.state.borrow_mut().paused = false;
        self.record("play");
        self.emit(EngineEvent::Play);
    }

    fn pause(&self) {
        self.state.borrow_mut().paused = true;
        self.record("pause");
        self.emit(EngineEvent::Pause);
    }

    fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn is_fullscreen(&self) -> bool {
        self.state.borrow().fullscreen
    }

    fn exit_fullscreen(&self) {
        self.state.borrow_mut().fullscreen = false;
        self.record("exit_fullscreen");
    }

    fn dispose(&self) {
        if self.state.borrow().disposed {
            return;
        }
        self.state.borrow_mut().disposed = true;
        self.record("dispose");
        self.emit(EngineEvent::Dispose);
    }
}

#[derive(Default)]
struct EngineState {
    instances: RefCell<Vec<MockInstance>>,
    settings: RefCell<Vec<EngineSettings>>,
    log: Log,
    deferred_ready: Cell<bool>,
    fail_for: RefCell<Option<String>>,
}

/// Engine factory and instance directory in one, sharing state across clones
#[derive(Clone, Default)]
pub struct MockEngine(Rc<EngineState>);

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances only become ready when `fire_ready` is called
    pub fn deferred() -> Self {
        let engine = Self::default();
        engine.0.deferred_ready.set(true);
        engine
    }

    /// Make `create` fail for the element with this id
    pub fn fail_on(&self, element_id: &str) {
        *self.0.fail_for.borrow_mut() = Some(element_id.to_string());
    }

    pub fn directory(&self) -> Rc<dyn InstanceDirectory<MockInstance>> {
        Rc::new(self.clone())
    }

    /// Every instance ever created, disposed ones included
    pub fn created(&self) -> Vec<MockInstance> {
        self.0.instances.borrow().clone()
    }

    pub fn instance_for(&self, element_id: &str) -> Option<MockInstance> {
        self.0
            .instances
            .borrow()
            .iter()
            .rev()
            .find(|i| i.element_id().as_deref() == Some(element_id))
            .cloned()
    }

    pub fn configured(&self) -> Vec<EngineSettings> {
        self.0.settings.borrow().clone()
    }

    /// Global action log, entries are `<instance id>:<action>`
    pub fn log(&self) -> Vec<String> {
        self.0.log.borrow().clone()
    }
}

impl PlayerEngine for MockEngine {
    type Element = MockElement;
    type Instance = MockInstance;

    fn configure(&self, settings: &EngineSettings) {
        self.0.settings.borrow_mut().push(*settings);
    }

    fn create(&self, element: &MockElement, options: &PlayerOptions) -> Result<MockInstance> {
        let element_id = element.attribute("id");
        if element_id.is_some() && *self.0.fail_for.borrow() == element_id {
            return Err(Error::engine("element is not a media element"));
        }

        let mut instances = self.0.instances.borrow_mut();
        let instance = MockInstance::new(
            format!("vjs_player_{}", instances.len() + 1),
            element_id,
            options.clone(),
            !self.0.deferred_ready.get(),
            Rc::clone(&self.0.log),
        );
        instances.push(instance.clone());
        Ok(instance)
    }
}

impl InstanceDirectory<MockInstance> for MockEngine {
    fn instances(&self) -> Vec<MockInstance> {
        self.0
            .instances
            .borrow()
            .iter()
            .filter(|i| !i.is_disposed())
            .cloned()
            .collect()
    }
}

// =============================================================================
// Log capture
// =============================================================================

/// Shared buffer usable as a `tracing-subscriber` writer
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with a subscriber writing into this buffer
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
