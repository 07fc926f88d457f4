//! web-sys implementation of the core page traits

use afterglow_core::{ElementNode, Environment, Page};
use std::cell::RefCell;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlMediaElement, Window};

/// Document event requesting the open lightbox to close
pub const LIGHTBOX_CLOSE_EVENT: &str = "afterglow:lightbox-close";

/// A DOM element handle
#[derive(Debug, Clone)]
pub struct DomElement(Element);

impl DomElement {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn node(&self) -> &Element {
        &self.0
    }
}

impl ElementNode for DomElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(err) = self.0.set_attribute(name, value) {
            warn!(attribute = name, error = ?err, "Cannot set attribute");
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(err) = self.0.remove_attribute(name) {
            warn!(attribute = name, error = ?err, "Cannot remove attribute");
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().add_1(class) {
            warn!(class, error = ?err, "Cannot add class");
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().remove_1(class) {
            warn!(class, error = ?err, "Cannot remove class");
        }
    }

    fn set_style(&self, property: &str, value: &str) {
        let Some(element) = self.0.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = element.style().set_property(property, value) {
            warn!(property, error = ?err, "Cannot set style");
        }
    }
}

/// The browser document
pub struct DomPage {
    window: Window,
    document: Document,
    /// Wrapper of the open lightbox overlay
    overlay: RefCell<Option<Element>>,
    /// Click handler shared by every overlay's close button and cover
    request_close: js_sys::Function,
}

impl DomPage {
    pub fn from_window() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let target = document.clone();
        let request_close = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            match Event::new(LIGHTBOX_CLOSE_EVENT) {
                Ok(close) => {
                    let _ = target.dispatch_event(&close);
                }
                Err(err) => warn!(error = ?err, "Cannot create lightbox close event"),
            }
        })
        .into_js_value()
        .unchecked_into::<js_sys::Function>();

        Ok(Self {
            window,
            document,
            overlay: RefCell::new(None),
            request_close,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `div.afterglow-lightbox-wrapper > div.cover + div.afterglow-lightbox + a.afterglow-lightbox-close`
    fn build_overlay(&self, video: &DomElement) -> Result<(Element, Element), JsValue> {
        let wrapper = self.document.create_element("div")?;
        wrapper.set_class_name("afterglow-lightbox-wrapper");

        let cover = self.document.create_element("div")?;
        cover.set_class_name("cover");
        cover.add_event_listener_with_callback("click", &self.request_close)?;

        let lightbox = self.document.create_element("div")?;
        lightbox.set_class_name("afterglow-lightbox");

        let clone = video
            .node()
            .clone_node_with_deep(true)?
            .dyn_into::<Element>()?;
        if let Some(id) = video.node().get_attribute("id") {
            // Keep ids unique while the hidden source stays in the document
            clone.set_attribute("id", &format!("{}_lightbox", id))?;
        }
        lightbox.append_child(&clone)?;

        let close = self.document.create_element("a")?;
        close.set_class_name("afterglow-lightbox-close");
        close.add_event_listener_with_callback("click", &self.request_close)?;

        wrapper.append_child(&cover)?;
        wrapper.append_child(&lightbox)?;
        wrapper.append_child(&close)?;

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("No body element"))?;
        body.append_child(&wrapper)?;

        Ok((wrapper, clone))
    }
}

impl Page for DomPage {
    type Element = DomElement;

    fn query_all(&self, selector: &str) -> Vec<DomElement> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                warn!(selector, error = ?err, "Invalid selector");
                return Vec::new();
            }
        };

        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(DomElement::new)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<DomElement> {
        self.document.get_element_by_id(id).map(DomElement::new)
    }

    fn environment(&self) -> Environment {
        let navigator = self.window.navigator();
        let native_controls = self
            .document
            .query_selector("video")
            .ok()
            .flatten()
            .and_then(|video| video.dyn_into::<HtmlMediaElement>().ok())
            .map(|video| video.controls())
            .unwrap_or(false);

        Environment {
            user_agent: navigator.user_agent().unwrap_or_default(),
            platform: navigator.platform().unwrap_or_default(),
            native_controls,
        }
    }

    fn open_lightbox(&self, video: &DomElement) -> Option<DomElement> {
        self.close_lightbox();
        match self.build_overlay(video) {
            Ok((wrapper, clone)) => {
                *self.overlay.borrow_mut() = Some(wrapper);
                Some(DomElement::new(clone))
            }
            Err(err) => {
                warn!(error = ?err, "Cannot build lightbox overlay");
                None
            }
        }
    }

    fn close_lightbox(&self) {
        if let Some(wrapper) = self.overlay.borrow_mut().take() {
            wrapper.remove();
        }
    }
}
