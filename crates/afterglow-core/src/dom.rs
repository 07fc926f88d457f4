//! Page abstraction
//!
//! The core never talks to a browser directly. Elements and the page are
//! reached through these traits so the registry can run against web-sys in
//! the browser and against in-memory mocks in tests.

/// Attribute marking an element that discovery has already processed
pub const PROCESSED_MARKER: &str = "data-afterglow-processed";

/// A handle to one DOM element.
///
/// Handles are cheap to clone and share the underlying node, so mutating
/// methods take `&self`.
pub trait ElementNode: Clone + 'static {
    /// Read an attribute, `None` when absent
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    fn has_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    /// Set an inline style property, e.g. `padding-top`
    fn set_style(&self, property: &str, value: &str);

    /// Attribute value, treating an empty string like an absent attribute
    fn non_empty_attribute(&self, name: &str) -> Option<String> {
        self.attribute(name).filter(|value| !value.is_empty())
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// Browser facts the player setup depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// `navigator.userAgent`
    pub user_agent: String,
    /// `navigator.platform`
    pub platform: String,
    /// Whether the first video on the page renders native controls
    pub native_controls: bool,
}

/// The page hosting the players
pub trait Page {
    type Element: ElementNode;

    /// All elements matching a CSS selector, in document order
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn environment(&self) -> Environment;

    /// Mount `video` inside a lightbox overlay and return the element that
    /// now lives in the overlay. `None` if no overlay could be built.
    fn open_lightbox(&self, video: &Self::Element) -> Option<Self::Element>;

    /// Remove the lightbox overlay, if any
    fn close_lightbox(&self);
}
