//! Video engine contract
//!
//! Media decoding, rendering and controls belong to the external engine.
//! These traits describe the small surface this crate drives.

use crate::config::{EngineSettings, HotkeyOptions, PlayerOptions};
use crate::dom::ElementNode;
use crate::Result;
use std::fmt;

/// Engine events the wrapper subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    Play,
    Pause,
    Dispose,
}

impl EngineEvent {
    /// Event name as the engine spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEvent::Play => "play",
            EngineEvent::Pause => "pause",
            EngineEvent::Dispose => "dispose",
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one engine instance. Clones refer to the same instance.
pub trait EngineInstance: Clone + 'static {
    /// Engine-assigned identifier, unique among live instances
    fn id(&self) -> String;

    /// Run `callback` once the instance is ready. The engine decides when.
    fn ready(&self, callback: Box<dyn FnOnce(&Self)>);

    fn hotkeys(&self, options: &HotkeyOptions);

    fn set_volume(&self, volume: f64);

    /// Attach a named child component
    fn add_child(&self, name: &str);

    fn on(&self, event: EngineEvent, handler: Box<dyn FnMut()>);

    fn play(&self);

    fn pause(&self);

    fn paused(&self) -> bool;

    fn is_fullscreen(&self) -> bool;

    fn exit_fullscreen(&self);

    fn dispose(&self);
}

/// Factory side of the engine
pub trait PlayerEngine {
    type Element: ElementNode;
    type Instance: EngineInstance;

    /// Apply process-wide engine settings
    fn configure(&self, settings: &EngineSettings);

    /// Turn an element into an engine instance
    fn create(&self, element: &Self::Element, options: &PlayerOptions) -> Result<Self::Instance>;
}

/// Every live engine instance on the page, owned by the engine
pub trait InstanceDirectory<I> {
    fn instances(&self) -> Vec<I>;
}
