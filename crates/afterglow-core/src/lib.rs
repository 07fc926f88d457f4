//! Afterglow Core - markup-driven video players for the browser
//!
//! This crate holds everything that is not tied to a particular browser
//! binding:
//! - Discovery of `video.afterglow` elements and `a.afterglow` lightbox triggers
//! - Per-element configuration (skins, responsive sizing, YouTube compatibility)
//! - Player lifecycle: init, single-active-player playback, destroy
//! - A registry with lookup, destroy and consolidation of dead players
//!
//! The page, its elements and the video engine are reached through the
//! traits in [`dom`] and [`engine`]; `afterglow-wasm` implements them on top
//! of web-sys and video.js.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                       Afterglow                       │
//! │                 (registry / lifecycle)                │
//! ├───────────────────────────────────────────────────────┤
//! │                                                       │
//! │   ┌──────────────┐            ┌──────────────────┐    │
//! │   │    Player    │◄───────────┤ LightboxTrigger  │    │
//! │   │   wrapper    │            │                  │    │
//! │   └──────┬───────┘            └────────┬─────────┘    │
//! │          │                             │              │
//! │   ┌──────┴───────┐            ┌────────┴─────────┐    │
//! │   │ PlayerEngine │            │       Page       │    │
//! │   │  + Directory │            │   ElementNode    │    │
//! │   └──────────────┘            └──────────────────┘    │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod lightbox;
pub mod player;
pub mod registry;

pub use config::{
    AfterglowConfig, EngineSettings, HotkeyOptions, PlayerConfig, PlayerOptions, VideoSource,
    YoutubeOptions,
};
pub use dom::{ElementNode, Environment, Page, PROCESSED_MARKER};
pub use engine::{EngineEvent, EngineInstance, InstanceDirectory, PlayerEngine};
pub use error::{Error, Result};
pub use lightbox::{LightboxTrigger, ListenerQueue, TriggerEvent, TriggerListener};
pub use player::{Player, ReadyCallback};
pub use registry::Afterglow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version once at startup
pub fn init() {
    tracing::info!(version = VERSION, "Afterglow Core initialized");
}
