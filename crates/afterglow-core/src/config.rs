//! Configuration
//!
//! Two layers:
//! - [`AfterglowConfig`] - page-wide settings for the registry, loadable from JSON
//! - [`PlayerConfig`] - per-element snapshot handed to the video engine

use crate::browser;
use crate::dom::{ElementNode, Environment};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Skin used when an element declares none
pub const DEFAULT_SKIN: &str = "afterglow";

/// Page-wide configuration for the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterglowConfig {
    /// Selector for regular players, including the legacy sublime class
    pub player_selector: String,
    /// Selector for lightbox trigger anchors
    pub trigger_selector: String,
    /// Skin applied when `data-skin` is absent
    pub default_skin: String,
    /// Engine component added on top of the control bar
    pub top_control_bar: String,
    /// Keyboard shortcut subset enabled once a player is ready
    pub hotkeys: HotkeyOptions,
    /// One-time global engine settings
    pub engine: EngineSettings,
    /// Log level for the browser console subscriber
    pub log_level: String,
}

impl Default for AfterglowConfig {
    fn default() -> Self {
        Self {
            player_selector: "video.afterglow,video.sublime".to_string(),
            trigger_selector: "a.afterglow,a.sublime".to_string(),
            default_skin: DEFAULT_SKIN.to_string(),
            top_control_bar: "TopControlBar".to_string(),
            hotkeys: HotkeyOptions::default(),
            engine: EngineSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AfterglowConfig {
    /// Parse a configuration, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Hotkey plugin options.
///
/// Fullscreen, number-jump and volume-scroll shortcuts stay disabled so they
/// do not fight with page scrolling and typing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotkeyOptions {
    pub enable_fullscreen: bool,
    pub enable_numbers: bool,
    pub enable_volume_scroll: bool,
}

/// Global engine settings applied once per `init`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine usage tracking (`HELP_IMPROVE_VIDEOJS`)
    pub help_improve: bool,
}

/// One media source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub src: String,
}

/// Parameters forwarded to the YouTube tech
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeOptions {
    pub iv_load_policy: u8,
    pub modestbranding: u8,
    pub rel: u8,
    pub showinfo: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<u8>,
}

/// Options handed to the engine factory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerOptions {
    pub controls: bool,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    pub muted: bool,
    pub playsinline: bool,
    pub preload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tech_order: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<VideoSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<YoutubeOptions>,
}

/// Configuration snapshot of one video element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub skin: String,
    pub options: PlayerOptions,
}

impl PlayerConfig {
    /// Snapshot the element before it is modified for the engine
    pub fn from_element<E: ElementNode>(element: &E, skin: &str, env: &Environment) -> Self {
        let mut options = PlayerOptions {
            controls: true,
            autoplay: element.has_attribute("autoplay"),
            loop_playback: element.has_attribute("loop"),
            muted: element.has_attribute("muted"),
            playsinline: element.has_attribute("playsinline"),
            preload: element
                .non_empty_attribute("preload")
                .unwrap_or_else(|| "auto".to_string()),
            poster: element.non_empty_attribute("poster"),
            ..Default::default()
        };

        if browser::is_youtube_player(element) {
            let video_id = element.attribute("data-youtube-id").unwrap_or_default();
            options.tech_order = vec!["youtube".to_string()];
            options.sources = vec![VideoSource {
                mime_type: "video/youtube".to_string(),
                src: format!("https://www.youtube.com/watch?v={}", video_id),
            }];
            options.youtube = Some(YoutubeOptions {
                iv_load_policy: 3,
                modestbranding: 1,
                rel: 0,
                showinfo: 0,
                controls: if env.native_controls { None } else { Some(0) },
            });
        }

        Self {
            skin: skin.to_string(),
            options,
        }
    }

    /// Classes derived from the skin name
    pub fn skin_classes(&self) -> Vec<String> {
        skin_classes(&self.skin)
    }
}

/// `vjs-afterglow-skin`, plus `afterglow-skin-<name>` for any other skin
pub fn skin_classes(skin: &str) -> Vec<String> {
    let mut classes = vec!["vjs-afterglow-skin".to_string()];
    if skin != DEFAULT_SKIN {
        classes.push(format!("afterglow-skin-{}", skin));
    }
    classes
}
