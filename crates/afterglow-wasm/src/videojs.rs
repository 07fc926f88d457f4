//! video.js bindings
//!
//! Expects the global `videojs` function plus the hotkeys plugin and the
//! `TopControlBar` component to be loaded before players are initialized.

use crate::dom::DomElement;
use afterglow_core::{
    EngineEvent, EngineInstance, EngineSettings, Error, HotkeyOptions, InstanceDirectory,
    PlayerEngine, PlayerOptions, Result,
};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// A video.js player instance
    #[wasm_bindgen(extends = js_sys::Object)]
    #[derive(Debug, Clone)]
    pub type VideoJsPlayer;

    #[wasm_bindgen(catch, js_name = videojs)]
    fn videojs(element: &web_sys::Element, options: &JsValue) -> std::result::Result<VideoJsPlayer, JsValue>;

    #[wasm_bindgen(js_namespace = videojs, js_name = getPlayers)]
    fn get_players() -> js_sys::Object;

    #[wasm_bindgen(method, js_name = id)]
    fn vjs_id(this: &VideoJsPlayer) -> String;

    #[wasm_bindgen(method, js_name = ready)]
    fn vjs_ready(this: &VideoJsPlayer, callback: &js_sys::Function);

    #[wasm_bindgen(method, catch, js_name = hotkeys)]
    fn vjs_hotkeys(this: &VideoJsPlayer, options: &JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = volume)]
    fn vjs_volume(this: &VideoJsPlayer, volume: f64);

    #[wasm_bindgen(method, catch, js_name = addChild)]
    fn vjs_add_child(this: &VideoJsPlayer, name: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = on)]
    fn vjs_on(this: &VideoJsPlayer, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, js_name = play)]
    fn vjs_play(this: &VideoJsPlayer) -> JsValue;

    #[wasm_bindgen(method, js_name = pause)]
    fn vjs_pause(this: &VideoJsPlayer);

    #[wasm_bindgen(method, js_name = paused)]
    fn vjs_paused(this: &VideoJsPlayer) -> bool;

    #[wasm_bindgen(method, js_name = isFullscreen)]
    fn vjs_is_fullscreen(this: &VideoJsPlayer) -> bool;

    #[wasm_bindgen(method, js_name = exitFullscreen)]
    fn vjs_exit_fullscreen(this: &VideoJsPlayer);

    #[wasm_bindgen(method, js_name = dispose)]
    fn vjs_dispose(this: &VideoJsPlayer);
}

impl EngineInstance for VideoJsPlayer {
    fn id(&self) -> String {
        self.vjs_id()
    }

    fn ready(&self, callback: Box<dyn FnOnce(&Self)>) {
        let player = self.clone();
        let closure = Closure::once_into_js(move || callback(&player));
        self.vjs_ready(closure.unchecked_ref());
    }

    fn hotkeys(&self, options: &HotkeyOptions) {
        let result = serde_wasm_bindgen::to_value(options)
            .map_err(JsValue::from)
            .and_then(|options| self.vjs_hotkeys(&options));
        if let Err(err) = result {
            warn!(player = %self.vjs_id(), error = %describe(&err), "Hotkeys unavailable");
        }
    }

    fn set_volume(&self, volume: f64) {
        self.vjs_volume(volume);
    }

    fn add_child(&self, name: &str) {
        if let Err(err) = self.vjs_add_child(name) {
            warn!(player = %self.vjs_id(), component = name, error = %describe(&err), "Cannot add component");
        }
    }

    fn on(&self, event: EngineEvent, handler: Box<dyn FnMut()>) {
        let closure = Closure::wrap(handler).into_js_value();
        self.vjs_on(event.as_str(), closure.unchecked_ref());
    }

    fn play(&self) {
        // The returned promise is not awaited
        let _ = self.vjs_play();
    }

    fn pause(&self) {
        self.vjs_pause();
    }

    fn paused(&self) -> bool {
        self.vjs_paused()
    }

    fn is_fullscreen(&self) -> bool {
        self.vjs_is_fullscreen()
    }

    fn exit_fullscreen(&self) {
        self.vjs_exit_fullscreen();
    }

    fn dispose(&self) {
        self.vjs_dispose();
    }
}

/// The global `videojs` factory
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoJs;

impl PlayerEngine for VideoJs {
    type Element = DomElement;
    type Instance = VideoJsPlayer;

    fn configure(&self, settings: &EngineSettings) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let result = js_sys::Reflect::set(
            &window,
            &JsValue::from_str("HELP_IMPROVE_VIDEOJS"),
            &JsValue::from_bool(settings.help_improve),
        );
        if let Err(err) = result {
            warn!(error = %describe(&err), "Cannot configure video.js");
        }
    }

    fn create(&self, element: &DomElement, options: &PlayerOptions) -> Result<VideoJsPlayer> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let options = options
            .serialize(&serializer)
            .map_err(|err| Error::engine(err.to_string()))?;

        videojs(element.node(), &options).map_err(|err| Error::engine(describe(&err)))
    }
}

/// `videojs.getPlayers()`, skipping disposed slots
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoJsDirectory;

impl InstanceDirectory<VideoJsPlayer> for VideoJsDirectory {
    fn instances(&self) -> Vec<VideoJsPlayer> {
        js_sys::Object::values(&get_players())
            .iter()
            .filter(|player| !player.is_null() && !player.is_undefined())
            .map(|player| player.unchecked_into::<VideoJsPlayer>())
            .collect()
    }
}

/// Readable text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return err.message().into();
    }
    format!("{:?}", value)
}
