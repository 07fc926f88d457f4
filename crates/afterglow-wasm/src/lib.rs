//! Afterglow WASM - video.js players and lightboxes from HTML markup
//!
//! Binds the Afterglow registry to the browser:
//! - `video.afterglow` elements become video.js players
//! - `a.afterglow` anchors open their target video in a lightbox
//! - Only one player plays at a time
//!
//! ## JavaScript Integration
//!
//! ```javascript
//! import init, { Afterglow } from '@afterglow/wasm';
//!
//! await init();
//! const afterglow = new Afterglow({ default_skin: 'dark' });
//! afterglow.init();
//!
//! const player = afterglow.getPlayer('intro'); // video.js player or false
//! afterglow.destroyPlayer('intro');
//! ```

use afterglow_core::{Afterglow as Registry, AfterglowConfig, ListenerQueue, TriggerEvent};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent};

mod dom;
mod logging;
mod videojs;

pub use dom::{DomElement, DomPage, LIGHTBOX_CLOSE_EVENT};
pub use videojs::{VideoJs, VideoJsDirectory, VideoJsPlayer};

type PageRegistry = Registry<DomPage, VideoJs>;
type Callbacks = ListenerQueue<js_sys::Function>;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    afterglow_core::VERSION.to_string()
}

/// Page-wide player registry exposed to JavaScript
#[wasm_bindgen]
pub struct Afterglow {
    inner: Rc<RefCell<PageRegistry>>,
    /// `onLightbox` callbacks, run once the registry is released
    callbacks: Callbacks,
    /// Triggers whose anchors already have a click listener
    bound_triggers: Cell<usize>,
    /// Whether the close/Escape listeners are installed
    close_bound: Cell<bool>,
}

#[wasm_bindgen]
impl Afterglow {
    /// Create the registry. `config` is an optional object with
    /// `AfterglowConfig` fields; missing fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Afterglow, JsValue> {
        let config: AfterglowConfig = if config.is_undefined() || config.is_null() {
            AfterglowConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        logging::init(&config.log_level);
        afterglow_core::init();

        let page = DomPage::from_window()?;
        let registry = Registry::new(page, VideoJs, Rc::new(VideoJsDirectory), config);

        Ok(Self {
            inner: Rc::new(RefCell::new(registry)),
            callbacks: Callbacks::new(),
            bound_triggers: Cell::new(0),
            close_bound: Cell::new(false),
        })
    }

    /// Set up every player and lightbox trigger on the page.
    /// Safe to call again after new markup was added.
    pub fn init(&self) -> Result<(), JsValue> {
        self.registry_mut()?.init();
        self.bind_close_listeners()?;
        self.bind_trigger_clicks()?;
        Ok(())
    }

    /// The video.js player for `id`, or `false`
    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, id: &str) -> JsValue {
        let player = match self.registry() {
            Ok(registry) => registry.get_player(id),
            Err(_) => {
                warn!(player_id = id, "Registry busy, player lookup skipped");
                None
            }
        };
        match player {
            Some(player) => player.into(),
            None => JsValue::FALSE,
        }
    }

    /// Destroy a player or close the lightbox showing it
    #[wasm_bindgen(js_name = destroyPlayer)]
    pub fn destroy_player(&self, id: &str) -> Result<bool, JsValue> {
        let destroyed = self.registry_mut()?.destroy_player(id);
        deliver(&self.callbacks);
        Ok(destroyed)
    }

    #[wasm_bindgen(js_name = closeLightbox)]
    pub fn close_lightbox(&self) -> Result<(), JsValue> {
        self.registry_mut()?.close_lightbox();
        deliver(&self.callbacks);
        Ok(())
    }

    #[wasm_bindgen(js_name = consolidatePlayers)]
    pub fn consolidate_players(&self) -> Result<(), JsValue> {
        self.registry_mut()?.consolidate_players();
        Ok(())
    }

    /// Listen for `trigger` or `close` on every lightbox trigger, including
    /// ones found by a later `init`. The callback receives the target player
    /// id and may call back into this object.
    #[wasm_bindgen(js_name = onLightbox)]
    pub fn on_lightbox(&self, event: &str, callback: js_sys::Function) -> Result<(), JsValue> {
        let event = TriggerEvent::from_name(event)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown lightbox event: {}", event)))?;

        self.registry_mut()?
            .on_lightbox(event, self.callbacks.listener(callback));
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = playerCount)]
    pub fn player_count(&self) -> usize {
        match self.registry() {
            Ok(registry) => registry.players().len(),
            Err(_) => {
                warn!("Registry busy, player count unavailable");
                0
            }
        }
    }

    /// Current configuration as JSON
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Result<String, JsValue> {
        Ok(self.registry()?.config().to_json())
    }
}

impl Afterglow {
    fn registry(&self) -> Result<Ref<'_, PageRegistry>, JsValue> {
        self.inner.try_borrow().map_err(|_| busy())
    }

    fn registry_mut(&self) -> Result<RefMut<'_, PageRegistry>, JsValue> {
        self.inner.try_borrow_mut().map_err(|_| busy())
    }

    fn bind_trigger_clicks(&self) -> Result<(), JsValue> {
        let registry = self.registry()?;
        let triggers = registry.lightbox_triggers();

        for (index, trigger) in triggers.iter().enumerate().skip(self.bound_triggers.get()) {
            let inner = Rc::clone(&self.inner);
            let callbacks = self.callbacks.clone();
            let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                event.prevent_default();
                let result = {
                    let Ok(mut registry) = inner.try_borrow_mut() else {
                        warn!(index, "Registry busy, lightbox not opened");
                        return;
                    };
                    registry.launch_lightbox(index)
                };
                deliver(&callbacks);
                if let Err(err) = result {
                    error!(index, code = err.error_code(), error = %err, "Cannot open lightbox");
                }
            });
            trigger
                .element()
                .node()
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            // Listeners live as long as the page
            on_click.forget();
        }

        self.bound_triggers.set(triggers.len());
        Ok(())
    }

    fn bind_close_listeners(&self) -> Result<(), JsValue> {
        if self.close_bound.get() {
            return Ok(());
        }

        let registry = self.registry()?;
        let document = registry.page().document();

        let inner = Rc::clone(&self.inner);
        let callbacks = self.callbacks.clone();
        let on_close = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            match inner.try_borrow_mut() {
                Ok(mut registry) => registry.close_lightbox(),
                Err(_) => warn!("Registry busy, lightbox not closed"),
            }
            deliver(&callbacks);
        });
        document.add_event_listener_with_callback(
            LIGHTBOX_CLOSE_EVENT,
            on_close.as_ref().unchecked_ref(),
        )?;
        on_close.forget();

        let inner = Rc::clone(&self.inner);
        let callbacks = self.callbacks.clone();
        let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() != "Escape" {
                return;
            }
            if let Ok(mut registry) = inner.try_borrow_mut() {
                if registry.lightbox_triggers().iter().any(|t| t.is_open()) {
                    registry.close_lightbox();
                }
            }
            deliver(&callbacks);
        });
        document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
        on_key.forget();

        drop(registry);
        self.close_bound.set(true);
        Ok(())
    }
}

fn busy() -> JsValue {
    js_sys::Error::new("Afterglow registry is busy").into()
}

/// Run queued `onLightbox` callbacks. Must not be called with the registry borrowed.
fn deliver(callbacks: &Callbacks) {
    callbacks.deliver(|callback, playerid| {
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(playerid)) {
            warn!(player_id = playerid, error = ?err, "Lightbox listener failed");
        }
    });
}
