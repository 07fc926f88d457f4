//! Player - wraps one video element into a configured engine instance
//!
//! Construction prepares the element (classes, responsive sizing, YouTube
//! compatibility). `init` hands it to the engine and finishes the setup once
//! the engine reports ready.

use crate::{
    browser,
    config::{AfterglowConfig, PlayerConfig},
    dom::{ElementNode, Environment},
    engine::{EngineEvent, EngineInstance, InstanceDirectory, PlayerEngine},
    Error, Result,
};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, error, warn};

/// Callback invoked with the instance once the player is ready
pub type ReadyCallback<I> = Box<dyn FnOnce(&I)>;

/// Player handle for one video element
pub struct Player<E: ElementNode, I: EngineInstance> {
    /// Element `id` attribute
    id: Option<String>,
    /// The wrapped video element
    element: E,
    /// Configuration snapshot taken before the element was modified
    config: PlayerConfig,
    /// Cleared on destroy or when the engine disposes the instance
    alive: Rc<Cell<bool>>,
    /// Engine instance, set by `init`
    instance: Option<I>,
}

impl<E: ElementNode, I: EngineInstance> Player<E, I> {
    /// Set the player up and prepare the video element
    pub fn new(element: E, settings: &AfterglowConfig, env: &Environment) -> Self {
        let id = element.non_empty_attribute("id");
        let skin = element
            .non_empty_attribute("data-skin")
            .unwrap_or_else(|| settings.default_skin.clone());
        let config = PlayerConfig::from_element(&element, &skin, env);

        let player = Self {
            id,
            element,
            config,
            alive: Rc::new(Cell::new(true)),
            instance: None,
        };
        player.prepare_video_element(env);
        player
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// The engine instance, `None` before `init`
    pub fn get_player(&self) -> Option<&I> {
        self.instance.as_ref()
    }

    /// Hand the element to the engine and finish setup when it is ready.
    ///
    /// Once ready, the instance gets the hotkey subset, its initial volume,
    /// the top control bar and a `play` handler that pauses every other
    /// playing instance in `directory`.
    pub fn init<G>(
        &mut self,
        engine: &G,
        directory: Rc<dyn InstanceDirectory<I>>,
        settings: &AfterglowConfig,
        callback: Option<ReadyCallback<I>>,
    ) -> Result<()>
    where
        G: PlayerEngine<Element = E, Instance = I>,
    {
        let instance = engine.create(&self.element, &self.config.options)?;

        let alive = Rc::clone(&self.alive);
        instance.on(EngineEvent::Dispose, Box::new(move || alive.set(false)));

        let element = self.element.clone();
        let player_id = self.id.clone();
        let hotkeys = settings.hotkeys;
        let top_control_bar = settings.top_control_bar.clone();

        instance.ready(Box::new(move |player: &I| {
            player.hotkeys(&hotkeys);

            if let Some(raw) = element.attribute("data-volume") {
                match parse_volume(&raw) {
                    Ok(volume) => player.set_volume(volume),
                    Err(err) => warn!(player_id = ?player_id, error = %err, "Ignoring initial volume"),
                }
            }

            player.add_child(&top_control_bar);

            let own_id = player.id();
            player.on(
                EngineEvent::Play,
                Box::new(move || pause_others(&own_id, directory.as_ref())),
            );

            debug!(player_id = ?player_id, "Player ready");

            if let Some(callback) = callback {
                callback(player);
            }
        }));

        self.instance = Some(instance);
        Ok(())
    }

    /// Tear the instance down.
    ///
    /// Playback is paused and fullscreen left before disposing, so the page
    /// is not left playing audio or stuck in fullscreen.
    pub fn destroy(&mut self) {
        if !self.alive.get() {
            return;
        }
        if let Some(instance) = &self.instance {
            if !instance.paused() {
                instance.pause();
            }
            if instance.is_fullscreen() {
                instance.exit_fullscreen();
            }
            instance.dispose();
        }
        self.alive.set(false);
        debug!(player_id = ?self.id, "Player destroyed");
    }

    /// Aspect ratio from `data-ratio` or `height / width`, 0 when neither is usable
    pub fn calculate_ratio(&self) -> f64 {
        let ratio = self.element.non_empty_attribute("data-ratio");
        let height = self.element.non_empty_attribute("height");
        let width = self.element.non_empty_attribute("width");

        match resolve_ratio(ratio.as_deref(), height.as_deref(), width.as_deref()) {
            Ok(ratio) => ratio,
            Err(err) => {
                error!(player_id = ?self.id, error = %err, "Cannot compute aspect ratio");
                0.0
            }
        }
    }

    fn prepare_video_element(&self, env: &Environment) {
        self.apply_default_classes(env);
        self.apply_parameters();

        if browser::is_youtube_player(&self.element) {
            self.apply_youtube_classes(env);
        }
    }

    fn apply_default_classes(&self, env: &Environment) {
        self.element.add_class("video-js");
        self.element.add_class("afterglow");
        for class in self.config.skin_classes() {
            self.element.add_class(&class);
        }

        self.element.remove_class("sublime");

        if browser::is_legacy_ie(&env.user_agent) {
            self.element.add_class("vjs-IE");
        }
    }

    fn apply_parameters(&self) {
        // Lightbox players must not grow beyond their declared width
        if self.element.attribute("data-overscale").as_deref() == Some("false") {
            if let Some(width) = self.element.attribute("width") {
                self.element.set_attribute("data-maxwidth", &width);
            }
        }

        if self.is_responsive() {
            self.element.add_class("vjs-responsive");
            let ratio = self.calculate_ratio();
            self.element
                .set_style("padding-top", &format!("{}%", ratio * 100.0));
            self.element.remove_attribute("height");
            self.element.remove_attribute("width");
            self.element.set_attribute("data-ratio", &ratio.to_string());
        }
    }

    fn apply_youtube_classes(&self, env: &Environment) {
        self.element.add_class("vjs-youtube");

        if env.native_controls {
            self.element.add_class("vjs-using-native-controls");
        }
        if browser::is_ios(&env.platform) {
            self.element.add_class("vjs-iOS");
        }
        if browser::is_legacy_ie(&env.user_agent) {
            self.element.add_class("vjs-using-native-controls");
        }
    }

    fn is_responsive(&self) -> bool {
        self.element.attribute("data-autoresize").as_deref() == Some("fit")
            || self.element.has_class("responsive")
    }
}

/// Resolve the aspect ratio from the raw attribute values.
///
/// An explicit ratio wins. Otherwise both dimensions are required.
pub fn resolve_ratio(ratio: Option<&str>, height: Option<&str>, width: Option<&str>) -> Result<f64> {
    if let Some(raw) = ratio {
        match parse_number(raw) {
            Some(ratio) => return Ok(ratio),
            None => warn!(value = raw, "Unparsable data-ratio, falling back to height/width"),
        }
    }

    let height = height.and_then(parse_number);
    let width = width.and_then(parse_number).filter(|w| *w != 0.0);
    match (height, width) {
        (Some(height), Some(width)) => Ok(height / width),
        _ => Err(Error::MissingDimensions),
    }
}

/// Parse the `data-volume` attribute
pub fn parse_volume(raw: &str) -> Result<f64> {
    parse_number(raw).ok_or_else(|| Error::invalid_attribute("data-volume", raw))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn pause_others<I: EngineInstance>(own_id: &str, directory: &dyn InstanceDirectory<I>) {
    for other in directory.instances() {
        if other.id() != own_id && !other.paused() {
            debug!(paused = %other.id(), playing = own_id, "Pausing other player");
            other.pause();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_from_dimensions() {
        let ratio = resolve_ratio(None, Some("90"), Some("160")).unwrap();
        assert_eq!(ratio, 0.5625);
    }

    #[test]
    fn test_explicit_ratio_wins() {
        let ratio = resolve_ratio(Some("0.4"), Some("90"), Some("160")).unwrap();
        assert_eq!(ratio, 0.4);
    }

    #[test]
    fn test_unparsable_ratio_falls_back() {
        let ratio = resolve_ratio(Some("wide"), Some("9"), Some("16")).unwrap();
        assert_eq!(ratio, 0.5625);
    }

    #[test]
    fn test_missing_dimensions() {
        assert!(matches!(
            resolve_ratio(None, None, None),
            Err(Error::MissingDimensions)
        ));
        assert!(matches!(
            resolve_ratio(None, Some("90"), None),
            Err(Error::MissingDimensions)
        ));
        assert!(matches!(
            resolve_ratio(None, Some("90"), Some("0")),
            Err(Error::MissingDimensions)
        ));
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("0.5").unwrap(), 0.5);
        assert_eq!(parse_volume(" 1 ").unwrap(), 1.0);
        let err = parse_volume("loud").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ATTRIBUTE");
        assert!(parse_volume("NaN").is_err());
    }
}
