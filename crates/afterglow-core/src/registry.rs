//! Afterglow - registry and lifecycle manager
//!
//! Owns every player and lightbox trigger found on the page:
//! - Discovery of video elements and trigger anchors
//! - Lookup by player id
//! - Destruction and consolidation of dead players
//! - Routing of lightbox events

use crate::{
    config::AfterglowConfig,
    dom::{ElementNode, Page, PROCESSED_MARKER},
    engine::{InstanceDirectory, PlayerEngine},
    lightbox::{LightboxTrigger, TriggerEvent, TriggerListener},
    player::Player,
    Result,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};

type PagePlayer<P, G> = Player<<P as Page>::Element, <G as PlayerEngine>::Instance>;
type PageTrigger<P, G> = LightboxTrigger<<P as Page>::Element, <G as PlayerEngine>::Instance>;
type SharedListener = Rc<RefCell<dyn FnMut(&str)>>;

/// Registry of all players on a page
pub struct Afterglow<P, G>
where
    P: Page,
    G: PlayerEngine<Element = P::Element>,
{
    config: AfterglowConfig,
    page: P,
    engine: G,
    directory: Rc<dyn InstanceDirectory<G::Instance>>,
    /// Regular players in discovery order
    players: Vec<PagePlayer<P, G>>,
    /// Lightbox triggers in discovery order
    lightbox_triggers: Vec<PageTrigger<P, G>>,
    /// Listeners given to every trigger, including ones discovered later
    lightbox_listeners: Vec<(TriggerEvent, SharedListener)>,
}

impl<P, G> Afterglow<P, G>
where
    P: Page,
    G: PlayerEngine<Element = P::Element>,
{
    pub fn new(
        page: P,
        engine: G,
        directory: Rc<dyn InstanceDirectory<G::Instance>>,
        config: AfterglowConfig,
    ) -> Self {
        Self {
            config,
            page,
            engine,
            directory,
            players: Vec::new(),
            lightbox_triggers: Vec::new(),
            lightbox_listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &AfterglowConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn players(&self) -> &[PagePlayer<P, G>] {
        &self.players
    }

    pub fn lightbox_triggers(&self) -> &[PageTrigger<P, G>] {
        &self.lightbox_triggers
    }

    /// Configure the engine and set up every player and trigger on the page.
    ///
    /// Elements handled by an earlier call carry the processed marker and
    /// are skipped, so calling this again only picks up new markup.
    #[instrument(skip(self))]
    pub fn init(&mut self) {
        self.configure_engine();
        self.init_video_elements();
        self.prepare_lightbox_videos();

        info!(
            players = self.players.len(),
            lightbox_triggers = self.lightbox_triggers.len(),
            "Afterglow initialized"
        );
    }

    /// Look a player up by id. Regular players are searched before lightbox
    /// targets, most recently added first.
    pub fn get_player(&self, id: &str) -> Option<G::Instance> {
        if let Some(player) = self.players.iter().rev().find(|p| p.id() == Some(id)) {
            return player.get_player().cloned();
        }
        self.lightbox_triggers
            .iter()
            .rev()
            .find(|t| t.playerid() == id)
            .and_then(|t| t.get_player().cloned())
    }

    /// Destroy a regular player, or close the lightbox if `id` is a
    /// lightbox target. Returns false when nothing matches.
    pub fn destroy_player(&mut self, id: &str) -> bool {
        if let Some(index) = self.players.iter().rposition(|p| p.id() == Some(id)) {
            let mut player = self.players.remove(index);
            player.destroy();
            info!(player_id = id, "Player destroyed");
            return true;
        }
        if self.lightbox_triggers.iter().any(|t| t.playerid() == id) {
            self.close_lightbox();
            return true;
        }
        false
    }

    /// Close every lightbox and consolidate.
    ///
    /// Only one lightbox is expected to be open at a time, so asking all
    /// triggers is cheap.
    pub fn close_lightbox(&mut self) {
        let mut events = Vec::new();
        for trigger in self.lightbox_triggers.iter_mut().rev() {
            if let Some(event) = trigger.close_lightbox(&self.page) {
                events.push(event);
            }
        }
        for event in events {
            self.handle_trigger_event(event);
        }
        self.consolidate_players();
    }

    /// Open the lightbox of the trigger at `index`
    pub fn launch_lightbox(&mut self, index: usize) -> Result<()> {
        let Some(trigger) = self.lightbox_triggers.get_mut(index) else {
            warn!(index, "No lightbox trigger at index");
            return Ok(());
        };
        let event = trigger.trigger(
            &self.page,
            &self.engine,
            Rc::clone(&self.directory),
            &self.config,
        )?;
        if let Some(event) = event {
            self.handle_trigger_event(event);
        }
        Ok(())
    }

    /// React to an event coming from a lightbox trigger
    pub fn handle_trigger_event(&mut self, event: TriggerEvent) {
        debug!(event = %event, "Lightbox event");
        match event {
            TriggerEvent::Trigger | TriggerEvent::Close => self.consolidate_players(),
        }
    }

    /// Register a listener on every lightbox trigger, present and future
    pub fn on_lightbox<F>(&mut self, event: TriggerEvent, listener: F)
    where
        F: FnMut(&str) + 'static,
    {
        let listener: SharedListener = Rc::new(RefCell::new(listener));
        for trigger in &mut self.lightbox_triggers {
            trigger.on(event, forward(&listener));
        }
        self.lightbox_listeners.push((event, listener));
    }

    /// Drop every player that is no longer alive
    pub fn consolidate_players(&mut self) {
        let before = self.players.len();
        self.players.retain(|p| p.is_alive());
        let removed = before - self.players.len();
        if removed > 0 {
            debug!(removed, remaining = self.players.len(), "Players consolidated");
        }
    }

    fn configure_engine(&self) {
        self.engine.configure(&self.config.engine);
    }

    fn init_video_elements(&mut self) {
        let env = self.page.environment();

        for element in self.page.query_all(&self.config.player_selector) {
            if element.has_attribute(PROCESSED_MARKER) {
                continue;
            }
            element.set_attribute(PROCESSED_MARKER, "true");

            let mut player: PagePlayer<P, G> = Player::new(element, &self.config, &env);
            if let Some(id) = player.id() {
                if self.players.iter().any(|p| p.id() == Some(id)) {
                    warn!(player_id = id, "Duplicate player id");
                }
            }

            if let Err(err) = player.init(&self.engine, Rc::clone(&self.directory), &self.config, None) {
                error!(player_id = ?player.id(), error = %err, "Player initialization failed");
            }
            self.players.push(player);
        }
    }

    fn prepare_lightbox_videos(&mut self) {
        for element in self.page.query_all(&self.config.trigger_selector) {
            if element.has_attribute(PROCESSED_MARKER) {
                continue;
            }
            element.set_attribute(PROCESSED_MARKER, "true");

            match LightboxTrigger::new(element) {
                Ok(mut trigger) => {
                    for (event, listener) in &self.lightbox_listeners {
                        trigger.on(*event, forward(listener));
                    }
                    self.lightbox_triggers.push(trigger);
                }
                Err(err) => warn!(error = %err, "Skipping lightbox trigger"),
            }
        }
    }
}

fn forward(listener: &SharedListener) -> TriggerListener {
    let listener = Rc::clone(listener);
    Box::new(move |playerid: &str| match listener.try_borrow_mut() {
        Ok(mut listener) => (&mut *listener)(playerid),
        Err(_) => warn!(playerid, "Lightbox listener is already running"),
    })
}
