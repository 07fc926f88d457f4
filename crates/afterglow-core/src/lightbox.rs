//! Lightbox triggers
//!
//! An anchor pointing at a hidden video. Triggering it mounts the video in
//! an overlay and starts a player there; closing destroys that player and
//! removes the overlay so the trigger can be used again.

use crate::{
    config::AfterglowConfig,
    dom::{ElementNode, Page, PROCESSED_MARKER},
    engine::{EngineInstance, InstanceDirectory, PlayerEngine},
    player::Player,
    Error, Result,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Events emitted by a lightbox trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// The lightbox was opened
    Trigger,
    /// The lightbox was closed and its player destroyed
    Close,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::Trigger => "trigger",
            TriggerEvent::Close => "close",
        }
    }

    /// Parse an event name as used by the JS API
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "trigger" => Some(TriggerEvent::Trigger),
            "close" => Some(TriggerEvent::Close),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener called with the trigger's target player id
pub type TriggerListener = Box<dyn FnMut(&str)>;

/// A lightbox trigger bound to one anchor element
pub struct LightboxTrigger<E: ElementNode, I: EngineInstance> {
    /// Id of the video this trigger opens
    playerid: String,
    /// The anchor element
    element: E,
    /// Player living in the open lightbox
    lightbox: Option<Player<E, I>>,
    listeners: Vec<(TriggerEvent, TriggerListener)>,
}

impl<E: ElementNode, I: EngineInstance> LightboxTrigger<E, I> {
    /// Bind to an anchor, reading the target from `href="#id"` or `data-playerid`
    pub fn new(element: E) -> Result<Self> {
        let playerid = element
            .non_empty_attribute("href")
            .and_then(|href| href.strip_prefix('#').map(str::to_string))
            .filter(|id| !id.is_empty())
            .or_else(|| element.non_empty_attribute("data-playerid"))
            .ok_or(Error::MissingLightboxTarget)?;

        Ok(Self {
            playerid,
            element,
            lightbox: None,
            listeners: Vec::new(),
        })
    }

    pub fn playerid(&self) -> &str {
        &self.playerid
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn is_open(&self) -> bool {
        self.lightbox.is_some()
    }

    /// The lightbox player's instance, `None` while closed
    pub fn get_player(&self) -> Option<&I> {
        self.lightbox.as_ref().and_then(Player::get_player)
    }

    pub fn on(&mut self, event: TriggerEvent, listener: TriggerListener) {
        self.listeners.push((event, listener));
    }

    /// Open the lightbox. Returns `None` when it is already open.
    pub fn trigger<P, G>(
        &mut self,
        page: &P,
        engine: &G,
        directory: Rc<dyn InstanceDirectory<I>>,
        settings: &AfterglowConfig,
    ) -> Result<Option<TriggerEvent>>
    where
        P: Page<Element = E>,
        G: PlayerEngine<Element = E, Instance = I>,
    {
        if self.lightbox.is_some() {
            debug!(playerid = %self.playerid, "Lightbox already open");
            return Ok(None);
        }

        let source = page
            .element_by_id(&self.playerid)
            .ok_or_else(|| Error::LightboxTargetNotFound {
                playerid: self.playerid.clone(),
            })?;
        let video = page
            .open_lightbox(&source)
            .ok_or_else(|| Error::LightboxUnavailable {
                playerid: self.playerid.clone(),
            })?;

        // The overlay lives in the document, keep discovery away from it
        video.set_attribute(PROCESSED_MARKER, "true");
        let mut player = Player::new(video, settings, &page.environment());
        if let Err(err) = player.init(engine, directory, settings, Some(Box::new(|p: &I| p.play()))) {
            page.close_lightbox();
            return Err(err);
        }
        self.lightbox = Some(player);

        info!(playerid = %self.playerid, "Lightbox opened");
        self.emit(TriggerEvent::Trigger);
        Ok(Some(TriggerEvent::Trigger))
    }

    /// Close the lightbox and reset the trigger. Returns `None` when it was not open.
    pub fn close_lightbox<P>(&mut self, page: &P) -> Option<TriggerEvent>
    where
        P: Page<Element = E>,
    {
        let mut player = self.lightbox.take()?;
        player.destroy();
        page.close_lightbox();

        info!(playerid = %self.playerid, "Lightbox closed");
        self.emit(TriggerEvent::Close);
        Some(TriggerEvent::Close)
    }

    fn emit(&mut self, event: TriggerEvent) {
        let playerid = self.playerid.clone();
        for (_, listener) in self.listeners.iter_mut().filter(|(e, _)| *e == event) {
            listener(&playerid);
        }
    }
}

/// Lightbox callbacks waiting for the registry to be released.
///
/// Trigger listeners run while the registry is mutably borrowed. A callback
/// that needs the registry again is registered through [`listener`], which
/// only records the call, and runs later from [`deliver`].
///
/// [`listener`]: ListenerQueue::listener
/// [`deliver`]: ListenerQueue::deliver
pub struct ListenerQueue<C> {
    pending: Rc<RefCell<Vec<(C, String)>>>,
}

impl<C> Default for ListenerQueue<C> {
    fn default() -> Self {
        Self {
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<C> Clone for ListenerQueue<C> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
        }
    }
}

impl<C: Clone + 'static> ListenerQueue<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trigger listener that queues `callback` with the target player id
    pub fn listener(&self, callback: C) -> impl FnMut(&str) + 'static {
        let pending = Rc::clone(&self.pending);
        move |playerid: &str| {
            pending
                .borrow_mut()
                .push((callback.clone(), playerid.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Run every queued call in order, including calls queued meanwhile
    pub fn deliver(&self, mut call: impl FnMut(&C, &str)) {
        loop {
            let batch = std::mem::take(&mut *self.pending.borrow_mut());
            if batch.is_empty() {
                break;
            }
            for (callback, playerid) in &batch {
                call(callback, playerid);
            }
        }
    }
}
