//! Page Session
//!
//! Ties the controller to a page: decides when to initialize, follows the
//! page when it swaps its media element, and answers every command.
//!
//! # Event flow
//!
//! ```text
//!   MediaElementSource ──callback──▶ crossbeam channel ──pump()──▶ Session
//!   control surface ──handle_message()──────────────────────────▶ Session
//! ```
//!
//! Callbacks only enqueue. The graph is touched from whichever thread calls
//! `pump`/`handle_*`, one event at a time.

use crossbeam_channel::{unbounded, Receiver, Sender};
use mqt_platform::{MediaElement, MediaElementSource};
use tracing::{debug, info, warn};

use crate::controller::EqualizerController;
use crate::dispatch;
use crate::error::EqError;
use crate::message::{Ack, Command};

/// Something that happened on the page
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A (possibly new) media element is present
    MediaElementChanged(MediaElement),
    /// The user interacted with the page; audio may start now
    UserInteraction,
}

/// One page's equalizer session
pub struct Session {
    controller: EqualizerController,
    element: Option<MediaElement>,
    /// The tracked element was already consumed elsewhere
    element_lost: bool,
    tx: Sender<PageEvent>,
    rx: Receiver<PageEvent>,
}

impl Session {
    pub fn new(controller: EqualizerController) -> Self {
        let (tx, rx) = unbounded();
        Self {
            controller,
            element: None,
            element_lost: false,
            tx,
            rx,
        }
    }

    /// Follow `source`: queue its current element, if any, and every later one
    pub fn watch(&self, source: &dyn MediaElementSource) {
        let tx = self.tx.clone();
        source.on_media_element_changed(Box::new(move |element| {
            let delivered = tx.send(PageEvent::MediaElementChanged(element)).is_ok();
            if !delivered {
                debug!("Session gone, unregistering element watcher");
            }
            delivered
        }));

        if let Some(element) = source.current() {
            if self.tx.send(PageEvent::MediaElementChanged(element)).is_err() {
                debug!("Event queue closed, dropping current element");
            }
        }
    }

    /// Sender for page events, for embedders that observe the page themselves
    pub fn events(&self) -> Sender<PageEvent> {
        self.tx.clone()
    }

    /// Handle every queued page event; returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::MediaElementChanged(element) => self.on_media_element(element),
            PageEvent::UserInteraction => self.on_user_interaction(),
        }
    }

    /// Track `element`, rebuilding the chain if it replaces a live one
    pub fn on_media_element(&mut self, element: MediaElement) {
        if self.element.as_ref() == Some(&element) {
            return;
        }

        info!("New media element {} detected", element.id());
        if self.controller.is_ready() {
            self.controller.abandon();
        }
        self.element = Some(element);
        self.element_lost = false;
        self.try_init();
    }

    pub fn on_user_interaction(&mut self) {
        if !self.controller.is_ready() {
            debug!("User interaction, setting up audio");
            self.try_init();
        }
    }

    /// Initialize if needed, route the command, and acknowledge it
    pub fn handle_command(&mut self, command: &Command) -> Ack {
        debug!("Received {}", command.kind());
        if !self.controller.is_ready() {
            self.try_init();
        }

        match dispatch::route(&mut self.controller, command) {
            Ok(()) => {}
            Err(EqError::NotReady) => debug!("{} ignored, audio not set up", command.kind()),
            Err(EqError::UnknownTarget(target)) => debug!("{} ignored, unknown target {}", command.kind(), target),
            Err(e) => warn!("{} failed: {}", command.kind(), e),
        }

        Ack::received(self.controller.is_ready())
    }

    /// Decode and handle a raw JSON message
    pub fn handle_message(&mut self, message: &serde_json::Value) -> Ack {
        let command = dispatch::parse(message);
        self.handle_command(&command)
    }

    pub fn is_ready(&self) -> bool {
        self.controller.is_ready()
    }

    /// The element being tracked, whether or not the chain is live
    pub fn element(&self) -> Option<&MediaElement> {
        self.element.as_ref()
    }

    pub fn controller(&self) -> &EqualizerController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EqualizerController {
        &mut self.controller
    }

    fn try_init(&mut self) {
        let Some(element) = self.element.clone() else {
            debug!("No media element yet");
            return;
        };

        // A consumed element stays consumed; wait for the page to swap it
        if self.element_lost {
            debug!("Element {} already consumed, not retrying", element.id());
            return;
        }

        // Failures are logged by the controller
        if let Err(EqError::SourceAlreadyAttached(_)) = self.controller.initialize(&element) {
            self.element_lost = true;
        }
    }
}
