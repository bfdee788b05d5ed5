#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for the verification pipeline
//!
//! Library crates never print. Progress, warnings and verdicts flow through
//! an unbounded channel as [`EventMessage`]s and the CLI decides how to
//! render or log them.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, BuildEvent, BuildStep, FailureContext, GeneralEvent, SandboxEvent, SnapshotEvent,
    VerificationEvent,
};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// What travels over the channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Stamp `event` with fresh metadata derived from the event itself
    #[must_use]
    pub fn new(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.level(), event.source());
        Self { meta, event }
    }

    /// Package the event was emitted for, if any
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.meta.package.as_deref()
    }
}

pub type EventSender = UnboundedSender<EventMessage>;
pub type EventReceiver = UnboundedReceiver<EventMessage>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Anything that can put events on the channel.
///
/// Components built without a sender emit nothing. Emitters scoped to one
/// package override [`EventEmitter::scoped_package`] so every event they
/// send carries it.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    fn scoped_package(&self) -> Option<&str> {
        None
    }

    fn emit(&self, event: AppEvent) {
        let Some(sender) = self.event_sender() else {
            return;
        };
        let mut message = EventMessage::new(event);
        if let Some(package) = self.scoped_package() {
            message.meta = message.meta.for_package(package);
        }
        // the receiver is gone once the CLI stops listening
        let _ = sender.send(message);
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Debug {
            message: message.into(),
        }));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Warning {
            message: message.into(),
            context: None,
        }));
    }

    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Warning {
            message: message.into(),
            context: Some(context.into()),
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
