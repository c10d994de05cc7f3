//! Presentation stream.
//!
//! [`EventForwarder`] observes the battle bus and republishes every
//! presentation event on a broadcast channel, alongside session-level
//! milestones. Delivery is best-effort: with no subscribers events are
//! simply dropped.
use battle_core::{
    CombatError, Event, EventBus, EventHandler, FactionId, HandlerCriticality, SubscriptionId,
    Topic, TurnScope,
};
use tokio::sync::broadcast;
use tracing::trace;

/// Topics mirrored onto the presentation stream.
pub const PRESENTATION_TOPICS: [Topic; 13] = [
    Topic::FIRST_APPEARANCE,
    Topic::ACTION_START,
    Topic::DETERMINING,
    Topic::TARGETING,
    Topic::CAUSING_DAMAGE,
    Topic::IMMUTE,
    Topic::CAUSING_DEFENSE,
    Topic::TAKE_DAMAGE,
    Topic::DIE,
    Topic::CAUSING_HEAL,
    Topic::GET_HEALED,
    Topic::GET_DEFENSE,
    Topic::REVIVED,
];

/// Item on the presentation stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A bus event as it was dispatched. Events from a turn that later fails
    /// are still delivered; only [`SessionEvent::TurnCommitted`] marks a
    /// turn as applied.
    Combat(Event),
    TurnCommitted {
        turn: u32,
        active: FactionId,
        dice: u8,
        log: Vec<String>,
    },
    Ended {
        winner: Option<FactionId>,
    },
}

/// Bus observer that mirrors events onto a broadcast channel.
pub struct EventForwarder {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventForwarder {
    pub fn new(tx: broadcast::Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Subscribes one forwarder to every presentation topic.
    pub fn attach(tx: broadcast::Sender<SessionEvent>, bus: &EventBus) -> Vec<(Topic, SubscriptionId)> {
        let forwarder = std::sync::Arc::new(Self::new(tx));
        PRESENTATION_TOPICS
            .iter()
            .map(|topic| (topic.clone(), bus.on(topic.clone(), forwarder.clone())))
            .collect()
    }
}

impl EventHandler for EventForwarder {
    fn name(&self) -> &str {
        "presentation-forwarder"
    }

    fn criticality(&self) -> HandlerCriticality {
        HandlerCriticality::Optional
    }

    fn handle(&self, _scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        if self.tx.send(SessionEvent::Combat(event.clone())).is_err() {
            trace!(target: "battle::runtime", topic = %event.topic(), "no presentation subscribers");
        }
        Ok(())
    }
}
