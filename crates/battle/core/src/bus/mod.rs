//! Topic-based event bus with an interceptor chain.
//!
//! One bus exists per battle. Handlers subscribe to exact topic names and run
//! sequentially in registration order; each sees the payload left by the one
//! before it, so passives and equipment can rewrite pending values.
mod event;
mod handler;
mod topic;

pub use event::{Event, PendingDamage, TargetKind};
pub use handler::{EventHandler, HandlerCriticality};
pub use topic::Topic;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, trace};

use crate::error::{BattleError, CombatError};
use crate::scope::TurnScope;

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = (SubscriptionId, Arc<dyn EventHandler>);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    topics: HashMap<Topic, Vec<Subscriber>>,
}

/// Per-battle publish/subscribe registry.
///
/// Clones share the same subscriber table.
pub struct EventBus {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Subscribers::default())),
        }
    }

    /// Registers `handler` for `topic`. Handlers run in registration order.
    pub fn on(&self, topic: Topic, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        trace!(target: "battle::bus", topic = %topic, handler = handler.name(), "subscribe");
        subscribers.topics.entry(topic).or_default().push((id, handler));
        id
    }

    /// Removes one subscription. Returns false if it was not registered.
    pub fn off(&self, topic: &Topic, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(handlers) = subscribers.topics.get_mut(topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            subscribers.topics.remove(topic);
        }
        removed
    }

    /// Drops every subscription. Used at battle teardown.
    pub fn clear(&self) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.topics.clear();
    }

    pub fn handler_count(&self, topic: &Topic) -> usize {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers.topics.get(topic).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers.topics.values().all(Vec::is_empty)
    }

    /// Copies the handler list so subscriptions made during dispatch apply
    /// from the next emission on.
    fn snapshot(&self, topic: &Topic) -> Vec<Arc<dyn EventHandler>> {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers
            .topics
            .get(topic)
            .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    /// Runs every handler for the event's topic and returns the final payload.
    ///
    /// # Error Handling
    ///
    /// A failing handler is isolated and the chain continues with the last
    /// good payload, except when the handler is `Critical` or the error is
    /// fatal; those abort the emission.
    pub fn emit(&self, scope: &mut TurnScope<'_>, event: Event) -> Result<Event, CombatError> {
        let topic = event.topic();
        let handlers = self.snapshot(&topic);
        trace!(target: "battle::bus", topic = %topic, handlers = handlers.len(), "emit");

        let mut current = event;
        for handler in handlers {
            let mut draft = current.clone();
            match handler.handle(scope, &mut draft) {
                Ok(()) => current = draft,
                Err(e) => Self::handle_fault(&topic, handler.as_ref(), e)?,
            }
        }
        Ok(current)
    }

    /// Like [`EventBus::emit`], awaiting each handler before starting the next.
    pub async fn emit_async(
        &self,
        scope: &mut TurnScope<'_>,
        event: Event,
    ) -> Result<Event, CombatError> {
        let topic = event.topic();
        let handlers = self.snapshot(&topic);
        trace!(target: "battle::bus", topic = %topic, handlers = handlers.len(), "emit_async");

        let mut current = event;
        for handler in handlers {
            let mut draft = current.clone();
            match handler.handle_async(scope, &mut draft).await {
                Ok(()) => current = draft,
                Err(e) => Self::handle_fault(&topic, handler.as_ref(), e)?,
            }
        }
        Ok(current)
    }

    fn handle_fault(
        topic: &Topic,
        handler: &dyn EventHandler,
        error: CombatError,
    ) -> Result<(), CombatError> {
        if error.severity().is_fatal() || handler.criticality() == HandlerCriticality::Critical {
            error!(
                target: "battle::bus",
                topic = %topic,
                handler = handler.name(),
                severity = error.severity().as_str(),
                error = ?error,
                "Handler failed, aborting dispatch"
            );
            return Err(error);
        }

        match handler.criticality() {
            HandlerCriticality::Optional => debug!(
                target: "battle::bus",
                topic = %topic,
                handler = handler.name(),
                error = ?error,
                "Optional handler failed"
            ),
            _ => error!(
                target: "battle::bus",
                topic = %topic,
                handler = handler.name(),
                error = ?error,
                "Handler failed, continuing"
            ),
        }
        Ok(())
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventBus")
            .field("topics", &subscribers.topics.len())
            .finish()
    }
}
