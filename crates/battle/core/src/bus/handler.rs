use async_trait::async_trait;

use crate::error::CombatError;
use crate::scope::TurnScope;

use super::Event;

/// Criticality level for event handlers.
///
/// Determines how handler errors affect the surrounding dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HandlerCriticality {
    /// Handler failure aborts the dispatch and the turn.
    Critical,

    /// Handler failure is logged as an error, dispatch continues (default).
    #[default]
    Important,

    /// Handler failure is logged at debug level.
    Optional,
}

/// A bus subscriber.
///
/// Handlers receive the payload produced by the previous handler on the same
/// topic and may rewrite it in place. A handler that returns an error has its
/// payload edits discarded.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn criticality(&self) -> HandlerCriticality {
        HandlerCriticality::Important
    }

    fn handle(&self, scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError>;

    /// Suspending variant used by [`EventBus::emit_async`](super::EventBus::emit_async).
    async fn handle_async(
        &self,
        scope: &mut TurnScope<'_>,
        event: &mut Event,
    ) -> Result<(), CombatError> {
        self.handle(scope, event)
    }
}
