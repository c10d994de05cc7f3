//! Passive skill dispatch.
//!
//! One dispatcher is subscribed per distinct trigger topic. When its topic
//! fires it walks every living character fastest-first and runs each skill
//! bound to that topic through the normal protocol, with the triggering
//! payload merged into the context.
use tracing::{debug, warn};

use crate::bus::{Event, EventBus, EventHandler, SubscriptionId, Topic};
use crate::context::{CombatContext, ContextExtras};
use crate::error::CombatError;
use crate::scope::TurnScope;
use crate::sequence::ActionSequence;

pub(crate) struct PassiveDispatcher {
    topic: Topic,
    name: String,
}

impl PassiveDispatcher {
    pub(crate) fn new(topic: Topic) -> Self {
        let name = format!("passive:{topic}");
        Self { topic, name }
    }

    fn dispatch(&self, scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        let registry = scope.registry;
        for (rank, id) in ActionSequence::turn_order(scope.state).into_iter().enumerate() {
            let skills = {
                let character = scope.state.require(&id)?;
                if !character.is_alive() {
                    continue;
                }
                character.skills.clone()
            };

            for skill in skills.iter().filter_map(|s| registry.get(s)) {
                if !skill.is_triggered_by(&self.topic) {
                    continue;
                }
                let mut ctx = CombatContext::build(
                    scope.state,
                    &scope.active_faction,
                    &id,
                    scope.dice,
                    ContextExtras {
                        is_first: rank == 0,
                        rank,
                        trigger: Some(event.clone()),
                    },
                )?;
                if let Some(outcome) = skill.perform(scope, &mut ctx)? {
                    scope.record(outcome);
                }
                if let Some(updated) = ctx.trigger {
                    *event = updated;
                }
            }
        }
        Ok(())
    }
}

impl EventHandler for PassiveDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        if scope.depth >= scope.config.max_passive_depth {
            let error = CombatError::PassiveDepthExceeded {
                topic: self.topic.to_string(),
                depth: scope.depth,
            };
            warn!(target: "battle::combat", topic = %self.topic, depth = scope.depth, error = %error, "skipping passive dispatch");
            return Ok(());
        }

        debug!(target: "battle::combat", topic = %self.topic, depth = scope.depth, "passive dispatch");
        scope.depth += 1;
        let result = self.dispatch(scope, event);
        scope.depth -= 1;
        result
    }
}

/// Guard over the passive subscriptions of one battle.
///
/// Dropping the guard unsubscribes too; [`PassiveListeners::cleanup`] makes
/// the teardown explicit.
#[must_use = "dropping the guard immediately unsubscribes every passive"]
pub struct PassiveListeners {
    bus: EventBus,
    subscriptions: Vec<(Topic, SubscriptionId)>,
}

impl PassiveListeners {
    pub(crate) fn new(bus: EventBus, subscriptions: Vec<(Topic, SubscriptionId)>) -> Self {
        Self { bus, subscriptions }
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.subscriptions.iter().map(|(topic, _)| topic)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Unsubscribes every dispatcher.
    pub fn cleanup(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        for (topic, id) in self.subscriptions.drain(..) {
            self.bus.off(&topic, id);
        }
    }
}

impl Drop for PassiveListeners {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
