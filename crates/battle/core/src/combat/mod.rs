//! Transactional turn boundary.
//!
//! [`Combat`] owns the per-battle bus, configuration and RNG. Each call to
//! [`Combat::process_main_turn`] clones the caller's snapshot into a draft,
//! resolves the whole turn on the draft, and returns the draft as the next
//! committed snapshot. The input snapshot is only ever borrowed immutably.
mod passive;

pub use passive::PassiveListeners;

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::bus::{EventBus, SubscriptionId, Topic};
use crate::config::BattleConfig;
use crate::context::{CombatContext, ContextExtras, TargetRequester};
use crate::error::CombatError;
use crate::scope::{Signal, TurnScope};
use crate::sequence::ActionSequence;
use crate::skill::SkillRegistry;
use crate::state::{BattleState, CharacterId, FactionId};

use passive::PassiveDispatcher;

/// Committed result of one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    /// The new snapshot.
    pub state: BattleState,
    pub log: Vec<String>,
    /// Control requests raised during the turn, in order.
    pub signals: Vec<Signal>,
}

impl TurnReport {
    pub fn reroll_requested(&self) -> bool {
        self.signals.contains(&Signal::Reroll)
    }
}

/// Per-battle combat engine.
pub struct Combat {
    bus: EventBus,
    registry: Arc<SkillRegistry>,
    config: BattleConfig,
    rng: ChaCha8Rng,
}

impl Combat {
    pub fn new(registry: Arc<SkillRegistry>, config: BattleConfig) -> Self {
        Self {
            bus: EventBus::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            registry,
            config,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Prepares a freshly assembled roster for battle.
    ///
    /// Resets transient stats and memory, then subscribes carried equipment.
    pub fn begin_battle(&mut self, state: &mut BattleState) {
        state.memory.clear();
        for character in state.characters_mut() {
            character.reset_for_battle();
            character.attach_equipment(&self.bus);
        }
        info!(
            target: "battle::combat",
            factions = state.factions.len(),
            characters = state.characters().count(),
            "battle started"
        );
    }

    /// Subscribes one dispatcher per distinct passive trigger found on the roster.
    pub fn setup_passive_listeners(&self, state: &BattleState) -> PassiveListeners {
        let mut topics: Vec<Topic> = Vec::new();
        for character in state.characters() {
            for skill in &character.skills {
                if let Some(topic) = self.registry.trigger_of(skill)
                    && !topics.contains(topic)
                {
                    topics.push(topic.clone());
                }
            }
        }

        let subscriptions: Vec<(Topic, SubscriptionId)> = topics
            .into_iter()
            .map(|topic| {
                let id = self
                    .bus
                    .on(topic.clone(), Arc::new(PassiveDispatcher::new(topic.clone())));
                (topic, id)
            })
            .collect();
        debug!(target: "battle::combat", passives = subscriptions.len(), "passive listeners installed");
        PassiveListeners::new(self.bus.clone(), subscriptions)
    }

    /// Resolves one active-faction turn against a draft of `current`.
    ///
    /// # Errors
    ///
    /// Only invariant violations surface here. The draft is discarded and
    /// `current` remains the latest valid snapshot.
    pub fn process_main_turn(
        &mut self,
        current: &BattleState,
        active_faction: &FactionId,
        dice: u8,
        targeter: &mut (dyn TargetRequester + Send),
    ) -> Result<TurnReport, CombatError> {
        current.require_faction(active_faction)?;

        let mut draft = current.clone();
        let mut scope = TurnScope::new(
            &mut draft,
            self.bus.clone(),
            &self.registry,
            &self.config,
            &mut self.rng,
            targeter,
            active_faction.clone(),
            dice,
        );
        let log = ActionSequence::resolve_turn(&mut scope)?;
        let signals = std::mem::take(&mut scope.signals);
        drop(scope);

        draft.history.push(dice);
        debug!(
            target: "battle::combat",
            active = %active_faction,
            dice,
            entries = log.len(),
            "turn committed"
        );
        Ok(TurnReport {
            state: draft,
            log,
            signals,
        })
    }

    /// Builds the context a skill sees for `actor`.
    pub fn create_context(
        state: &BattleState,
        active_faction: &FactionId,
        actor: &CharacterId,
        dice: u8,
        extras: ContextExtras,
    ) -> Result<CombatContext, CombatError> {
        CombatContext::build(state, active_faction, actor, dice, extras)
    }

    /// Tears the battle down: drops passives, detaches carried equipment and
    /// clears every remaining subscription.
    ///
    /// `state` keeps its items, ready for another [`Combat::begin_battle`].
    pub fn end_battle(&mut self, state: &mut BattleState, listeners: PassiveListeners) {
        listeners.cleanup();
        for character in state.characters_mut() {
            character.detach_equipment(&self.bus);
        }
        self.bus.clear();
        info!(target: "battle::combat", "battle ended");
    }
}
