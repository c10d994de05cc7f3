//! Mutable bundle threaded through one turn's dispatch.
use rand_chacha::ChaCha8Rng;

use crate::bus::{Event, EventBus};
use crate::config::BattleConfig;
use crate::context::TargetRequester;
use crate::error::CombatError;
use crate::skill::SkillRegistry;
use crate::state::{BattleState, FactionId};

/// Out-of-band request a skill raises for the boundary to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum Signal {
    /// Roll the turn dice again.
    Reroll,
}

/// What a resolved skill reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillOutcome {
    pub log: String,
    pub signal: Option<Signal>,
    /// The skill resolved but applied nothing.
    pub skipped: bool,
}

impl SkillOutcome {
    pub fn new(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            signal: None,
            skipped: false,
        }
    }

    /// Outcome of a cancelled choice or a target list emptied by interception.
    pub fn skipped(actor: &str, skill: &str) -> Self {
        Self {
            skipped: true,
            ..Self::new(format!("{actor} skipped {skill}."))
        }
    }
}

/// Everything a handler or skill may touch while a turn resolves.
///
/// `state` is the turn's draft; nothing here is visible to callers until the
/// turn commits.
pub struct TurnScope<'a> {
    pub state: &'a mut BattleState,
    pub bus: EventBus,
    pub registry: &'a SkillRegistry,
    pub config: &'a BattleConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub targeter: &'a mut (dyn TargetRequester + Send),
    pub active_faction: FactionId,
    pub dice: u8,
    /// Current passive nesting depth.
    pub depth: u32,
    pub log: Vec<String>,
    pub signals: Vec<Signal>,
}

impl<'a> TurnScope<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: &'a mut BattleState,
        bus: EventBus,
        registry: &'a SkillRegistry,
        config: &'a BattleConfig,
        rng: &'a mut ChaCha8Rng,
        targeter: &'a mut (dyn TargetRequester + Send),
        active_faction: FactionId,
        dice: u8,
    ) -> Self {
        Self {
            state,
            bus,
            registry,
            config,
            rng,
            targeter,
            active_faction,
            dice,
            depth: 0,
            log: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Publishes on this battle's bus and returns the intercepted payload.
    pub fn emit(&mut self, event: Event) -> Result<Event, CombatError> {
        let bus = self.bus.clone();
        bus.emit(self, event)
    }

    /// Records a skill outcome in the turn log.
    pub fn record(&mut self, outcome: SkillOutcome) {
        if let Some(signal) = outcome.signal {
            self.signals.push(signal);
        }
        self.log.push(outcome.log);
    }
}
