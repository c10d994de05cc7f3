//! Automated battles for balance checks.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use battle_core::{
    BattleState, CombatError, Event, EventHandler, FactionId, HandlerCriticality, SkillRegistry,
    Topic, TurnScope,
};
use tracing::{debug, info};

use crate::choice::{ChoiceProvider, serve_choices};
use crate::config::RuntimeConfig;
use crate::dice::DiceSource;
use crate::error::Result;
use crate::session::BattleSession;

/// Outcome of one automated battle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationReport {
    /// Rounds started. A round gives every standing faction one turn.
    pub rounds: u32,
    pub turns: u32,
    /// `None` when the round cap was hit or nobody survived.
    pub winner: Option<FactionId>,
    /// Damage that landed, keyed by the attacker's faction.
    pub damage: BTreeMap<FactionId, u32>,
    pub log: Vec<String>,
    pub final_state: BattleState,
}

/// Tallies landed damage per attacking faction.
#[derive(Default)]
struct DamageMeter {
    totals: Mutex<BTreeMap<FactionId, u32>>,
}

impl DamageMeter {
    fn totals(&self) -> BTreeMap<FactionId, u32> {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventHandler for DamageMeter {
    fn name(&self) -> &str {
        "damage-meter"
    }

    fn criticality(&self) -> HandlerCriticality {
        HandlerCriticality::Optional
    }

    fn handle(&self, scope: &mut TurnScope<'_>, event: &mut Event) -> std::result::Result<(), CombatError> {
        let Event::DamageTaken { source, amount, .. } = event else {
            return Ok(());
        };
        let faction = scope.state.require(source)?.faction.clone();
        let mut totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        *totals.entry(faction).or_default() += *amount;
        Ok(())
    }
}

/// Runs a battle to completion, answering manual choices with `provider`.
///
/// Factions take turns in roster order, one dice roll each. A turn that
/// raises a reroll signal earns its faction one bonus turn with a fresh
/// roll. The battle stops when one faction is left standing or after
/// `config.max_rounds` rounds.
pub async fn simulate_battle(
    registry: Arc<SkillRegistry>,
    roster: BattleState,
    config: &RuntimeConfig,
    dice: &mut dyn DiceSource,
    provider: impl ChoiceProvider + 'static,
) -> Result<SimulationReport> {
    let order: Vec<FactionId> = roster.factions.iter().map(|f| f.id.clone()).collect();
    let (mut session, choices) = BattleSession::begin(registry, roster, config);
    let responder = serve_choices(choices, provider);

    let meter = Arc::new(DamageMeter::default());
    let meter_subscription = session.bus().on(Topic::TAKE_DAMAGE, meter.clone());

    let mut report = SimulationReport::default();
    'battle: while report.rounds < config.max_rounds && !session.is_over() {
        report.rounds += 1;
        for active in &order {
            if session.is_over() {
                break 'battle;
            }
            let standing = session
                .state()
                .faction(active)
                .is_some_and(|f| !f.is_wiped_out());
            if !standing {
                continue;
            }

            let turn = session.play_turn(active, dice.roll()).await?;
            let bonus_turn = turn.reroll_requested();
            report.log.extend(turn.log);
            if bonus_turn && !session.is_over() {
                debug!(target: "battle::runtime", active = %active, "bonus turn from reroll");
                let bonus = session.play_turn(active, dice.roll()).await?;
                report.log.extend(bonus.log);
            }
        }
    }

    session.bus().off(&Topic::TAKE_DAMAGE, meter_subscription);
    report.turns = session.turns();
    report.winner = session.winner().cloned();
    report.damage = meter.totals();
    report.final_state = session.end();
    responder.abort();

    info!(
        target: "battle::runtime",
        rounds = report.rounds,
        turns = report.turns,
        winner = report.winner.as_ref().map(FactionId::as_str),
        "simulation finished"
    );
    Ok(report)
}
