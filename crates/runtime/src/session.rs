//! Async battle lifecycle.
//!
//! A [`BattleSession`] owns one battle's engine and its latest committed
//! snapshot. Turns run on the blocking pool so manual targeting can park the
//! worker while the owner answers [`PendingChoice`]s from its own task.
use std::sync::Arc;

use battle_core::{
    BattleState, Combat, EventBus, FactionId, PassiveListeners, SkillRegistry, SubscriptionId,
    Topic, TurnReport,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::choice::{ChannelTargeter, PendingChoice};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::forwarder::{EventForwarder, SessionEvent};

/// Cloneable façade for observers of a running battle.
#[derive(Clone)]
pub struct BattleHandle {
    events: broadcast::Sender<SessionEvent>,
}

impl BattleHandle {
    /// Subscribe to the presentation stream.
    ///
    /// Receivers only see events published after they subscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

pub struct BattleSession {
    /// `None` only while a turn is in flight or after a worker panic.
    combat: Option<Combat>,
    bus: EventBus,
    state: BattleState,
    passives: Option<PassiveListeners>,
    forwarding: Vec<(Topic, SubscriptionId)>,
    handle: BattleHandle,
    choices: mpsc::Sender<PendingChoice>,
    turns: u32,
}

impl BattleSession {
    /// Starts a battle over an assembled roster.
    ///
    /// Returns the session and the receiving end of its manual-choice
    /// channel. The owner must keep answering choices while a turn runs.
    pub fn begin(
        registry: Arc<SkillRegistry>,
        mut roster: BattleState,
        config: &RuntimeConfig,
    ) -> (Self, mpsc::Receiver<PendingChoice>) {
        let (choices, choice_rx) = mpsc::channel(config.choice_buffer.max(1));
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        let mut combat = Combat::new(registry, config.battle.clone());
        combat.begin_battle(&mut roster);
        let passives = combat.setup_passive_listeners(&roster);
        let forwarding = EventForwarder::attach(events.clone(), combat.bus());

        info!(
            target: "battle::runtime",
            factions = roster.factions.len(),
            passives = passives.len(),
            "battle session started"
        );

        let session = Self {
            bus: combat.bus().clone(),
            combat: Some(combat),
            state: roster,
            passives: Some(passives),
            forwarding,
            handle: BattleHandle { events },
            choices,
            turns: 0,
        };
        (session, choice_rx)
    }

    /// The battle's bus, for extra observers. Subscriptions made here are
    /// cleared by [`BattleSession::end`].
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn handle(&self) -> BattleHandle {
        self.handle.clone()
    }

    /// Latest committed snapshot.
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Committed turns so far.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// At most one faction still has living members.
    pub fn is_over(&self) -> bool {
        self.state.standing_factions().nth(1).is_none()
    }

    /// The last faction standing, once the battle is over.
    pub fn winner(&self) -> Option<&FactionId> {
        let mut standing = self.state.standing_factions();
        let first = standing.next()?;
        standing.next().is_none().then_some(&first.id)
    }

    /// Resolves one turn for `active` with the given dice.
    ///
    /// On error the previous snapshot stays current.
    pub async fn play_turn(&mut self, active: &FactionId, dice: u8) -> Result<TurnReport> {
        if self.is_over() {
            return Err(RuntimeError::BattleOver);
        }
        let mut combat = self.combat.take().ok_or(RuntimeError::SessionPoisoned)?;
        let snapshot = self.state.clone();
        let faction = active.clone();
        let mut targeter = ChannelTargeter::new(self.choices.clone());

        let (combat, result) = tokio::task::spawn_blocking(move || {
            let result = combat.process_main_turn(&snapshot, &faction, dice, &mut targeter);
            (combat, result)
        })
        .await
        .map_err(RuntimeError::WorkerJoin)?;
        self.combat = Some(combat);

        let report = result?;
        self.state = report.state.clone();
        self.turns += 1;
        debug!(
            target: "battle::runtime",
            turn = self.turns,
            active = %active,
            dice,
            "turn committed"
        );
        self.publish(SessionEvent::TurnCommitted {
            turn: self.turns,
            active: active.clone(),
            dice,
            log: report.log.clone(),
        });
        Ok(report)
    }

    /// Tears down every subscription and returns the final snapshot.
    pub fn end(mut self) -> BattleState {
        let winner = self.winner().cloned();
        for (topic, id) in self.forwarding.drain(..) {
            self.bus.off(&topic, id);
        }
        match (self.combat.take(), self.passives.take()) {
            (Some(mut combat), Some(passives)) => combat.end_battle(&mut self.state, passives),
            (_, passives) => {
                drop(passives);
                for character in self.state.characters_mut() {
                    character.detach_equipment(&self.bus);
                }
                self.bus.clear();
            }
        }
        info!(
            target: "battle::runtime",
            turns = self.turns,
            winner = winner.as_ref().map(FactionId::as_str),
            "battle session ended"
        );
        self.publish(SessionEvent::Ended { winner });
        self.state
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.handle.events.send(event);
    }
}
