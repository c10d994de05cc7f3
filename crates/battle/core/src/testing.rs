//! Shared fixtures for unit tests.
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bus::{Event, EventBus, EventHandler, Topic};
use crate::config::BattleConfig;
use crate::context::{CancelAll, TargetRequester};
use crate::error::CombatError;
use crate::scope::TurnScope;
use crate::skill::{Skill, SkillRegistry};
use crate::state::{Allegiance, BattleState, Character, CharacterId, Faction, FactionId};

pub(crate) fn id(name: &str) -> CharacterId {
    CharacterId::new(name)
}

/// F1 (player) = {a: speed 8 hp 5, b: speed 3 hp 5}, F2 (computer) = {e: speed 5 hp 10}.
pub(crate) fn two_factions() -> BattleState {
    BattleState::new(vec![
        Faction::new(
            "f1",
            Allegiance::Player,
            "F1",
            vec![Character::new("a", "A", 5, 8), Character::new("b", "B", 5, 3)],
        ),
        Faction::new(
            "f2",
            Allegiance::Computer,
            "F2",
            vec![Character::new("e", "E", 10, 5)],
        ),
    ])
}

/// Owns everything a [`TurnScope`] borrows.
pub(crate) struct ScopeFixture {
    pub state: BattleState,
    pub bus: EventBus,
    pub registry: SkillRegistry,
    pub config: BattleConfig,
    pub rng: ChaCha8Rng,
    pub targeter: Box<dyn TargetRequester + Send>,
    pub active: FactionId,
    pub dice: u8,
}

impl ScopeFixture {
    pub fn new() -> Self {
        Self {
            state: two_factions(),
            bus: EventBus::new(),
            registry: SkillRegistry::default(),
            config: BattleConfig::default(),
            rng: ChaCha8Rng::seed_from_u64(0),
            targeter: Box::new(CancelAll),
            active: FactionId::new("f1"),
            dice: 6,
        }
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.registry = SkillRegistry::new(skills);
        self
    }

    pub fn scope(&mut self) -> TurnScope<'_> {
        TurnScope::new(
            &mut self.state,
            self.bus.clone(),
            &self.registry,
            &self.config,
            &mut self.rng,
            &mut *self.targeter,
            self.active.clone(),
            self.dice,
        )
    }
}

/// Records every payload on the topics it is attached to.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn attach(bus: &EventBus, topics: &[Topic]) -> Self {
        let recorder = Self::default();
        for topic in topics {
            bus.on(topic.clone(), Arc::new(recorder.clone()));
        }
        recorder
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.events().iter().map(Event::topic).collect()
    }
}

impl EventHandler for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn handle(&self, _scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Adds a fixed delta to any pending amount.
pub(crate) struct Adjust {
    name: &'static str,
    delta: i32,
}

impl Adjust {
    pub fn new(name: &'static str, delta: i32) -> Self {
        Self { name, delta }
    }
}

impl EventHandler for Adjust {
    fn name(&self) -> &str {
        self.name
    }

    fn handle(&self, _scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        if let Some(amount) = event.pending_amount_mut() {
            *amount = amount.saturating_add_signed(self.delta);
        }
        Ok(())
    }
}
