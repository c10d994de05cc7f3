//! Battle graph: factions own characters, and the state owns factions.
//!
//! [`BattleState`] is the unit of copy-on-write. A turn clones it into a
//! draft, mutates the draft, and hands the draft back as the next snapshot.
mod character;
mod faction;
mod ids;

pub use character::{Character, Stat};
pub use faction::{Allegiance, Faction};
pub use ids::{CharacterId, EquipmentId, FactionId, SkillId};

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CombatError;

/// Per-battle flag and counter store, keyed by skill id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    /// Skills that have spent their once-per-battle use.
    pub used_once: BTreeSet<SkillId>,
    /// Invocations per skill in the current turn.
    pub turn_counts: BTreeMap<SkillId, u32>,
}

impl Memory {
    pub fn turn_count(&self, skill: &SkillId) -> u32 {
        self.turn_counts.get(skill).copied().unwrap_or(0)
    }

    pub fn record_turn_use(&mut self, skill: &SkillId) {
        *self.turn_counts.entry(skill.clone()).or_default() += 1;
    }

    pub fn has_used_once(&self, skill: &SkillId) -> bool {
        self.used_once.contains(skill)
    }

    pub fn mark_used_once(&mut self, skill: &SkillId) {
        self.used_once.insert(skill.clone());
    }

    /// Counters reset every turn, once-flags persist for the battle.
    pub fn reset_turn(&mut self) {
        self.turn_counts.clear();
    }

    pub fn clear(&mut self) {
        self.used_once.clear();
        self.turn_counts.clear();
    }
}

/// Snapshot of a battle in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BattleState {
    pub factions: Vec<Faction>,
    pub memory: Memory,
    /// Dice values of committed turns, oldest first.
    pub history: Vec<u8>,
}

impl BattleState {
    pub fn new(factions: Vec<Faction>) -> Self {
        Self {
            factions,
            memory: Memory::default(),
            history: Vec::new(),
        }
    }

    pub fn faction(&self, id: &FactionId) -> Option<&Faction> {
        self.factions.iter().find(|f| &f.id == id)
    }

    pub fn faction_mut(&mut self, id: &FactionId) -> Option<&mut Faction> {
        self.factions.iter_mut().find(|f| &f.id == id)
    }

    /// Every character in faction order, then member order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.factions.iter().flat_map(|f| f.characters.iter())
    }

    pub fn characters_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.factions.iter_mut().flat_map(|f| f.characters.iter_mut())
    }

    pub fn living(&self) -> impl Iterator<Item = &Character> {
        self.characters().filter(|c| c.is_alive())
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.factions.iter().find_map(|f| f.get_character(id))
    }

    pub fn character_mut(&mut self, id: &CharacterId) -> Option<&mut Character> {
        self.factions.iter_mut().find_map(|f| f.get_character_mut(id))
    }

    /// Like [`BattleState::character`], but a miss is an invariant violation.
    pub fn require(&self, id: &CharacterId) -> Result<&Character, CombatError> {
        self.character(id)
            .ok_or_else(|| CombatError::UnknownCharacter(id.clone()))
    }

    pub fn require_mut(&mut self, id: &CharacterId) -> Result<&mut Character, CombatError> {
        self.character_mut(id)
            .ok_or_else(|| CombatError::UnknownCharacter(id.clone()))
    }

    pub fn require_faction(&self, id: &FactionId) -> Result<&Faction, CombatError> {
        self.faction(id)
            .ok_or_else(|| CombatError::UnknownFaction(id.clone()))
    }

    /// Factions that still have a living member.
    pub fn standing_factions(&self) -> impl Iterator<Item = &Faction> {
        self.factions.iter().filter(|f| !f.is_wiped_out())
    }
}
