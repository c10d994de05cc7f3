use std::sync::Arc;

use crate::bus::EventBus;
use crate::equipment::{Equipment, EquippedItem};

use super::{CharacterId, EquipmentId, FactionId, SkillId};

/// Battle stat that skill effects can modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Stat {
    /// Battle-transient speed. Base speed is never touched.
    Speed,
    /// Binary per-hit shield.
    Defense,
}

/// A combatant.
///
/// Dead characters (hp 0) stay in their faction so revival effects can still
/// reach them; liveness is a query, not a removal.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub base_speed: i32,
    /// Battle-scoped speed that governs turn order.
    pub speed: i32,
    pub defense: u32,
    pub skills: Vec<SkillId>,
    pub equipment: Vec<EquippedItem>,
    /// Owning faction, set when the character joins one.
    pub faction: FactionId,
    pub has_acted: bool,
}

impl Character {
    /// Creates a character at full health with no faction yet.
    pub fn new(id: impl Into<CharacterId>, name: impl Into<String>, max_hp: u32, speed: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hp: max_hp,
            max_hp,
            base_speed: speed,
            speed,
            defense: 0,
            skills: Vec::new(),
            equipment: Vec::new(),
            faction: FactionId::new(""),
            has_acted: false,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SkillId>,
    {
        for skill in skills {
            let skill = skill.into();
            if !self.skills.contains(&skill) {
                self.skills.push(skill);
            }
        }
        self
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.max_hp);
        self
    }

    /// Carries an item without subscribing it yet. [`Character::attach_equipment`]
    /// performs the subscription once the battle bus exists.
    pub fn with_item(mut self, item: Arc<dyn Equipment>) -> Self {
        self.equipment.push(EquippedItem::detached(item));
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    #[inline]
    pub fn is_full_health(&self) -> bool {
        self.hp == self.max_hp
    }

    /// Restores battle-transient values ahead of a new battle.
    pub fn reset_for_battle(&mut self) {
        self.speed = self.base_speed;
        self.defense = 0;
        self.has_acted = false;
    }

    /// Adds an item and subscribes its handlers to `bus`.
    pub fn equip(&mut self, item: Arc<dyn Equipment>, bus: &EventBus) {
        let subscriptions = item.on_equip(&self.id, bus);
        self.equipment.push(EquippedItem::attached(item, subscriptions));
    }

    /// Removes an item and unsubscribes its handlers. Returns the item if it was equipped.
    pub fn unequip(&mut self, item: &EquipmentId, bus: &EventBus) -> Option<Arc<dyn Equipment>> {
        let index = self.equipment.iter().position(|e| e.item.id() == item)?;
        let equipped = self.equipment.remove(index);
        equipped.item.on_unequip(bus, &equipped.subscriptions);
        Some(equipped.item)
    }

    /// Subscribes every carried item that is not subscribed yet.
    pub fn attach_equipment(&mut self, bus: &EventBus) {
        for equipped in self.equipment.iter_mut().filter(|e| !e.is_attached()) {
            equipped.subscriptions = equipped.item.on_equip(&self.id, bus);
        }
    }

    /// Unsubscribes every carried item but keeps it on the character, so the
    /// next battle's [`Character::attach_equipment`] subscribes it again.
    pub fn detach_equipment(&mut self, bus: &EventBus) {
        for equipped in self.equipment.iter_mut().filter(|e| e.is_attached()) {
            equipped.item.on_unequip(bus, &equipped.subscriptions);
            equipped.subscriptions.clear();
        }
    }
}
