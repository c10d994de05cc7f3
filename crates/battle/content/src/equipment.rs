//! Built-in equipment catalog.
//!
//! Every item is a set of bus interceptors scoped to its owner. Items never
//! touch characters directly except through the effect primitives.
use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{
    CharacterId, CombatError, Equipment, EquipmentId, Event, EventHandler, HandlerCriticality,
    Topic, TurnScope, apply_damage, heal,
};
use rand::Rng;
use tracing::trace;

/// Behavior of a catalog item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// +1 pending damage when the owner attacks exactly one target.
    SharpDagger,
    /// -1 pending damage when the owner is among the targets.
    GuardianShield,
    /// Heals the owner 1 whenever the owner causes damage.
    VampireFang,
    /// Even odds of 1 retaliation damage when the owner is hit.
    CounterRing,
    /// +2 pending damage when every target is unhurt.
    SniperScope,
    /// Negates damage aimed at the owner on a dice of 1.
    GamblersCoin,
    /// +1 pending damage, +2 on a dice of 6.
    FlameSword,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::SharpDagger,
        ItemKind::GuardianShield,
        ItemKind::VampireFang,
        ItemKind::CounterRing,
        ItemKind::SniperScope,
        ItemKind::GamblersCoin,
        ItemKind::FlameSword,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ItemKind::SharpDagger => "sharp_dagger",
            ItemKind::GuardianShield => "guardian_shield",
            ItemKind::VampireFang => "vampire_fang",
            ItemKind::CounterRing => "counter_ring",
            ItemKind::SniperScope => "sniper_scope",
            ItemKind::GamblersCoin => "gamblers_coin",
            ItemKind::FlameSword => "flame_sword",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::SharpDagger => "Sharp Dagger",
            ItemKind::GuardianShield => "Guardian Shield",
            ItemKind::VampireFang => "Vampire Fang",
            ItemKind::CounterRing => "Counter Ring",
            ItemKind::SniperScope => "Sniper Scope",
            ItemKind::GamblersCoin => "Gambler's Coin",
            ItemKind::FlameSword => "Flame Sword",
        }
    }

    fn topic(self) -> Topic {
        match self {
            ItemKind::CounterRing => Topic::TAKE_DAMAGE,
            _ => Topic::CAUSING_DAMAGE,
        }
    }
}

/// A catalog item instance.
#[derive(Debug)]
pub struct CatalogItem {
    id: EquipmentId,
    kind: ItemKind,
}

impl CatalogItem {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            id: EquipmentId::new(kind.id()),
            kind,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }
}

impl Equipment for CatalogItem {
    fn id(&self) -> &EquipmentId {
        &self.id
    }

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn handlers(&self, owner: &CharacterId) -> Vec<(Topic, Arc<dyn EventHandler>)> {
        let handler = ItemHandler {
            kind: self.kind,
            owner: owner.clone(),
            name: format!("{}@{}", self.kind.id(), owner),
        };
        vec![(self.kind.topic(), Arc::new(handler))]
    }
}

/// Interceptor subscribed on behalf of one owner.
struct ItemHandler {
    kind: ItemKind,
    owner: CharacterId,
    name: String,
}

impl ItemHandler {
    fn intercept_damage(&self, scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        let Event::CausingDamage(pending) = event else {
            return Ok(());
        };
        let from_owner = pending.source == self.owner;
        let at_owner = pending.targets.contains(&self.owner);
        let before = pending.amount;

        match self.kind {
            ItemKind::SharpDagger if from_owner && pending.targets.len() == 1 => {
                pending.amount += 1;
            }
            ItemKind::GuardianShield if at_owner => {
                pending.amount = pending.amount.saturating_sub(1);
            }
            ItemKind::SniperScope if from_owner => {
                let unhurt = pending.targets.iter().all(|id| {
                    scope
                        .state
                        .character(id)
                        .is_some_and(|target| target.is_full_health())
                });
                if unhurt {
                    pending.amount += 2;
                }
            }
            ItemKind::GamblersCoin if at_owner && pending.dice == 1 => {
                pending.amount = 0;
            }
            ItemKind::FlameSword if from_owner => {
                pending.amount += if pending.dice == 6 { 2 } else { 1 };
            }
            ItemKind::VampireFang if from_owner && pending.amount > 0 => {
                let owner = self.owner.clone();
                heal(scope, &owner, std::slice::from_ref(&owner), 1)?;
            }
            _ => {}
        }

        if pending.amount != before {
            trace!(
                target: "battle::effect",
                item = self.kind.id(),
                owner = %self.owner,
                before,
                after = pending.amount,
                "pending damage rewritten"
            );
        }
        Ok(())
    }

    fn retaliate(&self, scope: &mut TurnScope<'_>, event: &Event) -> Result<(), CombatError> {
        let Event::DamageTaken {
            target,
            source,
            counter,
            ..
        } = event
        else {
            return Ok(());
        };
        if *target != self.owner || *counter || *source == self.owner {
            return Ok(());
        }
        if scope.rng.gen_bool(0.5) {
            let source = source.clone();
            apply_damage(scope, &self.owner, std::slice::from_ref(&source), 1, true)?;
        }
        Ok(())
    }
}

impl EventHandler for ItemHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn criticality(&self) -> HandlerCriticality {
        HandlerCriticality::Optional
    }

    fn handle(&self, scope: &mut TurnScope<'_>, event: &mut Event) -> Result<(), CombatError> {
        match self.kind {
            ItemKind::CounterRing => self.retaliate(scope, event),
            _ => self.intercept_damage(scope, event),
        }
    }
}

/// Lookup of catalog items by id.
#[derive(Clone)]
pub struct EquipmentCatalog {
    items: HashMap<EquipmentId, ItemKind>,
}

impl EquipmentCatalog {
    /// The seven built-in items.
    pub fn builtin() -> Self {
        Self {
            items: ItemKind::ALL
                .into_iter()
                .map(|kind| (EquipmentId::new(kind.id()), kind))
                .collect(),
        }
    }

    /// A fresh instance of the item, or `None` for unknown ids.
    pub fn create(&self, id: &EquipmentId) -> Option<Arc<dyn Equipment>> {
        let kind = *self.items.get(id)?;
        Some(Arc::new(CatalogItem::new(kind)))
    }

    pub fn contains(&self, id: &EquipmentId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for EquipmentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
