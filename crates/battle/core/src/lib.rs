//! Dice-driven faction combat rules.
//!
//! `battle-core` resolves turn-based combat between factions of characters.
//! Each turn shares one dice value; skills are declarative descriptors run
//! through a determine → target → execute protocol, and an [`EventBus`] lets
//! passive skills and equipment intercept pending values mid-resolution.
//! All turn mutation flows through [`Combat::process_main_turn`], which
//! commits a whole turn as a new [`BattleState`] snapshot.
pub mod bus;
pub mod combat;
pub mod config;
pub mod context;
pub mod effect;
pub mod equipment;
pub mod error;
pub mod scope;
pub mod sequence;
pub mod skill;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use bus::{
    Event, EventBus, EventHandler, HandlerCriticality, PendingDamage, SubscriptionId, TargetKind,
    Topic,
};
pub use combat::{Combat, PassiveListeners, TurnReport};
pub use config::BattleConfig;
pub use context::{
    CancelAll, CombatContext, CombatMode, ContextExtras, FirstCandidate, TargetRequest,
    TargetRequester,
};
pub use effect::{DamageReport, apply_damage, heal, modify_stat, revive};
pub use equipment::{Equipment, EquippedItem};
pub use error::{BattleError, CombatError, ErrorSeverity};
pub use scope::{Signal, SkillOutcome, TurnScope};
pub use sequence::ActionSequence;
pub use skill::{
    BuffSpec, Condition, DamageSpec, DiceRule, EffectSpec, MaxTargets, Parity, PendingAdjust,
    ScriptedSkill, SelectionStrategy, Skill, SkillCategory, SkillEffect, SkillRegistry,
    SkillTrigger, TargetMode, TargetScope, Targeting,
};
pub use state::{
    Allegiance, BattleState, Character, CharacterId, EquipmentId, Faction, FactionId, Memory,
    SkillId, Stat,
};
