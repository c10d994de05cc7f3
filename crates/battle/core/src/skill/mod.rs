//! Skills: declarative descriptors plus the three-phase resolution protocol.
//!
//! Skills carry no per-battle state. Once-flags and per-turn counters live in
//! [`Memory`](crate::state::Memory) on the battle snapshot.
mod descriptor;
mod generated;
mod protocol;
mod registry;
mod scripted;
mod select;

pub use descriptor::{
    BuffSpec, Condition, DamageSpec, DiceRule, EffectSpec, MaxTargets, Parity, PendingAdjust,
    ScriptedSkill, SelectionStrategy, Skill, SkillCategory, SkillEffect, SkillTrigger,
    TargetMode, TargetScope, Targeting,
};
pub use protocol::Determination;
pub use registry::SkillRegistry;
pub use select::select_targets;
