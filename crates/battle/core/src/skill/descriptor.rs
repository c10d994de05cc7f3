//! Declarative skill descriptors.
//!
//! A skill is pure data: a condition, a targeting rule and an effect drawn
//! from a closed set. Content files deserialize straight into these types.
use crate::bus::Topic;
use crate::context::CombatMode;
use crate::state::{SkillId, Stat};

/// When a skill may resolve relative to the turn owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkillCategory {
    Offensive,
    Defensive,
    Both,
}

impl SkillCategory {
    pub fn allows(self, mode: CombatMode) -> bool {
        match self {
            Self::Both => true,
            Self::Offensive => mode == CombatMode::Offensive,
            Self::Defensive => mode == CombatMode::Defensive,
        }
    }
}

/// What invokes a skill.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillTrigger {
    /// The acting character's scheduled slot in a turn.
    #[default]
    ActivePhase,
    /// A bus topic; the skill is passive.
    Event(Topic),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    Even,
    Odd,
}

/// Comparisons against the turn dice. Every present bound must hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiceRule {
    pub exact: Option<u8>,
    pub min: Option<u8>,
    pub max: Option<u8>,
    pub parity: Option<Parity>,
}

impl DiceRule {
    pub fn exact(value: u8) -> Self {
        Self {
            exact: Some(value),
            ..Self::default()
        }
    }

    pub fn at_least(value: u8) -> Self {
        Self {
            min: Some(value),
            ..Self::default()
        }
    }

    pub fn at_most(value: u8) -> Self {
        Self {
            max: Some(value),
            ..Self::default()
        }
    }

    pub fn matches(&self, dice: u8) -> bool {
        let parity = match self.parity {
            None => true,
            Some(Parity::Even) => dice % 2 == 0,
            Some(Parity::Odd) => dice % 2 == 1,
        };
        self.exact.is_none_or(|v| dice == v)
            && self.min.is_none_or(|v| dice >= v)
            && self.max.is_none_or(|v| dice <= v)
            && parity
    }
}

/// Activation predicate. The per-turn cap is checked alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Condition {
    pub dice: Option<DiceRule>,
    /// The dice value was rolled on an earlier committed turn.
    pub history_match: bool,
    /// Once per battle.
    pub once: bool,
    /// Only when the actor is first in this turn's order.
    pub only_first: bool,
    /// The triggering event targets the actor.
    pub targeted_self: bool,
    /// The triggering event was caused by one of the actor's enemies.
    pub source_is_enemy: bool,
    /// The triggering event was caused by the actor.
    pub source_is_self: bool,
}

/// Where candidates come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetScope {
    SelfOnly,
    /// Living allies, the actor included.
    Allies,
    #[default]
    Enemies,
    DeadAllies,
    /// Every living character.
    All,
    /// The participant that caused the triggering event.
    TriggerSource,
    /// The living targets of the triggering event.
    TriggerTargets,
}

/// Upper bound on selected targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaxTargets {
    Fixed(u32),
    Unbounded,
    /// `then` targets when dice is at most `threshold`, else `otherwise`.
    DiceAtMost { threshold: u8, then: u32, otherwise: u32 },
}

impl MaxTargets {
    /// Resolved bound, never below one.
    pub fn resolve(&self, dice: u8) -> usize {
        let max = match *self {
            Self::Fixed(n) => n as usize,
            Self::Unbounded => usize::MAX,
            Self::DiceAtMost {
                threshold,
                then,
                otherwise,
            } => {
                if dice <= threshold {
                    then as usize
                } else {
                    otherwise as usize
                }
            }
        };
        max.max(1)
    }
}

impl Default for MaxTargets {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetMode {
    #[default]
    Auto,
    /// Player-controlled actors choose one target through the requester.
    Manual,
}

/// How to narrow candidates down to the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SelectionStrategy {
    /// Lowest current hp first; ties keep candidate order.
    #[default]
    LowestHp,
    /// Uniform shuffle, then take.
    Random,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Targeting {
    pub scope: TargetScope,
    pub max: MaxTargets,
    pub mode: TargetMode,
    /// Falls back to the battle's default strategy.
    pub strategy: Option<SelectionStrategy>,
}

impl Targeting {
    pub fn scoped(scope: TargetScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn with_max(mut self, max: MaxTargets) -> Self {
        self.max = max;
        self
    }

    pub fn manual(mut self) -> Self {
        self.mode = TargetMode::Manual;
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageSpec {
    pub amount: u32,
    /// Deals the dice value instead of `amount`.
    pub scale_with_dice: bool,
    /// Marks the damage as retaliation.
    pub counter: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffSpec {
    pub stat: Stat,
    pub amount: i32,
}

/// Rewrite applied to a triggering event's pending amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PendingAdjust {
    Add(i32),
    Set(u32),
}

impl PendingAdjust {
    pub fn apply(self, amount: u32) -> u32 {
        match self {
            Self::Add(delta) => amount.saturating_add_signed(delta),
            Self::Set(value) => value,
        }
    }
}

/// Closed effect set for generated skills. Parts apply in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectSpec {
    pub damage: Option<DamageSpec>,
    pub heal: Option<u32>,
    pub buff: Option<BuffSpec>,
    pub revive: bool,
    pub reroll: bool,
    pub adjust_pending: Option<PendingAdjust>,
    pub cancel_targets: bool,
    /// Speed change on the actor when it acted first this turn.
    pub self_speed_if_first: Option<i32>,
}

impl EffectSpec {
    pub fn damage(amount: u32) -> Self {
        Self {
            damage: Some(DamageSpec {
                amount,
                ..DamageSpec::default()
            }),
            ..Self::default()
        }
    }

    pub fn heal(amount: u32) -> Self {
        Self {
            heal: Some(amount),
            ..Self::default()
        }
    }

    pub fn buff(stat: Stat, amount: i32) -> Self {
        Self {
            buff: Some(BuffSpec { stat, amount }),
            ..Self::default()
        }
    }
}

/// Skills whose behavior the closed set cannot express.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ScriptedSkill {
    /// 1 damage to one target, plus 2 to a second when dice is at most 3.
    MultiAttack,
    /// 1 damage to the target and 1 to the actor.
    Desperation,
    /// 2 damage to every target on a 6, else 2 damage to one random target.
    DragonBreath,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillEffect {
    Generated(EffectSpec),
    Scripted(ScriptedSkill),
}

/// A process-wide, stateless ability description.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub category: SkillCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger: SkillTrigger,
    /// Falls back to the battle's default cap.
    #[cfg_attr(feature = "serde", serde(default))]
    pub limit_per_turn: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Condition,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targeting: Targeting,
    pub effect: SkillEffect,
}

impl Skill {
    pub fn new(
        id: impl Into<SkillId>,
        name: impl Into<String>,
        category: SkillCategory,
        effect: SkillEffect,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            trigger: SkillTrigger::ActivePhase,
            limit_per_turn: None,
            condition: Condition::default(),
            targeting: Targeting::default(),
            effect,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_targeting(mut self, targeting: Targeting) -> Self {
        self.targeting = targeting;
        self
    }

    pub fn triggered_by(mut self, topic: Topic) -> Self {
        self.trigger = SkillTrigger::Event(topic);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit_per_turn = Some(limit);
        self
    }

    pub fn is_active_phase(&self) -> bool {
        self.trigger == SkillTrigger::ActivePhase
    }

    pub fn is_triggered_by(&self, topic: &Topic) -> bool {
        matches!(&self.trigger, SkillTrigger::Event(t) if t == topic)
    }
}
