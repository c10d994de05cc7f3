use std::slice;

use crate::context::CombatMode;
use crate::state::{CharacterId, SkillId};

use super::Topic;

/// Shape of a resolved target list, as seen by presentation and passives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    /// The only target is the actor.
    SelfOnly,
    Single,
    Multi,
}

impl TargetKind {
    pub fn classify(actor: &CharacterId, targets: &[CharacterId]) -> Self {
        match targets {
            [only] if only == actor => Self::SelfOnly,
            [_] => Self::Single,
            _ => Self::Multi,
        }
    }
}

/// Damage on its way to its targets. Interceptors rewrite `amount`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDamage {
    pub source: CharacterId,
    pub targets: Vec<CharacterId>,
    pub amount: u32,
    pub dice: u8,
    /// Set on retaliation damage so retaliation does not retaliate.
    pub counter: bool,
}

/// Typed payload of every bus topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    FirstAppearance {
        character: CharacterId,
    },
    ActionStarted {
        character: CharacterId,
        mode: CombatMode,
    },
    SkillDetermined {
        skill: SkillId,
        actor: CharacterId,
        active: bool,
    },
    /// Listeners may rewrite `targets`; an emptied list cancels the skill.
    TargetsResolved {
        skill: SkillId,
        actor: CharacterId,
        kind: TargetKind,
        targets: Vec<CharacterId>,
        dice: u8,
    },
    CausingDamage(PendingDamage),
    DamageNullified {
        target: CharacterId,
        damage: u32,
        defense: u32,
    },
    DefenseConsumed {
        target: CharacterId,
        amount: u32,
    },
    DamageTaken {
        target: CharacterId,
        source: CharacterId,
        amount: u32,
        counter: bool,
    },
    CharacterDied {
        character: CharacterId,
    },
    /// Listeners may rewrite `amount`.
    CausingHeal {
        source: CharacterId,
        targets: Vec<CharacterId>,
        amount: u32,
    },
    Healed {
        target: CharacterId,
        amount: u32,
    },
    DefenseGranted {
        target: CharacterId,
        amount: i32,
    },
    Revived {
        target: CharacterId,
    },
    /// Payload for topics outside the built-in set.
    Custom {
        topic: Topic,
        source: Option<CharacterId>,
        targets: Vec<CharacterId>,
        dice: u8,
    },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::FirstAppearance { .. } => Topic::FIRST_APPEARANCE,
            Event::ActionStarted { .. } => Topic::ACTION_START,
            Event::SkillDetermined { .. } => Topic::DETERMINING,
            Event::TargetsResolved { .. } => Topic::TARGETING,
            Event::CausingDamage(_) => Topic::CAUSING_DAMAGE,
            Event::DamageNullified { .. } => Topic::IMMUTE,
            Event::DefenseConsumed { .. } => Topic::CAUSING_DEFENSE,
            Event::DamageTaken { .. } => Topic::TAKE_DAMAGE,
            Event::CharacterDied { .. } => Topic::DIE,
            Event::CausingHeal { .. } => Topic::CAUSING_HEAL,
            Event::Healed { .. } => Topic::GET_HEALED,
            Event::DefenseGranted { .. } => Topic::GET_DEFENSE,
            Event::Revived { .. } => Topic::REVIVED,
            Event::Custom { topic, .. } => topic.clone(),
        }
    }

    /// Characters the event is about.
    pub fn targets(&self) -> &[CharacterId] {
        match self {
            Event::TargetsResolved { targets, .. }
            | Event::CausingHeal { targets, .. }
            | Event::Custom { targets, .. } => targets,
            Event::CausingDamage(pending) => &pending.targets,
            Event::DamageNullified { target, .. }
            | Event::DefenseConsumed { target, .. }
            | Event::DamageTaken { target, .. }
            | Event::Healed { target, .. }
            | Event::DefenseGranted { target, .. }
            | Event::Revived { target } => slice::from_ref(target),
            Event::FirstAppearance { character }
            | Event::ActionStarted { character, .. }
            | Event::CharacterDied { character } => slice::from_ref(character),
            Event::SkillDetermined { .. } => &[],
        }
    }

    pub fn targets_mut(&mut self) -> Option<&mut Vec<CharacterId>> {
        match self {
            Event::TargetsResolved { targets, .. }
            | Event::CausingHeal { targets, .. }
            | Event::Custom { targets, .. } => Some(targets),
            Event::CausingDamage(pending) => Some(&mut pending.targets),
            _ => None,
        }
    }

    /// The counterpart participant: whoever caused the event.
    pub fn source(&self) -> Option<&CharacterId> {
        match self {
            Event::TargetsResolved { actor, .. } | Event::SkillDetermined { actor, .. } => Some(actor),
            Event::CausingDamage(pending) => Some(&pending.source),
            Event::DamageTaken { source, .. } | Event::CausingHeal { source, .. } => Some(source),
            Event::ActionStarted { character, .. } => Some(character),
            Event::Custom { source, .. } => source.as_ref(),
            _ => None,
        }
    }

    pub fn dice(&self) -> Option<u8> {
        match self {
            Event::TargetsResolved { dice, .. } | Event::Custom { dice, .. } => Some(*dice),
            Event::CausingDamage(pending) => Some(pending.dice),
            _ => None,
        }
    }

    /// The in-flight amount interceptors may rewrite, if this event has one.
    pub fn pending_amount_mut(&mut self) -> Option<&mut u32> {
        match self {
            Event::CausingDamage(pending) => Some(&mut pending.amount),
            Event::CausingHeal { amount, .. } => Some(amount),
            _ => None,
        }
    }

    pub fn pending_amount(&self) -> Option<u32> {
        match self {
            Event::CausingDamage(pending) => Some(pending.amount),
            Event::CausingHeal { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub fn is_counter(&self) -> bool {
        match self {
            Event::CausingDamage(pending) => pending.counter,
            Event::DamageTaken { counter, .. } => *counter,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CharacterId {
        CharacterId::new(s)
    }

    #[test]
    fn target_kind_classification() {
        assert_eq!(TargetKind::classify(&id("a"), &[id("a")]), TargetKind::SelfOnly);
        assert_eq!(TargetKind::classify(&id("a"), &[id("b")]), TargetKind::Single);
        assert_eq!(TargetKind::classify(&id("a"), &[id("a"), id("b")]), TargetKind::Multi);
        assert_eq!(TargetKind::Multi.as_ref(), "MULTI");
    }

    #[test]
    fn pending_amount_is_writable_through_the_payload() {
        let mut event = Event::CausingDamage(PendingDamage {
            source: id("a"),
            targets: vec![id("e")],
            amount: 4,
            dice: 6,
            counter: false,
        });
        if let Some(amount) = event.pending_amount_mut() {
            *amount -= 1;
        }
        assert_eq!(event.pending_amount(), Some(3));
        assert_eq!(event.source(), Some(&id("a")));
        assert_eq!(event.topic(), Topic::CAUSING_DAMAGE);
    }

    #[test]
    fn single_participant_events_expose_their_target() {
        let event = Event::DamageTaken {
            target: id("e"),
            source: id("a"),
            amount: 2,
            counter: true,
        };
        assert_eq!(event.targets(), &[id("e")]);
        assert!(event.is_counter());
        assert!(Event::Revived { target: id("e") }.source().is_none());
    }
}
