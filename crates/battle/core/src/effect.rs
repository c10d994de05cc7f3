//! Shared effect primitives.
//!
//! Every numeric change a skill makes goes through one of these functions so
//! interception and presentation events are published uniformly.
use tracing::debug;

use crate::bus::{Event, PendingDamage};
use crate::error::CombatError;
use crate::scope::TurnScope;
use crate::state::{CharacterId, Stat};

/// Result of one [`apply_damage`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageReport {
    /// Amount after interception.
    pub amount: u32,
    /// Damage actually applied per target.
    pub dealt: Vec<(CharacterId, u32)>,
}

impl DamageReport {
    pub fn total(&self) -> u32 {
        self.dealt.iter().map(|(_, d)| d).sum()
    }
}

enum Hit {
    Nullified { defense: u32 },
    Taken { died: bool },
}

/// Applies `amount` to each living target.
///
/// Publishes the pending damage first so interceptors can rewrite the amount
/// (and the target list). Defense is binary: a shield at least as large as
/// the final amount nullifies the hit, anything smaller lets the full amount
/// through. The shield is spent either way.
pub fn apply_damage(
    scope: &mut TurnScope<'_>,
    source: &CharacterId,
    targets: &[CharacterId],
    amount: u32,
    counter: bool,
) -> Result<DamageReport, CombatError> {
    let pending = scope.emit(Event::CausingDamage(PendingDamage {
        source: source.clone(),
        targets: targets.to_vec(),
        amount,
        dice: scope.dice,
        counter,
    }))?;
    let amount = pending.pending_amount().unwrap_or(amount);
    let targets = pending.targets().to_vec();

    let mut report = DamageReport {
        amount,
        dealt: Vec::with_capacity(targets.len()),
    };

    for target in &targets {
        let hit = {
            let character = scope.state.require_mut(target)?;
            if !character.is_alive() {
                continue;
            }
            let defense = std::mem::take(&mut character.defense);
            if defense >= amount {
                Hit::Nullified { defense }
            } else {
                character.hp = character.hp.saturating_sub(amount);
                Hit::Taken {
                    died: character.hp == 0,
                }
            }
        };

        match hit {
            Hit::Nullified { defense } => {
                debug!(target: "battle::effect", %target, amount, defense, "hit nullified");
                report.dealt.push((target.clone(), 0));
                scope.emit(Event::DamageNullified {
                    target: target.clone(),
                    damage: amount,
                    defense,
                })?;
                scope.emit(Event::DefenseConsumed {
                    target: target.clone(),
                    amount: defense,
                })?;
            }
            Hit::Taken { died } => {
                report.dealt.push((target.clone(), amount));
                scope.emit(Event::DamageTaken {
                    target: target.clone(),
                    source: source.clone(),
                    amount,
                    counter,
                })?;
                if died {
                    debug!(target: "battle::effect", %target, "character died");
                    scope.emit(Event::CharacterDied {
                        character: target.clone(),
                    })?;
                }
            }
        }
    }

    Ok(report)
}

/// Heals each living target toward max hp. Returns the total applied.
pub fn heal(
    scope: &mut TurnScope<'_>,
    source: &CharacterId,
    targets: &[CharacterId],
    amount: u32,
) -> Result<u32, CombatError> {
    let pending = scope.emit(Event::CausingHeal {
        source: source.clone(),
        targets: targets.to_vec(),
        amount,
    })?;
    let amount = pending.pending_amount().unwrap_or(amount);

    let mut total = 0;
    for target in pending.targets() {
        let applied = {
            let character = scope.state.require_mut(target)?;
            if !character.is_alive() {
                continue;
            }
            let before = character.hp;
            character.hp = character.hp.saturating_add(amount).min(character.max_hp);
            character.hp - before
        };
        if applied > 0 {
            total += applied;
            scope.emit(Event::Healed {
                target: target.clone(),
                amount: applied,
            })?;
        }
    }
    Ok(total)
}

/// Changes a battle stat on every target.
///
/// Speed changes only the transient value; base speed is untouched.
pub fn modify_stat(
    scope: &mut TurnScope<'_>,
    targets: &[CharacterId],
    stat: Stat,
    amount: i32,
) -> Result<(), CombatError> {
    for target in targets {
        let character = scope.state.require_mut(target)?;
        match stat {
            Stat::Speed => character.speed = character.speed.saturating_add(amount),
            Stat::Defense => {
                character.defense = character.defense.saturating_add_signed(amount);
                scope.emit(Event::DefenseGranted {
                    target: target.clone(),
                    amount,
                })?;
            }
        }
    }
    Ok(())
}

/// Restores every target to max hp. Returns how many were dead.
pub fn revive(scope: &mut TurnScope<'_>, targets: &[CharacterId]) -> Result<usize, CombatError> {
    let mut revived = 0;
    for target in targets {
        let was_dead = {
            let character = scope.state.require_mut(target)?;
            let was_dead = !character.is_alive();
            character.hp = character.max_hp;
            was_dead
        };
        if was_dead {
            revived += 1;
            scope.emit(Event::Revived {
                target: target.clone(),
            })?;
        }
    }
    Ok(revived)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bus::Topic;
    use crate::testing::{Recorder, ScopeFixture, id};

    fn hp(fixture: &ScopeFixture, name: &str) -> u32 {
        fixture.state.character(&id(name)).map(|c| c.hp).unwrap()
    }

    #[test]
    fn defense_is_binary_and_always_consumed() {
        let mut fixture = ScopeFixture::new();
        fixture.state.character_mut(&id("e")).unwrap().defense = 2;

        {
            let mut scope = fixture.scope();
            let report = apply_damage(&mut scope, &id("a"), &[id("e")], 2, false).unwrap();
            assert_eq!(report.total(), 0);
        }
        assert_eq!(hp(&fixture, "e"), 10);
        assert_eq!(fixture.state.character(&id("e")).unwrap().defense, 0);

        fixture.state.character_mut(&id("e")).unwrap().defense = 2;
        {
            let mut scope = fixture.scope();
            let report = apply_damage(&mut scope, &id("a"), &[id("e")], 3, false).unwrap();
            assert_eq!(report.total(), 3);
        }
        assert_eq!(hp(&fixture, "e"), 7);
        assert_eq!(fixture.state.character(&id("e")).unwrap().defense, 0);
    }

    #[test]
    fn hp_floors_at_zero_and_death_is_published() {
        let mut fixture = ScopeFixture::new();
        let recorder = Recorder::attach(&fixture.bus, &[Topic::TAKE_DAMAGE, Topic::DIE]);

        {
            let mut scope = fixture.scope();
            apply_damage(&mut scope, &id("a"), &[id("e")], 25, false).unwrap();
            // Dead targets are skipped entirely.
            apply_damage(&mut scope, &id("a"), &[id("e")], 1, false).unwrap();
        }

        assert_eq!(hp(&fixture, "e"), 0);
        assert_eq!(recorder.topics(), vec![Topic::TAKE_DAMAGE, Topic::DIE]);
    }

    #[test]
    fn nullified_hit_publishes_immute_and_defense_events() {
        let mut fixture = ScopeFixture::new();
        fixture.state.character_mut(&id("e")).unwrap().defense = 5;
        let recorder = Recorder::attach(
            &fixture.bus,
            &[Topic::IMMUTE, Topic::CAUSING_DEFENSE, Topic::TAKE_DAMAGE],
        );

        let mut scope = fixture.scope();
        apply_damage(&mut scope, &id("a"), &[id("e")], 4, false).unwrap();

        assert_eq!(recorder.topics(), vec![Topic::IMMUTE, Topic::CAUSING_DEFENSE]);
    }

    #[test]
    fn heal_is_clamped_and_reports_applied_amount() {
        let mut fixture = ScopeFixture::new();
        fixture.state.character_mut(&id("e")).unwrap().hp = 8;
        let recorder = Recorder::attach(&fixture.bus, &[Topic::GET_HEALED]);

        let mut scope = fixture.scope();
        let applied = heal(&mut scope, &id("e"), &[id("e")], 5).unwrap();
        drop(scope);

        assert_eq!(applied, 2);
        assert_eq!(hp(&fixture, "e"), 10);
        assert_eq!(
            recorder.events(),
            vec![Event::Healed {
                target: id("e"),
                amount: 2
            }]
        );
    }

    #[test]
    fn heal_skips_dead_and_full_targets_silently() {
        let mut fixture = ScopeFixture::new();
        fixture.state.character_mut(&id("b")).unwrap().hp = 0;
        let recorder = Recorder::attach(&fixture.bus, &[Topic::GET_HEALED]);

        let mut scope = fixture.scope();
        let applied = heal(&mut scope, &id("a"), &[id("a"), id("b")], 3).unwrap();
        drop(scope);

        assert_eq!(applied, 0);
        assert_eq!(hp(&fixture, "b"), 0);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn speed_buff_leaves_base_speed() {
        let mut fixture = ScopeFixture::new();
        let mut scope = fixture.scope();
        modify_stat(&mut scope, &[id("a")], Stat::Speed, -1).unwrap();
        modify_stat(&mut scope, &[id("a")], Stat::Defense, 2).unwrap();
        drop(scope);

        let a = fixture.state.character(&id("a")).unwrap();
        assert_eq!(a.speed, 7);
        assert_eq!(a.base_speed, 8);
        assert_eq!(a.defense, 2);
    }

    #[test]
    fn revive_publishes_only_for_dead_targets() {
        let mut fixture = ScopeFixture::new();
        fixture.state.character_mut(&id("b")).unwrap().hp = 0;
        fixture.state.character_mut(&id("a")).unwrap().hp = 2;
        let recorder = Recorder::attach(&fixture.bus, &[Topic::REVIVED]);

        let mut scope = fixture.scope();
        let revived = revive(&mut scope, &[id("a"), id("b")]).unwrap();
        drop(scope);

        assert_eq!(revived, 1);
        assert_eq!(hp(&fixture, "a"), 5);
        assert_eq!(hp(&fixture, "b"), 5);
        assert_eq!(recorder.events(), vec![Event::Revived { target: id("b") }]);
    }

    #[test]
    fn interceptors_finalize_the_amount() {
        let mut fixture = ScopeFixture::new();
        fixture.bus.on(
            Topic::CAUSING_DAMAGE,
            Arc::new(crate::testing::Adjust::new("shield", -1)),
        );

        {
            let mut scope = fixture.scope();
            let report = apply_damage(&mut scope, &id("a"), &[id("e")], 1, false).unwrap();
            assert_eq!(report.amount, 0);
        }
        assert_eq!(hp(&fixture, "e"), 10);

        {
            let mut scope = fixture.scope();
            let report = apply_damage(&mut scope, &id("a"), &[id("e")], 3, false).unwrap();
            assert_eq!(report.amount, 2);
        }
        assert_eq!(hp(&fixture, "e"), 8);
    }

    #[test]
    fn unknown_target_is_an_invariant_violation() {
        let mut fixture = ScopeFixture::new();
        let mut scope = fixture.scope();
        let result = apply_damage(&mut scope, &id("a"), &[id("ghost")], 1, false);
        assert!(matches!(result, Err(CombatError::UnknownCharacter(_))));
    }
}
