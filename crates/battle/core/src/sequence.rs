//! One active-faction turn: order every living actor and let each act.
use tracing::{debug, warn};

use crate::bus::Event;
use crate::context::{CombatContext, ContextExtras};
use crate::error::CombatError;
use crate::scope::TurnScope;
use crate::state::{BattleState, CharacterId};

/// Turn orchestrator.
pub struct ActionSequence;

impl ActionSequence {
    /// Living characters, fastest first. Equal speeds keep faction then
    /// member order.
    pub fn turn_order(state: &BattleState) -> Vec<CharacterId> {
        let mut living: Vec<_> = state.living().map(|c| (c.speed, c.id.clone())).collect();
        living.sort_by(|a, b| b.0.cmp(&a.0));
        living.into_iter().map(|(_, id)| id).collect()
    }

    /// Resolves the turn described by `scope` and returns its log.
    ///
    /// Actors killed before their slot are skipped.
    pub fn resolve_turn(scope: &mut TurnScope<'_>) -> Result<Vec<String>, CombatError> {
        scope.state.memory.reset_turn();
        let order = Self::turn_order(scope.state);
        debug!(
            target: "battle::sequence",
            active = %scope.active_faction,
            dice = scope.dice,
            order = ?order,
            "resolving turn"
        );

        for (rank, actor) in order.iter().enumerate() {
            if !scope.state.require(actor)?.is_alive() {
                debug!(target: "battle::sequence", %actor, "skipping fallen actor");
                continue;
            }
            let ctx = CombatContext::build(
                scope.state,
                &scope.active_faction,
                actor,
                scope.dice,
                ContextExtras {
                    is_first: rank == 0,
                    rank,
                    trigger: None,
                },
            )?;
            Self::take_turn(scope, ctx)?;
        }

        Ok(std::mem::take(&mut scope.log))
    }

    /// A character's scheduled action.
    ///
    /// Runs every active-phase skill in skill list order. Skills whose
    /// category does not fit the character's mode determine inactive.
    pub fn take_turn(scope: &mut TurnScope<'_>, ctx: CombatContext) -> Result<(), CombatError> {
        let first_appearance = {
            let actor = scope.state.require_mut(&ctx.actor)?;
            !std::mem::replace(&mut actor.has_acted, true)
        };
        if first_appearance {
            scope.emit(Event::FirstAppearance {
                character: ctx.actor.clone(),
            })?;
        }
        scope.emit(Event::ActionStarted {
            character: ctx.actor.clone(),
            mode: ctx.mode,
        })?;

        let registry = scope.registry;
        let skills = scope.state.require(&ctx.actor)?.skills.clone();
        for skill_id in &skills {
            let Some(skill) = registry.get(skill_id) else {
                warn!(target: "battle::sequence", actor = %ctx.actor, skill = %skill_id, "dangling skill reference");
                continue;
            };
            if !skill.is_active_phase() {
                continue;
            }
            // A retaliation earlier in this action may have killed the actor.
            if !scope.state.require(&ctx.actor)?.is_alive() {
                break;
            }
            let mut skill_ctx = ctx.clone();
            if let Some(outcome) = skill.perform(scope, &mut skill_ctx)? {
                scope.record(outcome);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Topic;
    use crate::skill::{Condition, DiceRule, EffectSpec, Skill, SkillCategory, SkillEffect};
    use crate::state::{Allegiance, Character, Faction};
    use crate::testing::{Recorder, ScopeFixture, id, two_factions};

    fn fireball() -> Skill {
        Skill::new(
            "fireball",
            "Fireball",
            SkillCategory::Offensive,
            SkillEffect::Generated(EffectSpec::damage(4)),
        )
        .with_condition(Condition {
            dice: Some(DiceRule::exact(6)),
            ..Condition::default()
        })
    }

    #[test]
    fn order_is_descending_speed_with_stable_ties() {
        let state = BattleState::new(vec![
            Faction::new(
                "f1",
                Allegiance::Player,
                "F1",
                vec![Character::new("a", "A", 5, 4), Character::new("b", "B", 5, 7)],
            ),
            Faction::new(
                "f2",
                Allegiance::Computer,
                "F2",
                vec![Character::new("c", "C", 5, 4), Character::new("d", "D", 5, 0).with_hp(0)],
            ),
        ]);
        assert_eq!(ActionSequence::turn_order(&state), vec![id("b"), id("a"), id("c")]);
    }

    #[test]
    fn scenario_order_and_damage() {
        let mut fixture = ScopeFixture::new().with_skills([fireball()]);
        fixture.state.character_mut(&id("a")).unwrap().skills.push("fireball".into());
        let recorder = Recorder::attach(&fixture.bus, &[Topic::ACTION_START]);

        let mut scope = fixture.scope();
        let log = ActionSequence::resolve_turn(&mut scope).unwrap();
        drop(scope);

        let order: Vec<_> = recorder.events().iter().map(|e| e.targets()[0].clone()).collect();
        assert_eq!(order, vec![id("a"), id("e"), id("b")]);
        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 6);
        assert_eq!(log, vec!["Fireball: Dealt 4 DMG.".to_owned()]);
    }

    #[test]
    fn actor_killed_before_its_slot_is_skipped() {
        let mut fixture = ScopeFixture::new().with_skills([Skill::new(
            "smite",
            "Smite",
            SkillCategory::Offensive,
            SkillEffect::Generated(EffectSpec::damage(10)),
        )]);
        fixture.state.character_mut(&id("a")).unwrap().skills.push("smite".into());
        let recorder = Recorder::attach(&fixture.bus, &[Topic::ACTION_START]);

        let mut scope = fixture.scope();
        ActionSequence::resolve_turn(&mut scope).unwrap();
        drop(scope);

        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 0);
        let acted: Vec<_> = recorder.events().iter().map(|e| e.targets()[0].clone()).collect();
        assert_eq!(acted, vec![id("a"), id("b")]);
    }

    #[test]
    fn first_appearance_is_published_once() {
        let mut fixture = ScopeFixture::new();
        let recorder = Recorder::attach(&fixture.bus, &[Topic::FIRST_APPEARANCE]);

        for _ in 0..2 {
            let mut scope = fixture.scope();
            ActionSequence::resolve_turn(&mut scope).unwrap();
        }

        assert_eq!(recorder.events().len(), 3);
    }

    #[test]
    fn dangling_skill_is_skipped() {
        let mut state = two_factions();
        state.character_mut(&id("a")).unwrap().skills.push("missing".into());
        let mut fixture = ScopeFixture::new().with_skills([fireball()]);
        fixture.state = state;
        fixture.state.character_mut(&id("a")).unwrap().skills.push("fireball".into());

        let mut scope = fixture.scope();
        let log = ActionSequence::resolve_turn(&mut scope).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn off_mode_skills_publish_an_inactive_determination() {
        let ward = Skill::new(
            "ward",
            "Ward",
            SkillCategory::Defensive,
            SkillEffect::Generated(EffectSpec::damage(1)),
        );
        let mut fixture = ScopeFixture::new().with_skills([ward]);
        fixture.state.character_mut(&id("a")).unwrap().skills.push("ward".into());
        let recorder = Recorder::attach(&fixture.bus, &[Topic::DETERMINING]);

        let mut scope = fixture.scope();
        let log = ActionSequence::resolve_turn(&mut scope).unwrap();
        drop(scope);

        assert!(log.is_empty());
        assert_eq!(
            recorder.events(),
            vec![Event::SkillDetermined {
                skill: "ward".into(),
                actor: id("a"),
                active: false
            }]
        );
    }

    #[test]
    fn per_turn_counters_reset_each_turn() {
        let mut fixture = ScopeFixture::new().with_skills([fireball()]);
        fixture.state.character_mut(&id("a")).unwrap().skills.push("fireball".into());

        for expected in [6, 2] {
            let mut scope = fixture.scope();
            ActionSequence::resolve_turn(&mut scope).unwrap();
            drop(scope);
            assert_eq!(fixture.state.character(&id("e")).unwrap().hp, expected);
        }
    }
}
