//! Determine → target → execute.
//!
//! ```text
//! determine ──inactive──▶ None
//!     │ active (slot claimed)
//!     ▼
//! target ──cancelled / emptied──▶ Some(skipped)
//!     │
//!     ▼
//! execute ──▶ Some(outcome)
//! ```
use tracing::{debug, warn};

use crate::bus::{Event, TargetKind};
use crate::context::{CombatContext, TargetRequest};
use crate::error::CombatError;
use crate::scope::{SkillOutcome, TurnScope};
use crate::state::{Allegiance, BattleState, CharacterId};

use super::select::select_targets;
use super::{Skill, SkillEffect, TargetMode, TargetScope, generated, scripted};

/// Output of a successful determine phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Determination {
    pub candidates: Vec<CharacterId>,
    pub max: usize,
}

enum Selection {
    Chosen(Vec<CharacterId>),
    Cancelled,
}

impl Skill {
    /// Runs the full protocol for `ctx.actor`.
    ///
    /// `None` means the skill did not activate; a skipped outcome means it
    /// activated but applied nothing.
    pub fn perform(
        &self,
        scope: &mut TurnScope<'_>,
        ctx: &mut CombatContext,
    ) -> Result<Option<SkillOutcome>, CombatError> {
        let Some(determination) = self.determine(scope, ctx)? else {
            return Ok(None);
        };

        let targets = match self.target(scope, ctx, determination)? {
            Selection::Chosen(targets) => targets,
            Selection::Cancelled => {
                let actor = scope.state.require(&ctx.actor)?;
                return Ok(Some(SkillOutcome::skipped(&actor.name, &self.name)));
            }
        };

        self.execute(scope, ctx, &targets).map(Some)
    }

    /// Evaluates category, condition and per-turn cap, then resolves candidates.
    ///
    /// Publishes the verdict either way. On success the skill's per-turn slot
    /// is claimed.
    pub fn determine(
        &self,
        scope: &mut TurnScope<'_>,
        ctx: &CombatContext,
    ) -> Result<Option<Determination>, CombatError> {
        let candidates = if self.category.allows(ctx.mode) && self.condition_holds(scope, ctx) {
            self.candidates(scope.state, ctx)?
        } else {
            Vec::new()
        };
        let active = !candidates.is_empty();

        debug!(
            target: "battle::skill",
            skill = %self.id,
            actor = %ctx.actor,
            active,
            candidates = candidates.len(),
            "determined"
        );
        scope.emit(Event::SkillDetermined {
            skill: self.id.clone(),
            actor: ctx.actor.clone(),
            active,
        })?;

        if !active {
            return Ok(None);
        }

        scope.state.memory.record_turn_use(&self.id);
        Ok(Some(Determination {
            candidates,
            max: self.targeting.max.resolve(ctx.dice),
        }))
    }

    fn condition_holds(&self, scope: &TurnScope<'_>, ctx: &CombatContext) -> bool {
        let condition = &self.condition;
        let memory = &scope.state.memory;
        let limit = self
            .limit_per_turn
            .unwrap_or(scope.config.default_limit_per_turn);
        let source = ctx.trigger.as_ref().and_then(Event::source);

        memory.turn_count(&self.id) < limit
            && condition.dice.is_none_or(|rule| rule.matches(ctx.dice))
            && (!condition.history_match || scope.state.history.contains(&ctx.dice))
            && (!condition.once || !memory.has_used_once(&self.id))
            && (!condition.only_first || ctx.is_first)
            && (!condition.targeted_self || ctx.is_targeted())
            && (!condition.source_is_enemy || source.is_some_and(|s| ctx.is_enemy(s)))
            && (!condition.source_is_self || source == Some(&ctx.actor))
    }

    /// Living (or, for revival scopes, dead) characters this skill may target.
    pub fn candidates(
        &self,
        state: &BattleState,
        ctx: &CombatContext,
    ) -> Result<Vec<CharacterId>, CombatError> {
        let living = |ids: &[CharacterId]| -> Result<Vec<CharacterId>, CombatError> {
            let mut alive = Vec::with_capacity(ids.len());
            for id in ids {
                if state.require(id)?.is_alive() {
                    alive.push(id.clone());
                }
            }
            Ok(alive)
        };

        match self.targeting.scope {
            TargetScope::SelfOnly => living(std::slice::from_ref(&ctx.actor)),
            TargetScope::Allies => living(&ctx.allies),
            TargetScope::Enemies => living(&ctx.enemies),
            TargetScope::DeadAllies => Ok(state
                .require_faction(&ctx.actor_faction)?
                .characters
                .iter()
                .filter(|c| !c.is_alive())
                .map(|c| c.id.clone())
                .collect()),
            TargetScope::All => Ok(state.living().map(|c| c.id.clone()).collect()),
            TargetScope::TriggerSource => {
                let source = ctx.trigger.as_ref().and_then(Event::source);
                living(source.map(std::slice::from_ref).unwrap_or_default())
            }
            TargetScope::TriggerTargets => {
                let targets = ctx.trigger.as_ref().map(Event::targets).unwrap_or_default();
                living(targets)
            }
        }
    }

    fn target(
        &self,
        scope: &mut TurnScope<'_>,
        ctx: &CombatContext,
        determination: Determination,
    ) -> Result<Selection, CombatError> {
        let Determination { candidates, max } = determination;
        let allegiance = scope.state.require_faction(&ctx.actor_faction)?.allegiance;

        let selected = if self.targeting.mode == TargetMode::Manual
            && allegiance == Allegiance::Player
        {
            let request = TargetRequest {
                actor: ctx.actor.clone(),
                skill: self.id.clone(),
                candidates,
            };
            match scope.targeter.request_target(&request) {
                Some(choice) if request.candidates.contains(&choice) => vec![choice],
                Some(choice) => {
                    warn!(
                        target: "battle::skill",
                        skill = %self.id,
                        %choice,
                        "manual choice is not a candidate, skipping"
                    );
                    return Ok(Selection::Cancelled);
                }
                None => return Ok(Selection::Cancelled),
            }
        } else {
            let strategy = self
                .targeting
                .strategy
                .unwrap_or(scope.config.default_strategy);
            select_targets(strategy, candidates, max, scope.state, scope.rng)
        };

        let resolved = scope.emit(Event::TargetsResolved {
            skill: self.id.clone(),
            actor: ctx.actor.clone(),
            kind: TargetKind::classify(&ctx.actor, &selected),
            targets: selected,
            dice: ctx.dice,
        })?;

        let targets = resolved.targets().to_vec();
        debug!(target: "battle::skill", skill = %self.id, targets = ?targets, "targets resolved");
        if targets.is_empty() {
            Ok(Selection::Cancelled)
        } else {
            Ok(Selection::Chosen(targets))
        }
    }

    fn execute(
        &self,
        scope: &mut TurnScope<'_>,
        ctx: &mut CombatContext,
        targets: &[CharacterId],
    ) -> Result<SkillOutcome, CombatError> {
        let outcome = match &self.effect {
            SkillEffect::Generated(spec) => generated::execute(self, spec, scope, ctx, targets)?,
            SkillEffect::Scripted(script) => scripted::execute(self, *script, scope, ctx, targets)?,
        };
        if self.condition.once {
            scope.state.memory.mark_used_once(&self.id);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::bus::Topic;
    use crate::context::{CombatMode, ContextExtras, TargetRequester};
    use crate::skill::{
        Condition, DiceRule, EffectSpec, MaxTargets, SkillCategory, Targeting,
    };
    use crate::state::FactionId;
    use crate::testing::{Recorder, ScopeFixture, id};

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

    fn ctx(fixture: &ScopeFixture, actor: &str) -> CombatContext {
        CombatContext::build(
            &fixture.state,
            &fixture.active,
            &id(actor),
            fixture.dice,
            ContextExtras::default(),
        )
        .unwrap()
    }

    /// Counts requests and answers with a fixed choice.
    struct CountingTargeter {
        calls: Arc<AtomicUsize>,
        answer: Option<CharacterId>,
    }

    impl TargetRequester for CountingTargeter {
        fn request_target(&mut self, _request: &TargetRequest) -> Option<CharacterId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn active_skill_damages_and_logs() {
        let mut fixture = ScopeFixture::new();
        let mut ctx = ctx(&fixture, "a");
        let mut scope = fixture.scope();

        let outcome = fireball().perform(&mut scope, &mut ctx).unwrap().unwrap();
        drop(scope);

        assert_eq!(outcome.log, "Fireball: Dealt 4 DMG.");
        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 6);
    }

    #[test]
    fn inactive_skill_never_targets_or_executes() {
        let mut fixture = ScopeFixture::new();
        fixture.dice = 5;
        let calls = Arc::new(AtomicUsize::new(0));
        fixture.targeter = Box::new(CountingTargeter {
            calls: Arc::clone(&calls),
            answer: Some(id("e")),
        });
        let recorder = Recorder::attach(
            &fixture.bus,
            &[Topic::DETERMINING, Topic::TARGETING, Topic::CAUSING_DAMAGE],
        );
        let skill = fireball().with_targeting(Targeting::default().manual());
        let mut ctx = ctx(&fixture, "a");

        let mut scope = fixture.scope();
        assert!(skill.perform(&mut scope, &mut ctx).unwrap().is_none());
        drop(scope);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(recorder.topics(), vec![Topic::DETERMINING]);
        assert_eq!(
            recorder.events()[0],
            Event::SkillDetermined {
                skill: "fireball".into(),
                actor: id("a"),
                active: false
            }
        );
        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 10);
    }

    #[test]
    fn category_mismatch_determines_inactive() {
        let mut fixture = ScopeFixture::new();
        let recorder = Recorder::attach(&fixture.bus, &[Topic::DETERMINING, Topic::TARGETING]);
        let mut ctx = ctx(&fixture, "e");
        assert_eq!(ctx.mode, CombatMode::Defensive);

        let mut scope = fixture.scope();
        assert!(fireball().perform(&mut scope, &mut ctx).unwrap().is_none());
        drop(scope);

        assert_eq!(
            recorder.events(),
            vec![Event::SkillDetermined {
                skill: "fireball".into(),
                actor: id("e"),
                active: false
            }]
        );
        assert_eq!(fixture.state.memory.turn_count(&"fireball".into()), 0);
    }

    #[test]
    fn manual_cancel_skips_without_changes() {
        let mut fixture = ScopeFixture::new();
        let before = fixture.state.clone();
        let skill = fireball().with_targeting(Targeting::default().manual());
        let mut ctx = ctx(&fixture, "a");

        let mut scope = fixture.scope();
        let outcome = skill.perform(&mut scope, &mut ctx).unwrap().unwrap();
        drop(scope);

        assert_eq!(outcome.log, "A skipped Fireball.");
        assert!(outcome.skipped);
        for character in before.characters() {
            let after = fixture.state.character(&character.id).unwrap();
            assert_eq!(after.hp, character.hp);
            assert_eq!(after.speed, character.speed);
            assert_eq!(after.defense, character.defense);
        }
        // The cancelled invocation still consumed its slot.
        assert_eq!(fixture.state.memory.turn_count(&"fireball".into()), 1);
    }

    #[test]
    fn manual_choice_is_used_for_player_factions() {
        let mut fixture = ScopeFixture::new();
        fixture.state.faction_mut(&FactionId::new("f2")).unwrap().add_character(
            crate::state::Character::new("g", "G", 6, 1),
        );
        fixture.targeter = Box::new(CountingTargeter {
            calls: Arc::new(AtomicUsize::new(0)),
            answer: Some(id("g")),
        });
        let skill = fireball().with_targeting(Targeting::default().manual());
        let mut ctx = ctx(&fixture, "a");

        let mut scope = fixture.scope();
        skill.perform(&mut scope, &mut ctx).unwrap();
        drop(scope);

        assert_eq!(fixture.state.character(&id("g")).unwrap().hp, 2);
        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 10);
    }

    #[test]
    fn per_turn_cap_blocks_second_invocation() {
        let mut fixture = ScopeFixture::new();
        let skill = fireball();
        let mut ctx = ctx(&fixture, "a");

        let mut scope = fixture.scope();
        assert!(skill.perform(&mut scope, &mut ctx).unwrap().is_some());
        assert!(skill.perform(&mut scope, &mut ctx).unwrap().is_none());
        drop(scope);

        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 6);
    }

    #[test]
    fn selection_respects_max_targets() {
        let mut fixture = ScopeFixture::new();
        for (name, hp) in [("g", 4), ("h", 2)] {
            fixture
                .state
                .faction_mut(&FactionId::new("f2"))
                .unwrap()
                .add_character(crate::state::Character::new(name, name.to_uppercase(), 9, 1).with_hp(hp));
        }
        let skill = Skill::new(
            "volley",
            "Volley",
            SkillCategory::Offensive,
            SkillEffect::Generated(EffectSpec::damage(1)),
        )
        .with_targeting(Targeting::default().with_max(MaxTargets::Fixed(2)));
        let recorder = Recorder::attach(&fixture.bus, &[Topic::TARGETING]);
        let mut ctx = ctx(&fixture, "a");

        let mut scope = fixture.scope();
        skill.perform(&mut scope, &mut ctx).unwrap();
        drop(scope);

        assert_eq!(recorder.events()[0].targets(), &[id("h"), id("g")]);
    }

    #[test]
    fn emptied_targets_turn_into_a_skip() {
        struct Cancel;
        impl crate::bus::EventHandler for Cancel {
            fn name(&self) -> &str {
                "cancel"
            }
            fn handle(
                &self,
                _scope: &mut TurnScope<'_>,
                event: &mut Event,
            ) -> Result<(), CombatError> {
                if let Some(targets) = event.targets_mut() {
                    targets.clear();
                }
                Ok(())
            }
        }

        let mut fixture = ScopeFixture::new();
        fixture.bus.on(Topic::TARGETING, Arc::new(Cancel));
        let mut ctx = ctx(&fixture, "a");

        let mut scope = fixture.scope();
        let outcome = fireball().perform(&mut scope, &mut ctx).unwrap().unwrap();
        drop(scope);

        assert_eq!(outcome.log, "A skipped Fireball.");
        assert_eq!(fixture.state.character(&id("e")).unwrap().hp, 10);
    }

    #[test]
    fn history_match_reads_committed_rolls() {
        let mut fixture = ScopeFixture::new();
        fixture.dice = 3;
        let skill = Skill::new(
            "holy_aura",
            "Holy Aura",
            SkillCategory::Both,
            SkillEffect::Generated(EffectSpec::heal(999)),
        )
        .with_condition(Condition {
            history_match: true,
            ..Condition::default()
        })
        .with_targeting(Targeting::scoped(TargetScope::Allies));
        fixture.state.character_mut(&id("b")).unwrap().hp = 1;
        let mut ctx = ctx(&fixture, "a");

        {
            let mut scope = fixture.scope();
            assert!(skill.perform(&mut scope, &mut ctx).unwrap().is_none());
        }

        fixture.state.history.push(3);
        let mut scope = fixture.scope();
        let outcome = skill.perform(&mut scope, &mut ctx).unwrap().unwrap();
        drop(scope);

        assert_eq!(outcome.log, "Holy Aura: Healed 4.");
        assert_eq!(fixture.state.character(&id("b")).unwrap().hp, 5);
    }

    #[test]
    fn dead_ally_scope_finds_the_fallen() {
        let mut fixture = ScopeFixture::new();
        fixture.state.character_mut(&id("b")).unwrap().hp = 0;
        let skill = Skill::new(
            "resurrect",
            "Resurrect",
            SkillCategory::Offensive,
            SkillEffect::Generated(EffectSpec {
                revive: true,
                ..EffectSpec::default()
            }),
        )
        .with_targeting(Targeting::scoped(TargetScope::DeadAllies));
        let ctx = ctx(&fixture, "a");

        assert_eq!(skill.candidates(&fixture.state, &ctx).unwrap(), vec![id("b")]);
    }
}
