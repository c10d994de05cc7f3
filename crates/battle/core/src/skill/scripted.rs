use rand::seq::SliceRandom;

use crate::context::CombatContext;
use crate::effect::apply_damage;
use crate::error::CombatError;
use crate::scope::{SkillOutcome, TurnScope};
use crate::state::CharacterId;

use super::{ScriptedSkill, Skill};

pub(super) fn execute(
    skill: &Skill,
    script: ScriptedSkill,
    scope: &mut TurnScope<'_>,
    ctx: &mut CombatContext,
    targets: &[CharacterId],
) -> Result<SkillOutcome, CombatError> {
    let log = match script {
        ScriptedSkill::MultiAttack => multi_attack(scope, ctx, targets)?,
        ScriptedSkill::Desperation => desperation(scope, ctx, targets)?,
        ScriptedSkill::DragonBreath => dragon_breath(scope, ctx, targets)?,
    };
    Ok(SkillOutcome::new(format!("{}: {log}", skill.name)))
}

fn name_of(scope: &TurnScope<'_>, id: &CharacterId) -> Result<String, CombatError> {
    Ok(scope.state.require(id)?.name.clone())
}

fn multi_attack(
    scope: &mut TurnScope<'_>,
    ctx: &CombatContext,
    targets: &[CharacterId],
) -> Result<String, CombatError> {
    let Some((first, rest)) = targets.split_first() else {
        return Ok(String::new());
    };
    let report = apply_damage(scope, &ctx.actor, std::slice::from_ref(first), 1, false)?;
    let mut log = format!("{} takes {} DMG.", name_of(scope, first)?, report.amount);

    if ctx.dice <= 3
        && let Some(second) = rest.first()
    {
        let report = apply_damage(scope, &ctx.actor, std::slice::from_ref(second), 2, false)?;
        log.push_str(&format!(" Frenzy on {} for {} DMG!", name_of(scope, second)?, report.amount));
    }
    Ok(log)
}

fn desperation(
    scope: &mut TurnScope<'_>,
    ctx: &CombatContext,
    targets: &[CharacterId],
) -> Result<String, CombatError> {
    let Some(target) = targets.first() else {
        return Ok(String::new());
    };
    let dealt = apply_damage(scope, &ctx.actor, std::slice::from_ref(target), 1, false)?;
    let recoil = apply_damage(scope, &ctx.actor, std::slice::from_ref(&ctx.actor), 1, false)?;
    Ok(format!(
        "{} DMG to {}, {} DMG to self.",
        dealt.amount,
        name_of(scope, target)?,
        recoil.amount
    ))
}

fn dragon_breath(
    scope: &mut TurnScope<'_>,
    ctx: &CombatContext,
    targets: &[CharacterId],
) -> Result<String, CombatError> {
    if ctx.dice == 6 {
        let report = apply_damage(scope, &ctx.actor, targets, 2, false)?;
        return Ok(format!("{} DMG to ALL!", report.amount));
    }

    let Some(target) = targets.choose(&mut *scope.rng).cloned() else {
        return Ok(String::new());
    };
    let report = apply_damage(scope, &ctx.actor, std::slice::from_ref(&target), 2, false)?;
    Ok(format!("bites {} for {} DMG.", name_of(scope, &target)?, report.amount))
}
