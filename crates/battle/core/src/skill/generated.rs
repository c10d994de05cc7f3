//! Execution of declarative effect specs.
use crate::context::CombatContext;
use crate::effect::{apply_damage, heal, modify_stat, revive};
use crate::error::CombatError;
use crate::scope::{Signal, SkillOutcome, TurnScope};
use crate::state::{CharacterId, Stat};

use super::{EffectSpec, Skill};

pub(super) fn execute(
    skill: &Skill,
    spec: &EffectSpec,
    scope: &mut TurnScope<'_>,
    ctx: &mut CombatContext,
    targets: &[CharacterId],
) -> Result<SkillOutcome, CombatError> {
    let mut parts: Vec<String> = Vec::new();
    let mut signal = None;

    if let Some(damage) = spec.damage {
        let amount = if damage.scale_with_dice {
            u32::from(ctx.dice)
        } else {
            damage.amount
        };
        let report = apply_damage(scope, &ctx.actor, targets, amount, damage.counter)?;
        parts.push(format!("Dealt {} DMG.", report.amount));
    }

    if let Some(amount) = spec.heal {
        let applied = heal(scope, &ctx.actor, targets, amount)?;
        parts.push(format!("Healed {applied}."));
    }

    if let Some(buff) = spec.buff {
        modify_stat(scope, targets, buff.stat, buff.amount)?;
        parts.push(format!("{} {:+}.", buff.stat, buff.amount));
    }

    if spec.revive {
        revive(scope, targets)?;
        parts.push("Revived!".to_owned());
    }

    if let Some(adjust) = spec.adjust_pending
        && let Some(amount) = ctx.trigger.as_mut().and_then(|e| e.pending_amount_mut())
    {
        let before = *amount;
        *amount = adjust.apply(before);
        parts.push(format!("Pending {before} -> {}.", *amount));
    }

    if spec.cancel_targets
        && let Some(pending) = ctx.trigger.as_mut().and_then(|e| e.targets_mut())
    {
        pending.clear();
        parts.push("Cancelled!".to_owned());
    }

    if let Some(delta) = spec.self_speed_if_first
        && ctx.is_first
    {
        let actor = ctx.actor.clone();
        modify_stat(scope, std::slice::from_ref(&actor), Stat::Speed, delta)?;
        parts.push(format!("speed {delta:+}."));
    }

    if spec.reroll {
        signal = Some(Signal::Reroll);
        parts.push("Rewinds time! (Reroll Requested)".to_owned());
    }

    Ok(SkillOutcome {
        log: format!("{}: {}", skill.name, parts.join(" ")),
        signal,
        skipped: false,
    })
}
