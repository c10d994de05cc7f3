use std::sync::Arc;

use battle_content::{ContentFactory, EquipmentCatalog};
use battle_core::{
    Allegiance, BattleState, Character, EffectSpec, Faction, FactionId, Skill, SkillCategory,
    SkillEffect, SkillRegistry, TargetScope, Targeting,
};
use battle_runtime::{
    FirstCandidateProvider, FixedDice, RuntimeConfig, SeededDice, SimulationReport, simulate_battle,
};

fn faction_ids(names: &[&str]) -> Vec<FactionId> {
    names.iter().map(|n| FactionId::new(*n)).collect()
}

async fn run_builtin(enemy: &str, seed: u64, max_rounds: u32) -> SimulationReport {
    let content = ContentFactory::embedded();
    let registry = Arc::new(content.load_skills().unwrap());
    let roster = content
        .load_rosters()
        .unwrap()
        .assemble(&faction_ids(&["expedition", enemy]), &EquipmentCatalog::builtin())
        .unwrap();

    let mut config = RuntimeConfig::new(content.load_config().unwrap());
    config.battle.rng_seed = seed;
    config.max_rounds = max_rounds;

    let mut dice = SeededDice::new(seed);
    simulate_battle(registry, roster, &config, &mut dice, FirstCandidateProvider)
        .await
        .unwrap()
}

#[tokio::test]
async fn builtin_battle_stays_within_bounds() {
    let report = run_builtin("rebels", 7, RuntimeConfig::DEFAULT_MAX_ROUNDS).await;

    assert!(report.rounds >= 1 && report.rounds <= RuntimeConfig::DEFAULT_MAX_ROUNDS);
    assert!(report.turns >= report.rounds);
    for character in report.final_state.characters() {
        assert!(character.hp <= character.max_hp, "{} overhealed", character.id);
    }

    let standing: Vec<&FactionId> = report
        .final_state
        .standing_factions()
        .map(|f| &f.id)
        .collect();
    match &report.winner {
        Some(winner) => assert_eq!(standing, [winner]),
        None => assert_ne!(standing.len(), 1),
    }
}

#[tokio::test]
async fn same_seed_replays_the_same_battle() {
    let first = run_builtin("dragon_lair", 42, RuntimeConfig::DEFAULT_MAX_ROUNDS).await;
    let second = run_builtin("dragon_lair", 42, RuntimeConfig::DEFAULT_MAX_ROUNDS).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn round_cap_stops_the_battle() {
    let report = run_builtin("dragon_lair", 3, 1).await;
    assert_eq!(report.rounds, 1);
    assert!(report.turns <= 3);
}

#[tokio::test]
async fn reroll_grants_one_bonus_turn() {
    let rewind = Skill::new(
        "rewind",
        "Rewind",
        SkillCategory::Offensive,
        SkillEffect::Generated(EffectSpec {
            reroll: true,
            ..EffectSpec::default()
        }),
    )
    .with_targeting(Targeting::scoped(TargetScope::SelfOnly));
    let registry = Arc::new(SkillRegistry::new([rewind]));
    let roster = BattleState::new(vec![
        Faction::new(
            "mages",
            Allegiance::Computer,
            "Mages",
            vec![Character::new("mage", "Mage", 4, 6).with_skills(["rewind"])],
        ),
        Faction::new(
            "statues",
            Allegiance::Computer,
            "Statues",
            vec![Character::new("statue", "Statue", 9, 1)],
        ),
    ]);

    let mut config = RuntimeConfig::default();
    config.max_rounds = 2;
    let mut dice = FixedDice::new([3]);
    let report = simulate_battle(registry, roster, &config, &mut dice, FirstCandidateProvider)
        .await
        .unwrap();

    assert_eq!(report.rounds, 2);
    // Two mage turns plus one statue turn per round.
    assert_eq!(report.turns, 6);
    assert_eq!(report.winner, None);
    assert_eq!(
        report.log.iter().filter(|line| line.contains("Reroll Requested")).count(),
        4
    );
    assert!(report.damage.is_empty());
}

#[tokio::test]
async fn damage_is_credited_to_the_attacking_faction() {
    let strike = Skill::new(
        "strike",
        "Strike",
        SkillCategory::Offensive,
        SkillEffect::Generated(EffectSpec::damage(2)),
    );
    let registry = Arc::new(SkillRegistry::new([strike]));
    let roster = BattleState::new(vec![
        Faction::new(
            "wolves",
            Allegiance::Computer,
            "Wolves",
            vec![Character::new("wolf", "Wolf", 10, 6).with_skills(["strike"])],
        ),
        Faction::new(
            "sheep",
            Allegiance::Computer,
            "Sheep",
            vec![Character::new("sheep", "Sheep", 4, 1)],
        ),
    ]);

    let mut dice = FixedDice::new([4]);
    let report = simulate_battle(
        registry,
        roster,
        &RuntimeConfig::default(),
        &mut dice,
        FirstCandidateProvider,
    )
    .await
    .unwrap();

    assert_eq!(report.winner, Some(FactionId::new("wolves")));
    assert_eq!(report.rounds, 2);
    assert_eq!(report.damage.get(&FactionId::new("wolves")), Some(&4));
    assert_eq!(report.damage.get(&FactionId::new("sheep")), None);
}
