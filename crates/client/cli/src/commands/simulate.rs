//! Play a single battle and print what happened.

use anyhow::Result;
use battle_core::{BattleState, FactionId};
use battle_runtime::{FirstCandidateProvider, SeededDice, SimulationReport, simulate_battle};
use clap::Parser;
use console::style;

use crate::content::ContentArgs;
use crate::prompt::PromptProvider;

/// Play one battle
#[derive(Parser)]
pub struct Simulate {
    #[command(flatten)]
    content: ContentArgs,

    /// Faction that moves first
    #[arg(long, value_name = "FACTION", default_value = "expedition")]
    heroes: FactionId,

    /// Opposing factions, in turn order
    #[arg(
        long,
        value_name = "FACTION",
        value_delimiter = ',',
        default_value = "rebels"
    )]
    enemies: Vec<FactionId>,

    /// Seed for the dice and in-battle randomness (overrides BATTLE_SEED)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Round cap (overrides BATTLE_MAX_ROUNDS)
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Prompt for manual targets instead of taking the first candidate
    #[arg(short, long)]
    interactive: bool,
}

impl Simulate {
    pub async fn execute(self) -> Result<()> {
        let content = self.content.load()?;
        let mut config = content.config.clone();
        if let Some(seed) = self.seed {
            config.battle.rng_seed = seed;
        }
        if let Some(max_rounds) = self.max_rounds {
            config.max_rounds = max_rounds.max(1);
        }

        let mut order = vec![self.heroes.clone()];
        order.extend(self.enemies.iter().cloned());
        let roster = content.assemble(&order)?;

        println!(
            "{} {} (seed {})",
            style("Battle:").bold().cyan(),
            order
                .iter()
                .map(FactionId::as_str)
                .collect::<Vec<_>>()
                .join(" vs "),
            config.battle.rng_seed
        );
        print_roster(&roster);

        let mut dice = SeededDice::new(config.battle.rng_seed);
        let registry = content.registry.clone();
        let report = if self.interactive {
            let prompt = PromptProvider::new(&roster);
            simulate_battle(registry, roster, &config, &mut dice, prompt).await?
        } else {
            simulate_battle(registry, roster, &config, &mut dice, FirstCandidateProvider).await?
        };

        print_report(&report);
        Ok(())
    }
}

fn print_roster(state: &BattleState) {
    for faction in &state.factions {
        println!(
            "  {} ({})",
            style(&faction.name).bold(),
            faction.allegiance
        );
        for character in &faction.characters {
            println!(
                "    {} - HP: {}/{}, Speed: {}",
                character.name, character.hp, character.max_hp, character.speed
            );
        }
    }
    println!();
}

fn print_report(report: &SimulationReport) {
    println!("{}", style("=== Battle Log ===").bold().green());
    for line in &report.log {
        println!("  {line}");
    }
    println!();

    println!("{}", style("Survivors:").bold().yellow());
    for character in report.final_state.living() {
        println!(
            "  {} - HP: {}/{}",
            character.name, character.hp, character.max_hp
        );
    }
    println!();

    println!("{}", style("Damage Dealt:").bold().yellow());
    for (faction, amount) in &report.damage {
        println!("  {faction}: {amount}");
    }
    println!();

    let outcome = match &report.winner {
        Some(winner) => style(format!("{winner} wins")).bold().green(),
        None => style("No winner".to_owned()).bold().red(),
    };
    println!(
        "{} after {} rounds ({} turns)",
        outcome, report.rounds, report.turns
    );
}
