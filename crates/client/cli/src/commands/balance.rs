//! Seed sweeps over faction pairings.

use anyhow::Result;
use battle_core::FactionId;
use battle_runtime::{FirstCandidateProvider, SeededDice, SimulationReport, simulate_battle};
use clap::Parser;
use console::style;
use tracing::info;

use crate::content::ContentArgs;

/// Sweep seeds over faction pairings
#[derive(Parser)]
pub struct Balance {
    #[command(flatten)]
    content: ContentArgs,

    /// Faction whose win rate is measured
    #[arg(long, value_name = "FACTION", default_value = "expedition")]
    heroes: FactionId,

    /// Opponents to test against (defaults to every computer faction)
    #[arg(long, value_name = "FACTION", value_delimiter = ',')]
    enemies: Vec<FactionId>,

    /// Battles per pairing
    #[arg(short, long, default_value_t = 100)]
    runs: u64,

    /// First seed of the sweep
    #[arg(long, default_value_t = 0)]
    start_seed: u64,
}

impl Balance {
    pub async fn execute(self) -> Result<()> {
        let content = self.content.load()?;
        let enemies = if self.enemies.is_empty() {
            content
                .computer_factions()
                .into_iter()
                .filter(|f| *f != self.heroes)
                .collect()
        } else {
            self.enemies.clone()
        };
        if enemies.is_empty() {
            anyhow::bail!("No opponents to balance '{}' against", self.heroes);
        }

        println!(
            "{} {} over {} seeds from {}",
            style("Balance:").bold().cyan(),
            self.heroes,
            self.runs,
            self.start_seed
        );
        println!(
            "  {:<16} {:>7} {:>6} {:>6} {:>6} {:>8}",
            "opponent", "win %", "wins", "losses", "draws", "rounds"
        );

        for enemy in &enemies {
            let roster = content.assemble(&[self.heroes.clone(), enemy.clone()])?;
            let mut tally = Tally::default();
            for seed in self.start_seed..self.start_seed.saturating_add(self.runs) {
                let mut config = content.config.clone();
                config.battle.rng_seed = seed;
                let mut dice = SeededDice::new(seed);
                let report = simulate_battle(
                    content.registry.clone(),
                    roster.clone(),
                    &config,
                    &mut dice,
                    FirstCandidateProvider,
                )
                .await?;
                tally.record(&report, &self.heroes);
            }

            info!(
                target: "battle::runtime",
                opponent = %enemy,
                battles = tally.battles,
                wins = tally.wins,
                "pairing finished"
            );
            let rate = format!("{:>6.1}%", tally.win_rate() * 100.0);
            let rate = if tally.win_rate() >= 0.5 {
                style(rate).green()
            } else {
                style(rate).red()
            };
            println!(
                "  {:<16} {} {:>6} {:>6} {:>6} {:>8.1}",
                enemy.as_str(),
                rate,
                tally.wins,
                tally.losses,
                tally.draws,
                tally.average_rounds()
            );
        }
        Ok(())
    }
}

/// Outcome counts for one pairing.
#[derive(Debug, Default, PartialEq)]
struct Tally {
    battles: u64,
    wins: u64,
    losses: u64,
    draws: u64,
    rounds: u64,
}

impl Tally {
    fn record(&mut self, report: &SimulationReport, heroes: &FactionId) {
        self.battles += 1;
        self.rounds += u64::from(report.rounds);
        match &report.winner {
            Some(winner) if winner == heroes => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }

    fn win_rate(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.wins as f64 / self.battles as f64
    }

    fn average_rounds(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.rounds as f64 / self.battles as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(winner: Option<&str>, rounds: u32) -> SimulationReport {
        SimulationReport {
            rounds,
            winner: winner.map(FactionId::new),
            ..SimulationReport::default()
        }
    }

    #[test]
    fn tally_splits_outcomes() {
        let heroes = FactionId::new("expedition");
        let mut tally = Tally::default();
        tally.record(&report(Some("expedition"), 4), &heroes);
        tally.record(&report(Some("rebels"), 6), &heroes);
        tally.record(&report(None, 50), &heroes);
        tally.record(&report(Some("expedition"), 8), &heroes);

        assert_eq!(
            tally,
            Tally {
                battles: 4,
                wins: 2,
                losses: 1,
                draws: 1,
                rounds: 68,
            }
        );
        assert_eq!(tally.win_rate(), 0.5);
        assert_eq!(tally.average_rounds(), 17.0);
    }

    #[test]
    fn empty_tally_has_no_rate() {
        let tally = Tally::default();
        assert_eq!(tally.win_rate(), 0.0);
        assert_eq!(tally.average_rounds(), 0.0);
    }
}
