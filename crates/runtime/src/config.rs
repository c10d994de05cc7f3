//! Runtime configuration and environment overrides.
use std::env;

use battle_core::BattleConfig;

/// Configuration shared by battle sessions and the simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Pending manual choices that may queue before the turn worker blocks.
    pub choice_buffer: usize,
    /// Presentation events kept for slow subscribers.
    pub event_buffer: usize,
    /// Round cap for automated battles.
    pub max_rounds: u32,
}

impl RuntimeConfig {
    pub const DEFAULT_CHOICE_BUFFER: usize = 8;
    pub const DEFAULT_EVENT_BUFFER: usize = 128;
    pub const DEFAULT_MAX_ROUNDS: u32 = 50;

    pub fn new(battle: BattleConfig) -> Self {
        Self {
            battle,
            choice_buffer: Self::DEFAULT_CHOICE_BUFFER,
            event_buffer: Self::DEFAULT_EVENT_BUFFER,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_SEED` - Seed for in-battle randomness (default: 0)
    /// - `BATTLE_MAX_ROUNDS` - Round cap for automated battles (default: 50)
    /// - `BATTLE_CHOICE_BUFFER` - Pending choice queue size (default: 8)
    /// - `BATTLE_EVENT_BUFFER` - Presentation event capacity (default: 128)
    /// - `BATTLE_MAX_PASSIVE_DEPTH` - Passive nesting limit (default: 4)
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Applies environment overrides on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Some(seed) = read_env::<u64>("BATTLE_SEED") {
            self.battle.rng_seed = seed;
        }
        if let Some(depth) = read_env::<u32>("BATTLE_MAX_PASSIVE_DEPTH") {
            self.battle.max_passive_depth = depth;
        }
        if let Some(rounds) = read_env::<u32>("BATTLE_MAX_ROUNDS") {
            self.max_rounds = rounds.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_CHOICE_BUFFER") {
            self.choice_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            self.event_buffer = capacity.max(1);
        }
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
