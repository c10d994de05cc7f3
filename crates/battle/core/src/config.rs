use crate::skill::SelectionStrategy;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// How deep passive dispatch may nest before further triggers are skipped.
    /// A counter that triggers a counter that triggers a counter is depth 3.
    pub max_passive_depth: u32,

    /// Per-turn cap applied to skills that do not declare their own.
    pub default_limit_per_turn: u32,

    /// Selection strategy for skills that do not declare their own.
    pub default_strategy: SelectionStrategy,

    /// Seed for the battle RNG (random target selection, equipment procs).
    pub rng_seed: u64,
}

impl BattleConfig {
    pub const DEFAULT_MAX_PASSIVE_DEPTH: u32 = 4;
    pub const DEFAULT_LIMIT_PER_TURN: u32 = 1;

    /// Lowest and highest face of the shared turn dice.
    pub const DICE_MIN: u8 = 1;
    pub const DICE_MAX: u8 = 6;

    pub fn new() -> Self {
        Self {
            max_passive_depth: Self::DEFAULT_MAX_PASSIVE_DEPTH,
            default_limit_per_turn: Self::DEFAULT_LIMIT_PER_TURN,
            default_strategy: SelectionStrategy::LowestHp,
            rng_seed: 0,
        }
    }

    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
