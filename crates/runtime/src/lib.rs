//! Async orchestration for dice-driven battles.
//!
//! This crate wraps the synchronous `battle-core` engine for async callers:
//! - [`session`] runs one battle, one turn at a time, on the blocking pool
//! - [`choice`] carries manual-target requests to the session owner and back
//! - [`forwarder`] mirrors bus events onto a broadcast presentation stream
//! - [`dice`] supplies the per-turn dice
//! - [`simulate`] plays whole battles unattended for balance checks
pub mod choice;
pub mod config;
pub mod dice;
pub mod error;
pub mod forwarder;
pub mod session;
pub mod simulate;

pub use choice::{
    ChannelTargeter, ChoiceProvider, FirstCandidateProvider, PendingChoice, serve_choices,
};
pub use config::RuntimeConfig;
pub use dice::{DiceSource, FixedDice, SeededDice};
pub use error::{Result, RuntimeError};
pub use forwarder::{EventForwarder, PRESENTATION_TOPICS, SessionEvent};
pub use session::{BattleHandle, BattleSession};
pub use simulate::{SimulationReport, simulate_battle};
