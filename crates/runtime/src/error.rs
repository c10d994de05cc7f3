//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the combat engine and from the blocking worker that
//! resolves turns so callers can bubble them up with consistent context.
use battle_core::{BattleError, CombatError, ErrorSeverity};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("turn worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    /// A previous turn worker panicked and took the engine with it.
    #[error("battle session is no longer usable")]
    SessionPoisoned,

    #[error("battle is already over")]
    BattleOver,
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Combat(err) => err.severity(),
            RuntimeError::WorkerJoin(_) | RuntimeError::SessionPoisoned => ErrorSeverity::Fatal,
            RuntimeError::BattleOver => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Combat(err) => err.error_code(),
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::SessionPoisoned => "RUNTIME_SESSION_POISONED",
            RuntimeError::BattleOver => "RUNTIME_BATTLE_OVER",
        }
    }
}
