//! Common error infrastructure for battle-core.
//!
//! Most of what goes wrong during a turn is not an error at all: an inactive
//! skill, an empty candidate list, or a cancelled manual choice each resolve
//! to "no outcome" or a skipped outcome. What remains is classified here.
//!
//! # Severity Classification
//!
//! - **Recoverable**: a single handler or skill failed; the dispatch continues
//! - **Validation**: bad input from a boundary caller
//! - **Internal**: an engine limit was hit (e.g. passive nesting depth)
//! - **Fatal**: the battle graph is corrupt; the turn is aborted

use crate::state::{CharacterId, FactionId};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// A single handler failed. Other handlers and skills keep running.
    Recoverable,

    /// Invalid input from a boundary caller.
    Validation,

    /// Unexpected engine condition that indicates a bug or a runaway chain.
    Internal,

    /// Battle state invariant violated, the turn cannot be committed.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }

    /// Returns true if this error must abort the surrounding turn.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all battle errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while resolving a turn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// A character id resolved to nothing in the battle graph.
    #[error("character {0} is not part of this battle")]
    UnknownCharacter(CharacterId),

    /// A faction id resolved to nothing in the battle graph.
    #[error("faction {0} is not part of this battle")]
    UnknownFaction(FactionId),

    /// An event handler, equipment item or skill effect failed.
    #[error("handler `{handler}` failed: {reason}")]
    HandlerFault { handler: String, reason: String },

    /// Passive dispatch nested deeper than the configured limit.
    #[error("passive dispatch on {topic} exceeded depth {depth}")]
    PassiveDepthExceeded { topic: String, depth: u32 },
}

impl CombatError {
    /// Convenience constructor for handler faults.
    pub fn handler_fault(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HandlerFault {
            handler: handler.into(),
            reason: reason.into(),
        }
    }
}

impl BattleError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCharacter(_) | Self::UnknownFaction(_) => ErrorSeverity::Fatal,
            Self::HandlerFault { .. } => ErrorSeverity::Recoverable,
            Self::PassiveDepthExceeded { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCharacter(_) => "UNKNOWN_CHARACTER",
            Self::UnknownFaction(_) => "UNKNOWN_FACTION",
            Self::HandlerFault { .. } => "HANDLER_FAULT",
            Self::PassiveDepthExceeded { .. } => "PASSIVE_DEPTH_EXCEEDED",
        }
    }
}
