//! Engine error type.

use thiserror::Error;

use crate::types::ids::SessionId;

/// Failures inside the engine.
///
/// None of these reach the callers of the public input surface: each one is
/// logged where it is detected and the operation turns into a no-op (or, for
/// an orphaned session, a degraded in-place reset).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeterError {
    /// An audio sink could not resolve a sound.
    #[error("asset '{id}' could not be resolved")]
    MissingAsset {
        /// The sound that was requested.
        id: String,
    },

    /// A state change that is not legal from the current state.
    #[error("invalid transition: {reason}")]
    InvalidTransition {
        /// What was attempted.
        reason: &'static str,
    },

    /// A reset was triggered on a session that sits in no container.
    #[error("{session} has no live parent")]
    OrphanedSession {
        /// The session being reset.
        session: SessionId,
    },

    /// A scheduled callback outlived the session that scheduled it.
    #[error("callback for discarded {session}")]
    StaleCallback {
        /// The session the callback was scheduled for.
        session: SessionId,
    },

    /// A session was detached twice.
    #[error("{session} was already removed from its container")]
    TeardownRace {
        /// The session that was already gone.
        session: SessionId,
    },
}

impl MeterError {
    /// Build a [`MeterError::MissingAsset`].
    pub fn missing_asset(id: impl Into<String>) -> Self {
        MeterError::MissingAsset { id: id.into() }
    }

    pub(crate) fn invalid(reason: &'static str) -> Self {
        MeterError::InvalidTransition { reason }
    }
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, MeterError>;
