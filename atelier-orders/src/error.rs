//! Save pipeline errors

use crate::rollback::RollbackOutcome;
use shared::ProviderError;
use std::fmt;
use thiserror::Error;

/// Phases of the persistence sequence that can fail.
///
/// Cache invalidation runs after the last phase but cannot fail, so it
/// has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Header,
    DetailWrites,
    DetailDeletes,
    TotalUpdate,
    PaymentWrites,
    PaymentDeletes,
    WorkshopWrites,
    WorkshopDeletes,
    RequirementSync,
}

impl fmt::Display for SavePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SavePhase::Header => "the order header write",
            SavePhase::DetailWrites => "detail line writes",
            SavePhase::DetailDeletes => "detail line deletes",
            SavePhase::TotalUpdate => "the order total update",
            SavePhase::PaymentWrites => "payment writes",
            SavePhase::PaymentDeletes => "payment deletes",
            SavePhase::WorkshopWrites => "workshop assignment writes",
            SavePhase::WorkshopDeletes => "workshop assignment deletes",
            SavePhase::RequirementSync => "resource requirement sync",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SaveError {
    /// The aggregate was rejected before anything was written
    #[error("Validation error: {0}")]
    Validation(String),

    /// A phase failed; the sequence stopped there
    #[error("Save failed during {phase}: {source}")]
    Phase {
        phase: SavePhase,
        /// What happened to a header this save created
        rollback: RollbackOutcome,
        source: ProviderError,
    },
}

impl SaveError {
    pub fn validation(message: impl Into<String>) -> Self {
        SaveError::Validation(message.into())
    }

    /// True when the underlying failure was a concurrent edit; the
    /// caller should reload the order and retry
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, SaveError::Phase { source, .. } if source.is_version_conflict())
    }

    pub fn phase(&self) -> Option<SavePhase> {
        match self {
            SaveError::Phase { phase, .. } => Some(*phase),
            SaveError::Validation(_) => None,
        }
    }
}

pub type SaveResult<T> = Result<T, SaveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Resource;

    #[test]
    fn test_version_conflict_detection() {
        let conflict = SaveError::Phase {
            phase: SavePhase::Header,
            rollback: RollbackOutcome::NotAttempted,
            source: ProviderError::version_conflict(Resource::Orders, 7),
        };
        assert!(conflict.is_version_conflict());
        assert_eq!(conflict.phase(), Some(SavePhase::Header));

        let network = SaveError::Phase {
            phase: SavePhase::PaymentWrites,
            rollback: RollbackOutcome::HeaderDeleted,
            source: ProviderError::network("timeout"),
        };
        assert!(!network.is_version_conflict());

        let validation = SaveError::validation("quantity must be positive");
        assert!(!validation.is_version_conflict());
        assert_eq!(validation.phase(), None);
    }

    #[test]
    fn test_phase_error_message_names_the_phase() {
        let error = SaveError::Phase {
            phase: SavePhase::DetailWrites,
            rollback: RollbackOutcome::NotAttempted,
            source: ProviderError::network("connection refused"),
        };
        let message = error.to_string();
        assert!(message.contains("detail line writes"));
        assert!(message.contains("connection refused"));
    }
}
