//! # Error Types
//!
//! Domain-specific error types for autorent-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  autorent-core errors (this file)                                      │
//! │  ├── CoreError        - Lifecycle rule violations                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  autorent-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  autorent-engine errors                                                │
//! │  └── RentalError      - What the caller sees (NotFound, Conflict, ...) │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RentalError → HTTP layer          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::lifecycle::RentalAction;
use crate::types::RentalStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The rental's current status does not allow the requested action.
    ///
    /// ## When This Occurs
    /// - Paying a rental that is already active
    /// - Finishing a rental that was never paid
    /// - Any action on a completed or cancelled rental
    #[error("cannot {action} a rental that is {from}")]
    InvalidTransition {
        from: RentalStatus,
        action: RentalAction,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A timestamp lies before "now".
    #[error("{field} cannot be in the past")]
    InPast { field: String },

    /// The end of an interval is not after its start.
    #[error("end must be after start")]
    EmptyInterval,

    /// The interval is shorter than the minimum rental.
    #[error("minimum rental duration is {min_minutes} minutes")]
    TooShort { min_minutes: i64 },

    /// A number outside its allowed range.
    #[error("{field} is out of range")]
    OutOfRange { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_message() {
        let err = CoreError::InvalidTransition {
            from: RentalStatus::Completed,
            action: RentalAction::Finish,
        };
        assert_eq!(err.to_string(), "cannot finish a rental that is completed");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooShort { min_minutes: 60 };
        assert_eq!(err.to_string(), "minimum rental duration is 60 minutes");

        let err = ValidationError::InPast {
            field: "start".to_string(),
        };
        assert_eq!(err.to_string(), "start cannot be in the past");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyInterval.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
