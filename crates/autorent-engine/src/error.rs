//! # Engine Error Type
//!
//! What a caller of [`RentalEngine`](crate::RentalEngine) sees when an
//! operation fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in AutoRent                               │
//! │                                                                         │
//! │  ValidationError ───────────────────────► RentalError::InvalidInput    │
//! │  (autorent-core)                                                        │
//! │                                                                         │
//! │  Transition table says no ──────────────► RentalError::InvalidState    │
//! │  Cancel at/after start ─────────────────► RentalError::TooLate         │
//! │  Car not available / overlap ───────────► RentalError::Conflict        │
//! │  Conditional debit touched zero rows ───► RentalError::InsufficientFunds│
//! │  can_act() == false ────────────────────► RentalError::Forbidden       │
//! │                                                                         │
//! │  DbError::NotFound ─────────────────────► RentalError::NotFound        │
//! │  any other DbError ── logged in full ───► RentalError::Internal        │
//! │                       (generic message, unit rolled back)              │
//! │                                                                         │
//! │  Only Internal is worth retrying: business rejections are              │
//! │  deterministic and no partial state is ever left behind.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use autorent_core::{CarStatus, Money, RentalAction, RentalStatus, ValidationError};
use autorent_db::DbError;

/// Why a booking request conflicts with the car's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The car is not `available` (already booked or in maintenance).
    CarUnavailable(CarStatus),
    /// A non-cancelled rental already covers part of the window.
    Overlap { rental_id: String },
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::CarUnavailable(status) => write!(f, "car is {status}"),
            ConflictReason::Overlap { rental_id } => {
                write!(f, "window overlaps rental {rental_id}")
            }
        }
    }
}

/// Engine operation errors.
#[derive(Debug, Error)]
pub enum RentalError {
    /// Rental, car or user missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The actor neither owns the rental nor is an admin.
    #[error("not allowed to act on rental {rental_id}")]
    Forbidden { rental_id: String },

    /// The rental's status has no edge for this action.
    #[error("cannot {action} rental {rental_id}: it is {status}")]
    InvalidState {
        rental_id: String,
        status: RentalStatus,
        action: RentalAction,
    },

    /// Cancellation requested at or after the rental's start.
    #[error("rental {rental_id} started at {start} and can no longer be cancelled")]
    TooLate {
        rental_id: String,
        start: DateTime<Utc>,
    },

    /// The car can't be booked for the requested window.
    #[error("car {car_id} cannot be booked: {reason}")]
    Conflict {
        car_id: String,
        reason: ConflictReason,
    },

    /// The user's balance doesn't cover the rental's price.
    #[error("insufficient balance for user {user_id}: {required} required")]
    InsufficientFunds { user_id: String, required: Money },

    /// Bad interval, amount or identifier.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Store or infrastructure fault. The message never carries store detail.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The caller-facing category of a [`RentalError`].
///
/// ## Suggested HTTP mapping
/// | Kind              | Status |
/// |-------------------|--------|
/// | NotFound          | 404    |
/// | Forbidden         | 403    |
/// | InvalidState      | 409    |
/// | Conflict          | 409    |
/// | InsufficientFunds | 402    |
/// | InvalidInput      | 400    |
/// | Internal          | 500    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    Conflict,
    InsufficientFunds,
    InvalidInput,
    Internal,
}

impl RentalError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        RentalError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RentalError::NotFound { .. } => ErrorKind::NotFound,
            RentalError::Forbidden { .. } => ErrorKind::Forbidden,
            RentalError::InvalidState { .. } | RentalError::TooLate { .. } => {
                ErrorKind::InvalidState
            }
            RentalError::Conflict { .. } => ErrorKind::Conflict,
            RentalError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            RentalError::InvalidInput(_) => ErrorKind::InvalidInput,
            RentalError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Business rejections are deterministic; only infrastructure faults
    /// may succeed on a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RentalError::Internal(_))
    }

    /// The serializable body the HTTP layer returns.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// Error payload for the HTTP layer.
///
/// ```json
/// { "kind": "INSUFFICIENT_FUNDS", "message": "insufficient balance ...", "retryable": false }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

/// Converts store errors to engine errors.
///
/// Detail is logged here and dropped from the returned value.
impl From<DbError> for RentalError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RentalError::NotFound { entity, id },
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                RentalError::Internal("store is busy".to_string())
            }
            other => {
                tracing::error!(error = %other, "Store operation failed");
                RentalError::Internal("store operation failed".to_string())
            }
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, RentalError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_late_is_invalid_state() {
        let err = RentalError::TooLate {
            rental_id: "r1".to_string(),
            start: Utc::now(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_detail_does_not_leak() {
        let err: RentalError = DbError::QueryFailed("no such column: secret_col".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.is_retryable());
        assert!(!err.to_string().contains("secret_col"));
    }

    #[test]
    fn test_store_not_found_passes_through() {
        let err: RentalError = DbError::not_found("Car", "c1").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Car not found: c1");
    }

    #[test]
    fn test_messages() {
        let err = RentalError::InvalidState {
            rental_id: "r1".to_string(),
            status: RentalStatus::Completed,
            action: RentalAction::Finish,
        };
        assert_eq!(err.to_string(), "cannot finish rental r1: it is completed");

        let err = RentalError::Conflict {
            car_id: "c1".to_string(),
            reason: ConflictReason::CarUnavailable(CarStatus::Maintenance),
        };
        assert_eq!(err.to_string(), "car c1 cannot be booked: car is maintenance");
    }

    #[test]
    fn test_error_body_wire_format() {
        let err = RentalError::InsufficientFunds {
            user_id: "u1".to_string(),
            required: Money::from_cents(2400),
        };
        let json = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(json["kind"], "INSUFFICIENT_FUNDS");
        assert_eq!(json["retryable"], false);
        assert_eq!(
            json["message"],
            "insufficient balance for user u1: $24.00 required"
        );
    }
}
