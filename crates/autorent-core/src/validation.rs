//! # Validation Module
//!
//! Input validation that runs before the engine opens an atomic unit.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (outside this workspace)                          │
//! │  └── JSON decoding, authentication                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine (Rust)                                                │
//! │  └── THIS MODULE: ids, booking windows, amounts                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (balance >= 0, price > 0, end > start)          │
//! │  ├── Partial UNIQUE indexes (one live rental per car)                  │
//! │  └── Triggers (ledger is append-only)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::window::BookingWindow;
use crate::{MAX_RATING, MIN_RENTAL_MINUTES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a booking request against `now`.
///
/// ## Rules
/// - `start` must not be before `now`
/// - `end` must be after `start`
/// - the window must last at least [`MIN_RENTAL_MINUTES`]
///
/// ## Example
/// ```rust
/// use autorent_core::validation::validate_booking_request;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let start = now + Duration::hours(1);
/// assert!(validate_booking_request(now, start, start + Duration::hours(1)).is_ok());
/// assert!(validate_booking_request(now, start, start + Duration::minutes(59)).is_err());
/// ```
pub fn validate_booking_request(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ValidationResult<BookingWindow> {
    if start < now {
        return Err(ValidationError::InPast {
            field: "start".to_string(),
        });
    }

    let window = BookingWindow::new(start, end)?;

    if window.duration() < Duration::minutes(MIN_RENTAL_MINUTES) {
        return Err(ValidationError::TooShort {
            min_minutes: MIN_RENTAL_MINUTES,
        });
    }

    Ok(window)
}

/// Validates a computed rental price (must be > 0).
pub fn validate_total_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "total price".to_string(),
        });
    }

    Ok(())
}

/// Validates a top-up amount (must be > 0).
pub fn validate_topup_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a user or car rating: 0 (unrated) up to [`MAX_RATING`].
pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
        });
    }

    Ok(())
}

/// Validates an entity identifier (UUID).
///
/// ## Example
/// ```rust
/// use autorent_core::validation::validate_id;
///
/// assert!(validate_id("car_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("car_id", "not-a-uuid").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
