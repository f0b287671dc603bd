//! # Pricing Engine
//!
//! Turns a car's hourly rate, a booking window and the renter's rating into
//! the rental's total price.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  hours    = (end - start) as a real number (fractional hours allowed)  │
//! │  base     = rate × hours                                               │
//! │  modifier = 0.90  if rating > 4.5            (loyalty discount)        │
//! │             1.20  if 0 < rating < 2.0        (risk surcharge)          │
//! │             1.00  otherwise (0 = unrated, never penalised)             │
//! │  total    = round_half_up(base × modifier, cents)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exact Arithmetic
//! The whole product is evaluated as one integer fraction
//!
//! ```text
//!   rate_cents × duration_ms × modifier_pct
//!   ───────────────────────────────────────
//!           3_600_000 × 100
//! ```
//!
//! in `i128`, then rounded half-up once. No floating point touches money.

use crate::money::Money;
use crate::window::BookingWindow;
use crate::{LOYALTY_RATING_THRESHOLD, RISK_RATING_THRESHOLD};

const MILLIS_PER_HOUR: i128 = 3_600_000;
const PERCENT: i128 = 100;

/// Price band derived from the renter's rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    /// Rating above 4.5: 10% off.
    Loyal,
    /// Unrated, or between 2.0 and 4.5 inclusive.
    Standard,
    /// Rated, but below 2.0: 20% surcharge.
    Risky,
}

impl RiskTier {
    /// Classifies a rating. Zero means "unrated" and is never surcharged.
    pub fn for_rating(rating: f64) -> Self {
        if rating > LOYALTY_RATING_THRESHOLD {
            RiskTier::Loyal
        } else if rating > 0.0 && rating < RISK_RATING_THRESHOLD {
            RiskTier::Risky
        } else {
            RiskTier::Standard
        }
    }

    /// Multiplier in whole percent.
    #[inline]
    pub const fn modifier_percent(&self) -> i64 {
        match self {
            RiskTier::Loyal => 90,
            RiskTier::Standard => 100,
            RiskTier::Risky => 120,
        }
    }
}

/// Computes the total price of renting at `hourly_rate` over `window`.
///
/// Pure and deterministic. The caller guarantees `hourly_rate > 0`; the
/// window is non-empty by construction.
///
/// ## Example
/// ```rust
/// use autorent_core::money::Money;
/// use autorent_core::pricing::price;
/// use autorent_core::window::BookingWindow;
/// use chrono::{Duration, Utc};
///
/// let start = Utc::now();
/// let window = BookingWindow::new(start, start + Duration::hours(2)).unwrap();
///
/// // Risky driver (rating 1.0): $10/h × 2h × 1.20 = $24.00
/// assert_eq!(price(Money::from_cents(1000), &window, 1.0).cents(), 2400);
/// ```
pub fn price(hourly_rate: Money, window: &BookingWindow, requester_rating: f64) -> Money {
    let tier = RiskTier::for_rating(requester_rating);
    let duration_ms = i128::from(window.end_millis() - window.start_millis());

    let numerator =
        i128::from(hourly_rate.cents()) * duration_ms * i128::from(tier.modifier_percent());
    let denominator = MILLIS_PER_HOUR * PERCENT;

    let cents = round_half_up(numerator, denominator);
    Money::from_cents(i64::try_from(cents).unwrap_or(i64::MAX))
}

/// Integer division rounding halves away from zero.
fn round_half_up(numerator: i128, denominator: i128) -> i128 {
    if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        (numerator - denominator / 2) / denominator
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
