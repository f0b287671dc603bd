//! # Domain Types
//!
//! Core domain types used throughout AutoRent.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Car        │   │     Rental      │   │   LedgerEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  car_id (FK)    │◄──│  rental_id (FK?)│       │
//! │  │  category       │   │  user_id (FK)   │   │  user_id (FK)   │       │
//! │  │  status         │   │  start / end    │   │  kind, outcome  │       │
//! │  │  hourly_rate    │   │  total_price    │   │  amount_cents   │       │
//! │  └─────────────────┘   │  status         │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐                                                    │
//! │  │      User       │   CarStatus:    available | booked | maintenance  │
//! │  │  ─────────────  │   RentalStatus: pending | active |                │
//! │  │  balance_cents  │                 completed | cancelled             │
//! │  │  rating (0..5)  │   LedgerKind:   payment | topup                   │
//! │  └─────────────────┘   Outcome:      success | failed                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Car Status
//! `Car.status == Booked` exactly when the car has a rental in `Pending` or
//! `Active`. Once a rental exists the engine is the only writer of that field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::window::BookingWindow;

// =============================================================================
// Car Category
// =============================================================================

/// Fleet segment a car belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CarCategory {
    Economy,
    Business,
    Luxury,
}

impl CarCategory {
    /// All categories, in fleet order.
    pub const ALL: [CarCategory; 3] = [
        CarCategory::Economy,
        CarCategory::Business,
        CarCategory::Luxury,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CarCategory::Economy => "economy",
            CarCategory::Business => "business",
            CarCategory::Luxury => "luxury",
        }
    }
}

impl fmt::Display for CarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Car Status
// =============================================================================

/// Whether a car can currently be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CarStatus {
    /// No pending or active rental; open for booking.
    Available,
    /// Held by exactly one pending or active rental.
    Booked,
    /// Taken out of the fleet by an operator.
    Maintenance,
}

impl CarStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Booked => "booked",
            CarStatus::Maintenance => "maintenance",
        }
    }
}

impl Default for CarStatus {
    fn default() -> Self {
        CarStatus::Available
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rental Status
// =============================================================================

/// Lifecycle state of a rental.
///
/// See [`crate::lifecycle`] for the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    /// Booked, awaiting payment.
    Pending,
    /// Paid; the customer has the car.
    Active,
    /// Car returned. Terminal.
    Completed,
    /// Called off before the start time. Terminal.
    Cancelled,
}

impl RentalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Cancelled)
    }

    /// Whether a rental in this status keeps its car `Booked`.
    #[inline]
    pub const fn holds_car(&self) -> bool {
        matches!(self, RentalStatus::Pending | RentalStatus::Active)
    }

    /// The car status implied by a rental entering this status.
    #[inline]
    pub const fn implied_car_status(&self) -> CarStatus {
        if self.holds_car() {
            CarStatus::Booked
        } else {
            CarStatus::Available
        }
    }
}

impl Default for RentalStatus {
    fn default() -> Self {
        RentalStatus::Pending
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Role
// =============================================================================

/// Account role supplied by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Client,
    Corporate,
}

impl Role {
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
            Role::Corporate => "corporate",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

// =============================================================================
// Ledger Kind / Outcome
// =============================================================================

/// What moved money on a user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Balance debited to pay a rental.
    Payment,
    /// Balance credited by the user.
    Topup,
}

impl LedgerKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Payment => "payment",
            LedgerKind::Topup => "topup",
        }
    }
}

/// Whether the recorded movement actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOutcome {
    Success,
    /// Attempt was rejected; no balance changed.
    Failed,
}

impl LedgerOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerOutcome::Success => "success",
            LedgerOutcome::Failed => "failed",
        }
    }
}

// =============================================================================
// Car
// =============================================================================

/// A car in the rental fleet.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Car {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Manufacturer, e.g. "Toyota".
    pub make: String,

    /// Model name, e.g. "Corolla".
    pub model: String,

    pub category: CarCategory,

    /// Derived from the car's rentals; see module docs.
    pub status: CarStatus,

    /// Price per hour in cents (> 0).
    pub hourly_rate_cents: i64,

    /// Average customer rating, 0 when unrated.
    pub rating: f64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Returns the hourly rate as Money.
    #[inline]
    pub fn hourly_rate(&self) -> Money {
        Money::from_cents(self.hourly_rate_cents)
    }

    /// Only available cars accept new bookings.
    #[inline]
    pub fn is_bookable(&self) -> bool {
        self.status == CarStatus::Available
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered renter.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub display_name: String,

    pub role: Role,

    /// Internal ledger balance in cents. Never negative.
    pub balance_cents: i64,

    /// Driver rating in [0, 5]; 0 means unrated. Feeds the Pricing Engine.
    pub rating: f64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Rental
// =============================================================================

/// A booking of one car by one user over a half-open time window.
///
/// `total_price_cents` is computed once at creation and frozen: it is never
/// recalculated, even if the car's rate or the user's rating change later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rental {
    pub id: String,
    pub user_id: String,
    pub car_id: String,
    #[ts(as = "String")]
    pub start_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_at: DateTime<Utc>,
    pub total_price_cents: i64,
    pub status: RentalStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    /// Returns the frozen total price as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    /// Returns the booked interval.
    ///
    /// Rentals are only ever created from a validated window, so `end_at`
    /// is always after `start_at`.
    #[inline]
    pub fn window(&self) -> BookingWindow {
        BookingWindow::from_bounds(self.start_at, self.end_at)
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// Immutable record of a balance-affecting event.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,
    pub user_id: String,
    /// Set for payments; `None` for top-ups.
    pub rental_id: Option<String>,
    pub kind: LedgerKind,
    /// Always positive; direction follows from `kind`.
    pub amount_cents: i64,
    pub outcome: LedgerOutcome,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// A successful payment is the ledger side of a rental's pay transition.
    #[inline]
    pub fn is_settled_payment(&self) -> bool {
        self.kind == LedgerKind::Payment && self.outcome == LedgerOutcome::Success
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
