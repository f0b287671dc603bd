//! # autorent-core: Pure Business Logic for AutoRent
//!
//! This crate holds every rule of the rental booking and settlement engine
//! that can be expressed without touching a database or a clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AutoRent Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP layer / auth (outside this workspace)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            autorent-engine (state machine + ledger)             │   │
//! │  │     create_rental, pay_rental, finish_rental, cancel_rental     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ autorent-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────┐    │   │
//! │  │   │  types   │ │ pricing  │ │ lifecycle │ │  validation  │    │   │
//! │  │   │  Car     │ │ price()  │ │ pending → │ │ booking      │    │   │
//! │  │   │  Rental  │ │ RiskTier │ │ active →  │ │ windows      │    │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  autorent-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Car, User, Rental, LedgerEntry) and their status enums
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`window`] - Half-open booking windows and the overlap predicate
//! - [`pricing`] - The Pricing Engine
//! - [`lifecycle`] - Rental status transition table
//! - [`access`] - Who may act on a rental
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use autorent_core::money::Money;
//! use autorent_core::pricing::price;
//! use autorent_core::window::BookingWindow;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
//! let window = BookingWindow::new(start, start + Duration::hours(10)).unwrap();
//!
//! // $20/h for 10h, loyal customer (rating 5.0) gets 10% off
//! let total = price(Money::from_cents(2000), &window, 5.0);
//! assert_eq!(total.cents(), 18000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;
pub mod window;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{can_act, Actor};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::RentalAction;
pub use money::Money;
pub use types::*;
pub use window::BookingWindow;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shortest rental the engine accepts, in minutes.
pub const MIN_RENTAL_MINUTES: i64 = 60;

/// Highest rating a user or car can hold.
pub const MAX_RATING: f64 = 5.0;

/// Ratings strictly above this earn the loyalty discount.
pub const LOYALTY_RATING_THRESHOLD: f64 = 4.5;

/// Ratings strictly below this (and above zero) pay the risk surcharge.
pub const RISK_RATING_THRESHOLD: f64 = 2.0;
