//! # autorent-engine: Rental Booking and Settlement
//!
//! The state machine that books cars, settles payments and releases cars,
//! keeping car status, user balances and the ledger consistent under
//! concurrent requests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP layer (not in this workspace)                                    │
//! │       │  Actor { user_id, role } from the identity layer               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 autorent-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │  RentalEngine ── create / pay / finish / cancel / top_up        │   │
//! │  │      │   ├── availability (overlap check, same unit)            │   │
//! │  │      │   ├── autorent_core::pricing                             │   │
//! │  │      │   └── autorent_core::lifecycle (transition table)        │   │
//! │  │      │                                                          │   │
//! │  │  Clock · EngineConfig · telemetry · RentalError                 │   │
//! │  └──────┼──────────────────────────────────────────────────────────┘   │
//! │         ▼                                                               │
//! │  autorent-db (atomic units over SQLite)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use autorent_engine::{telemetry, EngineConfig, RentalEngine};
//! use autorent_core::Actor;
//!
//! let config = EngineConfig::load()?;
//! telemetry::init_tracing(&config.log_filter);
//! let engine = RentalEngine::connect(&config).await?;
//!
//! let receipt = engine.create_rental(&user_id, &car_id, start, end).await?;
//! engine.pay_rental(&receipt.rental_id, &Actor::new(&user_id, false)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod availability;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod receipt;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::Violation;
pub use availability::Availability;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use engine::RentalEngine;
pub use error::{ConflictReason, EngineResult, ErrorBody, ErrorKind, RentalError};
pub use receipt::{BalanceReceipt, RentalReceipt, StatusReceipt};
