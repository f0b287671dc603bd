//! # autorent-db: Store Layer for AutoRent
//!
//! This crate provides durable storage for users, cars, rentals and the
//! ledger. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AutoRent Data Flow                               │
//! │                                                                         │
//! │  RentalEngine (pay_rental)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    autorent-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CarRepo       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ UserRepo      │    │ 001_initial  │  │   │
//! │  │   │ AtomicUnit    │    │ RentalRepo    │    │   _schema    │  │   │
//! │  │   │ (atomic.rs)   │    │ LedgerRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`atomic`] - All-or-nothing units of work
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (car, user, rental, ledger)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use autorent_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/autorent.db")).await?;
//!
//! let mut unit = db.begin_atomic().await?;
//! db.rentals().claim(&mut unit, &rental_id).await?;
//! // ... conditional writes ...
//! unit.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod atomic;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use atomic::AtomicUnit;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::car::{CarRepository, NewCar};
pub use repository::ledger::{LedgerRepository, NewLedgerEntry};
pub use repository::rental::{NewRental, RentalRepository};
pub use repository::user::{NewUser, UserRepository};
