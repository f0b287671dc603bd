//! # Repository Module
//!
//! Store access for AutoRent, one repository per table.
//!
//! ## Two Kinds of Method
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Methods                                   │
//! │                                                                         │
//! │  Pool reads (&self)                 Unit methods (&mut AtomicUnit)     │
//! │  ──────────────────                 ─────────────────────────────      │
//! │  get_by_id, list, count             claim, get_in, set_status,        │
//! │  Run on any free connection.        debit_if_sufficient, append, ...  │
//! │  Never used inside a unit.          Run on the unit's connection and   │
//! │                                     commit or roll back together.      │
//! │                                                                         │
//! │  Setup inserts (cars, users) go straight to the pool: they touch a     │
//! │  single row and never participate in a rental transition.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CarRepository`](car::CarRepository) - Fleet records and car status
//! - [`UserRepository`](user::UserRepository) - Accounts and balances
//! - [`RentalRepository`](rental::RentalRepository) - Bookings and the overlap query
//! - [`LedgerRepository`](ledger::LedgerRepository) - Append-only money movements

pub mod car;
pub mod ledger;
pub mod rental;
pub mod user;

use crate::error::{DbError, DbResult};

/// Turns a zero-row claim or update into NotFound.
pub(crate) fn ensure_touched(rows_affected: u64, entity: &str, id: &str) -> DbResult<()> {
    if rows_affected == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}
