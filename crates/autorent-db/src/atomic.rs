//! # Atomic Units
//!
//! Every multi-entity state change (create, pay, finish, cancel, top-up)
//! runs inside one [`AtomicUnit`]: either all of its writes become visible
//! or none do.
//!
//! ## Unit Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atomic Unit                                      │
//! │                                                                         │
//! │  db.begin_atomic()            BEGIN (deferred)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  repo.claim(&mut unit, id)    first statement is a no-op UPDATE:       │
//! │       │                       takes the store's write lock before any  │
//! │       │                       read, so competing units queue here      │
//! │       ▼                                                                 │
//! │  reads + conditional writes   all on the unit's own connection         │
//! │       │                                                                 │
//! │       ├── unit.commit()       COMMIT → every write visible             │
//! │       └── drop(unit)          ROLLBACK → nothing visible               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repository methods that write take `&mut AtomicUnit`, so a write outside
//! a unit does not type-check. Reads through the pool must never happen
//! while a unit is open on a single-connection (in-memory) database.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::trace;

use crate::error::{DbError, DbResult};

/// An open all-or-nothing unit of work.
///
/// Dropping a unit without calling [`commit`](AtomicUnit::commit) rolls
/// it back.
pub struct AtomicUnit {
    tx: Transaction<'static, Sqlite>,
}

impl AtomicUnit {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        trace!("Atomic unit opened");
        Ok(AtomicUnit { tx })
    }

    /// The connection every statement of this unit runs on.
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Makes every write of the unit visible at once.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        trace!("Atomic unit committed");
        Ok(())
    }

    /// Discards every write of the unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        trace!("Atomic unit rolled back");
        Ok(())
    }
}

impl std::fmt::Debug for AtomicUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicUnit").finish_non_exhaustive()
    }
}
