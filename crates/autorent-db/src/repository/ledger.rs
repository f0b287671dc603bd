//! # Ledger Repository
//!
//! Append-only record of money movements. Entries are written inside the
//! same atomic unit as the balance change they describe; the schema
//! rejects any UPDATE or DELETE on them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::atomic::AtomicUnit;
use crate::error::DbResult;
use autorent_core::{LedgerEntry, LedgerKind, LedgerOutcome, Money};

/// Fields supplied when appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub user_id: String,
    pub rental_id: Option<String>,
    pub kind: LedgerKind,
    pub amount: Money,
    pub outcome: LedgerOutcome,
}

impl NewLedgerEntry {
    /// A payment for `rental_id`.
    pub fn payment(
        user_id: impl Into<String>,
        rental_id: impl Into<String>,
        amount: Money,
        outcome: LedgerOutcome,
    ) -> Self {
        NewLedgerEntry {
            user_id: user_id.into(),
            rental_id: Some(rental_id.into()),
            kind: LedgerKind::Payment,
            amount,
            outcome,
        }
    }

    /// A successful balance top-up.
    pub fn topup(user_id: impl Into<String>, amount: Money) -> Self {
        NewLedgerEntry {
            user_id: user_id.into(),
            rental_id: None,
            kind: LedgerKind::Topup,
            amount,
            outcome: LedgerOutcome::Success,
        }
    }
}

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Lists entries newest first, optionally for one user only.
    pub async fn list(&self, user_id: Option<&str>) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, rental_id, kind, amount_cents, outcome, created_at
            FROM ledger_entries
            WHERE ?1 IS NULL OR user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists the entries that reference one rental, oldest first.
    pub async fn for_rental(&self, rental_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, rental_id, kind, amount_cents, outcome, created_at
            FROM ledger_entries
            WHERE rental_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Appends an entry inside `unit`.
    pub async fn append(
        &self,
        unit: &mut AtomicUnit,
        new: &NewLedgerEntry,
    ) -> DbResult<LedgerEntry> {
        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id.clone(),
            rental_id: new.rental_id.clone(),
            kind: new.kind,
            amount_cents: new.amount.cents(),
            outcome: new.outcome,
            created_at: Utc::now(),
        };

        debug!(
            id = %entry.id,
            user_id = %entry.user_id,
            kind = entry.kind.as_str(),
            outcome = entry.outcome.as_str(),
            amount = %new.amount,
            "Appending ledger entry"
        );

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, user_id, rental_id, kind, amount_cents, outcome, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.rental_id)
        .bind(entry.kind)
        .bind(entry.amount_cents)
        .bind(entry.outcome)
        .bind(entry.created_at)
        .execute(unit.conn())
        .await?;

        Ok(entry)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::user::NewUser;
    use autorent_core::Role;

    async fn db_with_user() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .insert(&NewUser {
                display_name: "Alice".to_string(),
                role: Role::Client,
                balance: Money::zero(),
                rating: 0.0,
            })
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let (db, user_id) = db_with_user().await;

        let mut unit = db.begin_atomic().await.unwrap();
        db.ledger()
            .append(&mut unit, &NewLedgerEntry::topup(&user_id, Money::from_cents(500)))
            .await
            .unwrap();
        db.ledger()
            .append(&mut unit, &NewLedgerEntry::topup(&user_id, Money::from_cents(700)))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        let entries = db.ledger().list(Some(&user_id)).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount(), Money::from_cents(700));
        assert_eq!(entries[0].kind, LedgerKind::Topup);
        assert!(entries[0].rental_id.is_none());

        assert!(db.ledger().list(Some("nobody")).await.unwrap().is_empty());
        assert_eq!(db.ledger().list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rolled_back_entry_is_invisible() {
        let (db, user_id) = db_with_user().await;

        let mut unit = db.begin_atomic().await.unwrap();
        db.ledger()
            .append(&mut unit, &NewLedgerEntry::topup(&user_id, Money::from_cents(500)))
            .await
            .unwrap();
        unit.rollback().await.unwrap();

        assert!(db.ledger().list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entries_are_immutable() {
        let (db, user_id) = db_with_user().await;

        let mut unit = db.begin_atomic().await.unwrap();
        let entry = db
            .ledger()
            .append(&mut unit, &NewLedgerEntry::topup(&user_id, Money::from_cents(500)))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        let err = sqlx::query("UPDATE ledger_entries SET amount_cents = 1 WHERE id = ?1")
            .bind(&entry.id)
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        let err = sqlx::query("DELETE FROM ledger_entries WHERE id = ?1")
            .bind(&entry.id)
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let (db, user_id) = db_with_user().await;

        let mut unit = db.begin_atomic().await.unwrap();
        let err = db
            .ledger()
            .append(&mut unit, &NewLedgerEntry::topup(&user_id, Money::zero()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
