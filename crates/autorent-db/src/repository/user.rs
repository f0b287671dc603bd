//! # User Repository
//!
//! Accounts and their prepaid balances. The balance only ever changes
//! through [`debit_if_sufficient`](UserRepository::debit_if_sufficient)
//! and [`credit`](UserRepository::credit), both inside an atomic unit,
//! and the schema refuses any write that would make it negative.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::ensure_touched;
use crate::atomic::AtomicUnit;
use crate::error::{DbError, DbResult};
use autorent_core::validation::validate_rating;
use autorent_core::{Money, Role, User};

/// Fields supplied when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub display_name: String,
    pub role: Role,
    pub balance: Money,
    pub rating: f64,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a new user.
    pub async fn insert(&self, new: &NewUser) -> DbResult<User> {
        validate_rating(new.rating).map_err(|e| DbError::CheckViolation {
            message: e.to_string(),
        })?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            display_name: new.display_name.clone(),
            role: new.role,
            balance_cents: new.balance.cents(),
            rating: new.rating,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, role = user.role.as_str(), "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, display_name, role, balance_cents, rating, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.balance_cents)
        .bind(user.rating)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, display_name, role, balance_cents, rating, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // =========================================================================
    // Unit methods
    // =========================================================================

    /// Takes the write lock for `id` as the unit's first statement.
    pub async fn claim(&self, unit: &mut AtomicUnit, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(unit.conn())
            .await?;

        ensure_touched(result.rows_affected(), "User", id)
    }

    /// Reads a user through the unit's connection.
    pub async fn get_in(&self, unit: &mut AtomicUnit, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, display_name, role, balance_cents, rating, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(unit.conn())
        .await?;

        Ok(user)
    }

    /// Subtracts `amount` only if the balance covers it.
    ///
    /// ## Returns
    /// * `Some(new_balance)` - debited
    /// * `None` - balance too low (or no such user); nothing changed
    pub async fn debit_if_sufficient(
        &self,
        unit: &mut AtomicUnit,
        id: &str,
        amount: Money,
    ) -> DbResult<Option<Money>> {
        debug!(id = %id, amount = %amount, "Debiting user balance");

        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance_cents = balance_cents - ?2, updated_at = ?3
            WHERE id = ?1 AND balance_cents >= ?2
            RETURNING balance_cents
            "#,
        )
        .bind(id)
        .bind(amount.cents())
        .bind(Utc::now())
        .fetch_optional(unit.conn())
        .await?;

        Ok(balance.map(Money::from_cents))
    }

    /// Adds `amount` to the balance and returns the new balance.
    pub async fn credit(&self, unit: &mut AtomicUnit, id: &str, amount: Money) -> DbResult<Money> {
        debug!(id = %id, amount = %amount, "Crediting user balance");

        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance_cents = balance_cents + ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING balance_cents
            "#,
        )
        .bind(id)
        .bind(amount.cents())
        .bind(Utc::now())
        .fetch_optional(unit.conn())
        .await?;

        balance
            .map(Money::from_cents)
            .ok_or_else(|| DbError::not_found("User", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn user_with_balance(db: &Database, cents: i64) -> User {
        db.users()
            .insert(&NewUser {
                display_name: "Alice".to_string(),
                role: Role::Client,
                balance: Money::from_cents(cents),
                rating: 4.0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_debit_exact_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = user_with_balance(&db, 2000).await;

        let mut unit = db.begin_atomic().await.unwrap();
        db.users().claim(&mut unit, &user.id).await.unwrap();
        let left = db
            .users()
            .debit_if_sufficient(&mut unit, &user.id, Money::from_cents(2000))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        assert_eq!(left, Some(Money::zero()));
        let loaded = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(loaded.balance(), Money::zero());
    }

    #[tokio::test]
    async fn test_debit_insufficient_leaves_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = user_with_balance(&db, 1999).await;

        let mut unit = db.begin_atomic().await.unwrap();
        let left = db
            .users()
            .debit_if_sufficient(&mut unit, &user.id, Money::from_cents(2000))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        assert_eq!(left, None);
        let loaded = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(loaded.balance_cents, 1999);
    }

    #[tokio::test]
    async fn test_credit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = user_with_balance(&db, 100).await;

        let mut unit = db.begin_atomic().await.unwrap();
        let balance = db
            .users()
            .credit(&mut unit, &user.id, Money::from_cents(900))
            .await
            .unwrap();
        unit.commit().await.unwrap();
        assert_eq!(balance, Money::from_cents(1000));

        let mut unit = db.begin_atomic().await.unwrap();
        let err = db
            .users()
            .credit(&mut unit, "missing", Money::from_cents(1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_negative_opening_balance_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .users()
            .insert(&NewUser {
                display_name: "Bob".to_string(),
                role: Role::Client,
                balance: Money::from_cents(-1),
                rating: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .users()
            .insert(&NewUser {
                display_name: "Carol".to_string(),
                role: Role::Client,
                balance: Money::zero(),
                rating: -1.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
