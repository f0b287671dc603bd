//! # Car Repository
//!
//! Fleet records. A car's `status` mirrors its live rental:
//! `booked` exactly while a pending or active rental holds it.
//!
//! ## Status Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Car Status                                        │
//! │                                                                         │
//! │   available ──create_rental──► booked                                  │
//! │   booked ──finish / cancel──► available                                │
//! │   maintenance: set by fleet staff, never touched by the engine         │
//! │                                                                         │
//! │   Every change above happens inside the same atomic unit as the        │
//! │   rental write that causes it.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::ensure_touched;
use crate::atomic::AtomicUnit;
use crate::error::{DbError, DbResult};
use autorent_core::validation::validate_rating;
use autorent_core::{Car, CarCategory, CarStatus, Money};

/// Fields supplied when registering a car.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub category: CarCategory,
    pub hourly_rate: Money,
    pub rating: f64,
}

/// Repository for car database operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Registers a new car. It starts out `available`.
    pub async fn insert(&self, new: &NewCar) -> DbResult<Car> {
        validate_rating(new.rating).map_err(|e| DbError::CheckViolation {
            message: e.to_string(),
        })?;

        let now = Utc::now();
        let car = Car {
            id: Uuid::new_v4().to_string(),
            make: new.make.clone(),
            model: new.model.clone(),
            category: new.category,
            status: CarStatus::Available,
            hourly_rate_cents: new.hourly_rate.cents(),
            rating: new.rating,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %car.id, make = %car.make, model = %car.model, "Inserting car");

        sqlx::query(
            r#"
            INSERT INTO cars (
                id, make, model, category, status,
                hourly_rate_cents, rating, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&car.id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.category)
        .bind(car.status)
        .bind(car.hourly_rate_cents)
        .bind(car.rating)
        .bind(car.created_at)
        .bind(car.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(car)
    }

    /// Gets a car by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, make, model, category, status,
                   hourly_rate_cents, rating, created_at, updated_at
            FROM cars
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    /// Lists the whole fleet ordered by make and model.
    pub async fn list(&self) -> DbResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, make, model, category, status,
                   hourly_rate_cents, rating, created_at, updated_at
            FROM cars
            ORDER BY make, model, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    /// Counts registered cars.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Unit methods
    // =========================================================================

    /// Takes the write lock for `id` as the unit's first statement.
    ///
    /// Returns NotFound if the car doesn't exist.
    pub async fn claim(&self, unit: &mut AtomicUnit, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE cars SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(unit.conn())
            .await?;

        ensure_touched(result.rows_affected(), "Car", id)
    }

    /// Reads a car through the unit's connection.
    pub async fn get_in(&self, unit: &mut AtomicUnit, id: &str) -> DbResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, make, model, category, status,
                   hourly_rate_cents, rating, created_at, updated_at
            FROM cars
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(unit.conn())
        .await?;

        Ok(car)
    }

    /// Sets a car's status.
    pub async fn set_status(
        &self,
        unit: &mut AtomicUnit,
        id: &str,
        status: CarStatus,
    ) -> DbResult<()> {
        debug!(id = %id, status = %status, "Setting car status");

        let result = sqlx::query("UPDATE cars SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(unit.conn())
            .await?;

        ensure_touched(result.rows_affected(), "Car", id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
