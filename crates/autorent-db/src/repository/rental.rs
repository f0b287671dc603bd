//! # Rental Repository
//!
//! Bookings, the availability query, and conditional status updates.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       rentals table                                     │
//! │                                                                         │
//! │  start_at_ms / end_at_ms   INTEGER epoch millis (half-open window)     │
//! │  total_price_cents         frozen at insert (trigger guards it)        │
//! │  status                    pending → active → completed                │
//! │                            pending → cancelled                          │
//! │                                                                         │
//! │  Overlap test (index: car_id, start_at_ms, end_at_ms):                 │
//! │     existing.start < requested.end AND existing.end > requested.start  │
//! │     over every non-cancelled rental of the car                         │
//! │                                                                         │
//! │  Rows are never deleted (trigger).                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::ensure_touched;
use crate::atomic::AtomicUnit;
use crate::error::{DbError, DbResult};
use autorent_core::{BookingWindow, Money, Rental, RentalStatus};

/// Fields supplied when booking a car.
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: String,
    pub car_id: String,
    pub window: BookingWindow,
    pub total_price: Money,
}

/// Row shape of the `rentals` table.
#[derive(Debug, sqlx::FromRow)]
struct RentalRow {
    id: String,
    user_id: String,
    car_id: String,
    start_at_ms: i64,
    end_at_ms: i64,
    total_price_cents: i64,
    status: RentalStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RentalRow> for Rental {
    type Error = DbError;

    fn try_from(row: RentalRow) -> Result<Self, Self::Error> {
        Ok(Rental {
            start_at: from_millis(row.start_at_ms, &row.id)?,
            end_at: from_millis(row.end_at_ms, &row.id)?,
            id: row.id,
            user_id: row.user_id,
            car_id: row.car_id,
            total_price_cents: row.total_price_cents,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn from_millis(ms: i64, rental_id: &str) -> DbResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
        DbError::Internal(format!("rental {rental_id} has out-of-range timestamp {ms}"))
    })
}

fn into_rentals(rows: Vec<RentalRow>) -> DbResult<Vec<Rental>> {
    rows.into_iter().map(Rental::try_from).collect()
}

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Gets a rental by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Rental>> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, user_id, car_id, start_at_ms, end_at_ms,
                   total_price_cents, status, created_at, updated_at
            FROM rentals
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Rental::try_from).transpose()
    }

    /// Lists rentals newest first, optionally for one user only.
    pub async fn list(&self, user_id: Option<&str>) -> DbResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, user_id, car_id, start_at_ms, end_at_ms,
                   total_price_cents, status, created_at, updated_at
            FROM rentals
            WHERE ?1 IS NULL OR user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_rentals(rows)
    }

    /// Lists every rental of one car in window order.
    pub async fn list_for_car(&self, car_id: &str) -> DbResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, user_id, car_id, start_at_ms, end_at_ms,
                   total_price_cents, status, created_at, updated_at
            FROM rentals
            WHERE car_id = ?1
            ORDER BY start_at_ms, rowid
            "#,
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await?;

        into_rentals(rows)
    }

    // =========================================================================
    // Unit methods
    // =========================================================================

    /// Takes the write lock for `id` as the unit's first statement.
    pub async fn claim(&self, unit: &mut AtomicUnit, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE rentals SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(unit.conn())
            .await?;

        ensure_touched(result.rows_affected(), "Rental", id)
    }

    /// Reads a rental through the unit's connection.
    pub async fn get_in(&self, unit: &mut AtomicUnit, id: &str) -> DbResult<Option<Rental>> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, user_id, car_id, start_at_ms, end_at_ms,
                   total_price_cents, status, created_at, updated_at
            FROM rentals
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(unit.conn())
        .await?;

        row.map(Rental::try_from).transpose()
    }

    /// Finds a non-cancelled rental of `car_id` whose window overlaps
    /// `window`, if any.
    ///
    /// Windows are half-open, so back-to-back bookings don't conflict.
    pub async fn find_overlapping(
        &self,
        unit: &mut AtomicUnit,
        car_id: &str,
        window: &BookingWindow,
    ) -> DbResult<Option<Rental>> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, user_id, car_id, start_at_ms, end_at_ms,
                   total_price_cents, status, created_at, updated_at
            FROM rentals
            WHERE car_id = ?1
              AND status != 'cancelled'
              AND start_at_ms < ?3
              AND end_at_ms > ?2
            ORDER BY start_at_ms
            LIMIT 1
            "#,
        )
        .bind(car_id)
        .bind(window.start_millis())
        .bind(window.end_millis())
        .fetch_optional(unit.conn())
        .await?;

        row.map(Rental::try_from).transpose()
    }

    /// Inserts a new `pending` rental with its frozen price.
    pub async fn insert(&self, unit: &mut AtomicUnit, new: &NewRental) -> DbResult<Rental> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let start_ms = new.window.start_millis();
        let end_ms = new.window.end_millis();

        // Return exactly what a later read will see.
        let rental = Rental {
            start_at: from_millis(start_ms, &id)?,
            end_at: from_millis(end_ms, &id)?,
            id,
            user_id: new.user_id.clone(),
            car_id: new.car_id.clone(),
            total_price_cents: new.total_price.cents(),
            status: RentalStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        debug!(
            id = %rental.id,
            car_id = %rental.car_id,
            user_id = %rental.user_id,
            total = %new.total_price,
            "Inserting rental"
        );

        sqlx::query(
            r#"
            INSERT INTO rentals (
                id, user_id, car_id, start_at_ms, end_at_ms,
                total_price_cents, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&rental.id)
        .bind(&rental.user_id)
        .bind(&rental.car_id)
        .bind(start_ms)
        .bind(end_ms)
        .bind(rental.total_price_cents)
        .bind(rental.status)
        .bind(rental.created_at)
        .bind(rental.updated_at)
        .execute(unit.conn())
        .await?;

        Ok(rental)
    }

    /// Moves a rental from `from` to `to`.
    ///
    /// The update is conditional on the current status, so it returns
    /// `false` (and changes nothing) if the rental isn't in `from` any more.
    pub async fn transition(
        &self,
        unit: &mut AtomicUnit,
        id: &str,
        from: RentalStatus,
        to: RentalStatus,
    ) -> DbResult<bool> {
        debug!(id = %id, from = %from, to = %to, "Transitioning rental");

        let result = sqlx::query(
            "UPDATE rentals SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(unit.conn())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::car::NewCar;
    use crate::repository::user::NewUser;
    use autorent_core::{CarCategory, Role};
    use chrono::{Duration, TimeZone};

    struct Fixture {
        db: Database,
        user_id: String,
        car_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .insert(&NewUser {
                display_name: "Alice".to_string(),
                role: Role::Client,
                balance: Money::from_cents(10_000),
                rating: 3.0,
            })
            .await
            .unwrap();
        let car = db
            .cars()
            .insert(&NewCar {
                make: "Skoda".to_string(),
                model: "Octavia".to_string(),
                category: CarCategory::Business,
                hourly_rate: Money::from_cents(1500),
                rating: 4.0,
            })
            .await
            .unwrap();
        Fixture {
            db,
            user_id: user.id,
            car_id: car.id,
        }
    }

    fn window(start_hour: u32, hours: i64) -> BookingWindow {
        let start = Utc.with_ymd_and_hms(2030, 6, 1, start_hour, 0, 0).unwrap();
        BookingWindow::new(start, start + Duration::hours(hours)).unwrap()
    }

    async fn book(fx: &Fixture, w: BookingWindow) -> Rental {
        let mut unit = fx.db.begin_atomic().await.unwrap();
        let rental = fx
            .db
            .rentals()
            .insert(
                &mut unit,
                &NewRental {
                    user_id: fx.user_id.clone(),
                    car_id: fx.car_id.clone(),
                    window: w,
                    total_price: Money::from_cents(3000),
                },
            )
            .await
            .unwrap();
        unit.commit().await.unwrap();
        rental
    }

    #[tokio::test]
    async fn test_insert_round_trips_window() {
        let fx = fixture().await;
        let rental = book(&fx, window(10, 2)).await;

        let loaded = fx.db.rentals().get_by_id(&rental.id).await.unwrap().unwrap();
        assert_eq!(loaded.start_at, rental.start_at);
        assert_eq!(loaded.end_at, rental.end_at);
        assert_eq!(loaded.status, RentalStatus::Pending);
        assert_eq!(loaded.total_price(), Money::from_cents(3000));
    }

    #[tokio::test]
    async fn test_overlap_is_half_open() {
        let fx = fixture().await;
        book(&fx, window(10, 2)).await; // 10:00-12:00

        let mut unit = fx.db.begin_atomic().await.unwrap();
        let rentals = fx.db.rentals();

        let touching = rentals
            .find_overlapping(&mut unit, &fx.car_id, &window(12, 1))
            .await
            .unwrap();
        assert!(touching.is_none());

        let inside = rentals
            .find_overlapping(&mut unit, &fx.car_id, &window(11, 3))
            .await
            .unwrap();
        assert!(inside.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_rentals_do_not_overlap() {
        let fx = fixture().await;
        let rental = book(&fx, window(10, 2)).await;

        let mut unit = fx.db.begin_atomic().await.unwrap();
        let rentals = fx.db.rentals();
        rentals.claim(&mut unit, &rental.id).await.unwrap();
        assert!(rentals
            .transition(&mut unit, &rental.id, RentalStatus::Pending, RentalStatus::Cancelled)
            .await
            .unwrap());
        let found = rentals
            .find_overlapping(&mut unit, &fx.car_id, &window(10, 2))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_transition_is_conditional() {
        let fx = fixture().await;
        let rental = book(&fx, window(10, 2)).await;

        let mut unit = fx.db.begin_atomic().await.unwrap();
        let moved = fx
            .db
            .rentals()
            .transition(&mut unit, &rental.id, RentalStatus::Active, RentalStatus::Completed)
            .await
            .unwrap();
        assert!(!moved);
    }

    #[tokio::test]
    async fn test_second_live_rental_for_car_rejected() {
        let fx = fixture().await;
        book(&fx, window(10, 2)).await;

        let mut unit = fx.db.begin_atomic().await.unwrap();
        let err = fx
            .db
            .rentals()
            .insert(
                &mut unit,
                &NewRental {
                    user_id: fx.user_id.clone(),
                    car_id: fx.car_id.clone(),
                    window: window(20, 2),
                    total_price: Money::from_cents(3000),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_rentals_are_never_deleted() {
        let fx = fixture().await;
        let rental = book(&fx, window(10, 2)).await;

        let err = sqlx::query("DELETE FROM rentals WHERE id = ?1")
            .bind(&rental.id)
            .execute(fx.db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_filtered() {
        let fx = fixture().await;
        let first = book(&fx, window(8, 1)).await;

        let mut unit = fx.db.begin_atomic().await.unwrap();
        fx.db
            .rentals()
            .transition(&mut unit, &first.id, RentalStatus::Pending, RentalStatus::Cancelled)
            .await
            .unwrap();
        unit.commit().await.unwrap();
        let second = book(&fx, window(14, 1)).await;

        let all = fx.db.rentals().list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        let none = fx.db.rentals().list(Some("someone-else")).await.unwrap();
        assert!(none.is_empty());

        let by_car = fx.db.rentals().list_for_car(&fx.car_id).await.unwrap();
        assert_eq!(by_car[0].id, first.id);
    }
}
