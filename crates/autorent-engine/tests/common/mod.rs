//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use autorent_core::{Actor, Car, CarCategory, Money, Role, User};
use autorent_db::{Database, DbConfig, NewCar, NewUser};
use autorent_engine::{ManualClock, RentalEngine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

/// A syntactically valid id that no row ever gets.
pub const MISSING_ID: &str = "00000000-0000-4000-8000-000000000000";

/// "Now" for every test engine.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap()
}

/// `t0 + hours`.
pub fn at(hours: i64) -> DateTime<Utc> {
    t0() + Duration::hours(hours)
}

pub struct TestEngine {
    pub engine: RentalEngine,
    pub clock: Arc<ManualClock>,
    /// Keeps a file-backed database alive for the test's duration.
    _dir: Option<TempDir>,
}

impl TestEngine {
    pub fn db(&self) -> &Database {
        self.engine.database()
    }

    pub async fn user(&self, balance_cents: i64, rating: f64) -> User {
        self.user_with_role(balance_cents, rating, Role::Client).await
    }

    pub async fn user_with_role(&self, balance_cents: i64, rating: f64, role: Role) -> User {
        self.db()
            .users()
            .insert(&NewUser {
                display_name: format!("{role:?} {rating}"),
                role,
                balance: Money::from_cents(balance_cents),
                rating,
            })
            .await
            .unwrap()
    }

    pub async fn car(&self, hourly_rate_cents: i64) -> Car {
        self.db()
            .cars()
            .insert(&NewCar {
                make: "Volkswagen".to_string(),
                model: "Golf".to_string(),
                category: CarCategory::Economy,
                hourly_rate: Money::from_cents(hourly_rate_cents),
                rating: 4.0,
            })
            .await
            .unwrap()
    }

    pub async fn car_status(&self, car_id: &str) -> autorent_core::CarStatus {
        self.db().cars().get_by_id(car_id).await.unwrap().unwrap().status
    }

    /// Makes every statement matching `event` on `table` abort, so a unit
    /// fails after its earlier writes already ran.
    pub async fn fail_on(&self, event: &str, table: &str) {
        let sql = format!(
            "CREATE TRIGGER fault_{table} BEFORE {event} ON {table} \
             BEGIN SELECT RAISE(ABORT, 'disk I/O fault'); END"
        );
        sqlx::query(&sql).execute(self.db().pool()).await.unwrap();
    }

    /// Removes a trigger installed by [`fail_on`](Self::fail_on).
    pub async fn clear_fault(&self, table: &str) {
        let sql = format!("DROP TRIGGER fault_{table}");
        sqlx::query(&sql).execute(self.db().pool()).await.unwrap();
    }

    pub async fn assert_consistent(&self) {
        let violations = self.engine.verify_consistency().await.unwrap();
        assert!(violations.is_empty(), "violations: {violations:?}");
    }
}

fn engine_over(db: Database) -> (RentalEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let engine = RentalEngine::new(db, clock.clone());
    (engine, clock)
}

/// Single-connection in-memory store.
pub async fn memory_engine() -> TestEngine {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let (engine, clock) = engine_over(db);
    TestEngine {
        engine,
        clock,
        _dir: None,
    }
}

/// File-backed store with a real pool, for concurrency tests.
pub async fn file_engine(max_connections: u32) -> TestEngine {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("autorent.db"))
        .max_connections(max_connections)
        .busy_timeout(StdDuration::from_secs(30));
    let db = Database::new(config).await.unwrap();
    let (engine, clock) = engine_over(db);
    TestEngine {
        engine,
        clock,
        _dir: Some(dir),
    }
}

pub fn owner(user: &User) -> Actor {
    Actor::new(&user.id, false)
}

pub fn admin() -> Actor {
    Actor::with_role(MISSING_ID, Role::Admin)
}
