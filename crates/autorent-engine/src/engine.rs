//! # Rental State Machine
//!
//! [`RentalEngine`] owns every transition of a rental and keeps car status,
//! user balance and the ledger in step with it.
//!
//! ## One Operation, One Atomic Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_rental(user, car, start, end)                                  │
//! │    validate window (clock)           ── outside the unit, no I/O       │
//! │    ┌─ unit ──────────────────────────────────────────────────────────┐ │
//! │    │ claim car → load car (available?) → load user (rating)          │ │
//! │    │ → availability check → price → insert pending → car = booked    │ │
//! │    └─ commit ────────────────────────────────────────────────────────┘ │
//! │                                                                         │
//! │  pay_rental(rental, actor)                                             │
//! │    ┌─ unit ──────────────────────────────────────────────────────────┐ │
//! │    │ claim rental → load → can_act → pending? → conditional debit    │ │
//! │    │ → status = active → ledger(payment, success)                    │ │
//! │    └─ commit ────────────────────────────────────────────────────────┘ │
//! │    on InsufficientFunds: separate unit appends ledger(payment, failed) │
//! │                                                                         │
//! │  finish_rental / cancel_rental(rental, actor)                          │
//! │    ┌─ unit ──────────────────────────────────────────────────────────┐ │
//! │    │ claim rental → load → can_act → transition table                │ │
//! │    │ (cancel: reject once start has passed)                          │ │
//! │    │ → new status → car = available                                  │ │
//! │    └─ commit ────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every early return drops the unit, which rolls it back, so a rejected or
//! failed operation leaves no partial writes behind.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use autorent_core::validation::{
    validate_booking_request, validate_id, validate_topup_amount, validate_total_price,
};
use autorent_core::{
    can_act, pricing, Actor, BookingWindow, CarStatus, LedgerEntry, LedgerOutcome, Money, Rental,
    RentalAction, RentalStatus,
};
use autorent_db::{AtomicUnit, Database, DbError, NewLedgerEntry, NewRental};

use crate::audit::{audit, Violation};
use crate::availability::{check_in_unit, Availability};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{ConflictReason, EngineResult, RentalError};
use crate::receipt::{BalanceReceipt, RentalReceipt, StatusReceipt};

/// The booking and settlement engine.
///
/// Cheap to clone; clones share the store and clock.
#[derive(Debug, Clone)]
pub struct RentalEngine {
    db: Database,
    clock: Arc<dyn Clock>,
    record_failed_payments: bool,
}

impl RentalEngine {
    /// Creates an engine over an open store.
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        RentalEngine {
            db,
            clock,
            record_failed_payments: true,
        }
    }

    /// Opens the configured store and builds an engine on the system clock.
    pub async fn connect(config: &EngineConfig) -> EngineResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(RentalEngine::new(db, Arc::new(SystemClock))
            .with_failed_payment_records(config.record_failed_payments))
    }

    /// Whether rejected payments leave a `failed` ledger entry.
    pub fn with_failed_payment_records(mut self, enabled: bool) -> Self {
        self.record_failed_payments = enabled;
        self
    }

    /// The underlying store, for setup and read-only tooling.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Books `car_id` for `user_id` over `[start, end)`.
    ///
    /// ## Errors
    /// - `InvalidInput`: start in the past, end not after start, under an hour
    /// - `NotFound`: car or user missing
    /// - `Conflict`: car not available, or window overlaps a rental
    pub async fn create_rental(
        &self,
        user_id: &str,
        car_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<RentalReceipt> {
        debug!(user_id, car_id, %start, %end, "create_rental");

        let result = self.create_in_unit(user_id, car_id, start, end).await;
        match &result {
            Ok(receipt) => info!(
                rental_id = %receipt.rental_id,
                car_id,
                user_id,
                total = %receipt.total_price,
                "Rental created"
            ),
            Err(err) => log_rejection("create_rental", err),
        }
        result
    }

    async fn create_in_unit(
        &self,
        user_id: &str,
        car_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<RentalReceipt> {
        validate_id("user_id", user_id)?;
        validate_id("car_id", car_id)?;
        let window = validate_booking_request(self.clock.now(), start, end)?;

        let mut unit = self.db.begin_atomic().await?;
        self.db.cars().claim(&mut unit, car_id).await?;

        let car = self
            .db
            .cars()
            .get_in(&mut unit, car_id)
            .await?
            .ok_or_else(|| RentalError::not_found("Car", car_id))?;
        if !car.is_bookable() {
            return Err(RentalError::Conflict {
                car_id: car_id.to_string(),
                reason: ConflictReason::CarUnavailable(car.status),
            });
        }

        let user = self
            .db
            .users()
            .get_in(&mut unit, user_id)
            .await?
            .ok_or_else(|| RentalError::not_found("User", user_id))?;

        if let Availability::Conflicting(existing) =
            check_in_unit(&self.db, &mut unit, car_id, &window).await?
        {
            return Err(RentalError::Conflict {
                car_id: car_id.to_string(),
                reason: ConflictReason::Overlap {
                    rental_id: existing.id,
                },
            });
        }

        let total_price = pricing::price(car.hourly_rate(), &window, user.rating);
        validate_total_price(total_price)?;

        let rental = self
            .db
            .rentals()
            .insert(
                &mut unit,
                &NewRental {
                    user_id: user.id.clone(),
                    car_id: car.id.clone(),
                    window,
                    total_price,
                },
            )
            .await
            .map_err(|err| match err {
                // Store-level guard for a second live rental on the car.
                DbError::UniqueViolation { .. } => RentalError::Conflict {
                    car_id: car_id.to_string(),
                    reason: ConflictReason::CarUnavailable(CarStatus::Booked),
                },
                other => other.into(),
            })?;

        self.db
            .cars()
            .set_status(&mut unit, car_id, RentalStatus::Pending.implied_car_status())
            .await?;

        unit.commit().await?;

        Ok(RentalReceipt {
            total_price: rental.total_price(),
            status: rental.status,
            rental_id: rental.id,
        })
    }

    // =========================================================================
    // Pay
    // =========================================================================

    /// Settles a pending rental from the owner's balance.
    ///
    /// ## Errors
    /// - `NotFound`, `Forbidden`
    /// - `InvalidState`: rental is not pending
    /// - `InsufficientFunds`: balance below the rental's price
    pub async fn pay_rental(&self, rental_id: &str, actor: &Actor) -> EngineResult<StatusReceipt> {
        debug!(rental_id, actor = %actor.user_id, "pay_rental");

        let result = self.pay_in_unit(rental_id, actor).await;
        match &result {
            Ok(receipt) => info!(rental_id, status = %receipt.status, "Rental paid"),
            Err(err) => {
                log_rejection("pay_rental", err);
                if let RentalError::InsufficientFunds { user_id, required } = err {
                    if self.record_failed_payments {
                        self.record_failed_payment(user_id, rental_id, *required)
                            .await;
                    }
                }
            }
        }
        result
    }

    async fn pay_in_unit(&self, rental_id: &str, actor: &Actor) -> EngineResult<StatusReceipt> {
        let (mut unit, rental, next) = self
            .open_transition(rental_id, actor, RentalAction::Pay)
            .await?;
        let price = rental.total_price();

        // Decrement first, then transition; both land in the same commit.
        let remaining = self
            .db
            .users()
            .debit_if_sufficient(&mut unit, &rental.user_id, price)
            .await?;
        if remaining.is_none() {
            return Err(RentalError::InsufficientFunds {
                user_id: rental.user_id,
                required: price,
            });
        }

        self.move_rental(&mut unit, &rental, next).await?;

        self.db
            .ledger()
            .append(
                &mut unit,
                &NewLedgerEntry::payment(&rental.user_id, &rental.id, price, LedgerOutcome::Success),
            )
            .await?;

        unit.commit().await?;

        Ok(StatusReceipt {
            rental_id: rental.id,
            status: next,
        })
    }

    /// Leaves a trace of a rejected payment. Never fails the caller.
    async fn record_failed_payment(&self, user_id: &str, rental_id: &str, amount: Money) {
        let entry = NewLedgerEntry::payment(user_id, rental_id, amount, LedgerOutcome::Failed);

        let outcome: Result<(), DbError> = async {
            let mut unit = self.db.begin_atomic().await?;
            self.db.ledger().append(&mut unit, &entry).await?;
            unit.commit().await
        }
        .await;

        if let Err(err) = outcome {
            error!(rental_id, user_id, error = %err, "Failed to record failed payment");
        }
    }

    // =========================================================================
    // Finish
    // =========================================================================

    /// Completes an active rental and frees the car.
    pub async fn finish_rental(
        &self,
        rental_id: &str,
        actor: &Actor,
    ) -> EngineResult<StatusReceipt> {
        debug!(rental_id, actor = %actor.user_id, "finish_rental");

        let result = self.release_in_unit(rental_id, actor, RentalAction::Finish).await;
        match &result {
            Ok(receipt) => info!(rental_id, status = %receipt.status, "Rental finished"),
            Err(err) => log_rejection("finish_rental", err),
        }
        result
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    /// Cancels a pending rental that hasn't started and frees the car.
    ///
    /// ## Errors
    /// - `InvalidState`: rental is not pending
    /// - `TooLate` (kind `InvalidState`): now is at or after the start
    pub async fn cancel_rental(
        &self,
        rental_id: &str,
        actor: &Actor,
    ) -> EngineResult<StatusReceipt> {
        debug!(rental_id, actor = %actor.user_id, "cancel_rental");

        let result = self.release_in_unit(rental_id, actor, RentalAction::Cancel).await;
        match &result {
            Ok(receipt) => info!(rental_id, status = %receipt.status, "Rental cancelled"),
            Err(err) => log_rejection("cancel_rental", err),
        }
        result
    }

    /// Finish and cancel share a shape: move the rental, free the car.
    async fn release_in_unit(
        &self,
        rental_id: &str,
        actor: &Actor,
        action: RentalAction,
    ) -> EngineResult<StatusReceipt> {
        let (mut unit, rental, next) = self.open_transition(rental_id, actor, action).await?;

        if action == RentalAction::Cancel && rental.window().has_started(self.clock.now()) {
            return Err(RentalError::TooLate {
                rental_id: rental.id,
                start: rental.start_at,
            });
        }

        self.move_rental(&mut unit, &rental, next).await?;
        self.db
            .cars()
            .set_status(&mut unit, &rental.car_id, next.implied_car_status())
            .await?;

        unit.commit().await?;

        Ok(StatusReceipt {
            rental_id: rental.id,
            status: next,
        })
    }

    // =========================================================================
    // Shared transition steps
    // =========================================================================

    /// Opens a unit, claims and loads the rental, authorizes the actor and
    /// consults the transition table.
    async fn open_transition(
        &self,
        rental_id: &str,
        actor: &Actor,
        action: RentalAction,
    ) -> EngineResult<(AtomicUnit, Rental, RentalStatus)> {
        validate_id("rental_id", rental_id)?;

        let mut unit = self.db.begin_atomic().await?;
        self.db.rentals().claim(&mut unit, rental_id).await?;

        let rental = self
            .db
            .rentals()
            .get_in(&mut unit, rental_id)
            .await?
            .ok_or_else(|| RentalError::not_found("Rental", rental_id))?;

        if !can_act(actor, &rental) {
            return Err(RentalError::Forbidden {
                rental_id: rental.id,
            });
        }

        let next = rental
            .status
            .apply(action)
            .map_err(|_| RentalError::InvalidState {
                rental_id: rental.id.clone(),
                status: rental.status,
                action,
            })?;

        Ok((unit, rental, next))
    }

    /// Conditional status write; the rental was claimed, so a miss means
    /// the store and the loaded row disagree.
    async fn move_rental(
        &self,
        unit: &mut AtomicUnit,
        rental: &Rental,
        next: RentalStatus,
    ) -> EngineResult<()> {
        let moved = self
            .db
            .rentals()
            .transition(unit, &rental.id, rental.status, next)
            .await?;
        if !moved {
            error!(rental_id = %rental.id, from = %rental.status, to = %next, "Conditional status update missed");
            return Err(RentalError::Internal(
                "rental changed during transition".to_string(),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Balance
    // =========================================================================

    /// Credits `amount` to the user's balance and records the top-up.
    pub async fn top_up(&self, user_id: &str, amount: Money) -> EngineResult<BalanceReceipt> {
        debug!(user_id, %amount, "top_up");

        let result = self.top_up_in_unit(user_id, amount).await;
        match &result {
            Ok(receipt) => info!(user_id, balance = %receipt.balance, "Balance topped up"),
            Err(err) => log_rejection("top_up", err),
        }
        result
    }

    async fn top_up_in_unit(&self, user_id: &str, amount: Money) -> EngineResult<BalanceReceipt> {
        validate_id("user_id", user_id)?;
        validate_topup_amount(amount)?;

        let mut unit = self.db.begin_atomic().await?;
        self.db.users().claim(&mut unit, user_id).await?;

        let balance = self.db.users().credit(&mut unit, user_id, amount).await?;
        self.db
            .ledger()
            .append(&mut unit, &NewLedgerEntry::topup(user_id, amount))
            .await?;

        unit.commit().await?;

        Ok(BalanceReceipt {
            user_id: user_id.to_string(),
            balance,
        })
    }

    /// Current balance of a user.
    pub async fn balance(&self, user_id: &str) -> EngineResult<Money> {
        validate_id("user_id", user_id)?;
        let user = self
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| RentalError::not_found("User", user_id))?;
        Ok(user.balance())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Loads one rental the actor may see.
    pub async fn get_rental(&self, actor: &Actor, rental_id: &str) -> EngineResult<Rental> {
        validate_id("rental_id", rental_id)?;
        let rental = self
            .db
            .rentals()
            .get_by_id(rental_id)
            .await?
            .ok_or_else(|| RentalError::not_found("Rental", rental_id))?;

        if !can_act(actor, &rental) {
            return Err(RentalError::Forbidden {
                rental_id: rental.id,
            });
        }
        Ok(rental)
    }

    /// Rentals visible to `actor`, newest first.
    ///
    /// Non-admins always get their own; admins get `user_filter`'s, or all.
    pub async fn list_rentals(
        &self,
        actor: &Actor,
        user_filter: Option<&str>,
    ) -> EngineResult<Vec<Rental>> {
        let scope = actor.listing_scope(user_filter);
        Ok(self.db.rentals().list(scope).await?)
    }

    /// Ledger entries visible to `actor`, newest first.
    pub async fn list_ledger(
        &self,
        actor: &Actor,
        user_filter: Option<&str>,
    ) -> EngineResult<Vec<LedgerEntry>> {
        let scope = actor.listing_scope(user_filter);
        Ok(self.db.ledger().list(scope).await?)
    }

    /// Advisory availability check outside any booking.
    ///
    /// `create_rental` repeats the check inside its own unit; a `true` here
    /// is not a reservation.
    pub async fn is_available(
        &self,
        car_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let window = BookingWindow::new(start, end)?;

        let mut unit = self.db.begin_atomic().await?;
        let availability = check_in_unit(&self.db, &mut unit, car_id, &window).await?;
        unit.rollback().await?;

        Ok(availability.is_available())
    }

    /// Audits car status against live rentals across the whole fleet.
    pub async fn verify_consistency(&self) -> EngineResult<Vec<Violation>> {
        let cars = self.db.cars().list().await?;
        let rentals = self.db.rentals().list(None).await?;

        let violations = audit(&cars, &rentals);
        for violation in &violations {
            warn!(%violation, "Consistency violation");
        }
        Ok(violations)
    }
}

/// Business rejections are expected traffic; store faults were already
/// logged at error level by the `DbError` conversion.
fn log_rejection(operation: &'static str, err: &RentalError) {
    if err.is_retryable() {
        return;
    }
    warn!(operation, kind = ?err.kind(), error = %err, "Operation rejected");
}
