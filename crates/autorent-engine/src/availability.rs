//! # Availability Checker
//!
//! Decides whether a car is free over a requested window.
//!
//! ```text
//!   existing   [=========)
//!   requested        [=========)      conflict: e.start < r.end && e.end > r.start
//!   requested            [====)       touching endpoints: no conflict
//! ```
//!
//! The check only protects anything when it runs on the same atomic unit as
//! the booking write that follows it; [`check_in_unit`] is the form
//! `create_rental` uses. Cancelled rentals never conflict.

use autorent_core::{BookingWindow, Rental, RentalStatus};
use autorent_db::{AtomicUnit, Database, DbResult};

/// Outcome of an availability check.
#[derive(Debug, Clone)]
pub enum Availability {
    Available,
    /// The first non-cancelled rental that overlaps the window.
    Conflicting(Rental),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Runs the overlap query on `unit`'s connection.
///
/// Store errors propagate; they are never reported as "unavailable".
pub async fn check_in_unit(
    db: &Database,
    unit: &mut AtomicUnit,
    car_id: &str,
    window: &BookingWindow,
) -> DbResult<Availability> {
    let conflict = db
        .rentals()
        .find_overlapping(unit, car_id, window)
        .await?;

    Ok(match conflict {
        Some(rental) => Availability::Conflicting(rental),
        None => Availability::Available,
    })
}

/// In-memory form of the same predicate, for rentals already loaded.
pub fn first_conflict<'a, I>(rentals: I, window: &BookingWindow) -> Option<&'a Rental>
where
    I: IntoIterator<Item = &'a Rental>,
{
    rentals
        .into_iter()
        .filter(|r| r.status != RentalStatus::Cancelled)
        .find(|r| r.window().overlaps(window))
}
