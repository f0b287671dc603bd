//! # Consistency Audit
//!
//! Re-derives the cross-entity invariants from a snapshot of the store.
//!
//! ```text
//!   car.status == booked  ⇔  car has a pending or active rental
//!   at most one pending/active rental per car
//!   no two non-cancelled rentals of one car overlap
//! ```
//!
//! An empty report means every invariant holds.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use autorent_core::{Car, CarStatus, Rental, RentalStatus};

use crate::availability::first_conflict;

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// Car status disagrees with the presence of a live rental.
    CarStatusMismatch {
        car_id: String,
        status: CarStatus,
        live_rentals: usize,
    },
    /// More than one pending/active rental holds the car.
    MultipleLiveRentals {
        car_id: String,
        rental_ids: Vec<String>,
    },
    /// Two non-cancelled rentals of the car overlap in time.
    OverlappingRentals {
        car_id: String,
        first: String,
        second: String,
    },
    /// A rental points at a car that doesn't exist.
    UnknownCar { rental_id: String, car_id: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::CarStatusMismatch {
                car_id,
                status,
                live_rentals,
            } => write!(
                f,
                "car {car_id} is {status} with {live_rentals} pending/active rental(s)"
            ),
            Violation::MultipleLiveRentals { car_id, rental_ids } => write!(
                f,
                "car {car_id} is held by several rentals: {}",
                rental_ids.join(", ")
            ),
            Violation::OverlappingRentals {
                car_id,
                first,
                second,
            } => write!(f, "car {car_id} has overlapping rentals {first} and {second}"),
            Violation::UnknownCar { rental_id, car_id } => {
                write!(f, "rental {rental_id} references unknown car {car_id}")
            }
        }
    }
}

/// Checks every invariant over `cars` and `rentals`.
pub fn audit(cars: &[Car], rentals: &[Rental]) -> Vec<Violation> {
    let mut by_car: HashMap<&str, Vec<&Rental>> = HashMap::new();
    for rental in rentals {
        by_car.entry(rental.car_id.as_str()).or_default().push(rental);
    }

    let mut violations = Vec::new();

    for car in cars {
        let history = by_car.remove(car.id.as_str()).unwrap_or_default();
        let live: Vec<&Rental> = history
            .iter()
            .copied()
            .filter(|r| r.status.holds_car())
            .collect();

        let booked = car.status == CarStatus::Booked;
        if booked != !live.is_empty() {
            violations.push(Violation::CarStatusMismatch {
                car_id: car.id.clone(),
                status: car.status,
                live_rentals: live.len(),
            });
        }

        if live.len() > 1 {
            violations.push(Violation::MultipleLiveRentals {
                car_id: car.id.clone(),
                rental_ids: live.iter().map(|r| r.id.clone()).collect(),
            });
        }

        for (i, rental) in history.iter().enumerate() {
            if rental.status == RentalStatus::Cancelled {
                continue;
            }
            let later = history[i + 1..].iter().copied();
            if let Some(other) = first_conflict(later, &rental.window()) {
                violations.push(Violation::OverlappingRentals {
                    car_id: car.id.clone(),
                    first: rental.id.clone(),
                    second: other.id.clone(),
                });
            }
        }
    }

    // Anything left was not claimed by a known car.
    let mut orphans: Vec<&Rental> = by_car.into_values().flatten().collect();
    orphans.sort_by(|a, b| a.id.cmp(&b.id));
    violations.extend(orphans.into_iter().map(|r| Violation::UnknownCar {
        rental_id: r.id.clone(),
        car_id: r.car_id.clone(),
    }));

    violations
}
