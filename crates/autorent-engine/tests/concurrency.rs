//! Concurrent requests against a file-backed store with a real pool.
//!
//! Each test lines its tasks up on a barrier so the requests genuinely race
//! for the same rows.

mod common;

use std::sync::Arc;

use autorent_core::{CarStatus, Money, RentalStatus};
use autorent_engine::{ErrorKind, RentalError};
use common::{at, file_engine, owner};
use tokio::sync::Barrier;

const RACERS: usize = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_bookings_one_winner() {
    let t = file_engine(RACERS as u32).await;
    let car = t.car(1000).await;

    let mut users = Vec::new();
    for _ in 0..RACERS {
        users.push(t.user(0, 3.0).await);
    }

    let barrier = Arc::new(Barrier::new(RACERS));
    let mut handles = Vec::new();
    for (i, user) in users.into_iter().enumerate() {
        let engine = t.engine.clone();
        let barrier = barrier.clone();
        let car_id = car.id.clone();
        // Staggered but pairwise-overlapping windows.
        let start = at(1) + chrono::Duration::minutes(i as i64 * 5);
        let end = start + chrono::Duration::hours(2);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine.create_rental(&user.id, &car_id, start, end).await
        }));
    }

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(err) => assert!(matches!(err, RentalError::Conflict { .. }), "{err}"),
        }
    }

    assert_eq!(won, 1);
    let live: Vec<_> = t
        .db()
        .rentals()
        .list_for_car(&car.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.status.holds_car())
        .collect();
    assert_eq!(live.len(), 1);
    assert_eq!(t.car_status(&car.id).await, CarStatus::Booked);
    t.assert_consistent().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pays_never_overdraw() {
    let t = file_engine(RACERS as u32).await;
    // Two 2h rentals at $10/h; the balance covers exactly one.
    let alice = t.user(2000, 3.0).await;
    let first_car = t.car(1000).await;
    let second_car = t.car(1000).await;

    let first = t
        .engine
        .create_rental(&alice.id, &first_car.id, at(1), at(3))
        .await
        .unwrap();
    let second = t
        .engine
        .create_rental(&alice.id, &second_car.id, at(1), at(3))
        .await
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for rental_id in [first.rental_id.clone(), second.rental_id.clone()] {
        let engine = t.engine.clone();
        let barrier = barrier.clone();
        let actor = owner(&alice);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine.pay_rental(&rental_id, &actor).await
        }));
    }

    let mut paid = 0;
    let mut short = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(receipt) => {
                assert_eq!(receipt.status, RentalStatus::Active);
                paid += 1;
            }
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::InsufficientFunds, "{err}");
                short += 1;
            }
        }
    }

    assert_eq!((paid, short), (1, 1));
    assert_eq!(t.engine.balance(&alice.id).await.unwrap(), Money::zero());

    let settled = t
        .db()
        .ledger()
        .list(Some(&alice.id))
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.is_settled_payment())
        .count();
    assert_eq!(settled, 1);
    t.assert_consistent().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_top_ups_all_land() {
    let t = file_engine(RACERS as u32).await;
    let alice = t.user(0, 3.0).await;

    let barrier = Arc::new(Barrier::new(RACERS));
    let mut handles = Vec::new();
    for i in 1..=RACERS as i64 {
        let engine = t.engine.clone();
        let barrier = barrier.clone();
        let user_id = alice.id.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine.top_up(&user_id, Money::from_cents(i * 100)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // 100 + 200 + ... + 800
    assert_eq!(t.engine.balance(&alice.id).await.unwrap(), Money::from_cents(3600));
    assert_eq!(t.db().ledger().list(Some(&alice.id)).await.unwrap().len(), RACERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_races_pay() {
    let t = file_engine(4).await;
    let alice = t.user(10_000, 3.0).await;
    let car = t.car(1000).await;

    let booked = t
        .engine
        .create_rental(&alice.id, &car.id, at(1), at(3))
        .await
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let pay = {
        let engine = t.engine.clone();
        let barrier = barrier.clone();
        let (id, actor) = (booked.rental_id.clone(), owner(&alice));
        tokio::spawn(async move {
            barrier.wait().await;
            engine.pay_rental(&id, &actor).await
        })
    };
    let cancel = {
        let engine = t.engine.clone();
        let barrier = barrier.clone();
        let (id, actor) = (booked.rental_id.clone(), owner(&alice));
        tokio::spawn(async move {
            barrier.wait().await;
            engine.cancel_rental(&id, &actor).await
        })
    };

    let pay = pay.await.unwrap();
    let cancel = cancel.await.unwrap();

    // Exactly one wins; the loser sees the winner's status.
    assert!(pay.is_ok() != cancel.is_ok());
    let rental = t
        .engine
        .get_rental(&owner(&alice), &booked.rental_id)
        .await
        .unwrap();
    let balance = t.engine.balance(&alice.id).await.unwrap();
    if pay.is_ok() {
        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(cancel.unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(balance, Money::from_cents(8000));
        assert_eq!(t.car_status(&car.id).await, CarStatus::Booked);
    } else {
        assert_eq!(rental.status, RentalStatus::Cancelled);
        assert_eq!(pay.unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(balance, Money::from_cents(10_000));
        assert_eq!(t.car_status(&car.id).await, CarStatus::Available);
    }
    t.assert_consistent().await;
}
