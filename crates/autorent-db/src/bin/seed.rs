//! # Seed Data Generator
//!
//! Populates a store with a demo fleet and a handful of accounts.
//!
//! ## Usage
//! ```bash
//! # 30 cars (default)
//! cargo run -p autorent-db --bin seed
//!
//! # Custom fleet size and database path
//! cargo run -p autorent-db --bin seed -- --cars 100 --db ./data/autorent.db
//! ```
//!
//! ## Generated Data
//! - Cars cycle through economy, business and luxury models with
//!   deterministic rates and ratings
//! - Four users covering every pricing tier and role:
//!   an admin, a loyal client, a standard corporate account, a risky client

use std::env;

use autorent_core::{CarCategory, Money, Role};
use autorent_db::{Database, DbConfig, NewCar, NewUser};

/// Models per category, with the base hourly rate in cents.
const FLEET: &[(CarCategory, &[(&str, &str)], i64)] = &[
    (
        CarCategory::Economy,
        &[
            ("Toyota", "Yaris"),
            ("Kia", "Rio"),
            ("Hyundai", "i20"),
            ("Renault", "Clio"),
            ("Volkswagen", "Polo"),
        ],
        900,
    ),
    (
        CarCategory::Business,
        &[
            ("Skoda", "Superb"),
            ("Toyota", "Camry"),
            ("Volkswagen", "Passat"),
            ("Audi", "A4"),
        ],
        1800,
    ),
    (
        CarCategory::Luxury,
        &[
            ("BMW", "7 Series"),
            ("Mercedes-Benz", "S-Class"),
            ("Porsche", "Panamera"),
        ],
        4500,
    ),
];

/// `(display name, role, balance in cents, rating)`
const USERS: &[(&str, Role, i64, f64)] = &[
    ("Fleet Admin", Role::Admin, 0, 0.0),
    ("Loyal Client", Role::Client, 500_000, 4.8),
    ("Acme Corp", Role::Corporate, 2_000_000, 3.5),
    ("Risky Client", Role::Client, 20_000, 1.5),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut cars: usize = 30;
    let mut db_path = String::from("./autorent_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--cars" | "-c" => {
                if i + 1 < args.len() {
                    cars = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("AutoRent Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --cars <N>     Number of cars to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./autorent_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 AutoRent Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Cars:     {}", cars);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.cars().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} cars", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating users...");
    for (name, role, balance, rating) in USERS {
        let user = db
            .users()
            .insert(&NewUser {
                display_name: (*name).to_string(),
                role: *role,
                balance: Money::from_cents(*balance),
                rating: *rating,
            })
            .await?;
        println!("  {:<14} {:<10} {}  ({})", name, role.as_str(), user.balance(), user.id);
    }

    println!();
    println!("Generating fleet...");
    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..cars {
        let car = generate_car(seed);
        if let Err(e) = db.cars().insert(&car).await {
            eprintln!("Failed to insert {} {}: {}", car.make, car.model, e);
            continue;
        }
        generated += 1;
    }

    println!("✓ Generated {} cars in {:?}", generated, start.elapsed());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Picks a model round-robin across categories and varies its rate and rating.
fn generate_car(seed: usize) -> NewCar {
    let (category, models, base_rate) = FLEET[seed % FLEET.len()];
    let (make, model) = models[(seed / FLEET.len()) % models.len()];

    // +0..=5.00 per hour on top of the category base
    let rate_cents = base_rate + ((seed * 37) % 501) as i64;
    // 3.0 ..= 5.0 in tenths
    let rating = 3.0 + ((seed * 7) % 21) as f64 / 10.0;

    NewCar {
        make: make.to_string(),
        model: model.to_string(),
        category,
        hourly_rate: Money::from_cents(rate_cents),
        rating,
    }
}
