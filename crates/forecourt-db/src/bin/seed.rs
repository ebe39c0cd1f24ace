//! # Seed Data Generator
//!
//! Populates the database with a demo station for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./forecourt.db (or FORECOURT_DATABASE_PATH)
//! cargo run -p forecourt-db --bin seed
//!
//! # Specify database path
//! cargo run -p forecourt-db --bin seed -- --db ./data/station.db
//!
//! # Verbose logging
//! RUST_LOG=forecourt_db=debug cargo run -p forecourt-db --bin seed
//! ```
//!
//! ## Generated Station
//! - Three tanks: Regular, Premium, Diesel
//! - Six pumps (A-F), Pump D inactive
//! - Posted prices for every fuel
//! - Shop categories and a handful of products

use std::env;
use std::path::PathBuf;

use forecourt_core::{Money, NewCategory, NewContainer, NewProduct, NewPump, Volume};
use forecourt_db::{Database, StationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// (name, fuel type, capacity L, level L)
const TANKS: &[(&str, &str, i64, i64)] = &[
    ("Tank 1", "Regular", 10_000, 7_500),
    ("Tank 2", "Premium", 8_000, 6_200),
    ("Tank 3", "Diesel", 5_000, 3_800),
];

/// (name, tank index, total L, today L, active)
const PUMPS: &[(&str, usize, i64, i64, bool)] = &[
    ("Pump A", 0, 4_250, 180, true),
    ("Pump B", 0, 3_890, 145, true),
    ("Pump C", 1, 5_120, 220, true),
    ("Pump D", 1, 2_340, 0, false),
    ("Pump E", 2, 6_780, 310, true),
    ("Pump F", 2, 4_560, 195, true),
];

/// (fuel type, cents per litre)
const PRICES: &[(&str, i64)] = &[("Regular", 145), ("Premium", 165), ("Diesel", 152)];

const CATEGORIES: &[(&str, &str)] = &[
    ("Beverages", "Cold drinks and coffee"),
    ("Snacks", "Chips, candy and bars"),
    ("Automotive", "Oil, fluids and accessories"),
];

/// (barcode, name, category, cost cents, price cents, stock, min stock)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64, i64)] = &[
    ("5449000000996", "Coca-Cola 500ml", "Beverages", 90, 199, 48, 12),
    ("5000112637922", "Bottled Water 1L", "Beverages", 40, 129, 60, 12),
    ("0028400090896", "Potato Chips", "Snacks", 70, 179, 30, 10),
    ("0040000424314", "Chocolate Bar", "Snacks", 55, 149, 8, 10),
    ("0071924140016", "Motor Oil 1L", "Automotive", 600, 899, 15, 5),
    ("0079118000034", "Windshield Fluid 4L", "Automotive", 300, 549, 3, 4),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StationConfig::load()?;
    // Prices are what we're about to seed.
    config.verify_fuel_prices = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Forecourt Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: FORECOURT_DATABASE_PATH or ./forecourt.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    println!("⛽ Forecourt Seed Data Generator");
    println!("================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::open(&config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.pumps().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} pumps", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Tanks
    let mut tank_ids = Vec::with_capacity(TANKS.len());
    for (name, fuel, capacity_l, level_l) in TANKS {
        let tank = db
            .containers()
            .insert(&NewContainer {
                name: name.to_string(),
                fuel_type: fuel.to_string(),
                capacity_ml: Volume::from_liters(*capacity_l).milliliters(),
                current_level_ml: Volume::from_liters(*level_l).milliliters(),
            })
            .await?;
        println!("  {} {}: {} / {}", tank.name, tank.fuel_type, tank.current_level(), tank.capacity());
        tank_ids.push((tank.id, fuel.to_string()));
    }

    // Pumps
    for (name, tank_idx, total_l, today_l, active) in PUMPS {
        let (tank_id, fuel) = &tank_ids[*tank_idx];
        let pump = db
            .pumps()
            .insert(&NewPump {
                name: name.to_string(),
                container_id: Some(tank_id.clone()),
                fuel_type: fuel.clone(),
                total_counter_ml: Volume::from_liters(*total_l).milliliters(),
                is_active: *active,
            })
            .await?;

        // Today's throughput is normally accumulated by reconciliation.
        sqlx::query("UPDATE pumps SET daily_counter_ml = ?2 WHERE id = ?1")
            .bind(&pump.id)
            .bind(Volume::from_liters(*today_l).milliliters())
            .execute(db.pool())
            .await?;

        println!(
            "  {} ({}): counter {}{}",
            pump.name,
            pump.fuel_type,
            pump.total_counter(),
            if *active { "" } else { " [inactive]" }
        );
    }

    // Prices
    for (fuel, cents) in PRICES {
        db.fuel_prices().upsert(fuel, Money::from_cents(*cents)).await?;
    }
    db.verify_fuel_prices().await?;
    println!("✓ Fuel prices posted");

    // Shop
    for (name, description) in CATEGORIES {
        db.categories()
            .insert(&NewCategory {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
    }

    for (barcode, name, category, cost, price, stock, min) in PRODUCTS {
        db.products()
            .insert(&NewProduct {
                barcode: barcode.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                cost_price_cents: *cost,
                sale_price_cents: *price,
                current_stock: *stock,
                min_stock_level: *min,
            })
            .await?;
    }

    let low = db.products().list_low_stock().await?;
    println!(
        "✓ {} products, {} low on stock",
        db.products().count().await?,
        low.len()
    );

    info!(pumps = PUMPS.len(), tanks = TANKS.len(), "Seed complete");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
