//! # forecourt-db: Database Layer for Forecourt
//!
//! Persistence and transactional operations for the station back office,
//! on SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Forecourt Data Flow                              │
//! │                                                                         │
//! │  Dashboard action (record counter reading)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   forecourt-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌────────────────────┐ │   │
//! │  │   │   Database    │  │   Services    │  │   Repositories     │ │   │
//! │  │   │   (pool.rs)   │  │  counter      │  │  pump, container   │ │   │
//! │  │   │               │──│  refill       │──│  sale, product     │ │   │
//! │  │   │ SqlitePool    │  │  integrity    │  │  category, expense │ │   │
//! │  │   │ migrations    │  │  checkout     │  │  fuel_price        │ │   │
//! │  │   │ config        │  │  reports      │  │  purchase          │ │   │
//! │  │   └───────────────┘  └───────────────┘  └────────────────────┘ │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │             FORECOURT_DATABASE_PATH (./forecourt.db)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the `Database` handle
//! - [`config`] - Environment configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - `DbError`, `StationError` and `ErrorKind`
//! - [`repository`] - Single-table repositories
//! - [`service`] - Multi-table operations, one transaction each
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forecourt_db::{Database, StationConfig};
//! use forecourt_core::reconciliation::CounterReading;
//!
//! let db = Database::open(&StationConfig::load()?).await?;
//!
//! let pump = db.pumps().get_by_id(&pump_id).await?.unwrap();
//! let reading = CounterReading::new(&pump.id, pump.total_counter(), new_counter);
//! let result = db.counters().reconcile_at_posted_price(&reading).await?;
//! println!("{} sold for {}", result.volume_dispensed, result.revenue);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StationConfig};
pub use error::{DbError, DbResult, ErrorKind, ErrorResponse, StationError, StationResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    CategoryRepository, ContainerRepository, ExpenseRepository, FuelPriceRepository,
    ProductRepository, PumpRepository, PurchaseRepository, SaleRepository,
};
pub use service::{
    CheckoutService, CounterService, IntegrityService, RefillService, ReportService,
};
