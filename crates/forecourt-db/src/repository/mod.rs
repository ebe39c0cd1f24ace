//! # Repository Module
//!
//! Single-table access for Forecourt.
//!
//! ## Layout of Each Repository
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  repository/pump.rs                                                     │
//! │                                                                         │
//! │  pub(crate) async fn fetch(executor, id)          ┐                     │
//! │  pub(crate) async fn advance_counter(executor..)  ├─ executor-generic:  │
//! │  pub(crate) async fn reset_daily(executor, now)   ┘  pool or &mut *tx   │
//! │                                                                         │
//! │  pub struct PumpRepository { pool }                                    │
//! │  ├── list / get_by_id / list_by_container                              │
//! │  ├── insert / update / set_active                                      │
//! │  └── delete ──► IntegrityService (guarded)                             │
//! │                                                                         │
//! │  Services in `crate::service` reuse the executor-generic helpers       │
//! │  inside their transactions.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PumpRepository`] - Pumps and their counters
//! - [`ContainerRepository`] - Fuel tanks
//! - [`SaleRepository`] - Fuel and product sales
//! - [`ProductRepository`] - Shop products and stock
//! - [`CategoryRepository`] - Product categories
//! - [`ExpenseRepository`] - Operating expenses
//! - [`FuelPriceRepository`] - Posted fuel prices
//! - [`PurchaseRepository`] - Fuel deliveries

pub mod category;
pub mod container;
pub mod expense;
pub mod fuel_price;
pub mod product;
pub mod pump;
pub mod purchase;
pub mod sale;

pub use category::CategoryRepository;
pub use container::ContainerRepository;
pub use expense::ExpenseRepository;
pub use fuel_price::FuelPriceRepository;
pub use product::ProductRepository;
pub use pump::PumpRepository;
pub use purchase::PurchaseRepository;
pub use sale::SaleRepository;
