//! # Service Module
//!
//! Operations that touch more than one table and must commit or roll back
//! as a unit.
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Operation = One Transaction                      │
//! │                                                                         │
//! │  Service method                                                        │
//! │       │                                                                 │
//! │       │  let mut tx = pool.begin()                                     │
//! │       ▼                                                                 │
//! │  repository helpers called with &mut *tx                               │
//! │  (pump::advance_counter, container::deplete, sale::insert, ...)        │
//! │       │                                                                 │
//! │       ├── any Err(_) → tx dropped → ROLLBACK                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.commit()                                                           │
//! │                                                                         │
//! │  Never touch the pool while a transaction is open: the in-memory       │
//! │  test database has exactly one connection.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Services
//!
//! - [`CounterService`] - Pump counter reconciliation and daily reset
//! - [`RefillService`] - Container deliveries
//! - [`IntegrityService`] - Guarded deletes
//! - [`CheckoutService`] - POS cart checkout
//! - [`ReportService`] - Dashboard and report aggregates

pub mod checkout;
pub mod counter;
pub mod integrity;
pub mod refill;
pub mod reports;

pub use checkout::CheckoutService;
pub use counter::CounterService;
pub use integrity::IntegrityService;
pub use refill::RefillService;
pub use reports::ReportService;
