//! # forecourt-core: Pure Business Logic for Forecourt
//!
//! This crate holds the fuel-station domain: pumps, containers (tanks),
//! sales, products and expenses, plus the arithmetic that turns a pump
//! counter reading into a fuel sale. There is no I/O here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Forecourt Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard Frontend                           │   │
//! │  │   Pumps ──► Counter Reading ──► POS ──► Expenses ──► Reports    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ forecourt-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌──────────────┐ ┌───────────┐   │   │
//! │  │   │   types   │ │  money    │ │reconciliation│ │ validation│   │   │
//! │  │   │   Pump    │ │  volume   │ │   refill     │ │   rules   │   │   │
//! │  │   │ Container │ │           │ │   cart       │ │           │   │   │
//! │  │   └───────────┘ └───────────┘ └──────────────┘ └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                forecourt-db (Database Layer)                    │   │
//! │  │     SQLite repositories, transactional services, migrations     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Pump, Container, Sale, Product, Expense, ...)
//! - [`money`] - Money in integer cents
//! - [`volume`] - Fuel volume in integer millilitres
//! - [`reconciliation`] - Counter reading → dispensed volume and revenue
//! - [`refill`] - Container replenishment with weighted-average cost
//! - [`cart`] - POS cart math
//! - [`report`] - Dashboard aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use forecourt_core::{Money, Volume};
//! use forecourt_core::reconciliation::compute_dispense;
//!
//! let previous = Volume::from_liters(4250);
//! let new = Volume::from_liters(4300);
//! let price = Money::from_cents(145); // $1.45 per litre
//!
//! let dispense = compute_dispense(previous, new, price).unwrap();
//! assert_eq!(dispense.volume_dispensed, Volume::from_liters(50));
//! assert_eq!(dispense.revenue.cents(), 7250);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod reconciliation;
pub mod refill;
pub mod report;
pub mod types;
pub mod validation;
pub mod volume;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use volume::Volume;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Expense category recorded for every container refill.
pub const FUEL_PURCHASE_CATEGORY: &str = "Fuel Purchase";

/// Expense categories offered by the dashboard.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Utilities",
    "Maintenance",
    "Inventory",
    "Insurance",
    FUEL_PURCHASE_CATEGORY,
    "Salaries",
    "Marketing",
    "Office Supplies",
    "Other",
];

/// Maximum lines allowed in a single POS cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product line in the cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
