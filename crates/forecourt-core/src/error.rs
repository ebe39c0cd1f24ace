//! # Error Types
//!
//! Domain-specific error types for forecourt-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  forecourt-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  forecourt-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── StationError     - What services return (Core | Db)               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StationError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::volume::Volume;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Delete refused because other records still reference this one.
    ///
    /// ## When This Occurs
    /// - Deleting a pump or product that appears in sale history
    /// - Deleting a container that still feeds a pump
    #[error(
        "Cannot delete {entity} {id}: referenced by {count} {dependent} record(s){}",
        latest_suffix(.latest)
    )]
    ReferentialIntegrity {
        entity: String,
        id: String,
        dependent: String,
        count: i64,
        latest: Option<DateTime<Utc>>,
    },

    /// The pump counter moved since the caller read it.
    ///
    /// ## User Workflow
    /// ```text
    /// Operator A reads Pump A: 4250 L    Operator B reads Pump A: 4250 L
    ///      │                                  │
    ///      ▼                                  ▼
    /// records 4300 L → committed         records 4310 L
    ///                                         │
    ///                                         ▼
    ///                  StaleCounter { expected: 4250, actual: 4300 }
    ///                                         │
    ///                                         ▼
    ///                  UI reloads the pump and asks again
    /// ```
    #[error("Counter for pump {pump_id} changed: expected {expected}, found {actual}")]
    StaleCounter {
        pump_id: String,
        expected: Volume,
        actual: Volume,
    },

    /// Optimistic version check failed on update.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    /// A pump was attached to a container holding a different fuel.
    #[error("Pump dispenses {pump_fuel} but container holds {container_fuel}")]
    FuelTypeMismatch {
        pump_fuel: String,
        container_fuel: String,
    },

    /// Insufficient stock to complete a sale or adjustment.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// No price is posted for a fuel type.
    #[error("No fuel price configured for {fuel_type}")]
    FuelPriceMissing { fuel_type: String },

    /// Refill requested for a container with no headroom.
    #[error("Container {container_id} is already full")]
    ContainerFull { container_id: String },

    /// Checkout requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Product is not a line in the cart.
    #[error("Product {0} not in cart")]
    NotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error for a given entity type and ID.
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

fn latest_suffix(latest: &Option<DateTime<Utc>>) -> String {
    match latest {
        Some(at) => format!(", most recent {}", at.format("%Y-%m-%d %H:%M")),
        None => String::new(),
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A new counter reading does not advance the recorded one.
    #[error("New counter {new} must be greater than current counter {previous}")]
    CounterNotIncreasing { previous: Volume, new: Volume },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
