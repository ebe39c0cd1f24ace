//! # Domain Types
//!
//! Core domain types used throughout Forecourt.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Container     │◄──│      Pump       │◄──│      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  capacity_ml    │   │  container_id   │   │  sale_type      │       │
//! │  │  current_level  │   │  total_counter  │   │  pump_id        │       │
//! │  │  fuel_type      │   │  daily_counter  │   │  product_id ──┐ │       │
//! │  │  avg_cost       │   │  fuel_type      │   │  total_cents  │ │       │
//! │  └─────────────────┘   └─────────────────┘   └───────────────┼─┘       │
//! │                                                              │         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌───────────────▼─┐       │
//! │  │   FuelPrice     │   │    Expense      │   │    Product      │       │
//! │  │  fuel_type (PK) │   │  category       │   │  barcode        │       │
//! │  │  cents / litre  │   │  amount_cents   │   │  current_stock  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units
//! Every `*_ml` field is millilitres and every `*_cents` field is cents.
//! Accessors return [`Volume`] and [`Money`] so callers never mix them up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_barcode, validate_fuel_type, validate_name, validate_non_negative,
    validate_optional_text, validate_positive, validate_price_cents, validate_uuid,
    ValidationResult,
};
use crate::volume::Volume;

// =============================================================================
// Container
// =============================================================================

/// A fuel storage tank feeding one or more pumps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub fuel_type: String,

    /// Maximum volume the tank holds.
    pub capacity_ml: i64,

    /// Current level. Negative when pumps dispensed more than was delivered.
    pub current_level_ml: i64,

    /// Running weighted-average purchase cost of the fuel in the tank.
    pub avg_cost_cents_per_liter: i64,

    /// Optimistic concurrency token, bumped on every write.
    pub version: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Container {
    #[inline]
    pub fn capacity(&self) -> Volume {
        Volume::from_milliliters(self.capacity_ml)
    }

    #[inline]
    pub fn current_level(&self) -> Volume {
        Volume::from_milliliters(self.current_level_ml)
    }

    #[inline]
    pub fn avg_cost_per_liter(&self) -> Money {
        Money::from_cents(self.avg_cost_cents_per_liter)
    }

    /// Room left before the tank is full. A negative level counts as empty.
    pub fn headroom(&self) -> Volume {
        let room = self.capacity() - self.current_level().non_negative();
        room.non_negative()
    }

    /// Volume dispensed beyond what the tank held, if any.
    pub fn shortfall(&self) -> Option<Volume> {
        if self.current_level_ml < 0 {
            Some(-self.current_level())
        } else {
            None
        }
    }

    /// Fill level as a percentage, clamped to 0..=100. Display only.
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity_ml <= 0 {
            return 0.0;
        }
        let pct = self.current_level_ml as f64 / self.capacity_ml as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }
}

// =============================================================================
// Pump
// =============================================================================

/// A fuel dispenser with an odometer-style counter.
///
/// ## Counter Lifecycle
/// ```text
///   total_counter: 4250 L ──reconcile(4300)──► 4300 L   (never decreases)
///   daily_counter:  180 L ──reconcile(4300)──►  230 L
///                                │
///                          daily reset
///                                ▼
///   daily_counter:    0 L   total_counter unchanged
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Pump {
    pub id: String,
    pub name: String,

    /// Tank this pump draws from. A pump without a tank still records sales.
    pub container_id: Option<String>,

    pub fuel_type: String,

    /// Cumulative volume dispensed over the pump's lifetime.
    pub total_counter_ml: i64,

    /// Volume dispensed since the last daily reset.
    pub daily_counter_ml: i64,

    pub is_active: bool,
    pub version: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Pump {
    #[inline]
    pub fn total_counter(&self) -> Volume {
        Volume::from_milliliters(self.total_counter_ml)
    }

    #[inline]
    pub fn daily_counter(&self) -> Volume {
        Volume::from_milliliters(self.daily_counter_ml)
    }
}

// =============================================================================
// Sale Type
// =============================================================================

/// What a sale was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    /// Fuel dispensed through a pump, quantity in millilitres.
    Fuel,
    /// Shop product sold at the POS, quantity in units.
    Product,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Check,
    /// Sale derived from a pump counter reading rather than a till payment.
    FuelCounter,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once written.
///
/// `total_cents` is always derived from quantity and unit price; callers
/// never supply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub sale_type: SaleType,
    pub pump_id: Option<String>,
    pub product_id: Option<String>,

    /// Millilitres for fuel, units for products.
    pub quantity: i64,

    /// Cents per litre for fuel, cents per unit for products.
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Builds a fuel sale for a dispensed volume.
    pub fn fuel(
        pump_id: impl Into<String>,
        volume: Volume,
        price_per_liter: Money,
        payment_method: PaymentMethod,
    ) -> Self {
        Sale {
            id: Uuid::new_v4().to_string(),
            sale_type: SaleType::Fuel,
            pump_id: Some(pump_id.into()),
            product_id: None,
            quantity: volume.milliliters(),
            unit_price_cents: price_per_liter.cents(),
            total_cents: volume.priced_at(price_per_liter).cents(),
            payment_method,
            created_at: Utc::now(),
        }
    }

    /// Builds a product sale for a number of units.
    pub fn product(
        product_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        payment_method: PaymentMethod,
    ) -> Self {
        Sale {
            id: Uuid::new_v4().to_string(),
            sale_type: SaleType::Product,
            pump_id: None,
            product_id: Some(product_id.into()),
            quantity,
            unit_price_cents: unit_price.cents(),
            total_cents: unit_price.multiply_quantity(quantity).cents(),
            payment_method,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Dispensed volume. `None` for product sales.
    pub fn volume(&self) -> Option<Volume> {
        match self.sale_type {
            SaleType::Fuel => Some(Volume::from_milliliters(self.quantity)),
            SaleType::Product => None,
        }
    }
}

/// A sale joined with the display name of its pump or product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecentSale {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sale: Sale,
    pub pump_name: Option<String>,
    pub product_name: Option<String>,
}

impl RecentSale {
    /// Pump name for fuel, product name for shop items.
    pub fn item_name(&self) -> &str {
        self.pump_name
            .as_deref()
            .or(self.product_name.as_deref())
            .unwrap_or("Unknown")
    }
}

// =============================================================================
// Product
// =============================================================================

/// A shop item sold at the POS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Scanned at the till. Unique.
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    pub current_stock: i64,
    pub min_stock_level: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Checks if the product is at or below its reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock_level
    }

    /// Inventory badge shown next to the product.
    ///
    /// ```text
    ///   stock ≤ min          → Low
    ///   stock ≤ 1.5 × min    → Medium
    ///   otherwise            → Good
    /// ```
    pub fn stock_status(&self) -> StockStatus {
        if self.current_stock <= self.min_stock_level {
            StockStatus::Low
        } else if self.current_stock * 2 <= self.min_stock_level * 3 {
            StockStatus::Medium
        } else {
            StockStatus::Good
        }
    }

    /// Checks if a quantity can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Low,
    Medium,
    Good,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub description: String,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub receipt_number: Option<String>,
    pub vendor: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Expense total for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryTotal {
    pub category: String,
    pub total_cents: i64,
    pub count: i64,
}

// =============================================================================
// Fuel Price
// =============================================================================

/// Posted selling price for one fuel type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FuelPrice {
    pub fuel_type: String,
    pub price_cents_per_liter: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl FuelPrice {
    #[inline]
    pub fn price_per_liter(&self) -> Money {
        Money::from_cents(self.price_cents_per_liter)
    }
}

// =============================================================================
// Fuel Purchase
// =============================================================================

/// A delivery of fuel into a container.
///
/// `volume_ml` is what the tank accepted; `requested_volume_ml` is what was
/// ordered. The difference is overflow that did not fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FuelPurchase {
    pub id: String,
    pub container_id: String,
    pub volume_ml: i64,
    pub requested_volume_ml: i64,
    pub cost_cents_per_liter: i64,
    pub total_cents: i64,
    pub supplier: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl FuelPurchase {
    #[inline]
    pub fn volume(&self) -> Volume {
        Volume::from_milliliters(self.volume_ml)
    }

    #[inline]
    pub fn overflow(&self) -> Volume {
        Volume::from_milliliters(self.requested_volume_ml - self.volume_ml)
    }
}

// =============================================================================
// Input Types
// =============================================================================
//
// Payloads for creating and editing records. Ids, timestamps, counters and
// versions are assigned by the database layer.

/// Payload for creating or editing a container.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewContainer {
    pub name: String,
    pub fuel_type: String,
    pub capacity_ml: i64,
    /// Starting level on create. Ignored on edit; only refills move it.
    #[serde(default)]
    pub current_level_ml: i64,
}

impl NewContainer {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name, 100)?;
        validate_fuel_type(&self.fuel_type)?;
        validate_positive("capacity", self.capacity_ml)?;
        validate_non_negative("current_level", self.current_level_ml)?;
        if self.current_level_ml > self.capacity_ml {
            return Err(ValidationError::OutOfRange {
                field: "current_level".to_string(),
                min: 0,
                max: self.capacity_ml,
            });
        }
        Ok(())
    }
}

/// Payload for creating or editing a pump.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPump {
    pub name: String,
    pub container_id: Option<String>,
    pub fuel_type: String,
    /// Opening counter on create. Ignored on edit.
    #[serde(default)]
    pub total_counter_ml: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl NewPump {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name, 100)?;
        validate_fuel_type(&self.fuel_type)?;
        validate_non_negative("total_counter", self.total_counter_ml)?;
        if let Some(container_id) = &self.container_id {
            validate_uuid(container_id)?;
        }
        Ok(())
    }
}

/// Payload for creating or editing a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    pub current_stock: i64,
    pub min_stock_level: i64,
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_barcode(&self.barcode)?;
        validate_name("name", &self.name, 200)?;
        validate_name("category", &self.category, 100)?;
        validate_price_cents("cost_price", self.cost_price_cents)?;
        validate_price_cents("sale_price", self.sale_price_cents)?;
        validate_non_negative("current_stock", self.current_stock)?;
        validate_non_negative("min_stock_level", self.min_stock_level)?;
        Ok(())
    }
}

/// Payload for creating or editing a category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name, 100)?;
        validate_optional_text("description", self.description.as_deref(), 500)
    }
}

/// Payload for recording or editing an expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub category: String,
    pub description: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub receipt_number: Option<String>,
    pub vendor: Option<String>,
}

impl NewExpense {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("category", &self.category, 100)?;
        validate_name("description", &self.description, 500)?;
        validate_positive("amount", self.amount_cents)?;
        validate_optional_text("receipt_number", self.receipt_number.as_deref(), 100)?;
        validate_optional_text("vendor", self.vendor.as_deref(), 200)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
