//! # Database Error Types
//!
//! Error types for database operations and the services built on them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       │        CoreError (forecourt-core)                              │
//! │       │             │                                                   │
//! │       ▼             ▼                                                   │
//! │  StationError { Core | Db } ← What services return                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  .kind() → ErrorKind ← What callers branch on                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use forecourt_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use ts_rs::TS;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate barcode
    /// - Inserting a duplicate category name
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Pump pointing at a container that does not exist
    /// - Sale pointing at a pump or product that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, overfilled tank, ...).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Maps a failed `begin`/`commit` into a transaction error.
    pub(crate) fn transaction(err: sqlx::Error) -> Self {
        error!(error = %err, "Transaction failed");
        DbError::TransactionFailed(err.to_string())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                //   "CHECK constraint failed: <expr>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    error!(error = %msg, "Database query failed");
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => {
                error!(error = %err, "Internal database error");
                DbError::Internal(err.to_string())
            }
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Station Error
// =============================================================================

/// Error returned by every repository and service operation.
#[derive(Debug, Error)]
pub enum StationError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for StationError {
    fn from(err: ValidationError) -> Self {
        StationError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for StationError {
    fn from(err: sqlx::Error) -> Self {
        StationError::Db(DbError::from(err))
    }
}

/// Coarse category of a [`StationError`], for callers to branch on.
///
/// ## Usage in the Dashboard
/// ```typescript
/// switch (err.kind) {
///   case 'validation':            showForm(err.message); break;
///   case 'referential_integrity': confirmBlocked(err.message); break;
///   case 'conflict':              reloadAndRetry(); break;
///   default:                      showError(err.message);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    ReferentialIntegrity,
    /// A concurrent writer got there first; reload and retry.
    Conflict,
    /// A domain rule refused the operation.
    Business,
    Infrastructure,
}

impl StationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StationError::Core(core) => match core {
                CoreError::Validation(_) => ErrorKind::Validation,
                CoreError::NotFound { .. } => ErrorKind::NotFound,
                CoreError::ReferentialIntegrity { .. } => ErrorKind::ReferentialIntegrity,
                CoreError::StaleCounter { .. } | CoreError::Conflict { .. } => {
                    ErrorKind::Conflict
                }
                CoreError::EmptyCart
                | CoreError::CartTooLarge { .. }
                | CoreError::QuantityTooLarge { .. }
                | CoreError::NotInCart(_) => ErrorKind::Validation,
                CoreError::FuelTypeMismatch { .. }
                | CoreError::InsufficientStock { .. }
                | CoreError::FuelPriceMissing { .. }
                | CoreError::ContainerFull { .. } => ErrorKind::Business,
            },
            StationError::Db(db) => match db {
                DbError::NotFound { .. } => ErrorKind::NotFound,
                DbError::UniqueViolation { .. } | DbError::CheckViolation { .. } => {
                    ErrorKind::Validation
                }
                DbError::ForeignKeyViolation { .. } => ErrorKind::ReferentialIntegrity,
                _ => ErrorKind::Infrastructure,
            },
        }
    }
}

/// Serialized error shape for the dashboard.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&StationError> for ErrorResponse {
    fn from(err: &StationError) -> Self {
        let kind = err.kind();
        let message = match (kind, err) {
            // Don't leak SQL to the UI.
            (ErrorKind::Infrastructure, _) => "Database operation failed".to_string(),
            (_, e) => e.to_string(),
        };
        ErrorResponse { kind, message }
    }
}

/// Result type for station operations.
pub type StationResult<T> = Result<T, StationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use forecourt_core::Volume;

    #[test]
    fn test_kind_mapping() {
        let stale: StationError = CoreError::StaleCounter {
            pump_id: "p".to_string(),
            expected: Volume::from_liters(1),
            actual: Volume::from_liters(2),
        }
        .into();
        assert_eq!(stale.kind(), ErrorKind::Conflict);

        let validation: StationError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(validation.kind(), ErrorKind::Validation);

        let missing: StationError = CoreError::FuelPriceMissing {
            fuel_type: "Diesel".to_string(),
        }
        .into();
        assert_eq!(missing.kind(), ErrorKind::Business);

        let infra: StationError = DbError::PoolExhausted.into();
        assert_eq!(infra.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn test_error_response_hides_infrastructure_details() {
        let err: StationError = DbError::QueryFailed("no such table: pumps".to_string()).into();
        let response = ErrorResponse::from(&err);
        assert_eq!(response.message, "Database operation failed");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "infrastructure");
    }
}
