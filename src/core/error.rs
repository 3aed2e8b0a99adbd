//! Typed error handling for the metadata backend
//!
//! This module provides the error hierarchy returned by every operation so
//! that callers can match on the specific failure instead of a generic
//! `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`EntityError`]: lookups that found no row in the required state
//! - [`ValidationError`]: malformed or missing attributes
//! - [`ImportError`]: a rejected CSV batch
//! - [`StorageError`]: persistence and transaction failures
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match service.soft_delete(&id).await {
//!     Ok(report) => println!("{} rows deleted", report.affected()),
//!     Err(MetaError::Entity(EntityError::AlreadyDeleted { .. })) => {}
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::core::entity::EntityKind;

/// The main error type of the metadata backend
#[derive(Debug)]
pub enum MetaError {
    /// Row lookup / state precondition errors
    Entity(EntityError),

    /// Validation errors
    Validation(ValidationError),

    /// CSV import rejected as a whole
    Import(ImportError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaError::Entity(e) => write!(f, "{}", e),
            MetaError::Validation(e) => write!(f, "{}", e),
            MetaError::Import(e) => write!(f, "{}", e),
            MetaError::Storage(e) => write!(f, "{}", e),
            MetaError::Config(e) => write!(f, "{}", e),
            MetaError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for MetaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetaError::Entity(e) => Some(e),
            MetaError::Validation(e) => Some(e),
            MetaError::Import(e) => Some(e),
            MetaError::Storage(e) => Some(e),
            MetaError::Config(e) => Some(e),
            MetaError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl MetaError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            MetaError::Entity(e) => e.status_code(),
            MetaError::Validation(_) => StatusCode::BAD_REQUEST,
            MetaError::Import(_) => StatusCode::BAD_REQUEST,
            MetaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MetaError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MetaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            MetaError::Entity(e) => e.error_code(),
            MetaError::Validation(_) => "VALIDATION_ERROR",
            MetaError::Import(_) => "IMPORT_REJECTED",
            MetaError::Storage(_) => "STORAGE_ERROR",
            MetaError::Config(_) => "CONFIG_ERROR",
            MetaError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            MetaError::Entity(
                EntityError::NotFound { kind, id }
                | EntityError::AlreadyDeleted { kind, id }
                | EntityError::NotDeleted { kind, id },
            ) => Some(serde_json::json!({
                "entity_type": kind.singular(),
                "id": id,
            })),
            MetaError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            MetaError::Import(ImportError { rows, .. }) => {
                Some(serde_json::json!({ "rows": rows }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for MetaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors raised when no row matches an id in the required deletion state
#[derive(Debug)]
pub enum EntityError {
    /// No row with this id exists (or it is not active, for reads and updates)
    NotFound { kind: EntityKind, id: String },

    /// Soft delete requested on a row that is already deleted
    AlreadyDeleted { kind: EntityKind, id: String },

    /// Restore requested on a row that is not deleted
    NotDeleted { kind: EntityKind, id: String },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { kind, id } => {
                write!(f, "{} with id '{}' not found", kind, id)
            }
            EntityError::AlreadyDeleted { kind, id } => {
                write!(f, "{} with id '{}' not found or already deleted", kind, id)
            }
            EntityError::NotDeleted { kind, id } => {
                write!(f, "{} with id '{}' not found or not deleted", kind, id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    /// All three variants are scoped forms of "not found"
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyDeleted { .. } => "ENTITY_ALREADY_DELETED",
            EntityError::NotDeleted { .. } => "ENTITY_NOT_DELETED",
        }
    }
}

impl From<EntityError> for MetaError {
    fn from(err: EntityError) -> Self {
        MetaError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Missing required argument
    MissingArgument { argument: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::MissingArgument { argument } => {
                write!(f, "Missing required argument: {}", argument)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for MetaError {
    fn from(err: ValidationError) -> Self {
        MetaError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldValidationError {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for MetaError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MetaError::Validation(errors.into())
    }
}

// =============================================================================
// Import Errors
// =============================================================================

/// A CSV batch rejected in full; no row of it was written
#[derive(Debug)]
pub struct ImportError {
    pub kind: EntityKind,
    pub rows: Vec<RowError>,
}

/// Why one CSV row was rejected
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based line number in the file, header included
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} import rejected: {} invalid row(s)",
            self.kind,
            self.rows.len()
        )?;
        if let Some(first) = self.rows.first() {
            write!(f, " (line {}: {})", first.line, first.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ImportError {}

impl From<ImportError> for MetaError {
    fn from(err: ImportError) -> Self {
        MetaError::Import(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Transaction could not be opened or committed
    TransactionError { message: String },

    /// Data integrity error (duplicate id, row of the wrong kind, ...)
    IntegrityError { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::TransactionError { message } => {
                write!(f, "Transaction error: {}", message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for MetaError {
    fn from(err: StorageError) -> Self {
        MetaError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for MetaError {
    fn from(err: ConfigError) -> Self {
        MetaError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for MetaError {
    fn from(err: serde_json::Error) -> Self {
        MetaError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for metadata operations
pub type MetaResult<T> = Result<T, MetaError>;
