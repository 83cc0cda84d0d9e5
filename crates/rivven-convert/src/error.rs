//! Error types for rivven-convert
//!
//! Errors are classified by how far they propagate:
//! - Field-scoped errors (oversized large objects, driver access failures,
//!   rejected values) only lose one field of one record
//! - Column-scoped errors (unsupported types) drop a column from the schema
//! - Default-value parse failures fail schema construction unless the
//!   converter is configured to ignore them

use std::fmt;
use thiserror::Error;

/// Result type for rivven-convert operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Vendor type with no logical mapping
    UnsupportedType,
    /// Large object too long to materialize
    LargeObject,
    /// Failure reported by the data-access layer
    DriverAccess,
    /// Default literal could not be parsed
    DefaultValue,
    /// Value rejected by a record schema
    Schema,
    /// Configuration error
    Configuration,
}

impl ErrorCategory {
    /// Whether errors in this category only affect a single field of a record
    #[inline]
    pub const fn is_field_scoped(self) -> bool {
        matches!(self, Self::LargeObject | Self::DriverAccess | Self::Schema)
    }
}

/// Main error type for rivven-convert
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Vendor type code has no logical-type mapping
    #[error("unsupported type: vendor type code {code}")]
    UnsupportedType { code: i32 },

    /// Large object length exceeds the materialization limit
    #[error("large object of {length} units exceeds the maximum of {max}")]
    OversizedLargeObject { length: u64, max: u64 },

    /// Data-access failure while reading metadata or a column value
    #[error("driver access error: {message}")]
    DriverAccess {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Sanitized default literal does not parse as the field's logical type
    #[error("invalid default {value:?} for column {column} ({target}): {message}")]
    DefaultParse {
        column: String,
        value: String,
        target: String,
        message: String,
    },

    /// Value does not match the record schema
    #[error("field {field}: {message}")]
    FieldMismatch { field: String, message: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedType { .. } => ErrorCategory::UnsupportedType,
            Self::OversizedLargeObject { .. } => ErrorCategory::LargeObject,
            Self::DriverAccess { .. } => ErrorCategory::DriverAccess,
            Self::DefaultParse { .. } => ErrorCategory::DefaultValue,
            Self::FieldMismatch { .. } => ErrorCategory::Schema,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    /// Whether this error only affects a single field of a record
    #[inline]
    pub fn is_field_scoped(&self) -> bool {
        self.category().is_field_scoped()
    }

    /// Create a driver access error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::DriverAccess {
            message: message.into(),
            source: None,
        }
    }

    /// Create a driver access error with source
    pub fn driver_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DriverAccess {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a default-value parse error
    pub fn default_parse(
        column: impl Into<String>,
        value: impl Into<String>,
        target: impl fmt::Display,
        message: impl fmt::Display,
    ) -> Self {
        Self::DefaultParse {
            column: column.into(),
            value: value.into(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a field mismatch error
    pub fn field_mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldMismatch {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType => write!(f, "unsupported_type"),
            Self::LargeObject => write!(f, "large_object"),
            Self::DriverAccess => write!(f, "driver_access"),
            Self::DefaultValue => write!(f, "default_value"),
            Self::Schema => write!(f, "schema"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}
