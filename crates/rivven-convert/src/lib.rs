//! # rivven-convert
//!
//! Converts relational result metadata and rows into typed record schemas and
//! records for the Rivven event streaming platform.
//!
//! The conversion runs in two phases that share one type dispatch table:
//! schema mapping once per result, value extraction once per row. Both phases
//! resolve a column to the same [`mapping::ColumnKind`], so a record always
//! matches the schema built from the same metadata.
//!
//! ## Features
//!
//! - **Default Sanitizing**: catalog default expressions reduced to parseable literals
//! - **Numeric Mapping**: optional collapse of `NUMERIC(p, 0)` to the narrowest integer
//! - **Unsigned Widening**: unsigned integer columns widen to the next signed width
//! - **Large Objects**: BLOB/CLOB/NCLOB/XML materialized with a length limit and
//!   handles always released
//! - **Failure Isolation**: a failing column leaves one field unset, never the row
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivven_convert::prelude::*;
//!
//! let converter = Converter::new(ConverterConfig::new().with_map_numerics(true))?;
//!
//! // Defaults are keyed by column name, as reported by the catalog
//! let mut defaults = HashMap::new();
//! defaults.insert("created".to_string(), "CURRENT_TIMESTAMP".to_string());
//!
//! let schema = converter.convert_schema("users", rows.metadata(), &defaults)?;
//! while rows.next_row() {
//!     let record = converter.convert_record(&schema, &mut rows)?;
//!     println!("{}", record.to_json());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod converter;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod memory;
pub mod numeric;
pub mod record;
pub mod sanitize;
pub mod schema;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Value and type system
    pub use crate::types::{ColumnDescriptor, Nullability, SqlType, Value};

    // Driver traits
    pub use crate::connection::{
        Blob, Clob, Release, ResultSetMetadata, RowAccessor, RowCursor, SqlXml,
    };

    // Configuration
    pub use crate::config::{ConverterConfig, DefaultParsePolicy};

    // Schemas and records
    pub use crate::record::Record;
    pub use crate::schema::{FieldSchema, LogicalType, RecordSchema};

    // Conversion
    pub use crate::converter::{Converter, ConverterStats};
    pub use crate::mapping::ColumnKind;
    pub use crate::numeric::IntWidth;

    // In-memory results
    pub use crate::memory::{Cell, MemoryMetadata, MemoryResultSet};
}

// Re-export commonly used items at crate root
pub use converter::Converter;
pub use error::{Error, Result};
pub use types::Value;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _value = Value::Int32(42);
        let _config = ConverterConfig::default();
        let _policy = DefaultParsePolicy::Ignore;
        let _column = ColumnDescriptor::new("id", SqlType::Integer);
    }

    #[test]
    fn test_error_types() {
        let err = Error::driver("test error");
        assert!(err.is_field_scoped());
        assert_eq!(err.category(), ErrorCategory::DriverAccess);
    }

    #[test]
    fn test_value_types() {
        let v = Value::from(42_i32);
        assert!(!v.is_null());
        assert_eq!(v.as_i64(), Some(42));

        let v = Value::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
    }
}
