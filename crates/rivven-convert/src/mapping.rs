//! Type dispatch shared by schema mapping and value extraction
//!
//! A column's vendor type, signedness, precision and scale resolve to exactly
//! one `ColumnKind`. The schema mapper takes its logical type from the kind
//! and the value extractor picks its getter from the same kind, so the two
//! phases cannot disagree about a column.

use crate::numeric::{decimal_scale, resolve_numeric_width, IntWidth};
use crate::schema::LogicalType;
use crate::types::{ColumnDescriptor, SqlType};

/// Where a text column's value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSource {
    /// CHAR, VARCHAR, LONGVARCHAR
    Standard,
    /// NCHAR, NVARCHAR, LONGNVARCHAR
    National,
    /// CLOB handle
    Clob,
    /// NCLOB handle
    NClob,
    /// DATALINK, rendered as its URL
    DataLink,
    /// SQLXML handle, rendered as its serialization
    Xml,
}

/// Where a binary column's value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySource {
    /// BINARY, VARBINARY, LONGVARBINARY
    Standard,
    /// BLOB handle
    Blob,
}

/// Resolved conversion of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// BOOLEAN
    Boolean,
    /// BIT, TINYINT, SMALLINT, INTEGER, BIGINT and collapsed NUMERIC
    Integer(IntWidth),
    /// REAL
    Float32,
    /// FLOAT, DOUBLE
    Float64,
    /// DECIMAL and non-collapsed NUMERIC
    Decimal {
        /// Scale after sentinel substitution
        scale: i32,
    },
    /// Character types
    Text(TextSource),
    /// Binary types
    Binary(BinarySource),
    /// DATE
    Date,
    /// TIME
    Time,
    /// TIMESTAMP
    Timestamp,
}

impl ColumnKind {
    /// Resolve the conversion for a column, `None` for unsupported types
    pub fn resolve(
        sql_type: SqlType,
        signed: bool,
        precision: i32,
        scale: i32,
        map_numerics: bool,
    ) -> Option<Self> {
        // Unsigned columns take the next wider width to avoid overflow.
        let int = |width: IntWidth| {
            let width = if signed { width } else { width.widen() };
            Some(Self::Integer(width))
        };

        match sql_type {
            SqlType::Boolean => Some(Self::Boolean),
            SqlType::Bit => Some(Self::Integer(IntWidth::Int8)),
            SqlType::TinyInt => int(IntWidth::Int8),
            SqlType::SmallInt => int(IntWidth::Int16),
            SqlType::Integer => int(IntWidth::Int32),
            SqlType::BigInt => Some(Self::Integer(IntWidth::Int64)),
            SqlType::Real => Some(Self::Float32),
            SqlType::Float | SqlType::Double => Some(Self::Float64),
            SqlType::Numeric => match resolve_numeric_width(precision, scale, map_numerics) {
                Some(width) => Some(Self::Integer(width)),
                None => Some(Self::Decimal {
                    scale: decimal_scale(scale),
                }),
            },
            SqlType::Decimal => Some(Self::Decimal {
                scale: decimal_scale(scale),
            }),
            SqlType::Char | SqlType::VarChar | SqlType::LongVarChar => {
                Some(Self::Text(TextSource::Standard))
            }
            SqlType::NChar | SqlType::NVarChar | SqlType::LongNVarChar => {
                Some(Self::Text(TextSource::National))
            }
            SqlType::Clob => Some(Self::Text(TextSource::Clob)),
            SqlType::NClob => Some(Self::Text(TextSource::NClob)),
            SqlType::DataLink => Some(Self::Text(TextSource::DataLink)),
            SqlType::SqlXml => Some(Self::Text(TextSource::Xml)),
            SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary => {
                Some(Self::Binary(BinarySource::Standard))
            }
            SqlType::Blob => Some(Self::Binary(BinarySource::Blob)),
            SqlType::Date => Some(Self::Date),
            SqlType::Time => Some(Self::Time),
            SqlType::Timestamp => Some(Self::Timestamp),
            SqlType::Null
            | SqlType::Array
            | SqlType::JavaObject
            | SqlType::Other
            | SqlType::Distinct
            | SqlType::Struct
            | SqlType::Ref
            | SqlType::RowId
            | SqlType::Vendor(_) => None,
        }
    }

    /// Resolve the conversion for a metadata snapshot
    pub fn for_column(column: &ColumnDescriptor, map_numerics: bool) -> Option<Self> {
        Self::resolve(
            column.sql_type,
            column.signed,
            column.precision,
            column.scale,
            map_numerics,
        )
    }

    /// Logical type of the produced field
    pub const fn logical_type(self) -> LogicalType {
        match self {
            Self::Boolean => LogicalType::Bool,
            Self::Integer(width) => width.logical_type(),
            Self::Float32 => LogicalType::Float32,
            Self::Float64 => LogicalType::Float64,
            Self::Decimal { scale } => LogicalType::Decimal { scale },
            Self::Text(_) => LogicalType::String,
            Self::Binary(_) => LogicalType::Bytes,
            Self::Date => LogicalType::Date,
            Self::Time => LogicalType::Time,
            Self::Timestamp => LogicalType::Timestamp,
        }
    }
}
