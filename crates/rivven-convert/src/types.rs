//! Value and column types for rivven-convert
//!
//! The type system mirrors the Kafka Connect structured-record model:
//! - `SqlType`: closed enumeration of vendor (JDBC) column type codes
//! - `Nullability`: tri-state column nullability reported by the driver
//! - `ColumnDescriptor`: immutable per-column metadata snapshot
//! - `Value`: typed runtime value for every logical type

use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::connection::ResultSetMetadata;
use crate::error::Result;
use crate::schema::LogicalType;

/// Vendor column type code (the `java.sql.Types` numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// BIT
    Bit,
    /// TINYINT
    TinyInt,
    /// SMALLINT
    SmallInt,
    /// INTEGER
    Integer,
    /// BIGINT
    BigInt,
    /// FLOAT (double precision)
    Float,
    /// REAL (single precision)
    Real,
    /// DOUBLE
    Double,
    /// NUMERIC
    Numeric,
    /// DECIMAL
    Decimal,
    /// CHAR
    Char,
    /// VARCHAR
    VarChar,
    /// LONGVARCHAR
    LongVarChar,
    /// DATE
    Date,
    /// TIME
    Time,
    /// TIMESTAMP
    Timestamp,
    /// BINARY
    Binary,
    /// VARBINARY
    VarBinary,
    /// LONGVARBINARY
    LongVarBinary,
    /// NULL
    Null,
    /// OTHER
    Other,
    /// JAVA_OBJECT
    JavaObject,
    /// DISTINCT
    Distinct,
    /// STRUCT
    Struct,
    /// ARRAY
    Array,
    /// BLOB
    Blob,
    /// CLOB
    Clob,
    /// REF
    Ref,
    /// DATALINK
    DataLink,
    /// BOOLEAN
    Boolean,
    /// ROWID
    RowId,
    /// NCHAR
    NChar,
    /// NVARCHAR
    NVarChar,
    /// LONGNVARCHAR
    LongNVarChar,
    /// NCLOB
    NClob,
    /// SQLXML
    SqlXml,
    /// Any code outside the standard set (vendor extensions, newer codes)
    Vendor(i32),
}

impl SqlType {
    /// Classify a raw vendor type code
    pub const fn from_code(code: i32) -> Self {
        match code {
            -7 => Self::Bit,
            -6 => Self::TinyInt,
            5 => Self::SmallInt,
            4 => Self::Integer,
            -5 => Self::BigInt,
            6 => Self::Float,
            7 => Self::Real,
            8 => Self::Double,
            2 => Self::Numeric,
            3 => Self::Decimal,
            1 => Self::Char,
            12 => Self::VarChar,
            -1 => Self::LongVarChar,
            91 => Self::Date,
            92 => Self::Time,
            93 => Self::Timestamp,
            -2 => Self::Binary,
            -3 => Self::VarBinary,
            -4 => Self::LongVarBinary,
            0 => Self::Null,
            1111 => Self::Other,
            2000 => Self::JavaObject,
            2001 => Self::Distinct,
            2002 => Self::Struct,
            2003 => Self::Array,
            2004 => Self::Blob,
            2005 => Self::Clob,
            2006 => Self::Ref,
            70 => Self::DataLink,
            16 => Self::Boolean,
            -8 => Self::RowId,
            -15 => Self::NChar,
            -9 => Self::NVarChar,
            -16 => Self::LongNVarChar,
            2011 => Self::NClob,
            2009 => Self::SqlXml,
            other => Self::Vendor(other),
        }
    }

    /// Raw vendor type code
    pub const fn code(self) -> i32 {
        match self {
            Self::Bit => -7,
            Self::TinyInt => -6,
            Self::SmallInt => 5,
            Self::Integer => 4,
            Self::BigInt => -5,
            Self::Float => 6,
            Self::Real => 7,
            Self::Double => 8,
            Self::Numeric => 2,
            Self::Decimal => 3,
            Self::Char => 1,
            Self::VarChar => 12,
            Self::LongVarChar => -1,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::Binary => -2,
            Self::VarBinary => -3,
            Self::LongVarBinary => -4,
            Self::Null => 0,
            Self::Other => 1111,
            Self::JavaObject => 2000,
            Self::Distinct => 2001,
            Self::Struct => 2002,
            Self::Array => 2003,
            Self::Blob => 2004,
            Self::Clob => 2005,
            Self::Ref => 2006,
            Self::DataLink => 70,
            Self::Boolean => 16,
            Self::RowId => -8,
            Self::NChar => -15,
            Self::NVarChar => -9,
            Self::LongNVarChar => -16,
            Self::NClob => 2011,
            Self::SqlXml => 2009,
            Self::Vendor(code) => code,
        }
    }

    /// Standard type name
    pub fn name(self) -> &'static str {
        match self {
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::LongVarChar => "LONGVARCHAR",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Null => "NULL",
            Self::Other => "OTHER",
            Self::JavaObject => "JAVA_OBJECT",
            Self::Distinct => "DISTINCT",
            Self::Struct => "STRUCT",
            Self::Array => "ARRAY",
            Self::Blob => "BLOB",
            Self::Clob => "CLOB",
            Self::Ref => "REF",
            Self::DataLink => "DATALINK",
            Self::Boolean => "BOOLEAN",
            Self::RowId => "ROWID",
            Self::NChar => "NCHAR",
            Self::NVarChar => "NVARCHAR",
            Self::LongNVarChar => "LONGNVARCHAR",
            Self::NClob => "NCLOB",
            Self::SqlXml => "SQLXML",
            Self::Vendor(_) => "VENDOR",
        }
    }

    /// Whether this is one of the date/time types
    #[inline]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }
}

impl From<i32> for SqlType {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vendor(code) => write!(f, "VENDOR({})", code),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Column nullability as reported by the metadata provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nullability {
    /// Column does not allow NULL
    NoNulls,
    /// Column allows NULL
    Nullable,
    /// Driver cannot tell
    #[default]
    Unknown,
}

impl Nullability {
    /// Map the driver's numeric nullability code (0 = no nulls, 1 = nullable)
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::NoNulls,
            1 => Self::Nullable,
            _ => Self::Unknown,
        }
    }

    /// Unknown nullability is treated as nullable
    #[inline]
    pub const fn is_optional(self) -> bool {
        !matches!(self, Self::NoNulls)
    }
}

/// Per-column metadata snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Catalog column name
    pub name: String,
    /// Alias requested by the query (may be empty)
    pub label: String,
    /// Vendor type
    pub sql_type: SqlType,
    /// Nullability
    pub nullable: Nullability,
    /// Signedness (integer columns)
    pub signed: bool,
    /// Precision (numeric/decimal columns)
    pub precision: i32,
    /// Scale (numeric/decimal columns)
    pub scale: i32,
}

impl ColumnDescriptor {
    /// Create a descriptor with signed, nullable-unknown defaults
    pub fn new(name: impl Into<String>, sql_type: impl Into<SqlType>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            sql_type: sql_type.into(),
            nullable: Nullability::Unknown,
            signed: true,
            precision: 0,
            scale: 0,
        }
    }

    /// Snapshot the metadata of column `index` (0-based)
    pub fn from_metadata(metadata: &dyn ResultSetMetadata, index: usize) -> Result<Self> {
        Ok(Self {
            name: metadata.column_name(index)?,
            label: metadata.column_label(index)?,
            sql_type: SqlType::from_code(metadata.column_type(index)?),
            nullable: metadata.nullability(index)?,
            signed: metadata.is_signed(index)?,
            precision: metadata.precision(index)?,
            scale: metadata.scale(index)?,
        })
    }

    /// Set the query alias
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set nullability
    pub fn with_nullability(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set signedness
    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Set precision and scale
    pub fn with_precision(mut self, precision: i32, scale: i32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Field name: the label if non-empty, else the catalog name
    pub fn field_name(&self) -> &str {
        field_name(&self.label, &self.name)
    }

    /// Whether the produced field is optional
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.nullable.is_optional()
    }
}

pub(crate) fn field_name<'a>(label: &'a str, name: &'a str) -> &'a str {
    if label.is_empty() {
        name
    } else {
        label
    }
}

/// Typed record value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Exact decimal
    Decimal(Decimal),
    /// Text
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Instant, normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Check if value is NULL
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Logical type carried by this value (`None` for NULL)
    pub fn logical_type(&self) -> Option<LogicalType> {
        let ty = match self {
            Self::Null => return None,
            Self::Bool(_) => LogicalType::Bool,
            Self::Int8(_) => LogicalType::Int8,
            Self::Int16(_) => LogicalType::Int16,
            Self::Int32(_) => LogicalType::Int32,
            Self::Int64(_) => LogicalType::Int64,
            Self::Float32(_) => LogicalType::Float32,
            Self::Float64(_) => LogicalType::Float64,
            Self::Decimal(d) => LogicalType::Decimal {
                scale: d.scale() as i32,
            },
            Self::String(_) => LogicalType::String,
            Self::Bytes(_) => LogicalType::Bytes,
            Self::Date(_) => LogicalType::Date,
            Self::Time(_) => LogicalType::Time,
            Self::Timestamp(_) => LogicalType::Timestamp,
        };
        Some(ty)
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int8(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(n) => Some(i64::from(*n)),
            Self::Int16(n) => Some(i64::from(*n)),
            Self::Int32(n) => Some(i64::from(*n)),
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to convert to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int8(n) => Some(f64::from(*n)),
            Self::Int16(n) => Some(f64::from(*n)),
            Self::Int32(n) => Some(f64::from(*n)),
            Self::Int64(n) => Some(*n as f64),
            Self::Float32(n) => Some(f64::from(*n)),
            Self::Float64(n) => Some(*n),
            Self::Decimal(d) => d.to_string().parse().ok(),
            _ => None,
        }
    }

    /// Borrow as decimal
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Borrow as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow as bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Render as JSON for transport.
    ///
    /// Decimals are rendered as strings to keep their scale, bytes as
    /// standard base64 and temporal values in ISO-8601.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::json!(b),
            Self::Int8(n) => serde_json::json!(n),
            Self::Int16(n) => serde_json::json!(n),
            Self::Int32(n) => serde_json::json!(n),
            Self::Int64(n) => serde_json::json!(n),
            Self::Float32(n) => serde_json::json!(n),
            Self::Float64(n) => serde_json::json!(n),
            Self::Decimal(d) => serde_json::json!(d.to_string()),
            Self::String(s) => serde_json::json!(s),
            Self::Bytes(b) => {
                serde_json::json!(base64::engine::general_purpose::STANDARD.encode(b))
            }
            Self::Date(d) => serde_json::json!(d.format("%Y-%m-%d").to_string()),
            Self::Time(t) => serde_json::json!(t.format("%H:%M:%S%.f").to_string()),
            Self::Timestamp(ts) => serde_json::json!(ts.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Self::Null,
        }
    }
}
