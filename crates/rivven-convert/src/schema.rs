//! Record schemas and schema mapping
//!
//! Provides:
//! - LogicalType: the closed set of record field types
//! - FieldSchema / RecordSchema: immutable schema values
//! - build_field_schema: one column's metadata and default to a field
//! - convert_schema: a whole result's metadata to a record schema

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::config::{ConverterConfig, DefaultParsePolicy};
use crate::connection::ResultSetMetadata;
use crate::error::{Error, Result};
use crate::mapping::ColumnKind;
use crate::numeric::scaled_decimal;
use crate::sanitize::{is_null_literal, sanitize};
use crate::types::{ColumnDescriptor, Value};

/// Logical field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogicalType {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Exact decimal with a fixed scale
    Decimal {
        /// Number of fractional digits
        scale: i32,
    },
    /// Text
    String,
    /// Binary data
    Bytes,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// UTC instant
    Timestamp,
}

impl LogicalType {
    /// Whether a non-null value has this logical type.
    ///
    /// Decimal values are accepted for any decimal scale.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::Int8, Value::Int8(_))
                | (Self::Int16, Value::Int16(_))
                | (Self::Int32, Value::Int32(_))
                | (Self::Int64, Value::Int64(_))
                | (Self::Float32, Value::Float32(_))
                | (Self::Float64, Value::Float64(_))
                | (Self::Decimal { .. }, Value::Decimal(_))
                | (Self::String, Value::String(_))
                | (Self::Bytes, Value::Bytes(_))
                | (Self::Date, Value::Date(_))
                | (Self::Time, Value::Time(_))
                | (Self::Timestamp, Value::Timestamp(_))
        )
    }

    /// Parse a sanitized, non-null default literal as this type
    pub fn parse_literal(&self, literal: &str) -> std::result::Result<Value, String> {
        let trimmed = literal.trim();
        match self {
            Self::Bool => Ok(Value::Bool(parse_bool(literal))),
            Self::Int8 => trimmed.parse().map(Value::Int8).map_err(|e| e.to_string()),
            Self::Int16 => trimmed.parse().map(Value::Int16).map_err(|e| e.to_string()),
            Self::Int32 => trimmed.parse().map(Value::Int32).map_err(|e| e.to_string()),
            Self::Int64 => trimmed.parse().map(Value::Int64).map_err(|e| e.to_string()),
            Self::Float32 => trimmed
                .parse()
                .map(Value::Float32)
                .map_err(|e| e.to_string()),
            Self::Float64 => trimmed
                .parse()
                .map(Value::Float64)
                .map_err(|e| e.to_string()),
            Self::Decimal { scale } => {
                let unscaled = trimmed.parse::<i64>().map_err(|e| e.to_string())?;
                scaled_decimal(unscaled, *scale)
                    .map(Value::Decimal)
                    .ok_or_else(|| format!("{unscaled} is not representable at scale {scale}"))
            }
            Self::String => Ok(Value::String(literal.to_string())),
            Self::Bytes => Ok(Value::Bytes(literal.as_bytes().to_vec())),
            Self::Date => NaiveDate::parse_from_str(&unquote(literal), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| e.to_string()),
            Self::Time => NaiveTime::parse_from_str(&unquote(literal), "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|e| e.to_string()),
            Self::Timestamp => {
                NaiveDateTime::parse_from_str(&unquote(literal), "%Y-%m-%d %H:%M:%S%.f")
                    .map(|ts| Value::Timestamp(ts.and_utc()))
                    .map_err(|e| e.to_string())
            }
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int8 => write!(f, "int8"),
            Self::Int16 => write!(f, "int16"),
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Float32 => write!(f, "float32"),
            Self::Float64 => write!(f, "float64"),
            Self::Decimal { scale } => write!(f, "decimal({})", scale),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Boolean default literal; anything outside the true set reads as `false`.
/// Bit literals (`b'1'`) lose their quotes to `b1`.
fn parse_bool(literal: &str) -> bool {
    matches!(
        unquote(literal).to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "on" | "1" | "b1"
    )
}

fn unquote(literal: &str) -> String {
    literal.replace('\'', "").trim().to_string()
}

/// Schema of one record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name
    pub name: String,
    /// Logical type
    pub logical_type: LogicalType,
    /// Whether the field may be null
    pub optional: bool,
    /// Default value: `None` when the column has no default,
    /// `Some(Value::Null)` for an explicit null default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSchema {
    /// Create a required field without default
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            optional: false,
            default: None,
        }
    }

    /// Mark the field optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach a default value
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Whether a default (possibly null) is attached
    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Check that `value` may be stored in this field
    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if self.optional {
                return Ok(());
            }
            return Err(Error::field_mismatch(
                &self.name,
                "null value for required field",
            ));
        }
        if self.logical_type.accepts(value) {
            Ok(())
        } else {
            Err(Error::field_mismatch(
                &self.name,
                format!(
                    "{} value for {} field",
                    value.type_name(),
                    self.logical_type
                ),
            ))
        }
    }
}

/// Ordered field schemas of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Source table name
    pub name: String,
    /// Fields in column order
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Create a schema
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get field by name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field names in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Build the field schema of one column.
///
/// `default` must already be sanitized. Returns `Ok(None)` when the column's
/// type has no logical mapping; the column is then left out of the schema.
pub fn build_field_schema(
    column: &ColumnDescriptor,
    default: Option<&str>,
    map_numerics: bool,
) -> Result<Option<FieldSchema>> {
    let Some(kind) = ColumnKind::for_column(column, map_numerics) else {
        warn!(
            column = %column.name,
            sql_type = column.sql_type.code(),
            "Column type {} not currently supported, dropping column",
            column.sql_type
        );
        return Ok(None);
    };

    let logical_type = kind.logical_type();
    let mut field = FieldSchema::new(column.field_name(), logical_type);
    field.optional = column.is_optional();

    if let Some(literal) = default {
        let value = if is_null_literal(literal) {
            Value::Null
        } else {
            logical_type.parse_literal(literal).map_err(|message| {
                Error::default_parse(&column.name, literal, logical_type, message)
            })?
        };
        field.default = Some(value);
    }

    Ok(Some(field))
}

/// Build the record schema for all columns of a result.
///
/// `defaults` maps catalog column names (not labels) to raw default
/// literals; they are sanitized before parsing.
pub fn convert_schema(
    table: &str,
    metadata: &dyn ResultSetMetadata,
    defaults: &HashMap<String, String>,
    config: &ConverterConfig,
) -> Result<RecordSchema> {
    map_columns(table, metadata, defaults, config).map(|(schema, _)| schema)
}

/// Build the record schema and count the columns left out of it
pub(crate) fn map_columns(
    table: &str,
    metadata: &dyn ResultSetMetadata,
    defaults: &HashMap<String, String>,
    config: &ConverterConfig,
) -> Result<(RecordSchema, usize)> {
    let count = metadata.column_count()?;
    let mut fields = Vec::with_capacity(count);

    for index in 0..count {
        let column = ColumnDescriptor::from_metadata(metadata, index)?;
        let default = sanitize(
            column.sql_type,
            defaults.get(&column.name).map(String::as_str),
        );

        let field = match build_field_schema(&column, default.as_deref(), config.map_numerics) {
            Err(err @ Error::DefaultParse { .. })
                if config.default_parse_policy == DefaultParsePolicy::Ignore =>
            {
                warn!(table, column = %column.name, error = %err, "Dropping unparseable default");
                build_field_schema(&column, None, config.map_numerics)?
            }
            other => other?,
        };

        if let Some(field) = field {
            fields.push(field);
        }
    }

    let dropped = count - fields.len();
    Ok((RecordSchema::new(table, fields), dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Nullability, SqlType};
    use rust_decimal::Decimal;

    fn column(sql_type: SqlType) -> ColumnDescriptor {
        ColumnDescriptor::new("col", sql_type).with_nullability(Nullability::Nullable)
    }

    #[test]
    fn test_signed_tinyint_nullable_no_default() {
        let field = build_field_schema(&column(SqlType::TinyInt), None, false)
            .unwrap()
            .unwrap();
        assert_eq!(field.logical_type, LogicalType::Int8);
        assert!(field.optional);
        assert!(!field.has_default());
    }

    #[test]
    fn test_required_column() {
        let col =
            ColumnDescriptor::new("id", SqlType::Integer).with_nullability(Nullability::NoNulls);
        let field = build_field_schema(&col, None, false).unwrap().unwrap();
        assert_eq!(field.logical_type, LogicalType::Int32);
        assert!(!field.optional);
    }

    #[test]
    fn test_unknown_nullability_is_optional() {
        let col = ColumnDescriptor::new("id", SqlType::Integer);
        let field = build_field_schema(&col, None, false).unwrap().unwrap();
        assert!(field.optional);
    }

    #[test]
    fn test_unsupported_type_dropped() {
        assert_eq!(
            build_field_schema(&column(SqlType::Array), Some("x"), false).unwrap(),
            None
        );
        assert_eq!(
            build_field_schema(&column(SqlType::Null), None, false).unwrap(),
            None
        );
    }

    #[test]
    fn test_explicit_null_default() {
        let field = build_field_schema(&column(SqlType::Integer), Some("NULL"), false)
            .unwrap()
            .unwrap();
        assert_eq!(field.default, Some(Value::Null));
    }

    #[test]
    fn test_integer_defaults() {
        let col = column(SqlType::SmallInt).with_signed(false);
        let field = build_field_schema(&col, Some("40000"), false)
            .unwrap()
            .unwrap();
        assert_eq!(field.logical_type, LogicalType::Int32);
        assert_eq!(field.default, Some(Value::Int32(40000)));

        let err = build_field_schema(&column(SqlType::TinyInt), Some("300"), false).unwrap_err();
        assert!(matches!(err, Error::DefaultParse { .. }));
    }

    #[test]
    fn test_decimal_default_is_scaled() {
        let col = column(SqlType::Decimal).with_precision(10, 2);
        let field = build_field_schema(&col, Some("12345"), false).unwrap().unwrap();
        assert_eq!(field.logical_type, LogicalType::Decimal { scale: 2 });
        assert_eq!(field.default, Some(Value::Decimal(Decimal::new(12345, 2))));
    }

    #[test]
    fn test_bool_default() {
        let field = build_field_schema(&column(SqlType::Boolean), Some("TRUE"), false)
            .unwrap()
            .unwrap();
        assert_eq!(field.default, Some(Value::Bool(true)));

        let field = build_field_schema(&column(SqlType::Boolean), Some("0"), false)
            .unwrap()
            .unwrap();
        assert_eq!(field.default, Some(Value::Bool(false)));
    }

    #[test]
    fn test_quoted_bool_defaults() {
        for literal in ["'1'", "'t'", "b'1'", "on", " 'TRUE' "] {
            let field = build_field_schema(&column(SqlType::Boolean), Some(literal), false)
                .unwrap()
                .unwrap();
            assert_eq!(field.default, Some(Value::Bool(true)), "literal {literal}");
        }
    }

    #[test]
    fn test_unrecognized_bool_default_is_false() {
        for literal in ["'0'", "b'0'", "off", "maybe"] {
            let field = build_field_schema(&column(SqlType::Boolean), Some(literal), false)
                .unwrap()
                .unwrap();
            assert_eq!(field.default, Some(Value::Bool(false)), "literal {literal}");
        }
    }

    #[test]
    fn test_temporal_defaults_strip_quotes() {
        let field = build_field_schema(&column(SqlType::Date), Some("'2024-03-01'"), false)
            .unwrap()
            .unwrap();
        assert_eq!(
            field.default,
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
        );

        let field = build_field_schema(&column(SqlType::Time), Some("'12:30:00'"), false)
            .unwrap()
            .unwrap();
        assert_eq!(
            field.default,
            Some(Value::Time(NaiveTime::from_hms_opt(12, 30, 0).unwrap()))
        );

        let field = build_field_schema(
            &column(SqlType::Timestamp),
            Some("'2023-12-31 23:59:59.5'"),
            false,
        )
        .unwrap()
        .unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 500)
            .unwrap()
            .and_utc();
        assert_eq!(field.default, Some(Value::Timestamp(expected)));
    }

    #[test]
    fn test_binary_default_uses_literal_bytes() {
        let field = build_field_schema(&column(SqlType::VarBinary), Some("abc"), false)
            .unwrap()
            .unwrap();
        assert_eq!(field.default, Some(Value::Bytes(b"abc".to_vec())));
    }

    #[test]
    fn test_field_validate() {
        let field = FieldSchema::new("id", LogicalType::Int32);
        assert!(field.validate(&Value::Int32(1)).is_ok());
        assert!(field.validate(&Value::Int64(1)).is_err());
        assert!(field.validate(&Value::Null).is_err());
        assert!(field.clone().optional().validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_logical_type_display() {
        assert_eq!(LogicalType::Decimal { scale: 127 }.to_string(), "decimal(127)");
        assert_eq!(LogicalType::Timestamp.to_string(), "timestamp");
    }

    #[test]
    fn test_schema_serializes() {
        let schema = RecordSchema::new(
            "users",
            vec![FieldSchema::new("price", LogicalType::Decimal { scale: 2 }).optional()],
        );
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["fields"][0]["logical_type"]["type"], "decimal");
        assert_eq!(json["fields"][0]["logical_type"]["scale"], 2);
        assert!(json["fields"][0].get("default").is_none());
    }
}
