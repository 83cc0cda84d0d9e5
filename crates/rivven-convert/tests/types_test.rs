//! Unit tests for rivven-convert types module

use chrono::{NaiveDate, NaiveTime};
use rivven_convert::memory::MemoryMetadata;
use rivven_convert::schema::LogicalType;
use rivven_convert::types::{ColumnDescriptor, Nullability, SqlType, Value};
use rust_decimal::Decimal;

#[test]
fn test_value_null() {
    let v = Value::Null;
    assert!(v.is_null());
    assert_eq!(v.as_str(), None);
    assert_eq!(v.as_i64(), None);
    assert_eq!(v.as_f64(), None);
    assert_eq!(v.as_bool(), None);
    assert_eq!(v.logical_type(), None);
}

#[test]
fn test_value_integer_types() {
    let v = Value::Int8(42);
    assert_eq!(v.as_i64(), Some(42));
    assert_eq!(v.logical_type(), Some(LogicalType::Int8));

    let v = Value::Int16(-100);
    assert_eq!(v.as_i64(), Some(-100));

    let v = Value::Int32(1_000_000);
    assert_eq!(v.as_i64(), Some(1_000_000));

    let v = Value::Int64(9_000_000_000_000);
    assert_eq!(v.as_i64(), Some(9_000_000_000_000));
    assert_eq!(v.logical_type(), Some(LogicalType::Int64));
}

#[test]
fn test_value_decimal() {
    let v = Value::Decimal(Decimal::new(12345, 2));
    assert_eq!(v.as_decimal(), Some(&Decimal::new(12345, 2)));
    assert_eq!(v.logical_type(), Some(LogicalType::Decimal { scale: 2 }));
    assert!((v.as_f64().unwrap() - 123.45).abs() < 1e-9);
}

#[test]
fn test_value_from_primitives() {
    let v: Value = 42i32.into();
    assert_eq!(v.as_i64(), Some(42));

    let v: Value = "hello".into();
    assert_eq!(v.as_str(), Some("hello"));

    let v: Value = true.into();
    assert_eq!(v.as_bool(), Some(true));

    let none_val: Option<i32> = None;
    let v: Value = none_val.into();
    assert!(v.is_null());
}

#[test]
fn test_value_json_rendering() {
    assert_eq!(Value::Null.to_json(), serde_json::Value::Null);
    assert_eq!(
        Value::Decimal(Decimal::new(-105, 1)).to_json(),
        serde_json::json!("-10.5")
    );
    assert_eq!(
        Value::Bytes(b"hello".to_vec()).to_json(),
        serde_json::json!("aGVsbG8=")
    );

    let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
    assert_eq!(Value::Date(date).to_json(), serde_json::json!("2024-12-25"));

    let time = NaiveTime::from_hms_opt(14, 30, 45).unwrap();
    assert_eq!(Value::Time(time).to_json(), serde_json::json!("14:30:45"));

    let ts = date.and_time(time).and_utc();
    assert_eq!(
        Value::Timestamp(ts).to_json(),
        serde_json::json!("2024-12-25T14:30:45+00:00")
    );
}

#[test]
fn test_value_serialization() {
    let v = Value::String("test".to_string());
    let json = serde_json::to_string(&v).unwrap();
    assert!(json.contains("test"));

    let v2: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v, v2);
}

#[test]
fn test_sql_type_classification() {
    assert_eq!(SqlType::from_code(4), SqlType::Integer);
    assert_eq!(SqlType::from(-6), SqlType::TinyInt);
    assert_eq!(SqlType::from_code(2011), SqlType::NClob);
    assert_eq!(SqlType::from_code(-155), SqlType::Vendor(-155));
    assert_eq!(SqlType::Vendor(-155).code(), -155);

    assert!(SqlType::Timestamp.is_temporal());
    assert!(!SqlType::VarChar.is_temporal());
}

#[test]
fn test_sql_type_display() {
    assert_eq!(SqlType::LongNVarChar.to_string(), "LONGNVARCHAR");
    assert_eq!(SqlType::Vendor(-101).to_string(), "VENDOR(-101)");
}

#[test]
fn test_nullability_codes() {
    assert_eq!(Nullability::from_code(0), Nullability::NoNulls);
    assert_eq!(Nullability::from_code(1), Nullability::Nullable);
    assert_eq!(Nullability::from_code(2), Nullability::Unknown);

    assert!(!Nullability::NoNulls.is_optional());
    assert!(Nullability::Nullable.is_optional());
    assert!(Nullability::Unknown.is_optional());
}

#[test]
fn test_column_descriptor_field_name() {
    let col = ColumnDescriptor::new("user_id", SqlType::Integer);
    assert_eq!(col.field_name(), "user_id");

    let col = col.with_label("uid");
    assert_eq!(col.field_name(), "uid");
}

#[test]
fn test_column_descriptor_from_metadata() {
    let metadata = MemoryMetadata::new(vec![
        ColumnDescriptor::new("id", SqlType::Integer),
        ColumnDescriptor::new("amount", SqlType::Numeric)
            .with_label("total")
            .with_nullability(Nullability::NoNulls)
            .with_signed(false)
            .with_precision(12, 3),
    ]);

    let col = ColumnDescriptor::from_metadata(&metadata, 1).unwrap();
    assert_eq!(col.name, "amount");
    assert_eq!(col.label, "total");
    assert_eq!(col.sql_type, SqlType::Numeric);
    assert_eq!(col.nullable, Nullability::NoNulls);
    assert!(!col.signed);
    assert_eq!((col.precision, col.scale), (12, 3));

    assert!(ColumnDescriptor::from_metadata(&metadata, 2).is_err());
}
