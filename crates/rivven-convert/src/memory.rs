//! In-memory result sets
//!
//! `MemoryResultSet` implements the metadata and row accessor traits over
//! owned cells. It behaves like a forward-only driver cursor: primitive
//! getters return zero values for SQL NULL and set the NULL indicator, large
//! objects are served through handles whose releases are counted.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::connection::{
    Blob, Clob, Release, ResultSetMetadata, RowAccessor, RowCursor, SqlXml,
};
use crate::error::{Error, Result};
use crate::numeric::MAX_DECIMAL_SCALE;
use crate::types::{ColumnDescriptor, Nullability, Value};

/// One stored column value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Inline value
    Value(Value),
    /// Binary large object with its reported length
    Blob {
        /// Content
        data: Vec<u8>,
        /// Length reported by the handle
        length: u64,
    },
    /// Character large object with its reported length
    Clob {
        /// Content
        data: String,
        /// Length reported by the handle, in characters
        length: u64,
    },
    /// XML document
    Xml(String),
    /// DATALINK value
    Url(url::Url),
    /// Any read of this cell fails with a driver error
    Error(String),
}

impl Cell {
    /// SQL NULL
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Binary large object reporting its true length
    pub fn blob(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let length = data.len() as u64;
        Self::Blob { data, length }
    }

    /// Character large object reporting its true length
    pub fn clob(data: impl Into<String>) -> Self {
        let data = data.into();
        let length = data.chars().count() as u64;
        Self::Clob { data, length }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Metadata over column descriptors
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadata {
    columns: Vec<ColumnDescriptor>,
}

impl MemoryMetadata {
    /// Create metadata for `columns`
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    fn column(&self, index: usize) -> Result<&ColumnDescriptor> {
        self.columns
            .get(index)
            .ok_or_else(|| Error::driver(format!("column index {} out of range", index)))
    }
}

impl ResultSetMetadata for MemoryMetadata {
    fn column_count(&self) -> Result<usize> {
        Ok(self.columns.len())
    }

    fn column_name(&self, index: usize) -> Result<String> {
        Ok(self.column(index)?.name.clone())
    }

    fn column_label(&self, index: usize) -> Result<String> {
        Ok(self.column(index)?.label.clone())
    }

    fn column_type(&self, index: usize) -> Result<i32> {
        Ok(self.column(index)?.sql_type.code())
    }

    fn nullability(&self, index: usize) -> Result<Nullability> {
        Ok(self.column(index)?.nullable)
    }

    fn is_signed(&self, index: usize) -> Result<bool> {
        Ok(self.column(index)?.signed)
    }

    fn precision(&self, index: usize) -> Result<i32> {
        Ok(self.column(index)?.precision)
    }

    fn scale(&self, index: usize) -> Result<i32> {
        Ok(self.column(index)?.scale)
    }
}

/// Forward-only in-memory cursor
#[derive(Debug, Default)]
pub struct MemoryResultSet {
    metadata: MemoryMetadata,
    rows: Vec<Vec<Cell>>,
    position: Option<usize>,
    last_null: bool,
    released: Arc<AtomicUsize>,
}

impl MemoryResultSet {
    /// Create an empty result with the given columns
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            metadata: MemoryMetadata::new(columns),
            ..Default::default()
        }
    }

    /// Append a row
    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Advance to the next row, `false` once exhausted
    pub fn next_row(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        next < self.rows.len()
    }

    /// Number of large object and XML handles released so far
    pub fn released_handles(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    /// Metadata of this result
    pub fn memory_metadata(&self) -> &MemoryMetadata {
        &self.metadata
    }

    fn cell(&self, index: usize) -> Result<&Cell> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| Error::driver("no current row"))?;
        let cell = row
            .get(index)
            .ok_or_else(|| Error::driver(format!("column index {} out of range", index)))?;
        if let Cell::Error(message) = cell {
            return Err(Error::driver(message.clone()));
        }
        Ok(cell)
    }

    /// Fetch a cell and record whether it is SQL NULL
    fn fetch(&mut self, index: usize) -> Result<Cell> {
        let cell = self.cell(index)?.clone();
        self.last_null = matches!(cell, Cell::Value(Value::Null));
        Ok(cell)
    }

    fn integer(&mut self, index: usize) -> Result<i64> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(0),
            Cell::Value(Value::Bool(b)) => Ok(i64::from(b)),
            Cell::Value(Value::Decimal(d)) if d.fract().is_zero() => d
                .to_i64()
                .ok_or_else(|| Error::driver(format!("{} out of range", d))),
            Cell::Value(value) => value
                .as_i64()
                .ok_or_else(|| mismatch(&Cell::Value(value), "integer")),
            other => Err(mismatch(&other, "integer")),
        }
    }

    fn float(&mut self, index: usize) -> Result<f64> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(0.0),
            Cell::Value(value) => value
                .as_f64()
                .ok_or_else(|| mismatch(&Cell::Value(value), "float")),
            other => Err(mismatch(&other, "float")),
        }
    }

    fn narrow<T: TryFrom<i64>>(&mut self, index: usize, target: &str) -> Result<T> {
        let n = self.integer(index)?;
        T::try_from(n).map_err(|_| Error::driver(format!("{} out of range for {}", n, target)))
    }

    fn handle(&self) -> ReleaseCounter {
        ReleaseCounter {
            released: Arc::clone(&self.released),
            freed: false,
        }
    }
}

fn mismatch(cell: &Cell, target: &str) -> Error {
    let found = match cell {
        Cell::Value(value) => value.type_name(),
        Cell::Blob { .. } => "blob",
        Cell::Clob { .. } => "clob",
        Cell::Xml(_) => "xml",
        Cell::Url(_) => "url",
        Cell::Error(_) => "error",
    };
    Error::driver(format!("cannot read {} as {}", found, target))
}

impl RowCursor for MemoryResultSet {
    fn advance(&mut self) -> Result<bool> {
        Ok(self.next_row())
    }

    fn current(&mut self) -> &mut dyn RowAccessor {
        self
    }
}

impl RowAccessor for MemoryResultSet {
    fn metadata(&self) -> &dyn ResultSetMetadata {
        &self.metadata
    }

    fn was_null(&self) -> bool {
        self.last_null
    }

    fn get_bool(&mut self, index: usize) -> Result<bool> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(false),
            Cell::Value(value) => value
                .as_bool()
                .or_else(|| value.as_i64().map(|n| n != 0))
                .ok_or_else(|| mismatch(&Cell::Value(value), "bool")),
            other => Err(mismatch(&other, "bool")),
        }
    }

    fn get_i8(&mut self, index: usize) -> Result<i8> {
        self.narrow(index, "i8")
    }

    fn get_i16(&mut self, index: usize) -> Result<i16> {
        self.narrow(index, "i16")
    }

    fn get_i32(&mut self, index: usize) -> Result<i32> {
        self.narrow(index, "i32")
    }

    fn get_i64(&mut self, index: usize) -> Result<i64> {
        self.integer(index)
    }

    fn get_f32(&mut self, index: usize) -> Result<f32> {
        self.float(index).map(|f| f as f32)
    }

    fn get_f64(&mut self, index: usize) -> Result<f64> {
        self.float(index)
    }

    fn get_decimal(&mut self, index: usize, scale: i32) -> Result<Option<Decimal>> {
        let mut decimal = match self.fetch(index)? {
            Cell::Value(Value::Null) => return Ok(None),
            Cell::Value(Value::Decimal(d)) => d,
            Cell::Value(value) => match value.as_i64() {
                Some(n) => Decimal::from(n),
                None => return Err(mismatch(&Cell::Value(value), "decimal")),
            },
            other => return Err(mismatch(&other, "decimal")),
        };
        decimal.rescale(scale.clamp(0, MAX_DECIMAL_SCALE as i32) as u32);
        Ok(Some(decimal))
    }

    fn get_string(&mut self, index: usize) -> Result<Option<String>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Value(Value::String(s)) => Ok(Some(s)),
            Cell::Clob { data, .. } | Cell::Xml(data) => Ok(Some(data)),
            Cell::Url(url) => Ok(Some(url.into())),
            other => Err(mismatch(&other, "string")),
        }
    }

    fn get_bytes(&mut self, index: usize) -> Result<Option<Vec<u8>>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Value(Value::Bytes(b)) | Cell::Blob { data: b, .. } => Ok(Some(b)),
            other => Err(mismatch(&other, "bytes")),
        }
    }

    fn get_date(&mut self, index: usize) -> Result<Option<NaiveDate>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Value(Value::Date(d)) => Ok(Some(d)),
            Cell::Value(Value::Timestamp(ts)) => Ok(Some(ts.date_naive())),
            other => Err(mismatch(&other, "date")),
        }
    }

    fn get_time(&mut self, index: usize) -> Result<Option<NaiveTime>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Value(Value::Time(t)) => Ok(Some(t)),
            Cell::Value(Value::Timestamp(ts)) => Ok(Some(ts.time())),
            other => Err(mismatch(&other, "time")),
        }
    }

    fn get_timestamp(&mut self, index: usize) -> Result<Option<DateTime<Utc>>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Value(Value::Timestamp(ts)) => Ok(Some(ts)),
            Cell::Value(Value::Date(d)) => Ok(Some(d.and_time(NaiveTime::MIN).and_utc())),
            other => Err(mismatch(&other, "timestamp")),
        }
    }

    fn get_url(&mut self, index: usize) -> Result<Option<url::Url>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Url(url) => Ok(Some(url)),
            Cell::Value(Value::String(s)) => url::Url::parse(&s)
                .map(Some)
                .map_err(|e| Error::driver_with_source(format!("invalid URL {:?}", s), e)),
            other => Err(mismatch(&other, "url")),
        }
    }

    fn get_blob(&mut self, index: usize) -> Result<Option<Box<dyn Blob + '_>>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Blob { data, length } => Ok(Some(Box::new(MemoryLob {
                data,
                length,
                release: self.handle(),
            }))),
            Cell::Value(Value::Bytes(data)) => Ok(Some(Box::new(MemoryLob {
                length: data.len() as u64,
                data,
                release: self.handle(),
            }))),
            other => Err(mismatch(&other, "blob")),
        }
    }

    fn get_clob(&mut self, index: usize) -> Result<Option<Box<dyn Clob + '_>>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Clob { data, length } => Ok(Some(Box::new(MemoryLob {
                data,
                length,
                release: self.handle(),
            }))),
            Cell::Value(Value::String(data)) => Ok(Some(Box::new(MemoryLob {
                length: data.chars().count() as u64,
                data,
                release: self.handle(),
            }))),
            other => Err(mismatch(&other, "clob")),
        }
    }

    fn get_sqlxml(&mut self, index: usize) -> Result<Option<Box<dyn SqlXml + '_>>> {
        match self.fetch(index)? {
            Cell::Value(Value::Null) => Ok(None),
            Cell::Xml(data) | Cell::Value(Value::String(data)) => Ok(Some(Box::new(MemoryLob {
                length: data.len() as u64,
                data,
                release: self.handle(),
            }))),
            other => Err(mismatch(&other, "xml")),
        }
    }
}

/// Counts releases into the owning result set
#[derive(Debug)]
struct ReleaseCounter {
    released: Arc<AtomicUsize>,
    freed: bool,
}

impl ReleaseCounter {
    fn free(&mut self) -> Result<()> {
        if self.freed {
            return Err(Error::driver("handle already freed"));
        }
        self.freed = true;
        self.released.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.freed {
            Err(Error::driver("handle already freed"))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
struct MemoryLob<T> {
    data: T,
    length: u64,
    release: ReleaseCounter,
}

impl<T> Release for MemoryLob<T> {
    fn free(&mut self) -> Result<()> {
        self.release.free()
    }
}

impl Blob for MemoryLob<Vec<u8>> {
    fn length(&mut self) -> Result<u64> {
        self.release.check()?;
        Ok(self.length)
    }

    fn read_bytes(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.release.check()?;
        let start = usize::try_from(offset).map_err(|_| Error::driver("offset out of range"))?;
        let end = start.saturating_add(len).min(self.data.len());
        Ok(self.data.get(start..end).unwrap_or_default().to_vec())
    }
}

impl Clob for MemoryLob<String> {
    fn length(&mut self) -> Result<u64> {
        self.release.check()?;
        Ok(self.length)
    }

    fn read_string(&mut self, offset: u64, len: usize) -> Result<String> {
        self.release.check()?;
        let start = usize::try_from(offset).map_err(|_| Error::driver("offset out of range"))?;
        Ok(self.data.chars().skip(start).take(len).collect())
    }
}

impl SqlXml for MemoryLob<String> {
    fn to_xml_string(&mut self) -> Result<String> {
        self.release.check()?;
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn result() -> MemoryResultSet {
        MemoryResultSet::new(vec![
            ColumnDescriptor::new("n", SqlType::Integer),
            ColumnDescriptor::new("doc", SqlType::Blob),
        ])
        .with_row(vec![Cell::null(), Cell::blob(b"xyz".to_vec())])
        .with_row(vec![Cell::from(Value::Int32(300)), Cell::Error("broken".into())])
    }

    #[test]
    fn test_cursor_advances() {
        let mut rs = result();
        assert!(rs.get_i32(0).is_err());
        assert!(rs.next_row());
        assert!(rs.next_row());
        assert!(!rs.next_row());
        assert!(!rs.next_row());
    }

    #[test]
    fn test_null_returns_zero_and_sets_indicator() {
        let mut rs = result();
        rs.next_row();
        assert_eq!(rs.get_i32(0).unwrap(), 0);
        assert!(rs.was_null());
    }

    #[test]
    fn test_narrowing_overflow() {
        let mut rs = result();
        rs.next_row();
        rs.next_row();
        assert_eq!(rs.get_i16(0).unwrap(), 300);
        assert!(!rs.was_null());
        assert!(rs.get_i8(0).is_err());
    }

    #[test]
    fn test_blob_handle_release_counted() {
        let mut rs = result();
        rs.next_row();
        {
            let mut blob = rs.get_blob(1).unwrap().unwrap();
            assert_eq!(blob.length().unwrap(), 3);
            assert_eq!(blob.read_bytes(1, 2).unwrap(), b"yz".to_vec());
            blob.free().unwrap();
            assert!(blob.free().is_err());
            assert!(blob.length().is_err());
        }
        assert_eq!(rs.released_handles(), 1);
    }

    #[test]
    fn test_error_cell() {
        let mut rs = result();
        rs.next_row();
        rs.next_row();
        let err = rs.get_blob(1).err().unwrap();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_metadata() {
        let rs = result();
        let md = rs.metadata();
        assert_eq!(md.column_count().unwrap(), 2);
        assert_eq!(md.column_type(1).unwrap(), SqlType::Blob.code());
        assert!(md.column_name(5).is_err());
    }
}
