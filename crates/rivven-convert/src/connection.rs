//! Data-access traits consumed by the converter
//!
//! The converter never talks to a database itself. Drivers expose:
//! - ResultSetMetadata: per-column metadata of a query result
//! - RowAccessor: typed getters over the current row, plus the SQL NULL indicator
//! - Blob / Clob / SqlXml: out-of-line value handles released through `Release`
//!
//! Column indexes are 0-based throughout.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::types::Nullability;

/// Column metadata of a query result
pub trait ResultSetMetadata {
    /// Number of columns
    fn column_count(&self) -> Result<usize>;

    /// Catalog column name
    fn column_name(&self, index: usize) -> Result<String>;

    /// Alias requested by the query, empty when none
    fn column_label(&self, index: usize) -> Result<String>;

    /// Vendor type code
    fn column_type(&self, index: usize) -> Result<i32>;

    /// Nullability of the column
    fn nullability(&self, index: usize) -> Result<Nullability>;

    /// Whether values are signed numbers
    fn is_signed(&self, index: usize) -> Result<bool>;

    /// Declared precision
    fn precision(&self, index: usize) -> Result<i32>;

    /// Declared scale
    fn scale(&self, index: usize) -> Result<i32>;
}

/// Typed access to the current row of a result.
///
/// Primitive getters return the driver's zero value for SQL NULL; callers
/// must consult [`RowAccessor::was_null`] after each read. Timestamps, dates
/// and times are normalized to UTC by the implementation.
pub trait RowAccessor {
    /// Metadata of the underlying result
    fn metadata(&self) -> &dyn ResultSetMetadata;

    /// Whether the last value read was SQL NULL
    fn was_null(&self) -> bool;

    /// Read a boolean
    fn get_bool(&mut self, index: usize) -> Result<bool>;

    /// Read an 8-bit integer
    fn get_i8(&mut self, index: usize) -> Result<i8>;

    /// Read a 16-bit integer
    fn get_i16(&mut self, index: usize) -> Result<i16>;

    /// Read a 32-bit integer
    fn get_i32(&mut self, index: usize) -> Result<i32>;

    /// Read a 64-bit integer
    fn get_i64(&mut self, index: usize) -> Result<i64>;

    /// Read a single-precision float
    fn get_f32(&mut self, index: usize) -> Result<f32>;

    /// Read a double-precision float
    fn get_f64(&mut self, index: usize) -> Result<f64>;

    /// Read an exact decimal rounded to `scale` fractional digits
    fn get_decimal(&mut self, index: usize, scale: i32) -> Result<Option<Decimal>>;

    /// Read a character string
    fn get_string(&mut self, index: usize) -> Result<Option<String>>;

    /// Read a national character string
    fn get_nstring(&mut self, index: usize) -> Result<Option<String>> {
        self.get_string(index)
    }

    /// Read a binary value
    fn get_bytes(&mut self, index: usize) -> Result<Option<Vec<u8>>>;

    /// Read a date
    fn get_date(&mut self, index: usize) -> Result<Option<NaiveDate>>;

    /// Read a time of day
    fn get_time(&mut self, index: usize) -> Result<Option<NaiveTime>>;

    /// Read a timestamp, normalized to UTC
    fn get_timestamp(&mut self, index: usize) -> Result<Option<DateTime<Utc>>>;

    /// Read a DATALINK value
    fn get_url(&mut self, index: usize) -> Result<Option<url::Url>>;

    /// Acquire a binary large object handle
    fn get_blob(&mut self, index: usize) -> Result<Option<Box<dyn Blob + '_>>>;

    /// Acquire a character large object handle
    fn get_clob(&mut self, index: usize) -> Result<Option<Box<dyn Clob + '_>>>;

    /// Acquire a national character large object handle
    fn get_nclob(&mut self, index: usize) -> Result<Option<Box<dyn Clob + '_>>> {
        self.get_clob(index)
    }

    /// Acquire an XML value handle
    fn get_sqlxml(&mut self, index: usize) -> Result<Option<Box<dyn SqlXml + '_>>>;
}

/// Forward-only cursor over the rows of a result
pub trait RowCursor {
    /// Move to the next row, `Ok(false)` once exhausted
    fn advance(&mut self) -> Result<bool>;

    /// Accessor positioned on the current row
    fn current(&mut self) -> &mut dyn RowAccessor;
}

/// Handle holding driver resources until released
pub trait Release {
    /// Release the resources held by this handle
    fn free(&mut self) -> Result<()>;
}

/// Binary large object handle
pub trait Blob: Release {
    /// Length in bytes
    fn length(&mut self) -> Result<u64>;

    /// Read `len` bytes starting at 0-based `offset`
    fn read_bytes(&mut self, offset: u64, len: usize) -> Result<Vec<u8>>;
}

/// Character large object handle
pub trait Clob: Release {
    /// Length in characters
    fn length(&mut self) -> Result<u64>;

    /// Read `len` characters starting at 0-based `offset`
    fn read_string(&mut self, offset: u64, len: usize) -> Result<String>;
}

/// XML value handle
pub trait SqlXml: Release {
    /// String serialization of the document
    fn to_xml_string(&mut self) -> Result<String>;
}
