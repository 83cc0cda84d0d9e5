//! Value extraction
//!
//! Reads one typed value per column from a row accessor, using the same
//! `ColumnKind` resolution as schema mapping. Large objects are drained into
//! owned buffers and their handles released before returning. Per-column
//! failures are isolated by `convert_record`: the field stays unset and the
//! rest of the row is still converted.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ConverterConfig;
use crate::connection::{Blob, Clob, Release, RowAccessor};
use crate::error::{Error, Result};
use crate::mapping::{BinarySource, ColumnKind, TextSource};
use crate::numeric::IntWidth;
use crate::record::Record;
use crate::schema::RecordSchema;
use crate::types::{field_name, SqlType, Value};

/// Releases a driver handle when dropped
struct Scoped<H: Release + ?Sized>(Box<H>);

impl<H: Release + ?Sized> Deref for Scoped<H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.0
    }
}

impl<H: Release + ?Sized> DerefMut for Scoped<H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.0
    }
}

impl<H: Release + ?Sized> Drop for Scoped<H> {
    fn drop(&mut self) {
        if let Err(e) = self.0.free() {
            debug!("Releasing large object handle failed: {}", e);
        }
    }
}

fn checked_lob_length(length: u64, max: u64) -> Result<usize> {
    if length > max {
        return Err(Error::OversizedLargeObject { length, max });
    }
    usize::try_from(length).map_err(|_| Error::OversizedLargeObject { length, max })
}

fn read_blob(blob: Option<Box<dyn Blob + '_>>, max: u64) -> Result<Value> {
    let Some(blob) = blob else {
        return Ok(Value::Null);
    };
    let mut blob = Scoped(blob);
    let len = checked_lob_length(blob.length()?, max)?;
    Ok(Value::Bytes(blob.read_bytes(0, len)?))
}

fn read_clob(clob: Option<Box<dyn Clob + '_>>, max: u64) -> Result<Value> {
    let Some(clob) = clob else {
        return Ok(Value::Null);
    };
    let mut clob = Scoped(clob);
    let len = checked_lob_length(clob.length()?, max)?;
    Ok(Value::String(clob.read_string(0, len)?))
}

fn read_value(
    kind: ColumnKind,
    row: &mut dyn RowAccessor,
    index: usize,
    max_lob_length: u64,
) -> Result<Value> {
    let value = match kind {
        ColumnKind::Boolean => Value::Bool(row.get_bool(index)?),
        ColumnKind::Integer(IntWidth::Int8) => Value::Int8(row.get_i8(index)?),
        ColumnKind::Integer(IntWidth::Int16) => Value::Int16(row.get_i16(index)?),
        ColumnKind::Integer(IntWidth::Int32) => Value::Int32(row.get_i32(index)?),
        ColumnKind::Integer(IntWidth::Int64) => Value::Int64(row.get_i64(index)?),
        ColumnKind::Float32 => Value::Float32(row.get_f32(index)?),
        ColumnKind::Float64 => Value::Float64(row.get_f64(index)?),
        ColumnKind::Decimal { scale } => row.get_decimal(index, scale)?.into(),
        ColumnKind::Text(TextSource::Standard) => row.get_string(index)?.into(),
        ColumnKind::Text(TextSource::National) => row.get_nstring(index)?.into(),
        ColumnKind::Text(TextSource::Clob) => read_clob(row.get_clob(index)?, max_lob_length)?,
        ColumnKind::Text(TextSource::NClob) => {
            read_clob(row.get_nclob(index)?, max_lob_length)?
        }
        ColumnKind::Text(TextSource::DataLink) => row.get_url(index)?.map(String::from).into(),
        ColumnKind::Text(TextSource::Xml) => match row.get_sqlxml(index)? {
            Some(xml) => {
                let mut xml = Scoped(xml);
                Value::String(xml.to_xml_string()?)
            }
            None => Value::Null,
        },
        ColumnKind::Binary(BinarySource::Standard) => row.get_bytes(index)?.into(),
        ColumnKind::Binary(BinarySource::Blob) => {
            read_blob(row.get_blob(index)?, max_lob_length)?
        }
        ColumnKind::Date => row.get_date(index)?.into(),
        ColumnKind::Time => row.get_time(index)?.into(),
        ColumnKind::Timestamp => row.get_timestamp(index)?.into(),
    };
    Ok(value)
}

/// Extract the value of column `index` from the current row.
///
/// Signedness, precision and scale are read from the row's live metadata so
/// the resolved width matches the schema built from the same metadata.
/// Returns `Ok(None)` for unsupported types. A value the driver flags as SQL
/// NULL is always returned as [`Value::Null`].
pub fn extract_field(
    row: &mut dyn RowAccessor,
    index: usize,
    sql_type: SqlType,
    config: &ConverterConfig,
) -> Result<Option<Value>> {
    let (signed, precision, scale) = {
        let metadata = row.metadata();
        (
            metadata.is_signed(index)?,
            metadata.precision(index)?,
            metadata.scale(index)?,
        )
    };
    let Some(kind) = ColumnKind::resolve(sql_type, signed, precision, scale, config.map_numerics)
    else {
        return Ok(None);
    };

    let value = read_value(kind, row, index, config.max_lob_length)?;
    if row.was_null() {
        return Ok(Some(Value::Null));
    }
    Ok(Some(value))
}

/// Convert the current row into a record of `schema`.
///
/// Metadata lookups, extraction failures and values the schema rejects are
/// logged and leave the field unset. Only a failure to read the column count
/// aborts the row.
pub fn convert_record(
    schema: &Arc<RecordSchema>,
    row: &mut dyn RowAccessor,
    config: &ConverterConfig,
) -> Result<Record> {
    let count = row.metadata().column_count()?;
    let mut record = Record::new(Arc::clone(schema));

    for index in 0..count {
        let (sql_type, name) = match column_identity(row, index) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(column = index, error = %e, "Ignoring column with unreadable metadata");
                continue;
            }
        };

        match extract_field(row, index, sql_type, config) {
            Ok(Some(value)) => {
                if let Err(e) = record.put(&name, value) {
                    warn!(field = %name, error = %e, "Ignoring value rejected by schema");
                }
            }
            // Unsupported types were already reported when the schema was built.
            Ok(None) => {}
            Err(e) => {
                warn!(
                    field = %name,
                    %sql_type,
                    error = %e,
                    "Ignoring field because extraction failed"
                );
            }
        }
    }

    Ok(record)
}

/// Type and field name of column `index`
fn column_identity(row: &dyn RowAccessor, index: usize) -> Result<(SqlType, String)> {
    let metadata = row.metadata();
    let sql_type = SqlType::from_code(metadata.column_type(index)?);
    let label = metadata.column_label(index)?;
    let name = metadata.column_name(index)?;
    Ok((sql_type, field_name(&label, &name).to_string()))
}
