//! Converter facade
//!
//! Holds a validated configuration and drives schema mapping once per result
//! and value extraction once per row.
//!
//! ```rust,ignore
//! let converter = Converter::new(ConverterConfig::new().with_map_numerics(true))?;
//! let schema = converter.convert_schema("users", rows.metadata(), &defaults)?;
//! while rows.next_row() {
//!     let record = converter.convert_record(&schema, &mut rows)?;
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::ConverterConfig;
use crate::connection::{ResultSetMetadata, RowAccessor, RowCursor};
use crate::error::Result;
use crate::extract;
use crate::record::Record;
use crate::schema::{self, RecordSchema};

/// Converter statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterStats {
    /// Schemas built
    pub schemas_built: u64,
    /// Columns dropped from schemas
    pub columns_dropped: u64,
    /// Records converted
    pub records_converted: u64,
    /// Schema fields left unset in converted records
    pub fields_unset: u64,
}

/// Atomic converter statistics
#[derive(Debug, Default)]
#[allow(missing_docs)]
pub struct AtomicConverterStats {
    pub schemas_built: AtomicU64,
    pub columns_dropped: AtomicU64,
    pub records_converted: AtomicU64,
    pub fields_unset: AtomicU64,
}

impl AtomicConverterStats {
    /// Record a built schema
    pub fn record_schema(&self, columns_dropped: u64) {
        self.schemas_built.fetch_add(1, Ordering::Relaxed);
        self.columns_dropped
            .fetch_add(columns_dropped, Ordering::Relaxed);
    }

    /// Record a converted record
    pub fn record_conversion(&self, fields_unset: u64) {
        self.records_converted.fetch_add(1, Ordering::Relaxed);
        self.fields_unset.fetch_add(fields_unset, Ordering::Relaxed);
    }

    /// Get a snapshot
    pub fn snapshot(&self) -> ConverterStats {
        ConverterStats {
            schemas_built: self.schemas_built.load(Ordering::Relaxed),
            columns_dropped: self.columns_dropped.load(Ordering::Relaxed),
            records_converted: self.records_converted.load(Ordering::Relaxed),
            fields_unset: self.fields_unset.load(Ordering::Relaxed),
        }
    }
}

/// Converts result metadata and rows into schemas and records
#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    stats: AtomicConverterStats,
}

impl Converter {
    /// Create a converter, validating the configuration
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: AtomicConverterStats::default(),
        })
    }

    /// Configuration in use
    #[inline]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Statistics snapshot
    pub fn stats(&self) -> ConverterStats {
        self.stats.snapshot()
    }

    /// Build the record schema of a result.
    ///
    /// `defaults` maps column names to raw catalog default expressions.
    pub fn convert_schema(
        &self,
        table: &str,
        metadata: &dyn ResultSetMetadata,
        defaults: &HashMap<String, String>,
    ) -> Result<Arc<RecordSchema>> {
        let (schema, dropped) = schema::map_columns(table, metadata, defaults, &self.config)?;
        self.stats.record_schema(dropped as u64);
        debug!(
            table,
            fields = schema.len(),
            dropped,
            "Built record schema"
        );
        Ok(Arc::new(schema))
    }

    /// Convert the current row into a record of `schema`
    pub fn convert_record(
        &self,
        schema: &Arc<RecordSchema>,
        row: &mut dyn RowAccessor,
    ) -> Result<Record> {
        let record = extract::convert_record(schema, row, &self.config)?;
        let unset = schema.len().saturating_sub(record.set_count()) as u64;
        self.stats.record_conversion(unset);
        Ok(record)
    }

    /// Convert every remaining row of a cursor.
    ///
    /// A cursor failure aborts the batch; records converted so far are
    /// discarded.
    pub fn convert_rows(
        &self,
        schema: &Arc<RecordSchema>,
        rows: &mut dyn RowCursor,
    ) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while rows.advance()? {
            records.push(self.convert_record(schema, rows.current())?);
        }
        Ok(records)
    }
}
