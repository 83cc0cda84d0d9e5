//! Records conforming to a record schema

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::RecordSchema;
use crate::types::Value;

/// One converted row.
///
/// Each schema field is either unset or holds a value its schema accepts.
/// Fields whose extraction failed stay unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<Option<Value>>,
}

impl Record {
    /// Create an empty record for `schema`
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = vec![None; schema.len()];
        Self { schema, values }
    }

    /// Schema of this record
    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Set a field, validating the value against the field schema
    pub fn put(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| Error::field_mismatch(name, "no such field in schema"))?;
        let value = value.into();
        self.schema.fields[index].validate(&value)?;
        self.values[index] = Some(value);
        Ok(())
    }

    /// Value stored for a field, `None` if unset or unknown
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .index_of(name)
            .and_then(|index| self.values[index].as_ref())
    }

    /// Value stored for a field, falling back to the field's default when
    /// the field is unset
    pub fn get_or_default(&self, name: &str) -> Option<&Value> {
        let index = self.schema.index_of(name)?;
        self.values[index]
            .as_ref()
            .or(self.schema.fields[index].default.as_ref())
    }

    /// Whether a field holds a value (possibly null)
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of set fields
    pub fn set_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Iterate over set fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields
            .iter()
            .zip(&self.values)
            .filter_map(|(field, value)| value.as_ref().map(|v| (field.name.as_str(), v)))
    }

    /// Render set fields as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }
}
