use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single column value. Only the two kinds the schema uses are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Column name to value. Ordered so generated SQL is stable.
pub type FieldMap = BTreeMap<String, FieldValue>;

pub trait TableIdentity {
    fn table(&self) -> &'static str;
}

pub trait TableFields: TableIdentity {
    fn fields(&self) -> FieldMap;
}

pub trait TableConsumer {
    fn with_fields(&mut self, fields: &FieldMap) -> Result<()>;
}

/// Builds a record out of a row's field map.
pub fn consume<T: TableConsumer + Default>(fields: &FieldMap) -> Result<T> {
    let mut record = T::default();
    record.with_fields(fields)?;
    Ok(record)
}

pub fn consume_all<T: TableConsumer + Default>(rows: &[FieldMap]) -> Result<Vec<T>> {
    rows.iter().map(consume::<T>).collect()
}

pub fn text(fields: &FieldMap, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(FieldValue::Text(value)) => Some(value.clone()),
        _ => None,
    }
}

pub fn required_text(fields: &FieldMap, key: &'static str) -> Result<String> {
    text(fields, key).ok_or_else(|| Error::MissingField(key).into())
}

/// Reads a timestamp stored either natively or as RFC 3339 text.
pub fn timestamp(fields: &FieldMap, key: &'static str) -> Result<Option<DateTime<Utc>>> {
    match fields.get(key) {
        Some(FieldValue::Timestamp(value)) => Ok(Some(*value)),
        Some(FieldValue::Text(value)) if value.is_empty() => Ok(None),
        Some(FieldValue::Text(value)) => DateTime::parse_from_rfc3339(value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| Error::InvalidTimestamp(key).into()),
        None => Ok(None),
    }
}
