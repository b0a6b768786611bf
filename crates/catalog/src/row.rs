// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog rows
//!
//! Rows returned by a [`CatalogGateway`](crate::gateway::CatalogGateway) are
//! name-keyed sets of loosely typed values. Every catalog query casts its
//! output to text, integer, boolean or timestamp, so gateways only need to
//! decode those few shapes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};

/// A single value read from a catalog row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CatalogValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl CatalogValue {
    fn kind(&self) -> &'static str {
        match self {
            CatalogValue::Null => "null",
            CatalogValue::Bool(_) => "bool",
            CatalogValue::Int(_) => "int",
            CatalogValue::Text(_) => "text",
            CatalogValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for CatalogValue {
    fn from(value: bool) -> Self {
        CatalogValue::Bool(value)
    }
}

impl From<i64> for CatalogValue {
    fn from(value: i64) -> Self {
        CatalogValue::Int(value)
    }
}

impl From<i32> for CatalogValue {
    fn from(value: i32) -> Self {
        CatalogValue::Int(i64::from(value))
    }
}

impl From<&str> for CatalogValue {
    fn from(value: &str) -> Self {
        CatalogValue::Text(value.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(value: String) -> Self {
        CatalogValue::Text(value)
    }
}

impl From<DateTime<Utc>> for CatalogValue {
    fn from(value: DateTime<Utc>) -> Self {
        CatalogValue::Timestamp(value)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CatalogValue::Null, Into::into)
    }
}

/// One row of a catalog query result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogRow {
    values: HashMap<String, CatalogValue>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CatalogValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CatalogValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&CatalogValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn field(&self, field: &str) -> CatalogResult<&CatalogValue> {
        self.values.get(field).ok_or_else(|| CatalogError::RowDecode {
            field: field.to_string(),
            reason: "missing from row".to_string(),
        })
    }

    fn mismatch(field: &str, expected: &str, found: &CatalogValue) -> CatalogError {
        CatalogError::RowDecode {
            field: field.to_string(),
            reason: format!("expected {}, found {}", expected, found.kind()),
        }
    }

    /// Required text field
    pub fn text(&self, field: &str) -> CatalogResult<String> {
        match self.field(field)? {
            CatalogValue::Text(s) => Ok(s.clone()),
            other => Err(Self::mismatch(field, "text", other)),
        }
    }

    /// Nullable text field
    pub fn opt_text(&self, field: &str) -> CatalogResult<Option<String>> {
        match self.field(field)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Text(s) => Ok(Some(s.clone())),
            other => Err(Self::mismatch(field, "text", other)),
        }
    }

    /// Required integer field; numeric text is accepted
    pub fn int(&self, field: &str) -> CatalogResult<i64> {
        self.opt_int(field)?.ok_or_else(|| CatalogError::RowDecode {
            field: field.to_string(),
            reason: "unexpected null".to_string(),
        })
    }

    /// Nullable integer field; numeric text is accepted
    pub fn opt_int(&self, field: &str) -> CatalogResult<Option<i64>> {
        match self.field(field)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Int(i) => Ok(Some(*i)),
            CatalogValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| CatalogError::RowDecode {
                    field: field.to_string(),
                    reason: format!("'{}' is not an integer: {}", s, e),
                }),
            other => Err(Self::mismatch(field, "int", other)),
        }
    }

    /// Nullable 32-bit integer field
    pub fn opt_i32(&self, field: &str) -> CatalogResult<Option<i32>> {
        self.opt_int(field)?
            .map(|v| {
                i32::try_from(v).map_err(|_| CatalogError::RowDecode {
                    field: field.to_string(),
                    reason: format!("{} does not fit in 32 bits", v),
                })
            })
            .transpose()
    }

    /// Boolean field; NULL reads as `false`
    pub fn flag(&self, field: &str) -> CatalogResult<bool> {
        match self.field(field)? {
            CatalogValue::Null => Ok(false),
            CatalogValue::Bool(b) => Ok(*b),
            CatalogValue::Text(_) => self.yes_no(field),
            other => Err(Self::mismatch(field, "bool", other)),
        }
    }

    /// `information_schema` style `YES`/`NO` field; NULL reads as `false`
    pub fn yes_no(&self, field: &str) -> CatalogResult<bool> {
        match self.field(field)? {
            CatalogValue::Null => Ok(false),
            CatalogValue::Bool(b) => Ok(*b),
            CatalogValue::Text(s) => match s.trim().to_ascii_uppercase().as_str() {
                "YES" | "TRUE" | "T" | "ALWAYS" => Ok(true),
                "NO" | "FALSE" | "F" | "NEVER" | "" => Ok(false),
                _ => Err(CatalogError::RowDecode {
                    field: field.to_string(),
                    reason: format!("'{}' is not a yes/no value", s),
                }),
            },
            other => Err(Self::mismatch(field, "yes/no", other)),
        }
    }

    pub fn opt_timestamp(&self, field: &str) -> CatalogResult<Option<DateTime<Utc>>> {
        match self.field(field)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Timestamp(ts) => Ok(Some(*ts)),
            CatalogValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(|e| CatalogError::RowDecode {
                    field: field.to_string(),
                    reason: format!("'{}' is not a timestamp: {}", s, e),
                }),
            other => Err(Self::mismatch(field, "timestamp", other)),
        }
    }
}

impl FromIterator<(String, CatalogValue)> for CatalogRow {
    fn from_iter<I: IntoIterator<Item = (String, CatalogValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
