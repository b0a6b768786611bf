// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the discovery layer.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::passes::Pass;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Kind of entity a failed lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Database,
    Schema,
    Table,
    View,
    Column,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Database => "database",
            EntityKind::Schema => "schema",
            EntityKind::Table => "table",
            EntityKind::View => "view",
            EntityKind::Column => "column",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Query execution timed out
    #[error("Query timed out after {0}s")]
    QueryTimeout(u64),

    /// A referenced entity is absent from the catalog or the registry
    #[error("{kind} '{key}' not found")]
    NotFound { kind: EntityKind, key: String },

    /// Rows describing one composite entity contradict each other
    #[error("Inconsistent constraint '{constraint}' on '{owner}': {reason}")]
    Inconsistent {
        owner: String,
        constraint: String,
        reason: String,
    },

    /// A store type has no portable mapping
    #[error("Unsupported store type: {store_type}")]
    UnsupportedType { store_type: String },

    /// Discovery options are missing or malformed
    #[error("Invalid discovery options: {0}")]
    ValidationError(String),

    /// Invalid gateway configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// A catalog row lacks a field or carries the wrong value type
    #[error("Failed to decode field '{field}': {reason}")]
    RowDecode { field: String, reason: String },

    /// The run was cancelled between passes
    #[error("Discovery cancelled before the {before} pass")]
    Cancelled { before: Pass },

    /// The specified feature is not supported by this build
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl CatalogError {
    pub(crate) fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        CatalogError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn inconsistent(
        owner: impl fmt::Display,
        constraint: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CatalogError::Inconsistent {
            owner: owner.to_string(),
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error reports a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    /// Entity kind of a `NotFound` error
    pub fn not_found_kind(&self) -> Option<EntityKind> {
        match self {
            CatalogError::NotFound { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
