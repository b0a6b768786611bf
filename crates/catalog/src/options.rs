// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Discovery options
//!
//! Caller configuration for one discovery run. Options are checked before
//! any catalog query is issued.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{CatalogError, CatalogResult};

/// Longest identifier PostgreSQL keeps (NAMEDATALEN - 1)
const MAX_IDENTIFIER_BYTES: usize = 63;

/// What to do with a column whose store type has no portable mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedTypePolicy {
    /// Abort the run with `UnsupportedType`
    #[default]
    Fail,
    /// Keep the store type and leave the portable type empty
    Opaque,
}

/// Options for a discovery run
///
/// # Examples
///
/// ```rust,ignore
/// let options = DiscoveryOptions::new("shop")
///     .with_unmapped_types(UnmappedTypePolicy::Opaque);
/// let graph = discover(&mut gateway, &options).await?;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryOptions {
    /// Database to discover, matched case-insensitively
    pub database_name: String,
    pub unmapped_types: UnmappedTypePolicy,
    /// Checked before each pass
    #[serde(skip)]
    pub cancellation: Option<CancellationToken>,
}

impl DiscoveryOptions {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            ..Self::default()
        }
    }

    pub fn with_unmapped_types(mut self, policy: UnmappedTypePolicy) -> Self {
        self.unmapped_types = policy;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Check the options before any query runs
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ValidationError` if the database name is blank,
    /// longer than an identifier may be, or contains a NUL byte.
    pub fn validate(&self) -> CatalogResult<()> {
        let name = &self.database_name;
        if name.trim().is_empty() {
            return Err(CatalogError::ValidationError(
                "database_name cannot be empty".to_string(),
            ));
        }
        if name.len() > MAX_IDENTIFIER_BYTES {
            return Err(CatalogError::ValidationError(format!(
                "database_name is {} bytes, the limit is {}",
                name.len(),
                MAX_IDENTIFIER_BYTES
            )));
        }
        if name.contains('\0') {
            return Err(CatalogError::ValidationError(
                "database_name cannot contain NUL".to_string(),
            ));
        }
        Ok(())
    }
}
