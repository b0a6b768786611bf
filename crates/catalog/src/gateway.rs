// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog gateway trait
//!
//! This module defines the async seam through which discovery runs catalog
//! queries against an already-open database session.

use serde::Serialize;

use crate::error::CatalogResult;
use crate::row::CatalogRow;

/// Transaction isolation level reported by a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Description of the transaction a gateway session is enlisted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionInfo {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl TransactionInfo {
    /// Whether every pass of a run sees the same catalog state
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self.isolation,
            IsolationLevel::RepeatableRead | IsolationLevel::Serializable
        )
    }
}

/// Gateway trait for executing catalog queries
///
/// Implementations wrap one session (connection or transaction). Discovery
/// borrows the gateway mutably for a whole run and never issues two queries
/// at once.
///
/// # Examples
///
/// ```rust,ignore
/// use schemagraph_catalog::{CatalogGateway, CatalogResult};
///
/// async fn count_schemas(gateway: &mut impl CatalogGateway) -> CatalogResult<usize> {
///     let rows = gateway.execute("SELECT nspname::text AS schema_name FROM pg_namespace").await?;
///     Ok(rows.len())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogGateway: Send {
    /// Execute a SQL text and return its rows in result order
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConnectionFailed` if the session is unusable.
    /// Returns `CatalogError::QueryFailed` if the statement fails.
    /// Returns `CatalogError::QueryTimeout` if the query exceeds timeout.
    async fn execute(&mut self, sql: &str) -> CatalogResult<Vec<CatalogRow>>;

    /// Whether the session is enlisted in a transaction
    fn is_in_transaction(&self) -> bool {
        self.current_transaction().is_some()
    }

    /// The transaction the session is enlisted in, if any
    fn current_transaction(&self) -> Option<TransactionInfo> {
        None
    }
}
