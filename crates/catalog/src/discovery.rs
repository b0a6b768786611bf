// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Discovery orchestrator
//!
//! Runs every pass in dependency order over one gateway session and hands
//! back the finished graph. The first error aborts the run; no partial graph
//! is ever returned.

use tracing::{debug, info, warn};

use schemagraph_ir::CatalogGraph;

use crate::dialect::{CatalogDialect, POSTGRES};
use crate::error::{CatalogError, CatalogResult};
use crate::gateway::CatalogGateway;
use crate::options::DiscoveryOptions;
use crate::passes::{self, Pass, PassContext};
use crate::registry::EntityRegistry;

/// Discover a PostgreSQL database through an open gateway session
///
/// # Errors
///
/// Returns `CatalogError::ValidationError` before any query if the options are invalid.
/// Returns `CatalogError::NotFound` if the database or an owner entity is missing.
/// Returns `CatalogError::Inconsistent` if rows of one composite entity disagree.
/// Gateway errors are returned unchanged.
///
/// # Examples
///
/// ```rust,ignore
/// let graph = discover(&mut gateway, &DiscoveryOptions::new("shop")).await?;
/// for table in graph.tables() {
///     println!("{}.{}", table.schema, table.name);
/// }
/// ```
pub async fn discover<G>(gateway: &mut G, options: &DiscoveryOptions) -> CatalogResult<CatalogGraph>
where
    G: CatalogGateway + ?Sized,
{
    discover_with_dialect(gateway, &POSTGRES, options).await
}

/// Discover a database using an explicit dialect
pub async fn discover_with_dialect<G>(
    gateway: &mut G,
    dialect: &CatalogDialect,
    options: &DiscoveryOptions,
) -> CatalogResult<CatalogGraph>
where
    G: CatalogGateway + ?Sized,
{
    options.validate()?;

    info!(
        database = %options.database_name,
        dialect = %dialect.dialect,
        "Starting catalog discovery"
    );

    match gateway.current_transaction() {
        Some(tx) if tx.is_snapshot() => {}
        Some(tx) => warn!(
            isolation = ?tx.isolation,
            "Discovery transaction is not a snapshot; passes may observe concurrent DDL"
        ),
        None if gateway.is_in_transaction() => {}
        None => warn!("Discovery is running outside a transaction; passes may observe concurrent DDL"),
    }

    let mut registry = EntityRegistry::new(dialect.dialect);
    let mut ctx = PassContext::new(dialect, options);

    for pass in Pass::ORDERED {
        if !ctx.should_run(pass) {
            debug!(pass = %pass, "Skipping catalog pass");
            continue;
        }
        if options.is_cancelled() {
            info!(before = %pass, "Catalog discovery cancelled");
            return Err(CatalogError::Cancelled { before: pass });
        }

        let rows = gateway.execute(dialect.query(pass)).await?;
        let row_count = rows.len();
        passes::apply(pass, &mut registry, rows, &mut ctx)?;
        debug!(pass = %pass, rows = row_count, "Applied catalog pass");
    }

    let graph = registry.into_graph()?;
    info!(
        database = %graph.database().name,
        schemas = graph.schemas().len(),
        tables = graph.tables().count(),
        views = graph.views().count(),
        store_types = ctx.types.cached(),
        "Catalog discovery finished"
    );
    Ok(graph)
}
