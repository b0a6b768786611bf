// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # schemagraph - Catalog Discovery
//!
//! This crate reads the system catalogs of a relational database and
//! assembles them into a [`CatalogGraph`](schemagraph_ir::CatalogGraph).
//!
//! ## Architecture
//!
//! - [`CatalogGateway`]: executes catalog queries on an open session
//! - [`map_store_type`] / [`TypeMapper`]: vendor store types to portable types
//! - [`EntityRegistry`]: everything discovered so far, looked up by key
//! - [`ConstraintAssembler`]: folds one-row-per-column results into keys and indexes
//! - [`discover`]: runs the passes in dependency order
//!
//! Vendor differences are data: a [`CatalogDialect`] carries the query text
//! for each [`Pass`] and the store-type spellings its catalog reports.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemagraph_catalog::{discover, CatalogError, CatalogGateway, DiscoveryOptions};
//!
//! async fn print_tables(gateway: &mut impl CatalogGateway) -> Result<(), CatalogError> {
//!     let graph = discover(gateway, &DiscoveryOptions::new("shop")).await?;
//!     for table in graph.tables() {
//!         println!("{}.{}", table.schema, table.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod dialect;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod live_postgres;
pub mod options;
pub mod passes;
pub mod registry;
pub mod row;
pub mod types;

// Re-exports
pub use assembler::{Assembled, CompositeEntity, ConstraintAssembler, ForeignKeyMember, IndexMember};
pub use dialect::{CatalogDialect, POSTGRES, PassQueries};
pub use discovery::{discover, discover_with_dialect};
pub use error::{CatalogError, CatalogResult, EntityKind};
pub use gateway::{CatalogGateway, IsolationLevel, TransactionInfo};
pub use live_postgres::{LivePostgresGateway, discover_postgres, discover_postgres_with_options};
pub use options::{DiscoveryOptions, UnmappedTypePolicy};
pub use passes::Pass;
pub use registry::{EntityRegistry, RelationKind};
pub use row::{CatalogRow, CatalogValue};
pub use types::{NormalizedType, TypeMapper, map_store_type, normalize_store_type};
