// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog dialects
//!
//! A dialect is pure data: the query text for each discovery pass and the
//! store-type spellings its catalog reports. One orchestrator runs every
//! dialect.

mod postgres;

pub use postgres::POSTGRES;

use schemagraph_ir::{Dialect, PortableType};

use crate::passes::Pass;

/// Query text for each discovery pass
#[derive(Debug, Clone, Copy)]
pub struct PassQueries {
    pub database: &'static str,
    /// Only run when the database pass reports the session may read it
    pub creation_time: &'static str,
    pub schemas: &'static str,
    pub tables: &'static str,
    pub views: &'static str,
    pub columns: &'static str,
    pub primary_keys: &'static str,
    pub unique_constraints: &'static str,
    pub foreign_keys: &'static str,
    pub indexes: &'static str,
}

/// Vendor specific data driving a discovery run
#[derive(Debug)]
pub struct CatalogDialect {
    pub dialect: Dialect,
    /// Schema unqualified names resolve against
    pub default_schema: &'static str,
    /// Namespaces never reported as user schemas
    pub system_schemas: &'static [&'static str],
    /// Normalized store type spelling to portable type
    pub type_spellings: &'static [(&'static str, PortableType)],
    pub queries: PassQueries,
}

impl CatalogDialect {
    /// Query text for a pass
    pub fn query(&self, pass: Pass) -> &'static str {
        let q = &self.queries;
        match pass {
            Pass::Database => q.database,
            Pass::CreationTime => q.creation_time,
            Pass::Schemas => q.schemas,
            Pass::Tables => q.tables,
            Pass::Views => q.views,
            Pass::Columns => q.columns,
            Pass::PrimaryKeys => q.primary_keys,
            Pass::UniqueConstraints => q.unique_constraints,
            Pass::ForeignKeys => q.foreign_keys,
            Pass::Indexes => q.indexes,
        }
    }

    pub fn is_system_schema(&self, name: &str) -> bool {
        self.system_schemas.contains(&name)
    }
}
