// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema graph
//!
//! The finished, owned result of one discovery run. The graph is read-only:
//! it exposes lookups but no mutation, and re-running discovery produces a
//! new graph rather than updating this one.

use serde::{Deserialize, Serialize};

use crate::metadata::{Database, ForeignKey, RelationRef, Schema, Table, View};

/// Cross-referenced graph of one database's structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogGraph {
    database: Database,
}

impl CatalogGraph {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Root database entity
    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.database.schemas
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.database.schemas.iter().find(|s| s.name == name)
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.schema(schema).and_then(|s| s.table(name))
    }

    pub fn view(&self, schema: &str, name: &str) -> Option<&View> {
        self.schema(schema).and_then(|s| s.view(name))
    }

    /// Resolve a relation reference (e.g. a foreign key target) to its table
    pub fn resolve(&self, reference: &RelationRef) -> Option<&Table> {
        self.table(&reference.schema, &reference.name)
    }

    /// All tables across all schemas, in discovery order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.database.schemas.iter().flat_map(|s| s.tables.iter())
    }

    /// All views across all schemas, in discovery order
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.database.schemas.iter().flat_map(|s| s.views.iter())
    }

    /// Foreign keys (with their owning table) that reference `target`
    pub fn foreign_keys_to(&self, target: &RelationRef) -> Vec<(&Table, &ForeignKey)> {
        self.tables()
            .flat_map(|t| t.foreign_keys.iter().map(move |fk| (t, fk)))
            .filter(|(_, fk)| &fk.target == target)
            .collect()
    }

    /// Give up the graph wrapper and take the root entity
    pub fn into_database(self) -> Database {
        self.database
    }
}
