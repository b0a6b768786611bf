// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Entity registry
//!
//! In-memory indexed store of everything a discovery run has found so far.
//! Entities are addressed by (schema, name); the database and schemas are
//! also reachable by catalog id. Nothing is removed during a run, and the
//! registry is consumed when the finished graph is built.

use std::collections::HashMap;
use std::hash::Hash;

use schemagraph_ir::{
    CatalogGraph, Column, Database, Dialect, RelationRef, Schema, Table, View,
};

use crate::error::{CatalogError, CatalogResult, EntityKind};

/// Insertion-ordered store with an optional key index
///
/// Unkeyed entries keep their position but can never be looked up.
#[derive(Debug)]
pub(crate) struct KeyedStore<K, V> {
    entries: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> KeyedStore<K, V> {
    /// Insert under `key`; hands the value back if the key is taken
    pub(crate) fn put(&mut self, key: K, value: V) -> Result<(), V> {
        if self.index.contains_key(&key) {
            return Err(value);
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(value);
        Ok(())
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.index.get(key).map(|&i| &mut self.entries[i])
    }

    pub(crate) fn get_or_create(&mut self, key: K, create: impl FnOnce() -> V) -> &mut V {
        let next = self.entries.len();
        let slot = *self.index.entry(key).or_insert(next);
        if slot == next {
            self.entries.push(create());
        }
        &mut self.entries[slot]
    }

    pub(crate) fn push_unkeyed(&mut self, value: V) {
        self.entries.push(value);
    }

    pub(crate) fn into_values(self) -> Vec<V> {
        self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Which kind of relation a column row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    View,
}

/// Registry of entities discovered during one run
#[derive(Debug)]
pub struct EntityRegistry {
    dialect: Dialect,
    database: Option<Database>,
    schemas: KeyedStore<String, Schema>,
    schema_ids: HashMap<i64, String>,
    tables: KeyedStore<RelationRef, Table>,
    views: KeyedStore<RelationRef, View>,
}

impl EntityRegistry {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            database: None,
            schemas: KeyedStore::default(),
            schema_ids: HashMap::new(),
            tables: KeyedStore::default(),
            views: KeyedStore::default(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn put_database(&mut self, database: Database) -> CatalogResult<()> {
        if let Some(existing) = &self.database {
            return Err(CatalogError::inconsistent(
                &existing.name,
                &database.name,
                "a run discovers exactly one database",
            ));
        }
        self.database = Some(database);
        Ok(())
    }

    pub fn database(&self) -> CatalogResult<&Database> {
        self.database
            .as_ref()
            .ok_or_else(|| CatalogError::not_found(EntityKind::Database, "<unresolved>"))
    }

    pub fn database_mut(&mut self) -> CatalogResult<&mut Database> {
        self.database
            .as_mut()
            .ok_or_else(|| CatalogError::not_found(EntityKind::Database, "<unresolved>"))
    }

    fn database_name(&self) -> &str {
        self.database.as_ref().map_or("", |db| db.name.as_str())
    }

    pub fn put_schema(&mut self, schema: Schema) -> CatalogResult<()> {
        let (id, name) = (schema.id, schema.name.clone());
        if self.schema_ids.contains_key(&id) {
            return Err(CatalogError::inconsistent(
                self.database_name(),
                &name,
                format!("duplicate schema id {}", id),
            ));
        }
        self.schemas.put(name.clone(), schema).map_err(|dup| {
            CatalogError::inconsistent(self.database_name(), &dup.name, "duplicate schema name")
        })?;
        self.schema_ids.insert(id, name);
        Ok(())
    }

    pub fn schema(&self, name: &str) -> CatalogResult<&Schema> {
        self.schemas
            .get(&name.to_string())
            .ok_or_else(|| CatalogError::not_found(EntityKind::Schema, name))
    }

    pub fn schema_by_id(&self, id: i64) -> CatalogResult<&Schema> {
        self.schema_ids
            .get(&id)
            .and_then(|name| self.schemas.get(name))
            .ok_or_else(|| CatalogError::not_found(EntityKind::Schema, format!("#{}", id)))
    }

    fn check_relation_name(&self, key: &RelationRef) -> CatalogResult<()> {
        self.schema(&key.schema)?;
        if self.tables.get(key).is_some() || self.views.get(key).is_some() {
            return Err(CatalogError::inconsistent(
                &key.schema,
                &key.name,
                "duplicate relation name",
            ));
        }
        Ok(())
    }

    pub fn put_table(&mut self, table: Table) -> CatalogResult<()> {
        let key = table.reference();
        self.check_relation_name(&key)?;
        self.tables
            .put(key, table)
            .map_err(|t| CatalogError::inconsistent(&t.schema, &t.name, "duplicate table"))
    }

    pub fn table(&self, key: &RelationRef) -> CatalogResult<&Table> {
        self.tables
            .get(key)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Table, key))
    }

    pub fn table_mut(&mut self, key: &RelationRef) -> CatalogResult<&mut Table> {
        self.tables
            .get_mut(key)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Table, key))
    }

    pub fn put_view(&mut self, view: View) -> CatalogResult<()> {
        let key = view.reference();
        self.check_relation_name(&key)?;
        self.views
            .put(key, view)
            .map_err(|v| CatalogError::inconsistent(&v.schema, &v.name, "duplicate view"))
    }

    pub fn view(&self, key: &RelationRef) -> CatalogResult<&View> {
        self.views
            .get(key)
            .ok_or_else(|| CatalogError::not_found(EntityKind::View, key))
    }

    /// Column list of a table or view
    pub fn relation_columns_mut(
        &mut self,
        key: &RelationRef,
        kind: RelationKind,
    ) -> CatalogResult<&mut Vec<Column>> {
        match kind {
            RelationKind::Table => self.table_mut(key).map(|t| &mut t.columns),
            RelationKind::View => self
                .views
                .get_mut(key)
                .map(|v| &mut v.columns)
                .ok_or_else(|| CatalogError::not_found(EntityKind::View, key)),
        }
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Consume the registry and attach every relation to its schema
    pub fn into_graph(self) -> CatalogResult<CatalogGraph> {
        let mut database = self
            .database
            .ok_or_else(|| CatalogError::not_found(EntityKind::Database, "<unresolved>"))?;

        let mut schemas = self.schemas;
        for table in self.tables.into_values() {
            let key = table.schema.clone();
            schemas
                .get_mut(&key)
                .ok_or_else(|| CatalogError::not_found(EntityKind::Schema, &key))?
                .tables
                .push(table);
        }
        for view in self.views.into_values() {
            let key = view.schema.clone();
            schemas
                .get_mut(&key)
                .ok_or_else(|| CatalogError::not_found(EntityKind::Schema, &key))?
                .views
                .push(view);
        }

        database.schemas = schemas.into_values();
        Ok(CatalogGraph::new(database))
    }
}
