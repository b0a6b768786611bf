// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Graph-specific test helpers and custom assertions

use schemagraph_ir::{CatalogGraph, Column, PortableType, Table};

/// Custom assertion helpers for discovered graphs
pub struct GraphAssertions;

impl GraphAssertions {
    /// Assert that a table exists and return it
    pub fn assert_table<'g>(graph: &'g CatalogGraph, schema: &str, table: &str) -> &'g Table {
        graph
            .table(schema, table)
            .unwrap_or_else(|| panic!("Expected table '{}.{}' in graph", schema, table))
    }

    /// Assert a table's column names in ordinal order
    pub fn assert_columns(graph: &CatalogGraph, schema: &str, table: &str, expected: &[&str]) {
        let t = Self::assert_table(graph, schema, table);
        assert_eq!(
            t.column_names(),
            expected,
            "Column list mismatch on '{}.{}'",
            schema,
            table
        );
        for (i, column) in t.columns.iter().enumerate() {
            assert_eq!(
                column.ordinal_position as usize,
                i + 1,
                "Column '{}' out of ordinal order",
                column.name
            );
        }
    }

    /// Assert that a column has the given properties
    pub fn assert_column(
        column: &Column,
        name: &str,
        portable_type: Option<PortableType>,
        nullable: bool,
    ) {
        assert_eq!(column.name, name, "Column name mismatch");
        assert_eq!(column.portable_type, portable_type, "Column portable type mismatch");
        assert_eq!(column.nullable, nullable, "Column nullable mismatch");
    }

    /// Assert a table's primary key name and columns
    pub fn assert_primary_key(
        graph: &CatalogGraph,
        schema: &str,
        table: &str,
        name: &str,
        columns: &[&str],
    ) {
        let t = Self::assert_table(graph, schema, table);
        let pk = t
            .primary_key
            .as_ref()
            .unwrap_or_else(|| panic!("Table '{}.{}' has no primary key", schema, table));
        assert_eq!(pk.name, name, "Primary key name mismatch");
        assert_eq!(pk.columns, columns, "Primary key columns mismatch");
    }

    /// Assert that every foreign key resolves: the target table exists, both
    /// column lists have the same length, and every target column exists
    pub fn assert_foreign_keys_resolve(graph: &CatalogGraph) {
        for table in graph.tables() {
            for fk in &table.foreign_keys {
                let target = graph.resolve(&fk.target).unwrap_or_else(|| {
                    panic!(
                        "Foreign key '{}' on '{}' targets missing table '{}'",
                        fk.name,
                        table.reference(),
                        fk.target
                    )
                });
                assert_eq!(
                    fk.columns.len(),
                    fk.target_columns.len(),
                    "Foreign key '{}' column lists differ in length",
                    fk.name
                );
                for column in &fk.target_columns {
                    assert!(
                        target.column(column).is_some(),
                        "Foreign key '{}' targets missing column '{}.{}'",
                        fk.name,
                        fk.target,
                        column
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagraph_ir::{Database, Dialect, ForeignKey, RelationRef, Schema};

    fn graph_with_fk(target_table: &str) -> CatalogGraph {
        let parent = Table::new(1, "public", "parent")
            .with_columns(vec![Column::new("id", 1, "integer")]);
        let mut child = Table::new(2, "public", "child")
            .with_columns(vec![Column::new("parent_id", 1, "integer")]);
        child.foreign_keys.push(ForeignKey {
            name: "child_parent_fk".to_string(),
            columns: vec!["parent_id".to_string()],
            target: RelationRef::new("public", target_table),
            target_columns: vec!["id".to_string()],
            on_update: Default::default(),
            on_delete: Default::default(),
            match_option: Default::default(),
        });

        let mut schema = Schema::new(2200, "public");
        schema.tables = vec![parent, child];
        let mut db = Database::new(1, "shop", Dialect::PostgreSQL);
        db.schemas.push(schema);
        CatalogGraph::new(db)
    }

    #[test]
    fn test_assert_columns() {
        let graph = graph_with_fk("parent");
        GraphAssertions::assert_columns(&graph, "public", "child", &["parent_id"]);
    }

    #[test]
    fn test_assert_foreign_keys_resolve() {
        GraphAssertions::assert_foreign_keys_resolve(&graph_with_fk("parent"));
    }

    #[test]
    #[should_panic(expected = "targets missing table")]
    fn test_assert_foreign_keys_resolve_fails() {
        GraphAssertions::assert_foreign_keys_resolve(&graph_with_fk("ghost"));
    }

    #[test]
    #[should_panic(expected = "has no primary key")]
    fn test_assert_primary_key_missing() {
        GraphAssertions::assert_primary_key(&graph_with_fk("parent"), "public", "child", "pk", &["id"]);
    }
}
