// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Catalog row fixtures
//!
//! Each builder returns a row carrying every field the matching PostgreSQL
//! pass query selects, with neutral defaults. Override fields with
//! [`CatalogRow::with`].

use chrono::{DateTime, Utc};
use schemagraph_catalog::{CatalogRow, CatalogValue};

/// Sample catalog rows for testing
pub struct CatalogFixtures;

impl CatalogFixtures {
    // ===== Database and namespace rows =====

    pub fn database(id: i64, name: &str) -> CatalogRow {
        CatalogRow::new()
            .with("database_id", id)
            .with("database_name", name)
            .with("collation_name", "en_US.UTF-8")
            .with("can_stat_files", false)
    }

    /// Creation time of a database, as read once server file access is granted
    pub fn creation_time(id: i64, created_at: Option<DateTime<Utc>>) -> CatalogRow {
        CatalogRow::new()
            .with("database_id", id)
            .with("created_at", created_at)
    }

    pub fn schema(id: i64, name: &str) -> CatalogRow {
        CatalogRow::new()
            .with("schema_id", id)
            .with("schema_name", name)
    }

    // ===== Relation rows =====

    pub fn table(id: i64, schema_id: i64, name: &str) -> CatalogRow {
        CatalogRow::new()
            .with("relation_id", id)
            .with("schema_id", schema_id)
            .with("relation_name", name)
    }

    pub fn view(id: i64, schema_id: i64, name: &str, definition: &str) -> CatalogRow {
        Self::table(id, schema_id, name).with("definition", definition)
    }

    // ===== Column rows =====

    /// Plain table column
    pub fn column(
        schema: &str,
        table: &str,
        name: &str,
        ordinal: i32,
        store_type: &str,
        nullable: bool,
    ) -> CatalogRow {
        CatalogRow::new()
            .with("schema_name", schema)
            .with("relation_name", table)
            .with("relation_kind", "r")
            .with("column_name", name)
            .with("ordinal_position", ordinal)
            .with("column_default", CatalogValue::Null)
            .with("is_nullable", if nullable { "YES" } else { "NO" })
            .with("store_type", store_type)
            .with("character_maximum_length", CatalogValue::Null)
            .with("precision", CatalogValue::Null)
            .with("scale", CatalogValue::Null)
            .with("is_identity", "NO")
            .with("identity_start", CatalogValue::Null)
            .with("identity_increment", CatalogValue::Null)
            .with("identity_last_value", CatalogValue::Null)
            .with("is_generated", "NEVER")
            .with("generation_expression", CatalogValue::Null)
    }

    /// Column of a view
    pub fn view_column(
        schema: &str,
        view: &str,
        name: &str,
        ordinal: i32,
        store_type: &str,
    ) -> CatalogRow {
        Self::column(schema, view, name, ordinal, store_type, true).with("relation_kind", "v")
    }

    /// `GENERATED ... AS IDENTITY` column
    pub fn identity_column(
        schema: &str,
        table: &str,
        name: &str,
        ordinal: i32,
        store_type: &str,
        last_value: Option<i64>,
    ) -> CatalogRow {
        Self::column(schema, table, name, ordinal, store_type, false)
            .with("is_identity", "YES")
            .with("identity_start", "1")
            .with("identity_increment", "1")
            .with("identity_last_value", last_value.map(|v| v.to_string()))
    }

    // ===== Constraint and index rows =====

    /// Member row of a primary key or unique constraint
    pub fn key_column(
        schema: &str,
        table: &str,
        constraint: &str,
        column: &str,
        ordinal: i32,
    ) -> CatalogRow {
        CatalogRow::new()
            .with("schema_name", schema)
            .with("table_name", table)
            .with("constraint_name", constraint)
            .with("column_name", column)
            .with("ordinal_position", ordinal)
    }

    /// Member row of a foreign key with `NO ACTION` rules and `MATCH SIMPLE`
    #[allow(clippy::too_many_arguments)]
    pub fn foreign_key_column(
        schema: &str,
        table: &str,
        constraint: &str,
        column: &str,
        ordinal: i32,
        target_schema: &str,
        target_table: &str,
        target_column: &str,
    ) -> CatalogRow {
        Self::key_column(schema, table, constraint, column, ordinal)
            .with("target_schema", target_schema)
            .with("target_table", target_table)
            .with("target_column", target_column)
            .with("update_rule", "NO ACTION")
            .with("delete_rule", "NO ACTION")
            .with("match_option", "NONE")
    }

    /// Member row of a plain, non-partial index on a column
    pub fn index_column(
        schema: &str,
        table: &str,
        index: Option<&str>,
        column: &str,
        ordinality: i32,
    ) -> CatalogRow {
        CatalogRow::new()
            .with("schema_name", schema)
            .with("table_name", table)
            .with("index_name", index)
            .with("column_name", column)
            .with("ordinality", ordinality)
            .with("is_unique", false)
            .with("is_partial", false)
            .with("is_functional", false)
            .with("is_expression", false)
    }

    /// Member row of an expression index
    pub fn index_expression(
        schema: &str,
        table: &str,
        index: &str,
        expression: &str,
        ordinality: i32,
    ) -> CatalogRow {
        Self::index_column(schema, table, Some(index), expression, ordinality)
            .with("is_functional", true)
            .with("is_expression", true)
    }
}
