// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Discovery passes
//!
//! Each pass turns the rows of one catalog query into registry entries.
//! Passes resolve their owners from entries earlier passes created, so they
//! must run in [`Pass::ORDERED`] order.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use schemagraph_ir::{
    Column, Database, ForeignKey, Identity, Index, MatchOption, PrimaryKey, ReferentialAction,
    RelationRef, Schema, Table, UniqueConstraint, View,
};

use crate::assembler::{ConstraintAssembler, ForeignKeyMember, IndexMember};
use crate::dialect::CatalogDialect;
use crate::error::{CatalogError, CatalogResult, EntityKind};
use crate::options::{DiscoveryOptions, UnmappedTypePolicy};
use crate::registry::{EntityRegistry, RelationKind};
use crate::row::CatalogRow;
use crate::types::TypeMapper;

/// One catalog query and the registry update it drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pass {
    Database,
    /// Reads the database creation time; skipped unless the session may
    /// stat server files
    CreationTime,
    Schemas,
    Tables,
    Views,
    Columns,
    PrimaryKeys,
    UniqueConstraints,
    ForeignKeys,
    Indexes,
}

impl Pass {
    /// Dependency order; no pass may run before the ones preceding it
    pub const ORDERED: [Pass; 10] = [
        Pass::Database,
        Pass::CreationTime,
        Pass::Schemas,
        Pass::Tables,
        Pass::Views,
        Pass::Columns,
        Pass::PrimaryKeys,
        Pass::UniqueConstraints,
        Pass::ForeignKeys,
        Pass::Indexes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pass::Database => "database",
            Pass::CreationTime => "creation time",
            Pass::Schemas => "schemas",
            Pass::Tables => "tables",
            Pass::Views => "views",
            Pass::Columns => "columns",
            Pass::PrimaryKeys => "primary keys",
            Pass::UniqueConstraints => "unique constraints",
            Pass::ForeignKeys => "foreign keys",
            Pass::Indexes => "indexes",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run-wide state passes read besides the registry
pub(crate) struct PassContext<'a> {
    pub dialect: &'a CatalogDialect,
    pub options: &'a DiscoveryOptions,
    pub types: TypeMapper,
    /// Set by the database pass
    pub can_stat_files: bool,
}

impl<'a> PassContext<'a> {
    pub(crate) fn new(dialect: &'a CatalogDialect, options: &'a DiscoveryOptions) -> Self {
        Self {
            dialect,
            options,
            types: TypeMapper::for_dialect(dialect),
            can_stat_files: false,
        }
    }

    /// Whether `pass` has anything to read in this run
    pub(crate) fn should_run(&self, pass: Pass) -> bool {
        match pass {
            Pass::CreationTime => self.can_stat_files,
            _ => true,
        }
    }
}

/// Apply the rows of one pass to the registry
pub(crate) fn apply(
    pass: Pass,
    registry: &mut EntityRegistry,
    rows: Vec<CatalogRow>,
    ctx: &mut PassContext<'_>,
) -> CatalogResult<()> {
    match pass {
        Pass::Database => apply_database(registry, rows, ctx),
        Pass::CreationTime => apply_creation_time(registry, rows),
        Pass::Schemas => apply_schemas(registry, rows, ctx),
        Pass::Tables => apply_tables(registry, rows),
        Pass::Views => apply_views(registry, rows),
        Pass::Columns => apply_columns(registry, rows, ctx),
        Pass::PrimaryKeys => apply_primary_keys(registry, rows),
        Pass::UniqueConstraints => apply_unique_constraints(registry, rows),
        Pass::ForeignKeys => apply_foreign_keys(registry, rows),
        Pass::Indexes => apply_indexes(registry, rows),
    }
}

/// Pick the target database; an exact-case match beats a case-insensitive one
fn apply_database(
    registry: &mut EntityRegistry,
    rows: Vec<CatalogRow>,
    ctx: &mut PassContext<'_>,
) -> CatalogResult<()> {
    let target = ctx.options.database_name.as_str();

    let mut exact = None;
    let mut folded = None;
    for row in rows {
        let name = row.text("database_name")?;
        if name == target {
            exact = Some(row);
            break;
        }
        if folded.is_none() && name.to_lowercase() == target.to_lowercase() {
            folded = Some(row);
        }
    }

    let row = exact
        .or(folded)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Database, target))?;

    let mut database = Database::new(
        row.int("database_id")?,
        row.text("database_name")?,
        registry.dialect(),
    );
    database.default_schema = ctx.dialect.default_schema.to_string();
    database.collation = row.opt_text("collation_name")?;
    ctx.can_stat_files = row.flag("can_stat_files")?;
    registry.put_database(database)
}

fn apply_creation_time(registry: &mut EntityRegistry, rows: Vec<CatalogRow>) -> CatalogResult<()> {
    let database = registry.database_mut()?;
    for row in rows {
        if row.int("database_id")? == database.id {
            database.created_at = row.opt_timestamp("created_at")?;
            break;
        }
    }
    Ok(())
}

fn apply_schemas(
    registry: &mut EntityRegistry,
    rows: Vec<CatalogRow>,
    ctx: &PassContext<'_>,
) -> CatalogResult<()> {
    for row in rows {
        let name = row.text("schema_name")?;
        if ctx.dialect.is_system_schema(&name) {
            debug!(schema = %name, "Skipping system schema");
            continue;
        }
        registry.put_schema(Schema::new(row.int("schema_id")?, name))?;
    }
    Ok(())
}

fn owning_schema(registry: &EntityRegistry, row: &CatalogRow) -> CatalogResult<String> {
    Ok(registry.schema_by_id(row.int("schema_id")?)?.name.clone())
}

fn apply_tables(registry: &mut EntityRegistry, rows: Vec<CatalogRow>) -> CatalogResult<()> {
    for row in rows {
        let schema = owning_schema(registry, &row)?;
        let table = Table::new(row.int("relation_id")?, schema, row.text("relation_name")?);
        registry.put_table(table)?;
    }
    Ok(())
}

fn apply_views(registry: &mut EntityRegistry, rows: Vec<CatalogRow>) -> CatalogResult<()> {
    for row in rows {
        let schema = owning_schema(registry, &row)?;
        let view = View::new(
            row.int("relation_id")?,
            schema,
            row.text("relation_name")?,
            row.opt_text("definition")?.unwrap_or_default(),
        );
        registry.put_view(view)?;
    }
    Ok(())
}

fn relation_ref(row: &CatalogRow, name_field: &str) -> CatalogResult<RelationRef> {
    Ok(RelationRef::new(row.text("schema_name")?, row.text(name_field)?))
}

fn apply_columns(
    registry: &mut EntityRegistry,
    rows: Vec<CatalogRow>,
    ctx: &mut PassContext<'_>,
) -> CatalogResult<()> {
    for row in rows {
        let owner = relation_ref(&row, "relation_name")?;
        let kind = match row.opt_text("relation_kind")?.as_deref() {
            Some("v") => RelationKind::View,
            _ => RelationKind::Table,
        };

        let store_type = row.text("store_type")?;
        let portable_type = match ctx.types.map(&store_type) {
            Ok(portable) => Some(portable),
            Err(err @ CatalogError::UnsupportedType { .. }) => match ctx.options.unmapped_types {
                UnmappedTypePolicy::Fail => return Err(err),
                UnmappedTypePolicy::Opaque => {
                    warn!(relation = %owner, store_type = %store_type, "Leaving column type opaque");
                    None
                }
            },
            Err(err) => return Err(err),
        };

        let ordinal = row.int("ordinal_position")?;
        let identity = if row.yes_no("is_identity")? {
            Some(Identity {
                start: row.opt_int("identity_start")?,
                increment: row.opt_int("identity_increment")?,
                last_value: row.opt_int("identity_last_value")?,
            })
        } else {
            None
        };

        let column = Column {
            name: row.text("column_name")?,
            ordinal_position: i32::try_from(ordinal).map_err(|_| CatalogError::RowDecode {
                field: "ordinal_position".to_string(),
                reason: format!("{} does not fit in 32 bits", ordinal),
            })?,
            nullable: row.yes_no("is_nullable")?,
            store_type,
            portable_type,
            character_maximum_length: row.opt_i32("character_maximum_length")?,
            precision: row.opt_i32("precision")?,
            scale: row.opt_i32("scale")?,
            identity,
            is_generated: row.yes_no("is_generated")?,
            generation_expression: row.opt_text("generation_expression")?,
            default_value: row.opt_text("column_default")?,
        };

        let columns = registry.relation_columns_mut(&owner, kind)?;
        if columns.iter().any(|c| c.name == column.name) {
            return Err(CatalogError::inconsistent(
                &owner,
                &column.name,
                "duplicate column",
            ));
        }
        columns.push(column);
    }
    Ok(())
}

/// Fail unless `column` exists on the table `owner`
fn require_column(registry: &EntityRegistry, owner: &RelationRef, column: &str) -> CatalogResult<()> {
    if registry.table(owner)?.column(column).is_none() {
        return Err(CatalogError::not_found(
            EntityKind::Column,
            format!("{}.{}", owner, column),
        ));
    }
    Ok(())
}

/// Rows shared by primary key and unique constraint passes
fn key_members(
    registry: &EntityRegistry,
    rows: Vec<CatalogRow>,
) -> CatalogResult<Vec<(RelationRef, Option<String>, String)>> {
    rows.into_iter()
        .map(|row| {
            let owner = relation_ref(&row, "table_name")?;
            let column = row.text("column_name")?;
            require_column(registry, &owner, &column)?;
            Ok((owner, row.opt_text("constraint_name")?, column))
        })
        .collect()
}

fn apply_primary_keys(registry: &mut EntityRegistry, rows: Vec<CatalogRow>) -> CatalogResult<()> {
    let mut assembler = ConstraintAssembler::<PrimaryKey>::new();
    for (owner, name, column) in key_members(registry, rows)? {
        assembler.push(owner, name, column)?;
    }

    for assembled in assembler.finish() {
        let table = registry.table_mut(&assembled.owner)?;
        if let Some(existing) = &table.primary_key {
            return Err(CatalogError::inconsistent(
                &assembled.owner,
                &assembled.entity.name,
                format!("table already has primary key '{}'", existing.name),
            ));
        }
        table.primary_key = Some(assembled.entity);
    }
    Ok(())
}

fn apply_unique_constraints(
    registry: &mut EntityRegistry,
    rows: Vec<CatalogRow>,
) -> CatalogResult<()> {
    let mut assembler = ConstraintAssembler::<UniqueConstraint>::new();
    for (owner, name, column) in key_members(registry, rows)? {
        assembler.push(owner, name, column)?;
    }

    for assembled in assembler.finish() {
        registry
            .table_mut(&assembled.owner)?
            .unique_constraints
            .push(assembled.entity);
    }
    Ok(())
}

fn referential_action(row: &CatalogRow, field: &str) -> CatalogResult<ReferentialAction> {
    match row.opt_text(field)? {
        None => Ok(ReferentialAction::default()),
        Some(rule) => ReferentialAction::from_rule(&rule).ok_or_else(|| CatalogError::RowDecode {
            field: field.to_string(),
            reason: format!("unknown referential action '{}'", rule),
        }),
    }
}

fn match_option(row: &CatalogRow) -> CatalogResult<MatchOption> {
    match row.opt_text("match_option")? {
        None => Ok(MatchOption::default()),
        Some(rule) => MatchOption::from_rule(&rule).ok_or_else(|| CatalogError::RowDecode {
            field: "match_option".to_string(),
            reason: format!("unknown match option '{}'", rule),
        }),
    }
}

fn apply_foreign_keys(registry: &mut EntityRegistry, rows: Vec<CatalogRow>) -> CatalogResult<()> {
    let mut assembler = ConstraintAssembler::<ForeignKey>::new();
    for row in rows {
        let owner = relation_ref(&row, "table_name")?;
        let column = row.text("column_name")?;
        require_column(registry, &owner, &column)?;

        let target = RelationRef::new(row.text("target_schema")?, row.text("target_table")?);
        let target_column = row.text("target_column")?;
        require_column(registry, &target, &target_column)?;

        let member = ForeignKeyMember {
            column,
            target,
            target_column,
            on_update: referential_action(&row, "update_rule")?,
            on_delete: referential_action(&row, "delete_rule")?,
            match_option: match_option(&row)?,
        };
        assembler.push(owner, row.opt_text("constraint_name")?, member)?;
    }

    for assembled in assembler.finish() {
        let fk = assembled.entity;
        if fk.columns.len() != fk.target_columns.len() {
            return Err(CatalogError::inconsistent(
                &assembled.owner,
                &fk.name,
                format!(
                    "{} local columns but {} target columns",
                    fk.columns.len(),
                    fk.target_columns.len()
                ),
            ));
        }
        registry.table_mut(&assembled.owner)?.foreign_keys.push(fk);
    }
    Ok(())
}

fn apply_indexes(registry: &mut EntityRegistry, rows: Vec<CatalogRow>) -> CatalogResult<()> {
    let mut assembler = ConstraintAssembler::<Index>::new();
    for row in rows {
        let owner = relation_ref(&row, "table_name")?;
        let column = row.text("column_name")?;
        if row.flag("is_expression")? {
            registry.table(&owner)?;
        } else {
            require_column(registry, &owner, &column)?;
        }

        let member = IndexMember {
            column,
            is_unique: row.flag("is_unique")?,
            is_partial: row.flag("is_partial")?,
            is_functional: row.flag("is_functional")?,
        };
        assembler.push(owner, row.opt_text("index_name")?, member)?;
    }

    for assembled in assembler.finish() {
        registry
            .table_mut(&assembled.owner)?
            .indexes
            .push(assembled.entity);
    }
    Ok(())
}
