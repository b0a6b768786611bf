// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for discovered database structure
//!
//! This module defines the entities of a schema graph: databases, schemas,
//! tables, views, columns, keys and indexes, plus the portable value types
//! columns are classified into.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// Vendor neutral classification of a column's value domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PortableType {
    Boolean,

    // Integer types
    Int64,
    Int32,
    Int16,

    // Fractional types
    Decimal,
    Float64,
    Float32,

    // Character and binary types
    Text,
    Bytes,

    // Date/Time types
    Date,
    Timestamp,

    // Special types
    Uuid,
    Xml,

    /// Array of the inner type (one level per `[]` suffix)
    Array(Box<PortableType>),
}

impl PortableType {
    /// Wrap a type into an array-of modifier
    pub fn array_of(element: PortableType) -> Self {
        PortableType::Array(Box::new(element))
    }

    /// Whether this is an array type
    pub fn is_array(&self) -> bool {
        matches!(self, PortableType::Array(_))
    }

    /// Innermost scalar type, unwrapping any number of array levels
    pub fn scalar(&self) -> &PortableType {
        match self {
            PortableType::Array(inner) => inner.scalar(),
            other => other,
        }
    }
}

impl fmt::Display for PortableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            PortableType::Boolean => "boolean",
            PortableType::Int64 => "int64",
            PortableType::Int32 => "int32",
            PortableType::Int16 => "int16",
            PortableType::Decimal => "decimal",
            PortableType::Float64 => "float64",
            PortableType::Float32 => "float32",
            PortableType::Text => "text",
            PortableType::Bytes => "bytes",
            PortableType::Date => "date",
            PortableType::Timestamp => "timestamp",
            PortableType::Uuid => "uuid",
            PortableType::Xml => "xml",
            PortableType::Array(inner) => return write!(f, "array<{}>", inner),
        };
        f.write_str(tag)
    }
}

/// Reference to a relation by schema and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationRef {
    pub schema: String,
    pub name: String,
}

impl RelationRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RelationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Identity generation parameters of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub start: Option<i64>,
    pub increment: Option<i64>,
    /// Last value handed out by the backing sequence, if any was
    pub last_value: Option<i64>,
}

/// Metadata for a column of a table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// 1-based position within the owning relation
    pub ordinal_position: i32,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Type name exactly as the catalog spells it
    pub store_type: String,
    /// Portable classification; `None` when left opaque
    pub portable_type: Option<PortableType>,
    pub character_maximum_length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    /// Identity parameters when this is an identity column
    pub identity: Option<Identity>,
    /// Whether the value is computed (`GENERATED ALWAYS AS ...`)
    pub is_generated: bool,
    pub generation_expression: Option<String>,
    /// Default value (as SQL expression string)
    pub default_value: Option<String>,
}

impl Column {
    /// Create a new column with builder pattern
    pub fn new(name: impl Into<String>, ordinal_position: i32, store_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal_position,
            nullable: true,
            store_type: store_type.into(),
            portable_type: None,
            character_maximum_length: None,
            precision: None,
            scale: None,
            identity: None,
            is_generated: false,
            generation_expression: None,
            default_value: None,
        }
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: set portable type
    pub fn with_portable_type(mut self, portable_type: PortableType) -> Self {
        self.portable_type = Some(portable_type);
        self
    }

    /// Builder method: set default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Builder method: mark as identity column
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.identity.is_some()
    }
}

/// Primary key of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: String,
    /// Column names in key order
    pub columns: Vec<String>,
}

/// Unique constraint of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    /// Column names in constraint order
    pub columns: Vec<String>,
}

/// Action taken on referencing rows when the referenced row changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

impl ReferentialAction {
    /// Parse an action as spelled by `information_schema` (`NO ACTION`, `SET NULL`, ...)
    pub fn from_rule(rule: &str) -> Option<Self> {
        let folded: String = rule
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();

        match folded.as_str() {
            "NOACTION" => Some(ReferentialAction::NoAction),
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SETNULL" => Some(ReferentialAction::SetNull),
            "SETDEFAULT" => Some(ReferentialAction::SetDefault),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            _ => None,
        }
    }
}

/// How composite foreign key values are matched against the referenced key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOption {
    #[default]
    Simple,
    Full,
    Partial,
}

impl MatchOption {
    /// Parse a match option; `information_schema` reports `MATCH SIMPLE` as `NONE`
    pub fn from_rule(rule: &str) -> Option<Self> {
        match rule.trim().to_ascii_uppercase().as_str() {
            "NONE" | "SIMPLE" => Some(MatchOption::Simple),
            "FULL" => Some(MatchOption::Full),
            "PARTIAL" => Some(MatchOption::Partial),
            _ => None,
        }
    }
}

/// Foreign key of a table
///
/// `columns` and `target_columns` are paired by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    /// Referencing columns on the owning table
    pub columns: Vec<String>,
    /// Referenced table
    pub target: RelationRef,
    /// Referenced columns on the target table
    pub target_columns: Vec<String>,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
    pub match_option: MatchOption,
}

/// Secondary (non-unique, non-primary) index of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name; catalogs are not guaranteed to report one
    pub name: Option<String>,
    /// Indexed column names, or expression text for expression members
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_partial: bool,
    pub is_functional: bool,
}

/// Metadata for a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Catalog object id
    pub id: i64,
    /// Table name
    pub name: String,
    /// Name of the owning schema
    pub schema: String,
    /// Column definitions, in ordinal order
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl Table {
    /// Create new table metadata with builder pattern
    pub fn new(id: i64, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            schema: schema.into(),
            columns: Vec::new(),
            primary_key: None,
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Builder method: add columns
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in ordinal order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Reference to this table
    pub fn reference(&self) -> RelationRef {
        RelationRef::new(&self.schema, &self.name)
    }
}

/// Metadata for a database view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: i64,
    pub name: String,
    pub schema: String,
    /// The view's SQL body
    pub definition: String,
    pub columns: Vec<Column>,
}

impl View {
    pub fn new(
        id: i64,
        schema: impl Into<String>,
        name: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            schema: schema.into(),
            definition: definition.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn reference(&self) -> RelationRef {
        RelationRef::new(&self.schema, &self.name)
    }
}

/// A namespace within a database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: i64,
    pub name: String,
    pub tables: Vec<Table>,
    pub views: Vec<View>,
}

impl Schema {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tables: Vec::new(),
            views: Vec::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }
}

/// Root of a discovered graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: i64,
    pub name: String,
    /// Schema unqualified names resolve against
    pub default_schema: String,
    pub collation: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Engine the graph was read from
    pub dialect: Dialect,
    pub schemas: Vec<Schema>,
}

impl Database {
    pub fn new(id: i64, name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            id,
            name: name.into(),
            default_schema: String::new(),
            collation: None,
            created_at: None,
            dialect,
            schemas: Vec::new(),
        }
    }
}
