// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # schemagraph - Graph Model
//!
//! This crate provides the in-memory model of a discovered database:
//! - Entities for databases, schemas, tables, views and columns
//! - Composite entities for keys, constraints and indexes
//! - Portable value types columns are classified into
//! - The owned [`CatalogGraph`] handed to consumers after discovery

pub mod dialect;
pub mod graph;
pub mod metadata;

// Re-export commonly used types
pub use dialect::Dialect;
pub use graph::CatalogGraph;
pub use metadata::{
    Column, Database, ForeignKey, Identity, Index, MatchOption, PortableType, PrimaryKey,
    ReferentialAction, RelationRef, Schema, Table, UniqueConstraint, View,
};
