// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Constraint assembler
//!
//! Catalogs report composite entities one row per participating column.
//! The assembler folds those rows back into single entities: the first row
//! for an `(owner, name)` pair opens the entity and every row, in arrival
//! order, appends its member. Rows are never re-sorted; the catalog query's
//! `ORDER BY` decides member order.
//!
//! Rows without a usable name cannot be grouped and become one entity each.

use schemagraph_ir::{
    ForeignKey, Index, MatchOption, PrimaryKey, ReferentialAction, RelationRef, UniqueConstraint,
};

use crate::error::{CatalogError, CatalogResult};
use crate::registry::KeyedStore;

/// An entity assembled from one row per member
pub trait CompositeEntity: Sized {
    /// Per-row contribution
    type Member;

    /// Create an empty entity, taking entity-level attributes from the first member
    fn open(name: Option<String>, first: &Self::Member) -> Self;

    /// Append a member; `Err` carries the reason rows disagree
    fn absorb(&mut self, member: Self::Member) -> Result<(), String>;
}

/// A finished entity with the relation that owns it
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled<E> {
    pub owner: RelationRef,
    pub entity: E,
}

/// Groups rows into composite entities keyed by `(owner, name)`
#[derive(Debug)]
pub struct ConstraintAssembler<E> {
    store: KeyedStore<(RelationRef, String), Assembled<E>>,
}

impl<E> Default for ConstraintAssembler<E> {
    fn default() -> Self {
        Self {
            store: KeyedStore::default(),
        }
    }
}

impl<E: CompositeEntity> ConstraintAssembler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row into the entity it belongs to
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Inconsistent` if the row contradicts earlier rows
    /// of the same entity.
    pub fn push(
        &mut self,
        owner: RelationRef,
        name: Option<String>,
        member: E::Member,
    ) -> CatalogResult<()> {
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            let mut entity = E::open(None, &member);
            entity
                .absorb(member)
                .map_err(|reason| CatalogError::inconsistent(&owner, "", reason))?;
            self.store.push_unkeyed(Assembled { owner, entity });
            return Ok(());
        };

        let key = (owner, name);
        let slot = self.store.get_or_create(key.clone(), || Assembled {
            owner: key.0.clone(),
            entity: E::open(Some(key.1.clone()), &member),
        });
        slot.entity
            .absorb(member)
            .map_err(|reason| CatalogError::inconsistent(&key.0, &key.1, reason))
    }

    /// Number of distinct entities so far
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finished entities in first-seen order
    pub fn finish(self) -> Vec<Assembled<E>> {
        self.store.into_values()
    }
}

fn push_distinct(columns: &mut Vec<String>, column: String) -> Result<(), String> {
    if columns.contains(&column) {
        return Err(format!("column '{}' listed twice", column));
    }
    columns.push(column);
    Ok(())
}

impl CompositeEntity for PrimaryKey {
    type Member = String;

    fn open(name: Option<String>, _first: &String) -> Self {
        PrimaryKey {
            name: name.unwrap_or_default(),
            columns: Vec::new(),
        }
    }

    fn absorb(&mut self, column: String) -> Result<(), String> {
        push_distinct(&mut self.columns, column)
    }
}

impl CompositeEntity for UniqueConstraint {
    type Member = String;

    fn open(name: Option<String>, _first: &String) -> Self {
        UniqueConstraint {
            name: name.unwrap_or_default(),
            columns: Vec::new(),
        }
    }

    fn absorb(&mut self, column: String) -> Result<(), String> {
        push_distinct(&mut self.columns, column)
    }
}

/// One column of an index with the index-level flags its row carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMember {
    /// Column name, or expression text
    pub column: String,
    pub is_unique: bool,
    pub is_partial: bool,
    pub is_functional: bool,
}

impl CompositeEntity for Index {
    type Member = IndexMember;

    fn open(name: Option<String>, first: &IndexMember) -> Self {
        Index {
            name,
            columns: Vec::new(),
            is_unique: first.is_unique,
            is_partial: first.is_partial,
            is_functional: first.is_functional,
        }
    }

    fn absorb(&mut self, member: IndexMember) -> Result<(), String> {
        let flags = (member.is_unique, member.is_partial, member.is_functional);
        if flags != (self.is_unique, self.is_partial, self.is_functional) {
            return Err(format!(
                "index flags changed at column '{}'",
                member.column
            ));
        }
        // The same column may legitimately appear twice in an index.
        self.columns.push(member.column);
        Ok(())
    }
}

/// One column pair of a foreign key with the key-level attributes its row carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyMember {
    pub column: String,
    pub target: RelationRef,
    pub target_column: String,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
    pub match_option: MatchOption,
}

impl CompositeEntity for ForeignKey {
    type Member = ForeignKeyMember;

    fn open(name: Option<String>, first: &ForeignKeyMember) -> Self {
        ForeignKey {
            name: name.unwrap_or_default(),
            columns: Vec::new(),
            target: first.target.clone(),
            target_columns: Vec::new(),
            on_update: first.on_update,
            on_delete: first.on_delete,
            match_option: first.match_option,
        }
    }

    fn absorb(&mut self, member: ForeignKeyMember) -> Result<(), String> {
        if member.target != self.target {
            return Err(format!(
                "target changed from {} to {}",
                self.target, member.target
            ));
        }
        if (member.on_update, member.on_delete) != (self.on_update, self.on_delete) {
            return Err("referential actions differ between rows".to_string());
        }
        if member.match_option != self.match_option {
            return Err("match option differs between rows".to_string());
        }
        push_distinct(&mut self.columns, member.column)?;
        self.target_columns.push(member.target_column);
        Ok(())
    }
}
