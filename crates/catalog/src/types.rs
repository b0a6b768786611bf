// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Store type mapping
//!
//! Converts vendor store-type strings (e.g. `character varying(255)`,
//! `"char"`, `integer[]`) into [`PortableType`] tags. Spellings live in the
//! dialect's type table; anything not in the table is an error.

use std::collections::HashMap;

use schemagraph_ir::PortableType;

use crate::dialect::{CatalogDialect, POSTGRES};
use crate::error::{CatalogError, CatalogResult};

/// A store type reduced to its base spelling and array depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedType {
    pub base: String,
    pub array_depth: usize,
}

/// Normalize a store type spelling
///
/// Trims, lowercases, strips double quotes, drops parenthesized modifiers
/// such as `(255)` or `(10,2)`, counts trailing `[]` suffixes, and collapses
/// internal whitespace to single spaces.
pub fn normalize_store_type(store_type: &str) -> NormalizedType {
    let mut stripped = String::with_capacity(store_type.len());
    let mut depth = 0usize;
    for c in store_type.chars() {
        match c {
            '"' => {}
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.extend(c.to_lowercase()),
            _ => {}
        }
    }

    let mut rest = stripped.trim_end();
    let mut array_depth = 0;
    while let Some(inner) = rest.strip_suffix("[]") {
        array_depth += 1;
        rest = inner.trim_end();
    }

    NormalizedType {
        base: rest.split_whitespace().collect::<Vec<_>>().join(" "),
        array_depth,
    }
}

fn lookup(
    spellings: &[(&'static str, PortableType)],
    store_type: &str,
) -> CatalogResult<PortableType> {
    let normalized = normalize_store_type(store_type);

    let scalar = spellings
        .iter()
        .find(|(spelling, _)| *spelling == normalized.base)
        .map(|(_, portable)| portable.clone())
        .ok_or_else(|| CatalogError::UnsupportedType {
            store_type: store_type.to_string(),
        })?;

    Ok((0..normalized.array_depth).fold(scalar, |inner, _| PortableType::array_of(inner)))
}

/// Map a PostgreSQL store type to its portable type
///
/// # Errors
///
/// Returns `CatalogError::UnsupportedType` if the spelling has no mapping.
///
/// # Examples
///
/// ```rust,ignore
/// use schemagraph_catalog::map_store_type;
/// use schemagraph_ir::PortableType;
///
/// assert_eq!(map_store_type("character varying(255)")?, PortableType::Text);
/// ```
pub fn map_store_type(store_type: &str) -> CatalogResult<PortableType> {
    lookup(POSTGRES.type_spellings, store_type)
}

/// Memoizing type mapper bound to one dialect's type table
///
/// A discovery run sees the same few spellings thousands of times, so results
/// (including failures) are cached for the lifetime of the mapper.
#[derive(Debug)]
pub struct TypeMapper {
    spellings: &'static [(&'static str, PortableType)],
    memo: HashMap<String, CatalogResult<PortableType>>,
}

impl TypeMapper {
    pub fn for_dialect(dialect: &CatalogDialect) -> Self {
        Self {
            spellings: dialect.type_spellings,
            memo: HashMap::new(),
        }
    }

    pub fn map(&mut self, store_type: &str) -> CatalogResult<PortableType> {
        if let Some(cached) = self.memo.get(store_type) {
            return cached.clone();
        }
        let result = lookup(self.spellings, store_type);
        self.memo.insert(store_type.to_string(), result.clone());
        result
    }

    /// Number of distinct spellings seen so far
    pub fn cached(&self) -> usize {
        self.memo.len()
    }
}
