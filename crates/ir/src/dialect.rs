// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! Identifies which database engine a discovered graph was read from.
//!
//! Vendor differences (catalog query texts, store-type spellings) live as data
//! in the catalog crate; this tag only records the provenance of a graph so
//! consumers can interpret `store_type` strings correctly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported catalog dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Dialect {
    /// PostgreSQL (12+)
    PostgreSQL,
}

impl Dialect {
    /// Human readable engine name
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "PostgreSQL",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
