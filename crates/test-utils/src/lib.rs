// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for schemagraph
//!
//! This crate provides common testing components including:
//! - A scripted mock catalog gateway
//! - Catalog row fixtures shaped like the PostgreSQL pass queries
//! - Graph-specific assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_gateway;

// Re-exports for convenience
pub use assertions::GraphAssertions;
pub use fixtures::CatalogFixtures;
pub use mock_gateway::{MockGateway, MockGatewayBuilder};

/// Install a test subscriber honouring `RUST_LOG`; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
