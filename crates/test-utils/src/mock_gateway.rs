// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock gateway implementation for testing
//!
//! Rows are scripted per pass; the gateway recognises which pass is running
//! by its query text, so passes the script leaves out return no rows.

use std::collections::HashMap;

use schemagraph_catalog::{
    CatalogDialect, CatalogError, CatalogGateway, CatalogResult, CatalogRow, IsolationLevel,
    POSTGRES, Pass, TransactionInfo,
};

use crate::fixtures::CatalogFixtures;

/// Scripted in-memory gateway for testing
#[derive(Debug)]
pub struct MockGateway {
    dialect: &'static CatalogDialect,
    rows: HashMap<Pass, Vec<CatalogRow>>,
    failures: HashMap<Pass, CatalogError>,
    transaction: Option<TransactionInfo>,
    executed: Vec<Pass>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Create a gateway returning no rows for any pass
    pub fn new() -> Self {
        Self {
            dialect: &POSTGRES,
            rows: HashMap::new(),
            failures: HashMap::new(),
            transaction: None,
            executed: Vec::new(),
        }
    }

    /// Passes executed so far, in execution order
    pub fn executed(&self) -> &[Pass] {
        &self.executed
    }

    fn pass_for(&self, sql: &str) -> Option<Pass> {
        Pass::ORDERED
            .into_iter()
            .find(|p| self.dialect.query(*p) == sql)
    }
}

#[async_trait::async_trait]
impl CatalogGateway for MockGateway {
    async fn execute(&mut self, sql: &str) -> CatalogResult<Vec<CatalogRow>> {
        let pass = self
            .pass_for(sql)
            .ok_or_else(|| CatalogError::QueryFailed(format!("unexpected query: {}", sql)))?;
        self.executed.push(pass);

        if let Some(err) = self.failures.get(&pass) {
            return Err(err.clone());
        }
        Ok(self.rows.get(&pass).cloned().unwrap_or_default())
    }

    fn current_transaction(&self) -> Option<TransactionInfo> {
        self.transaction
    }
}

/// Builder for creating mock gateways with a fluent API
pub struct MockGatewayBuilder {
    gateway: MockGateway,
}

impl Default for MockGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGatewayBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            gateway: MockGateway::new(),
        }
    }

    /// Append rows to a pass's result
    pub fn with_rows(mut self, pass: Pass, rows: impl IntoIterator<Item = CatalogRow>) -> Self {
        self.gateway.rows.entry(pass).or_default().extend(rows);
        self
    }

    /// Append one row to a pass's result
    pub fn with_row(self, pass: Pass, row: CatalogRow) -> Self {
        self.with_rows(pass, [row])
    }

    /// Make a pass fail with `err`
    pub fn fail_on(mut self, pass: Pass, err: CatalogError) -> Self {
        self.gateway.failures.insert(pass, err);
        self
    }

    /// Report a read-only, repeatable-read transaction
    pub fn in_snapshot(self) -> Self {
        self.in_transaction(TransactionInfo {
            isolation: IsolationLevel::RepeatableRead,
            read_only: true,
        })
    }

    pub fn in_transaction(mut self, info: TransactionInfo) -> Self {
        self.gateway.transaction = Some(info);
        self
    }

    /// Add the standard test database: `shop` with `customers`, `orders`
    /// and an `open_orders` view in `public`
    pub fn with_orders_schema(self) -> Self {
        self.with_row(Pass::Database, CatalogFixtures::database(16384, "shop"))
            .with_row(Pass::Schemas, CatalogFixtures::schema(2200, "public"))
            .with_rows(
                Pass::Tables,
                [
                    CatalogFixtures::table(16400, 2200, "customers"),
                    CatalogFixtures::table(16410, 2200, "orders"),
                ],
            )
            .with_row(
                Pass::Views,
                CatalogFixtures::view(
                    16420,
                    2200,
                    "open_orders",
                    " SELECT id, total FROM orders WHERE total IS NULL;",
                ),
            )
            .with_rows(
                Pass::Columns,
                [
                    CatalogFixtures::identity_column("public", "customers", "id", 1, "integer", Some(3)),
                    CatalogFixtures::column(
                        "public",
                        "customers",
                        "email",
                        2,
                        "character varying(255)",
                        false,
                    )
                    .with("character_maximum_length", 255i64),
                    CatalogFixtures::view_column("public", "open_orders", "id", 1, "integer"),
                    CatalogFixtures::view_column("public", "open_orders", "total", 2, "numeric(10,2)"),
                    CatalogFixtures::column("public", "orders", "id", 1, "integer", false),
                    CatalogFixtures::column("public", "orders", "customer_id", 2, "integer", false),
                    CatalogFixtures::column("public", "orders", "total", 3, "numeric(10,2)", true)
                        .with("precision", 10i64)
                        .with("scale", 2i64),
                    CatalogFixtures::column(
                        "public",
                        "orders",
                        "placed_at",
                        4,
                        "timestamp with time zone",
                        false,
                    )
                    .with("column_default", "now()"),
                ],
            )
            .with_rows(
                Pass::PrimaryKeys,
                [
                    CatalogFixtures::key_column("public", "customers", "customers_pkey", "id", 1),
                    CatalogFixtures::key_column("public", "orders", "orders_pkey", "id", 1),
                ],
            )
            .with_row(
                Pass::UniqueConstraints,
                CatalogFixtures::key_column("public", "customers", "customers_email_key", "email", 1),
            )
            .with_row(
                Pass::ForeignKeys,
                CatalogFixtures::foreign_key_column(
                    "public",
                    "orders",
                    "orders_customer_id_fkey",
                    "customer_id",
                    1,
                    "public",
                    "customers",
                    "id",
                )
                .with("delete_rule", "CASCADE"),
            )
            .with_row(
                Pass::Indexes,
                CatalogFixtures::index_column(
                    "public",
                    "orders",
                    Some("orders_placed_at_idx"),
                    "placed_at",
                    1,
                ),
            )
    }

    /// Build the mock gateway
    pub fn build(self) -> MockGateway {
        self.gateway
    }
}
