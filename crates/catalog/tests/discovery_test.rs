// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end discovery tests against a scripted gateway

use schemagraph_catalog::{
    CatalogError, CatalogGateway, CatalogResult, CatalogRow, DiscoveryOptions, EntityKind,
    IsolationLevel, POSTGRES, Pass, TransactionInfo, UnmappedTypePolicy, discover,
};
use schemagraph_ir::{MatchOption, PortableType, ReferentialAction, RelationRef};
use schemagraph_test_utils::{
    CatalogFixtures, GraphAssertions, MockGateway, MockGatewayBuilder, init_tracing,
};
use tokio_util::sync::CancellationToken;

fn shop() -> DiscoveryOptions {
    DiscoveryOptions::new("shop")
}

/// Database `shop` with one empty schema `public`
fn bare_shop() -> MockGatewayBuilder {
    MockGatewayBuilder::new()
        .in_snapshot()
        .with_row(Pass::Database, CatalogFixtures::database(16384, "shop"))
        .with_row(Pass::Schemas, CatalogFixtures::schema(2200, "public"))
}

#[tokio::test]
async fn test_orders_with_primary_key() {
    init_tracing();
    let mut gateway = bare_shop()
        .with_row(Pass::Tables, CatalogFixtures::table(16410, 2200, "orders"))
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "orders", "id", 1, "integer", false),
                CatalogFixtures::column("public", "orders", "total", 2, "numeric", true),
            ],
        )
        .with_row(
            Pass::PrimaryKeys,
            CatalogFixtures::key_column("public", "orders", "orders_pkey", "id", 1),
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();

    assert_eq!(graph.schemas().len(), 1);
    assert_eq!(graph.tables().count(), 1);
    GraphAssertions::assert_columns(&graph, "public", "orders", &["id", "total"]);
    GraphAssertions::assert_primary_key(&graph, "public", "orders", "orders_pkey", &["id"]);

    let orders = GraphAssertions::assert_table(&graph, "public", "orders");
    GraphAssertions::assert_column(&orders.columns[0], "id", Some(PortableType::Int32), false);
    GraphAssertions::assert_column(&orders.columns[1], "total", Some(PortableType::Decimal), true);
}

#[tokio::test]
async fn test_standard_schema() {
    init_tracing();
    let mut gateway = MockGatewayBuilder::new()
        .in_snapshot()
        .with_orders_schema()
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    let db = graph.database();
    assert_eq!(db.name, "shop");
    assert_eq!(db.default_schema, "public");
    assert_eq!(db.collation.as_deref(), Some("en_US.UTF-8"));
    assert!(db.created_at.is_none());

    GraphAssertions::assert_foreign_keys_resolve(&graph);
    GraphAssertions::assert_columns(
        &graph,
        "public",
        "orders",
        &["id", "customer_id", "total", "placed_at"],
    );

    let customers = GraphAssertions::assert_table(&graph, "public", "customers");
    let id = customers.column("id").unwrap();
    assert_eq!(id.identity.and_then(|i| i.last_value), Some(3));
    assert_eq!(customers.unique_constraints.len(), 1);
    assert_eq!(customers.unique_constraints[0].columns, vec!["email"]);
    assert_eq!(
        customers.column("email").unwrap().character_maximum_length,
        Some(255)
    );

    let orders = GraphAssertions::assert_table(&graph, "public", "orders");
    let fk = &orders.foreign_keys[0];
    assert_eq!(fk.target, RelationRef::new("public", "customers"));
    assert_eq!(fk.on_delete, ReferentialAction::Cascade);
    assert_eq!(fk.on_update, ReferentialAction::NoAction);
    assert_eq!(fk.match_option, MatchOption::Simple);
    assert_eq!(orders.indexes.len(), 1);
    assert_eq!(orders.indexes[0].name.as_deref(), Some("orders_placed_at_idx"));
    assert_eq!(
        orders.column("placed_at").unwrap().default_value.as_deref(),
        Some("now()")
    );

    let view = graph.view("public", "open_orders").unwrap();
    assert_eq!(view.columns.len(), 2);
    assert!(view.definition.contains("FROM orders"));

    let incoming = graph.foreign_keys_to(&RelationRef::new("public", "customers"));
    assert_eq!(incoming.len(), 1);
}

#[tokio::test]
async fn test_passes_run_in_dependency_order() {
    let mut gateway = MockGatewayBuilder::new().with_orders_schema().build();
    discover(&mut gateway, &shop()).await.unwrap();

    let expected: Vec<Pass> = Pass::ORDERED
        .into_iter()
        .filter(|p| *p != Pass::CreationTime)
        .collect();
    assert_eq!(gateway.executed(), expected.as_slice());
}

#[tokio::test]
async fn test_creation_time_read_when_file_access_granted() {
    let created = chrono::DateTime::parse_from_rfc3339("2023-11-05T08:30:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let mut gateway = MockGatewayBuilder::new()
        .with_row(
            Pass::Database,
            CatalogFixtures::database(16384, "shop").with("can_stat_files", true),
        )
        .with_rows(
            Pass::CreationTime,
            [
                CatalogFixtures::creation_time(1, None),
                CatalogFixtures::creation_time(16384, Some(created)),
            ],
        )
        .with_row(Pass::Schemas, CatalogFixtures::schema(2200, "public"))
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    assert_eq!(graph.database().created_at, Some(created));
    assert_eq!(&gateway.executed()[..3], &[Pass::Database, Pass::CreationTime, Pass::Schemas]);
}

#[tokio::test]
async fn test_creation_time_skipped_without_file_access() {
    let mut gateway = bare_shop()
        .fail_on(
            Pass::CreationTime,
            CatalogError::QueryFailed("permission denied for function pg_stat_file".to_string()),
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    assert!(graph.database().created_at.is_none());
    assert!(!gateway.executed().contains(&Pass::CreationTime));
}

#[tokio::test]
async fn test_composite_foreign_key() {
    let mut gateway = bare_shop()
        .with_rows(
            Pass::Tables,
            [
                CatalogFixtures::table(1, 2200, "parent"),
                CatalogFixtures::table(2, 2200, "child"),
            ],
        )
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "child", "a1", 1, "integer", false),
                CatalogFixtures::column("public", "child", "a2", 2, "integer", false),
                CatalogFixtures::column("public", "parent", "b1", 1, "integer", false),
                CatalogFixtures::column("public", "parent", "b2", 2, "integer", false),
            ],
        )
        .with_rows(
            Pass::ForeignKeys,
            [
                CatalogFixtures::foreign_key_column(
                    "public", "child", "child_fk", "a1", 1, "public", "parent", "b2",
                )
                .with("match_option", "FULL"),
                CatalogFixtures::foreign_key_column(
                    "public", "child", "child_fk", "a2", 2, "public", "parent", "b1",
                )
                .with("match_option", "FULL"),
            ],
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    let child = graph.table("public", "child").unwrap();
    assert_eq!(child.foreign_keys.len(), 1);

    let fk = &child.foreign_keys[0];
    assert_eq!(fk.columns, vec!["a1", "a2"]);
    assert_eq!(fk.target_columns, vec!["b2", "b1"]);
    assert_eq!(fk.match_option, MatchOption::Full);
    GraphAssertions::assert_foreign_keys_resolve(&graph);
}

#[tokio::test]
async fn test_same_foreign_key_name_on_two_tables() {
    let mut gateway = bare_shop()
        .with_rows(
            Pass::Tables,
            [
                CatalogFixtures::table(1, 2200, "customers"),
                CatalogFixtures::table(2, 2200, "invoices"),
                CatalogFixtures::table(3, 2200, "orders"),
            ],
        )
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "customers", "id", 1, "integer", false),
                CatalogFixtures::column("public", "invoices", "customer_id", 1, "integer", false),
                CatalogFixtures::column("public", "orders", "customer_id", 1, "integer", false),
            ],
        )
        .with_rows(
            Pass::ForeignKeys,
            [
                CatalogFixtures::foreign_key_column(
                    "public", "invoices", "fk_customer", "customer_id", 1, "public", "customers",
                    "id",
                ),
                CatalogFixtures::foreign_key_column(
                    "public", "orders", "fk_customer", "customer_id", 1, "public", "customers",
                    "id",
                )
                .with("delete_rule", "CASCADE"),
            ],
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    let invoices = graph.table("public", "invoices").unwrap();
    let orders = graph.table("public", "orders").unwrap();
    assert_eq!(invoices.foreign_keys.len(), 1);
    assert_eq!(orders.foreign_keys.len(), 1);
    assert_eq!(invoices.foreign_keys[0].on_delete, ReferentialAction::NoAction);
    assert_eq!(orders.foreign_keys[0].on_delete, ReferentialAction::Cascade);
    assert_eq!(
        graph.foreign_keys_to(&RelationRef::new("public", "customers")).len(),
        2
    );
}

#[tokio::test]
async fn test_partitioned_table_with_primary_key() {
    let mut gateway = bare_shop()
        .with_rows(
            Pass::Tables,
            [
                CatalogFixtures::table(1, 2200, "events"),
                CatalogFixtures::table(2, 2200, "events_2024"),
            ],
        )
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "events", "id", 1, "bigint", false)
                    .with("relation_kind", "p"),
                CatalogFixtures::column("public", "events", "happened_on", 2, "date", false)
                    .with("relation_kind", "p"),
                CatalogFixtures::column("public", "events_2024", "id", 1, "bigint", false),
                CatalogFixtures::column("public", "events_2024", "happened_on", 2, "date", false),
            ],
        )
        .with_rows(
            Pass::PrimaryKeys,
            [
                CatalogFixtures::key_column("public", "events", "events_pkey", "id", 1),
                CatalogFixtures::key_column("public", "events", "events_pkey", "happened_on", 2),
                CatalogFixtures::key_column("public", "events_2024", "events_2024_pkey", "id", 1),
                CatalogFixtures::key_column(
                    "public",
                    "events_2024",
                    "events_2024_pkey",
                    "happened_on",
                    2,
                ),
            ],
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    GraphAssertions::assert_primary_key(
        &graph,
        "public",
        "events",
        "events_pkey",
        &["id", "happened_on"],
    );
    GraphAssertions::assert_primary_key(
        &graph,
        "public",
        "events_2024",
        "events_2024_pkey",
        &["id", "happened_on"],
    );
}

#[tokio::test]
async fn test_two_rows_fold_into_one_unique_constraint() {
    let mut gateway = bare_shop()
        .with_row(Pass::Tables, CatalogFixtures::table(1, 2200, "items"))
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "items", "sku", 1, "text", false),
                CatalogFixtures::column("public", "items", "region", 2, "text", false),
            ],
        )
        .with_rows(
            Pass::UniqueConstraints,
            [
                CatalogFixtures::key_column("public", "items", "items_region_sku_key", "region", 1),
                CatalogFixtures::key_column("public", "items", "items_region_sku_key", "sku", 2),
            ],
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    let items = graph.table("public", "items").unwrap();
    assert_eq!(items.unique_constraints.len(), 1);
    // catalog order, not column order
    assert_eq!(items.unique_constraints[0].columns, vec!["region", "sku"]);
}

#[tokio::test]
async fn test_unnamed_indexes_stay_separate() {
    let mut gateway = bare_shop()
        .with_row(Pass::Tables, CatalogFixtures::table(1, 2200, "items"))
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "items", "sku", 1, "text", false),
                CatalogFixtures::column("public", "items", "region", 2, "text", false),
            ],
        )
        .with_rows(
            Pass::Indexes,
            [
                CatalogFixtures::index_column("public", "items", None, "sku", 1),
                CatalogFixtures::index_column("public", "items", None, "region", 1),
                CatalogFixtures::index_expression("public", "items", "items_lower_sku", "lower(sku)", 1),
            ],
        )
        .build();

    let graph = discover(&mut gateway, &shop()).await.unwrap();
    let items = graph.table("public", "items").unwrap();
    assert_eq!(items.indexes.len(), 3);
    assert!(items.indexes[2].is_functional);
}

#[tokio::test]
async fn test_unknown_database_is_not_found() {
    let mut gateway = MockGatewayBuilder::new().with_orders_schema().build();

    let err = discover(&mut gateway, &DiscoveryOptions::new("warehouse"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.not_found_kind(), Some(EntityKind::Database));
    assert_eq!(gateway.executed(), &[Pass::Database]);
}

#[tokio::test]
async fn test_database_name_matches_case_insensitively() {
    let mut gateway = MockGatewayBuilder::new().with_orders_schema().build();
    let graph = discover(&mut gateway, &DiscoveryOptions::new("SHOP"))
        .await
        .unwrap();
    assert_eq!(graph.database().name, "shop");
}

#[tokio::test]
async fn test_invalid_options_issue_no_queries() {
    let mut gateway = MockGatewayBuilder::new().with_orders_schema().build();
    let err = discover(&mut gateway, &DiscoveryOptions::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ValidationError(_)));
    assert!(gateway.executed().is_empty());
}

#[tokio::test]
async fn test_column_of_unknown_table() {
    let mut gateway = bare_shop()
        .with_row(
            Pass::Columns,
            CatalogFixtures::column("public", "ghost", "id", 1, "integer", false),
        )
        .build();

    let err = discover(&mut gateway, &shop()).await.unwrap_err();
    match err {
        CatalogError::NotFound { kind, key } => {
            assert_eq!(kind, EntityKind::Table);
            assert_eq!(key, "public.ghost");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_foreign_key_to_unknown_table() {
    let mut gateway = bare_shop()
        .with_row(Pass::Tables, CatalogFixtures::table(1, 2200, "child"))
        .with_row(
            Pass::Columns,
            CatalogFixtures::column("public", "child", "parent_id", 1, "integer", false),
        )
        .with_row(
            Pass::ForeignKeys,
            CatalogFixtures::foreign_key_column(
                "public", "child", "child_fk", "parent_id", 1, "public", "parent", "id",
            ),
        )
        .build();

    let err = discover(&mut gateway, &shop()).await.unwrap_err();
    assert_eq!(err.not_found_kind(), Some(EntityKind::Table));
}

fn tsvector_gateway() -> MockGateway {
    bare_shop()
        .with_row(Pass::Tables, CatalogFixtures::table(1, 2200, "docs"))
        .with_rows(
            Pass::Columns,
            [
                CatalogFixtures::column("public", "docs", "id", 1, "integer", false),
                CatalogFixtures::column("public", "docs", "search", 2, "tsvector", true),
            ],
        )
        .build()
}

#[tokio::test]
async fn test_unsupported_type_fails_by_default() {
    let mut gateway = tsvector_gateway();
    let err = discover(&mut gateway, &shop()).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::UnsupportedType { ref store_type } if store_type == "tsvector"
    ));
}

#[tokio::test]
async fn test_unsupported_type_left_opaque() {
    init_tracing();
    let mut gateway = tsvector_gateway();
    let options = shop().with_unmapped_types(UnmappedTypePolicy::Opaque);

    let graph = discover(&mut gateway, &options).await.unwrap();
    let search = graph.table("public", "docs").unwrap().column("search").unwrap();
    assert_eq!(search.store_type, "tsvector");
    assert_eq!(search.portable_type, None);
}

#[tokio::test]
async fn test_gateway_error_propagates_unchanged() {
    let mut gateway = MockGatewayBuilder::new()
        .with_orders_schema()
        .fail_on(
            Pass::ForeignKeys,
            CatalogError::QueryFailed("permission denied for schema audit".to_string()),
        )
        .build();

    let err = discover(&mut gateway, &shop()).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::QueryFailed(ref msg) if msg == "permission denied for schema audit"
    ));
    assert_eq!(gateway.executed().last(), Some(&Pass::ForeignKeys));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let mut gateway = MockGatewayBuilder::new().with_orders_schema().build();

    let err = discover(&mut gateway, &shop().with_cancellation(token))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Cancelled {
            before: Pass::Database
        }
    ));
    assert!(gateway.executed().is_empty());
}

/// Cancels the run once a given pass has been served
struct CancelAfter {
    inner: MockGateway,
    pass: Pass,
    token: CancellationToken,
}

#[async_trait::async_trait]
impl CatalogGateway for CancelAfter {
    async fn execute(&mut self, sql: &str) -> CatalogResult<Vec<CatalogRow>> {
        let rows = self.inner.execute(sql).await?;
        if sql == POSTGRES.query(self.pass) {
            self.token.cancel();
        }
        Ok(rows)
    }

    fn current_transaction(&self) -> Option<TransactionInfo> {
        Some(TransactionInfo {
            isolation: IsolationLevel::ReadCommitted,
            read_only: true,
        })
    }
}

#[tokio::test]
async fn test_cancelled_between_passes() {
    let token = CancellationToken::new();
    let mut gateway = CancelAfter {
        inner: MockGatewayBuilder::new().with_orders_schema().build(),
        pass: Pass::Tables,
        token: token.clone(),
    };

    let err = discover(&mut gateway, &shop().with_cancellation(token))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cancelled { before: Pass::Views }));
    assert_eq!(
        gateway.inner.executed(),
        &[Pass::Database, Pass::Schemas, Pass::Tables]
    );
}

#[tokio::test]
async fn test_graph_serializes() {
    let mut gateway = MockGatewayBuilder::new().with_orders_schema().build();
    let graph = discover(&mut gateway, &shop()).await.unwrap();

    let json = serde_json::to_value(&graph).unwrap();
    let schema = &json["database"]["schemas"][0];
    assert_eq!(schema["name"], "public");
    assert_eq!(schema["tables"][1]["name"], "orders");
    assert_eq!(schema["tables"][1]["primary_key"]["columns"][0], "id");
    assert_eq!(schema["views"][0]["name"], "open_orders");
}

#[tokio::test]
async fn test_error_serializes() {
    let err = CatalogError::NotFound {
        kind: EntityKind::Database,
        key: "warehouse".to_string(),
    };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["NotFound"]["kind"], "Database");
    assert_eq!(err.to_string(), "database 'warehouse' not found");
}
