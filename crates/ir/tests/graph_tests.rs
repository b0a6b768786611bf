// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Unit tests for the finished schema graph

use schemagraph_ir::{
    CatalogGraph, Column, Database, Dialect, ForeignKey, MatchOption, ReferentialAction,
    RelationRef, Schema, Table, View,
};

fn sample_graph() -> CatalogGraph {
    let customers = Table::new(1, "public", "customers")
        .with_columns(vec![Column::new("id", 1, "integer").with_nullable(false)]);

    let mut orders = Table::new(2, "public", "orders").with_columns(vec![
        Column::new("id", 1, "integer").with_nullable(false),
        Column::new("customer_id", 2, "integer"),
    ]);
    orders.foreign_keys.push(ForeignKey {
        name: "orders_customer_fk".to_string(),
        columns: vec!["customer_id".to_string()],
        target: RelationRef::new("public", "customers"),
        target_columns: vec!["id".to_string()],
        on_update: ReferentialAction::NoAction,
        on_delete: ReferentialAction::Cascade,
        match_option: MatchOption::Simple,
    });

    let mut public = Schema::new(2200, "public");
    public.tables.push(customers);
    public.tables.push(orders);
    public.views.push(View::new(3, "public", "recent_orders", "SELECT 1"));

    let mut audit = Schema::new(2201, "audit");
    audit.tables.push(Table::new(4, "audit", "events"));

    let mut db = Database::new(16384, "shop", Dialect::PostgreSQL);
    db.default_schema = "public".to_string();
    db.schemas = vec![public, audit];
    CatalogGraph::new(db)
}

#[test]
fn test_graph_lookups() {
    let graph = sample_graph();

    assert_eq!(graph.database().name, "shop");
    assert_eq!(graph.schemas().len(), 2);
    assert!(graph.schema("audit").is_some());
    assert!(graph.schema("missing").is_none());
    assert_eq!(graph.table("public", "orders").map(|t| t.id), Some(2));
    assert!(graph.table("audit", "orders").is_none());
    assert!(graph.view("public", "recent_orders").is_some());
}

#[test]
fn test_graph_iterates_in_discovery_order() {
    let graph = sample_graph();

    let names: Vec<_> = graph.tables().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "orders", "events"]);
    assert_eq!(graph.views().count(), 1);
}

#[test]
fn test_graph_resolves_foreign_key_targets() {
    let graph = sample_graph();
    let orders = graph.table("public", "orders").unwrap();
    let fk = &orders.foreign_keys[0];

    let target = graph.resolve(&fk.target).unwrap();
    assert_eq!(target.name, "customers");

    let incoming = graph.foreign_keys_to(&RelationRef::new("public", "customers"));
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].0.name, "orders");
    assert_eq!(incoming[0].1.name, "orders_customer_fk");
}

#[test]
fn test_graph_serializes_to_json() {
    let graph = sample_graph();
    let json = serde_json::to_value(&graph).unwrap();

    assert_eq!(json["database"]["name"], "shop");
    assert_eq!(json["database"]["dialect"], "PostgreSQL");
    assert_eq!(
        json["database"]["schemas"][0]["tables"][1]["foreign_keys"][0]["on_delete"],
        "Cascade"
    );

    let back: CatalogGraph = serde_json::from_value(json).unwrap();
    assert_eq!(back, graph);
}

#[test]
fn test_into_database() {
    let db = sample_graph().into_database();
    assert_eq!(db.default_schema, "public");
}
