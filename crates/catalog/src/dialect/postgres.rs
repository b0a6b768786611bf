// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! PostgreSQL catalog queries and store-type spellings.
//!
//! Every query casts its output to `text`, `int4`/`int8`, `bool` or
//! `timestamptz`, and orders rows so composite entities arrive grouped with
//! their members in key order.

use schemagraph_ir::{Dialect, PortableType};

use super::{CatalogDialect, PassQueries};

macro_rules! system_schemas {
    () => {
        "('pg_toast', 'pg_temp_1', 'pg_toast_temp_1', 'pg_catalog', 'information_schema')"
    };
}

// Keys are read from pg_constraint so they are scoped by table oid and visible
// to sessions holding only SELECT. Constraint names are unique per table, not
// per schema.
macro_rules! key_constraint_query {
    ($contype:literal) => {
        concat!(
            "SELECT ns.nspname::text AS schema_name,
       cls.relname::text AS table_name,
       con.conname::text AS constraint_name,
       a.attname::text AS column_name,
       k.ordinality::int4 AS ordinal_position
FROM pg_constraint AS con
JOIN pg_class AS cls ON cls.oid = con.conrelid AND cls.relkind IN ('r', 'p')
JOIN pg_namespace AS ns ON ns.oid = cls.relnamespace
CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, ordinality)
JOIN pg_attribute AS a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
WHERE con.contype = '",
            $contype,
            "'
  AND ns.nspname NOT IN ",
            system_schemas!(),
            "
ORDER BY ns.nspname, cls.relname, con.conname, k.ordinality"
        )
    };
}

const SYSTEM_SCHEMAS: &[&str] = &[
    "pg_toast",
    "pg_temp_1",
    "pg_toast_temp_1",
    "pg_catalog",
    "information_schema",
];

// EXECUTE on pg_stat_file is checked when the query is planned, so the
// creation time is read by a separate pass gated on `can_stat_files`.
const DATABASE: &str = "SELECT d.oid::int8 AS database_id,
       d.datname::text AS database_name,
       d.datcollate::text AS collation_name,
       has_function_privilege('pg_stat_file(text,boolean)', 'EXECUTE') AS can_stat_files
FROM pg_database AS d
WHERE d.datistemplate = false
ORDER BY d.datname";

const CREATION_TIME: &str = "SELECT d.oid::int8 AS database_id,
       COALESCE(f.creation, f.modification) AS created_at
FROM pg_database AS d
CROSS JOIN LATERAL pg_stat_file('base/' || d.oid || '/PG_VERSION', true) AS f
WHERE d.datistemplate = false
ORDER BY d.datname";

const SCHEMAS: &str = concat!(
    "SELECT ns.oid::int8 AS schema_id,
       ns.nspname::text AS schema_name
FROM pg_namespace AS ns
WHERE ns.nspname NOT IN ",
    system_schemas!(),
    "
ORDER BY ns.nspname"
);

// Partitioned parents (relkind 'p') are tables too; their partitions are
// listed alongside them.
const TABLES: &str = concat!(
    "SELECT cls.oid::int8 AS relation_id,
       ns.oid::int8 AS schema_id,
       cls.relname::text AS relation_name
FROM pg_class AS cls
JOIN pg_namespace AS ns ON cls.relnamespace = ns.oid
WHERE cls.relkind IN ('r', 'p')
  AND ns.nspname NOT IN ",
    system_schemas!(),
    "
ORDER BY ns.nspname, cls.relname"
);

const VIEWS: &str = concat!(
    "SELECT cls.oid::int8 AS relation_id,
       ns.oid::int8 AS schema_id,
       cls.relname::text AS relation_name,
       pg_get_viewdef(cls.oid)::text AS definition
FROM pg_class AS cls
JOIN pg_namespace AS ns ON cls.relnamespace = ns.oid
WHERE cls.relkind = 'v'
  AND ns.nspname NOT IN ",
    system_schemas!(),
    "
ORDER BY ns.nspname, cls.relname"
);

// pg_sequence_last_value checks sequence privileges at call time, so the CASE
// guard keeps sessions without SELECT or USAGE on the sequence working.
const COLUMNS: &str = concat!(
    "SELECT ns.nspname::text AS schema_name,
       cls.relname::text AS relation_name,
       cls.relkind::text AS relation_kind,
       a.attname::text AS column_name,
       a.attnum::int4 AS ordinal_position,
       CASE WHEN a.attgenerated = '' THEN pg_get_expr(ad.adbin, ad.adrelid) END AS column_default,
       CASE WHEN a.attnotnull THEN 'NO' ELSE 'YES' END AS is_nullable,
       format_type(a.atttypid, a.atttypmod)::text AS store_type,
       information_schema._pg_char_max_length(a.atttypid, a.atttypmod)::int4 AS character_maximum_length,
       COALESCE(information_schema._pg_numeric_precision(a.atttypid, a.atttypmod),
                information_schema._pg_datetime_precision(a.atttypid, a.atttypmod))::int4 AS precision,
       information_schema._pg_numeric_scale(a.atttypid, a.atttypmod)::int4 AS scale,
       CASE WHEN a.attidentity <> '' THEN 'YES' ELSE 'NO' END AS is_identity,
       seq.seqstart::text AS identity_start,
       seq.seqincrement::text AS identity_increment,
       CASE WHEN seq.seqrelid IS NOT NULL
             AND has_sequence_privilege(seq.seqrelid, 'SELECT,USAGE')
            THEN pg_sequence_last_value(seq.seqrelid::regclass)::text
       END AS identity_last_value,
       CASE WHEN a.attgenerated <> '' THEN 'ALWAYS' ELSE 'NEVER' END AS is_generated,
       CASE WHEN a.attgenerated <> '' THEN pg_get_expr(ad.adbin, ad.adrelid) END AS generation_expression
FROM pg_attribute AS a
JOIN pg_class AS cls ON cls.oid = a.attrelid AND cls.relkind IN ('r', 'p', 'v')
JOIN pg_namespace AS ns ON ns.oid = cls.relnamespace
LEFT JOIN pg_attrdef AS ad ON ad.adrelid = a.attrelid AND ad.adnum = a.attnum
LEFT JOIN pg_depend AS dep
  ON a.attidentity <> ''
 AND dep.classid = 'pg_class'::regclass
 AND dep.refclassid = 'pg_class'::regclass
 AND dep.refobjid = a.attrelid
 AND dep.refobjsubid = a.attnum
 AND dep.deptype = 'i'
LEFT JOIN pg_sequence AS seq ON seq.seqrelid = dep.objid
WHERE a.attnum > 0
  AND NOT a.attisdropped
  AND ns.nspname NOT IN ",
    system_schemas!(),
    "
ORDER BY ns.nspname, cls.relname, a.attnum"
);

const PRIMARY_KEYS: &str = key_constraint_query!("p");

const UNIQUE_CONSTRAINTS: &str = key_constraint_query!("u");

// conkey and confkey are unnested together, so referencing and referenced
// columns pair by position. A foreign key that references a partitioned table
// gets one internal clone per referenced partition on the same referencing
// table; only the constraint whose parent lives on another table is kept.
const FOREIGN_KEYS: &str = concat!(
    "SELECT ns.nspname::text AS schema_name,
       cls.relname::text AS table_name,
       con.conname::text AS constraint_name,
       a.attname::text AS column_name,
       k.ordinality::int4 AS ordinal_position,
       fns.nspname::text AS target_schema,
       fcls.relname::text AS target_table,
       fa.attname::text AS target_column,
       CASE con.confupdtype
            WHEN 'r' THEN 'RESTRICT'
            WHEN 'c' THEN 'CASCADE'
            WHEN 'n' THEN 'SET NULL'
            WHEN 'd' THEN 'SET DEFAULT'
            ELSE 'NO ACTION'
       END AS update_rule,
       CASE con.confdeltype
            WHEN 'r' THEN 'RESTRICT'
            WHEN 'c' THEN 'CASCADE'
            WHEN 'n' THEN 'SET NULL'
            WHEN 'd' THEN 'SET DEFAULT'
            ELSE 'NO ACTION'
       END AS delete_rule,
       CASE con.confmatchtype
            WHEN 'f' THEN 'FULL'
            WHEN 'p' THEN 'PARTIAL'
            ELSE 'NONE'
       END AS match_option
FROM pg_constraint AS con
JOIN pg_class AS cls ON cls.oid = con.conrelid AND cls.relkind IN ('r', 'p')
JOIN pg_namespace AS ns ON ns.oid = cls.relnamespace
JOIN pg_class AS fcls ON fcls.oid = con.confrelid AND fcls.relkind IN ('r', 'p')
JOIN pg_namespace AS fns ON fns.oid = fcls.relnamespace
CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, fattnum, ordinality)
JOIN pg_attribute AS a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
JOIN pg_attribute AS fa ON fa.attrelid = con.confrelid AND fa.attnum = k.fattnum
WHERE con.contype = 'f'
  AND NOT EXISTS (
      SELECT 1 FROM pg_constraint AS parent
      WHERE parent.oid = con.conparentid
        AND parent.conrelid = con.conrelid)
  AND ns.nspname NOT IN ",
    system_schemas!(),
    "
ORDER BY ns.nspname, cls.relname, con.conname, k.ordinality"
);

// Expression members have attnum 0 and no pg_attribute row; their text comes
// from pg_get_indexdef. INCLUDE columns are not key members.
const INDEXES: &str = concat!(
    "SELECT tns.nspname::text AS schema_name,
       trel.relname::text AS table_name,
       irel.relname::text AS index_name,
       COALESCE(a.attname::text, pg_get_indexdef(i.indexrelid, k.ordinality::int4, true)) AS column_name,
       k.ordinality::int4 AS ordinality,
       i.indisunique AS is_unique,
       (i.indpred IS NOT NULL) AS is_partial,
       (i.indexprs IS NOT NULL) AS is_functional,
       (k.colnum = 0) AS is_expression
FROM pg_index AS i
JOIN pg_class AS trel ON trel.oid = i.indrelid AND trel.relkind IN ('r', 'p')
JOIN pg_namespace AS tns ON tns.oid = trel.relnamespace
JOIN pg_class AS irel ON irel.oid = i.indexrelid
CROSS JOIN LATERAL unnest(i.indkey) WITH ORDINALITY AS k(colnum, ordinality)
LEFT JOIN pg_attribute AS a ON a.attrelid = trel.oid AND a.attnum = k.colnum
WHERE NOT i.indisunique
  AND NOT i.indisprimary
  AND k.ordinality <= i.indnkeyatts
  AND tns.nspname NOT IN ",
    system_schemas!(),
    "
ORDER BY tns.nspname, trel.relname, irel.relname, k.ordinality"
);

const TYPE_SPELLINGS: &[(&str, PortableType)] = &[
    ("bytea", PortableType::Bytes),
    ("boolean", PortableType::Boolean),
    ("bool", PortableType::Boolean),
    ("text", PortableType::Text),
    ("character varying", PortableType::Text),
    ("varchar", PortableType::Text),
    ("character", PortableType::Text),
    ("char", PortableType::Text),
    ("bpchar", PortableType::Text),
    ("name", PortableType::Text),
    ("json", PortableType::Text),
    ("jsonb", PortableType::Text),
    ("numeric", PortableType::Decimal),
    ("decimal", PortableType::Decimal),
    ("bigint", PortableType::Int64),
    ("int8", PortableType::Int64),
    ("integer", PortableType::Int32),
    ("int", PortableType::Int32),
    ("int4", PortableType::Int32),
    ("smallint", PortableType::Int16),
    ("int2", PortableType::Int16),
    ("real", PortableType::Float32),
    ("float4", PortableType::Float32),
    ("double precision", PortableType::Float64),
    ("float8", PortableType::Float64),
    ("date", PortableType::Date),
    ("timestamp", PortableType::Timestamp),
    ("timestamp without time zone", PortableType::Timestamp),
    ("timestamp with time zone", PortableType::Timestamp),
    ("timestamptz", PortableType::Timestamp),
    ("uuid", PortableType::Uuid),
    ("xml", PortableType::Xml),
];

/// PostgreSQL dialect
pub static POSTGRES: CatalogDialect = CatalogDialect {
    dialect: Dialect::PostgreSQL,
    default_schema: "public",
    system_schemas: SYSTEM_SCHEMAS,
    type_spellings: TYPE_SPELLINGS,
    queries: PassQueries {
        database: DATABASE,
        creation_time: CREATION_TIME,
        schemas: SCHEMAS,
        tables: TABLES,
        views: VIEWS,
        columns: COLUMNS,
        primary_keys: PRIMARY_KEYS,
        unique_constraints: UNIQUE_CONSTRAINTS,
        foreign_keys: FOREIGN_KEYS,
        indexes: INDEXES,
    },
};
