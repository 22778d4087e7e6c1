//! Table definitions for the persisted state graph.
//!
//! `states.encoding` is unique, so the canonical key maps to exactly one id.
//! `edges` is keyed by `(parent_id, child_id)` and never stores a pair twice.

diesel::table! {
    states (id) {
        id -> BigInt,
        encoding -> Binary,
    }
}

diesel::table! {
    edges (parent_id, child_id) {
        parent_id -> BigInt,
        child_id -> BigInt,
    }
}

diesel::table! {
    overflow (id) {
        id -> BigInt,
        state_id -> BigInt,
        depth -> Integer,
    }
}

diesel::allow_tables_to_appear_in_same_query!(states, edges, overflow);

pub const CREATE_SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS states (
        id INTEGER PRIMARY KEY,
        encoding BLOB NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS edges (
        parent_id INTEGER NOT NULL REFERENCES states(id),
        child_id INTEGER NOT NULL REFERENCES states(id),
        PRIMARY KEY (parent_id, child_id)
    ) WITHOUT ROWID;

    CREATE TABLE IF NOT EXISTS overflow (
        id INTEGER PRIMARY KEY,
        state_id INTEGER NOT NULL REFERENCES states(id),
        depth INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_overflow_depth ON overflow(depth, id);
"#;
