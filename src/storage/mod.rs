//! Record store access layer
//!
//! The engine talks to the relational store through the [`ConnectionAdapter`]
//! trait; [`Database`] is the sqlx-backed implementation covering SQLite and
//! PostgreSQL behind cargo features.

pub mod adapter;
pub mod database;

pub use adapter::{ConnectionAdapter, RecordId, SqlParam, TableNames, TableRow};
pub use database::Database;
