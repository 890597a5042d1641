//! JSON tree column support for sqlx.
//!
//! [`JsonDocument`] wraps a [`serde_json::Value`] and binds/decodes as a
//! database JSON column: serialized text on `SQLite` (the default feature),
//! native `jsonb` on `PostgreSQL` (the `postgres` feature). The cargo feature
//! selects which backend codec is compiled in.

pub mod document;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use document::JsonDocument;
