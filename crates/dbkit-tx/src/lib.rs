//! Transaction lifecycle helpers over `SQLite` connection pools.
//!
//! Two layers:
//!
//! - [`TransactionProvider`] owns a pool and runs caller closures inside a
//!   unit of work: begin, run, commit on success, rollback on error.
//! - [`registry`] keeps a process-wide map of named units for code that wants
//!   a shared handle instead of threading providers through every call site.
//!
//! Connection pooling, isolation, and SQL generation stay inside sqlx; this
//! crate only manages the begin/commit/rollback choreography around them.

pub mod config;
pub mod error;
pub mod provider;
pub mod registry;

pub use config::UnitConfig;
pub use error::{Error, Result};
pub use provider::TransactionProvider;
pub use registry::DEFAULT_UNIT;
