//! Unit configuration.
//!
//! A unit is one named database handle: a location plus pool settings.
//! [`UnitConfig`] produces the sqlx connect options; the provider and the
//! registry both build pools from it.

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::Result;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
enum Storage {
    File(PathBuf),
    Memory,
}

/// Configuration for a single database unit.
#[derive(Debug, Clone)]
pub struct UnitConfig {
    name: String,
    storage: Storage,
    create_if_missing: bool,
    max_connections: u32,
}

impl UnitConfig {
    /// File-backed unit at the given path.
    ///
    /// The database file and its parent directories are created on first
    /// connect unless [`create_if_missing`](Self::create_if_missing) is
    /// switched off.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            storage: Storage::File(path.into()),
            create_if_missing: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// In-memory unit.
    ///
    /// Pinned to a single pooled connection: every `SQLite` in-memory
    /// connection is a distinct database, so a wider pool would hand out
    /// empty databases.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: Storage::Memory,
            create_if_missing: true,
            max_connections: 1,
        }
    }

    /// Unit name, used as the registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a missing database file is created on connect.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Pool size cap for file-backed units. Ignored for in-memory units.
    pub fn max_connections(mut self, max: u32) -> Self {
        if matches!(self.storage, Storage::File(_)) {
            self.max_connections = max;
        }
        self
    }

    /// Build connect options, creating parent directories for file-backed
    /// units when allowed.
    pub(crate) fn connect_options(&self) -> Result<SqliteConnectOptions> {
        match &self.storage {
            Storage::File(path) => {
                if self.create_if_missing {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Ok(SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(self.create_if_missing))
            }
            Storage::Memory => Ok(SqliteConnectOptions::new().in_memory(true)),
        }
    }

    pub(crate) fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().max_connections(self.max_connections);
        match self.storage {
            // Keep the single in-memory connection alive for the lifetime of
            // the pool; letting the idle reaper close it would drop the data.
            Storage::Memory => options.min_connections(1),
            Storage::File(_) => options,
        }
    }
}
