//! Closure-based transaction lifecycle over a `SQLite` pool.

use futures_util::future::BoxFuture;
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{debug, warn};

use crate::config::UnitConfig;
use crate::error::{Error, Result};

/// Runs units of work against an owned connection pool.
///
/// Each call begins a transaction, hands the transaction's connection to the
/// caller's closure, commits on `Ok` and rolls back on `Err`. Closures return
/// a boxed future so they can borrow the connection across awaits:
///
/// ```rust,no_run
/// # async fn example(provider: &dbkit_tx::TransactionProvider) -> dbkit_tx::Result<()> {
/// provider
///     .with(|conn| {
///         Box::pin(async move {
///             sqlx::query("DELETE FROM sessions").execute(&mut *conn).await?;
///             Ok(())
///         })
///     })
///     .await
/// # }
/// ```
///
/// The `*_handled` variants take an error handler that runs after rollback
/// and may suppress the error, transform it, or substitute a fallback value.
pub struct TransactionProvider {
    pool: SqlitePool,
}

impl TransactionProvider {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect a pool for the given unit configuration.
    pub async fn connect(config: &UnitConfig) -> Result<Self> {
        let options = config.connect_options()?;
        let pool = config.pool_options().connect_with(options).await?;
        Ok(Self::new(pool))
    }

    /// Provider over a fresh in-memory database, for tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&UnitConfig::in_memory("memory")).await
    }

    /// The underlying pool, for schema setup and non-transactional work.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Whether the pool is still accepting work.
    pub fn is_open(&self) -> bool {
        !self.pool.is_closed()
    }

    /// Close the pool and wait for connections to be released. Idempotent.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run a unit of work that returns no value.
    pub async fn with<F>(&self, tx_fn: F) -> Result<()>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<()>>,
    {
        self.reduce(tx_fn).await
    }

    /// [`with`](Self::with) with an error handler applied after rollback.
    pub async fn with_handled<F, H>(&self, tx_fn: F, on_error: H) -> Result<()>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<()>>,
        H: FnOnce(Error) -> Result<()>,
    {
        self.reduce_handled(tx_fn, on_error).await
    }

    /// Run a unit of work and return its value.
    pub async fn reduce<T, F>(&self, tx_fn: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
    {
        self.reduce_handled(tx_fn, Err).await
    }

    /// [`reduce`](Self::reduce) with an error handler applied after rollback.
    ///
    /// The handler also sees commit failures; by then the transaction can no
    /// longer be rolled back by this crate and sqlx owns the cleanup.
    pub async fn reduce_handled<T, F, H>(&self, tx_fn: F, on_error: H) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
        H: FnOnce(Error) -> Result<T>,
    {
        let mut tx = self.pool.begin().await?;
        match tx_fn(&mut *tx).await {
            Ok(value) => match tx.commit().await {
                Ok(()) => {
                    debug!("transaction committed");
                    Ok(value)
                }
                Err(err) => on_error(Error::Database(err)),
            },
            Err(err) => {
                rollback(tx).await;
                on_error(err)
            }
        }
    }

    /// Run a unit of work whose lookup may come up empty.
    ///
    /// A `RowNotFound` raised by the closure becomes `Ok(None)` and the
    /// transaction still commits; any other error rolls back as usual.
    pub async fn optional<T, F>(&self, tx_fn: F) -> Result<Option<T>>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
    {
        self.optional_handled(tx_fn, Err).await
    }

    /// [`optional`](Self::optional) with an error handler applied after
    /// rollback.
    pub async fn optional_handled<T, F, H>(&self, tx_fn: F, on_error: H) -> Result<Option<T>>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
        H: FnOnce(Error) -> Result<Option<T>>,
    {
        let mut tx = self.pool.begin().await?;
        let outcome = match tx_fn(&mut *tx).await {
            Err(err) if err.is_row_not_found() => Ok(None),
            other => other.map(Some),
        };
        match outcome {
            Ok(value) => match tx.commit().await {
                Ok(()) => {
                    debug!("transaction committed");
                    Ok(value)
                }
                Err(err) => on_error(Error::Database(err)),
            },
            Err(err) => {
                rollback(tx).await;
                on_error(err)
            }
        }
    }
}

/// Roll back, keeping the closure's error as the one reported.
async fn rollback(tx: Transaction<'_, Sqlite>) {
    debug!("rolling back transaction");
    if let Err(err) = tx.rollback().await {
        warn!("rollback failed: {}", err);
    }
}
