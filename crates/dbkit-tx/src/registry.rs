//! Process-wide registry of named units.
//!
//! Mirrors the provider API as free functions against a shared map, so
//! application code can reach its database by name instead of threading a
//! provider through every call site. The convenience functions at the bottom
//! operate on the unit named [`DEFAULT_UNIT`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use futures_util::future::BoxFuture;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::config::UnitConfig;
use crate::error::{Error, Result};
use crate::provider::TransactionProvider;

/// Name used by the default-unit convenience functions.
pub const DEFAULT_UNIT: &str = "default";

type Registry = RwLock<HashMap<String, Arc<TransactionProvider>>>;

static PROVIDERS: OnceLock<Registry> = OnceLock::new();

fn providers() -> &'static Registry {
    PROVIDERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Connect a pool and register it under the config's unit name.
///
/// Fails with [`Error::AlreadyInitialized`] when the name is taken. The pool
/// is connected outside the lock; a racer that loses the re-check under the
/// write lock closes its freshly opened pool.
pub async fn setup(config: &UnitConfig) -> Result<Arc<TransactionProvider>> {
    let name = config.name().to_string();
    if read_map().contains_key(&name) {
        return Err(Error::AlreadyInitialized(name));
    }

    let provider = Arc::new(TransactionProvider::connect(config).await?);

    let lost_race = {
        let mut map = write_map();
        if map.contains_key(&name) {
            true
        } else {
            map.insert(name.clone(), Arc::clone(&provider));
            false
        }
    };
    if lost_race {
        provider.close().await;
        return Err(Error::AlreadyInitialized(name));
    }

    debug!("unit {} initialized", name);
    Ok(provider)
}

/// Registered provider for the unit, if any.
pub fn get(name: &str) -> Option<Arc<TransactionProvider>> {
    read_map().get(name).cloned()
}

/// Registered provider for [`DEFAULT_UNIT`], if any.
pub fn default_unit() -> Option<Arc<TransactionProvider>> {
    get(DEFAULT_UNIT)
}

/// Remove the unit and close its pool. No-op when the unit is not registered.
pub async fn shutdown(name: &str) {
    let removed = write_map().remove(name);
    if let Some(provider) = removed {
        provider.close().await;
        debug!("unit {} shut down", name);
    }
}

/// Shut down every registered unit.
pub async fn shutdown_all() {
    let drained: Vec<_> = write_map().drain().collect();
    for (name, provider) in drained {
        provider.close().await;
        debug!("unit {} shut down", name);
    }
}

/// Run a unit of work on the default unit.
pub async fn with<F>(tx_fn: F) -> Result<()>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<()>>,
{
    require_default()?.with(tx_fn).await
}

/// [`with`] with an error handler applied after rollback.
pub async fn with_handled<F, H>(tx_fn: F, on_error: H) -> Result<()>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<()>>,
    H: FnOnce(Error) -> Result<()>,
{
    require_default()?.with_handled(tx_fn, on_error).await
}

/// Run a value-returning unit of work on the default unit.
pub async fn reduce<T, F>(tx_fn: F) -> Result<T>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
{
    require_default()?.reduce(tx_fn).await
}

/// [`reduce`] with an error handler applied after rollback.
pub async fn reduce_handled<T, F, H>(tx_fn: F, on_error: H) -> Result<T>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
    H: FnOnce(Error) -> Result<T>,
{
    require_default()?.reduce_handled(tx_fn, on_error).await
}

/// Run a maybe-empty lookup on the default unit.
pub async fn optional<T, F>(tx_fn: F) -> Result<Option<T>>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
{
    require_default()?.optional(tx_fn).await
}

fn require_default() -> Result<Arc<TransactionProvider>> {
    default_unit().ok_or_else(|| Error::UnknownUnit(DEFAULT_UNIT.to_string()))
}

fn read_map() -> std::sync::RwLockReadGuard<'static, HashMap<String, Arc<TransactionProvider>>> {
    providers().read().unwrap_or_else(PoisonError::into_inner)
}

fn write_map() -> std::sync::RwLockWriteGuard<'static, HashMap<String, Arc<TransactionProvider>>> {
    providers().write().unwrap_or_else(PoisonError::into_inner)
}
