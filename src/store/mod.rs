//! Store initialization: URL scheme to driver dispatch.
//!
//! `open` parses `<scheme>://<address>`, picks the driver for the scheme and
//! connects once, bounded by the bundle's timeout. No retries; a failed
//! attempt is returned to the caller as is.

pub mod memory;
mod sql;

pub use memory::MemStore;

use opentelemetry::KeyValue;
use secrecy::ExposeSecret;
use sqlx::{MySqlPool, PgPool};
use tracing::Instrument as _;

use crate::config::ParameterBundle;
use crate::error::{Error, Result};
use crate::telemetry;

/// Backing store technology, selected by URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Memory,
    Postgres,
    MySql,
}

impl Driver {
    /// Map a URL scheme to a driver. Schemes are matched exactly.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "mem" => Some(Driver::Memory),
            "postgres" | "postgresql" => Some(Driver::Postgres),
            "mysql" => Some(Driver::MySql),
            _ => None,
        }
    }

    /// Whether data outlives the process that wrote it.
    pub fn is_persistent(self) -> bool {
        !matches!(self, Driver::Memory)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Driver::Memory => "mem",
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every scheme `open` accepts, as listed in `UnsupportedDriver` errors.
pub fn supported_schemes() -> &'static [&'static str] {
    &["mem", "postgres", "postgresql", "mysql"]
}

/// Split a store URL into scheme and address.
pub fn split_url(url: &str) -> Result<(&str, &str)> {
    match url.split_once("://") {
        Some((scheme, address)) if !scheme.is_empty() && !address.is_empty() => {
            Ok((scheme, address))
        }
        _ => Err(Error::InvalidUrlFormat),
    }
}

/// A connected store backend.
#[derive(Debug, Clone)]
pub enum Backend {
    Memory(MemStore),
    Postgres(PgPool),
    MySql(MySqlPool),
}

/// Handle to an opened store, namespaced by the configured prefix.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    prefix: String,
    backend: Backend,
}

/// Open the store named by `bundle.url`.
pub async fn open(bundle: &ParameterBundle) -> Result<StoreHandle> {
    let url = bundle.url.expose_secret();
    let (scheme, address) = split_url(url)?;
    let driver =
        Driver::from_scheme(scheme).ok_or_else(|| Error::UnsupportedDriver(scheme.to_string()))?;

    let span = telemetry::store::start_open_span(driver.as_str(), &bundle.prefix, bundle.timeout);
    let result = connect(driver, url, address, bundle)
        .instrument(span.clone())
        .await;

    let outcome = if result.is_ok() { "ok" } else { "error" };
    telemetry::metrics::store_opened().add(
        1,
        &[
            KeyValue::new("driver", driver.as_str()),
            KeyValue::new("result", outcome),
        ],
    );
    telemetry::store::record_open_outcome(&span, outcome);

    let backend = result?;
    Ok(StoreHandle {
        prefix: bundle.prefix.clone(),
        backend,
    })
}

async fn connect(
    driver: Driver,
    url: &str,
    address: &str,
    bundle: &ParameterBundle,
) -> Result<Backend> {
    let timeout = bundle.connect_timeout();
    let backend = match driver {
        Driver::Memory => Backend::Memory(MemStore::new(address, &bundle.prefix)),
        Driver::Postgres => Backend::Postgres(
            sql::postgres::open(url, timeout)
                .await
                .map_err(Error::StoreConnectionFailed)?,
        ),
        Driver::MySql => Backend::MySql(
            sql::mysql::open(url, timeout)
                .await
                .map_err(Error::StoreConnectionFailed)?,
        ),
    };
    Ok(backend)
}

impl StoreHandle {
    pub fn driver(&self) -> Driver {
        match self.backend {
            Backend::Memory(_) => Driver::Memory,
            Backend::Postgres(_) => Driver::Postgres,
            Backend::MySql(_) => Driver::MySql,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Simple health check: a `SELECT 1` for SQL stores.
    pub async fn health_check(&self) -> Result<()> {
        match &self.backend {
            Backend::Memory(_) => {}
            Backend::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Backend::MySql(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        match &self.backend {
            Backend::Memory(store) => store.put(key, value),
            Backend::Postgres(pool) => sql::postgres::put(pool, &self.prefix, key, value).await?,
            Backend::MySql(pool) => sql::mysql::put(pool, &self.prefix, key, value).await?,
        }
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = match &self.backend {
            Backend::Memory(store) => store.get(key),
            Backend::Postgres(pool) => sql::postgres::get(pool, &self.prefix, key).await?,
            Backend::MySql(pool) => sql::mysql::get(pool, &self.prefix, key).await?,
        };
        Ok(value)
    }

    /// Delete a key. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let existed = match &self.backend {
            Backend::Memory(store) => store.delete(key),
            Backend::Postgres(pool) => sql::postgres::delete(pool, &self.prefix, key).await?,
            Backend::MySql(pool) => sql::mysql::delete(pool, &self.prefix, key).await?,
        };
        Ok(existed)
    }

    /// Release the store's connections.
    pub async fn close(self) {
        match self.backend {
            Backend::Memory(_) => {}
            Backend::Postgres(pool) => pool.close().await,
            Backend::MySql(pool) => pool.close().await,
        }
    }
}
