//! SQL-backed stores via SQLx (Postgres and MySQL).
//!
//! Each store keeps its entries in a single `kv` table keyed by
//! (namespace, k); the namespace is the configured prefix.

use std::time::Duration;

use sqlx::pool::PoolOptions;
use sqlx::{MySqlPool, PgPool};

fn pool_options<DB: sqlx::Database>(timeout: Option<Duration>) -> PoolOptions<DB> {
    let options = PoolOptions::<DB>::new().max_connections(10);
    match timeout {
        Some(timeout) => options.acquire_timeout(timeout),
        None => options,
    }
}

/// Run `fut` under `timeout`; an elapsed timeout is `PoolTimedOut`.
pub(crate) async fn bounded<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = std::result::Result<T, sqlx::Error>>,
) -> std::result::Result<T, sqlx::Error> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| sqlx::Error::PoolTimedOut)?,
        None => fut.await,
    }
}

pub(crate) mod postgres {
    use super::*;

    /// Connect and create the `kv` table, all within `timeout`. The pool is
    /// closed again if the table cannot be created.
    pub async fn open(
        url: &str,
        timeout: Option<Duration>,
    ) -> std::result::Result<PgPool, sqlx::Error> {
        bounded(timeout, async {
            let pool = pool_options(timeout).connect(url).await?;
            if let Err(e) = init(&pool).await {
                pool.close().await;
                return Err(e);
            }
            Ok(pool)
        })
        .await
    }

    async fn init(pool: &PgPool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                namespace   TEXT NOT NULL,
                k           TEXT NOT NULL,
                v           BYTEA NOT NULL,
                PRIMARY KEY (namespace, k)
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn put(
        pool: &PgPool,
        ns: &str,
        key: &str,
        value: &[u8],
    ) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO kv (namespace, k, v) VALUES ($1, $2, $3)
             ON CONFLICT (namespace, k) DO UPDATE SET v = EXCLUDED.v",
        )
        .bind(ns)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get(
        pool: &PgPool,
        ns: &str,
        key: &str,
    ) -> std::result::Result<Option<Vec<u8>>, sqlx::Error> {
        sqlx::query_scalar("SELECT v FROM kv WHERE namespace = $1 AND k = $2")
            .bind(ns)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(
        pool: &PgPool,
        ns: &str,
        key: &str,
    ) -> std::result::Result<bool, sqlx::Error> {
        let done = sqlx::query("DELETE FROM kv WHERE namespace = $1 AND k = $2")
            .bind(ns)
            .bind(key)
            .execute(pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

pub(crate) mod mysql {
    use super::*;

    /// Connect and create the `kv` table, all within `timeout`. The pool is
    /// closed again if the table cannot be created.
    pub async fn open(
        url: &str,
        timeout: Option<Duration>,
    ) -> std::result::Result<MySqlPool, sqlx::Error> {
        bounded(timeout, async {
            let pool = pool_options(timeout).connect(url).await?;
            if let Err(e) = init(&pool).await {
                pool.close().await;
                return Err(e);
            }
            Ok(pool)
        })
        .await
    }

    async fn init(pool: &MySqlPool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                namespace   VARCHAR(255) NOT NULL,
                k           VARCHAR(255) NOT NULL,
                v           LONGBLOB NOT NULL,
                PRIMARY KEY (namespace, k)
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn put(
        pool: &MySqlPool,
        ns: &str,
        key: &str,
        value: &[u8],
    ) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO kv (namespace, k, v) VALUES (?, ?, ?)
             ON DUPLICATE KEY UPDATE v = VALUES(v)",
        )
        .bind(ns)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get(
        pool: &MySqlPool,
        ns: &str,
        key: &str,
    ) -> std::result::Result<Option<Vec<u8>>, sqlx::Error> {
        sqlx::query_scalar("SELECT v FROM kv WHERE namespace = ? AND k = ?")
            .bind(ns)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(
        pool: &MySqlPool,
        ns: &str,
        key: &str,
    ) -> std::result::Result<bool, sqlx::Error> {
        let done = sqlx::query("DELETE FROM kv WHERE namespace = ? AND k = ?")
            .bind(ns)
            .bind(key)
            .execute(pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_times_out_as_pool_timeout() {
        let result = bounded::<()>(
            Some(Duration::from_millis(20)),
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(sqlx::Error::PoolTimedOut)), "{result:?}");
    }

    #[tokio::test]
    async fn bounded_passes_inner_errors_through() {
        let result = bounded::<()>(Some(Duration::from_secs(5)), async {
            Err(sqlx::Error::Protocol("permission denied for schema public".into()))
        })
        .await;
        assert!(matches!(result, Err(sqlx::Error::Protocol(_))), "{result:?}");

        let result = bounded(None, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
