//! # edge-store
//!
//! Resolves store connection parameters (URL, key prefix, timeout, log
//! level) from command-line flags or environment variables, and opens the
//! backing store selected by the URL scheme.
//!
//! ```no_run
//! use edge_store::config::{self, EnvSource};
//!
//! # async fn run() -> edge_store::error::Result<()> {
//! let bundle = config::resolve(&EnvSource)?;
//! let store = edge_store::store::open(&bundle).await?;
//! store.put("greeting", b"hello").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
