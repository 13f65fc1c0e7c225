//! Metric instrument factories for edge-store.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a registered provider the instruments are no-ops.

use opentelemetry::metrics::{Counter, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("edge-store")
}

/// Counter: store open attempts that reached a driver.
/// Labels: `driver`, `result` ("ok" | "error").
pub fn store_opened() -> Counter<u64> {
    meter()
        .u64_counter("edge_store.store.opened")
        .with_description("Number of store open attempts")
        .build()
}
