//! Store-open span helpers.

use tracing::Span;

/// Start a span covering a single store open.
///
/// The `store.result` field is declared empty and filled in by
/// [`record_open_outcome`].
pub fn start_open_span(driver: &str, prefix: &str, timeout_secs: u64) -> Span {
    tracing::info_span!(
        "store.open",
        "store.driver" = driver,
        "store.prefix" = prefix,
        "store.timeout_secs" = timeout_secs,
        "store.result" = tracing::field::Empty,
    )
}

/// Record the outcome ("ok" | "error") of a store open on its span.
pub fn record_open_outcome(span: &Span, outcome: &str) {
    span.record("store.result", outcome);
    span.in_scope(|| {
        if outcome == "ok" {
            tracing::info!(outcome, "store opened");
        } else {
            tracing::warn!(outcome, "store open failed");
        }
    });
}
