//! Integration tests for telemetry initialization and span helpers.

use std::io::Write;
use std::sync::{Arc, Mutex};

use edge_store::config::LogLevel;
use edge_store::telemetry::{self, TelemetryConfig};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `f` with a local fmt subscriber and return what it logged.
fn capture(f: impl FnOnce()) -> String {
    let out = Captured::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    out.text()
}

#[test]
fn telemetry_initializes_without_endpoint() {
    // The global subscriber can only be set once per process; a second
    // init returns Err, which is acceptable here.
    let config = TelemetryConfig::new("edge-store-test", LogLevel::Debug);
    let _guard = telemetry::init_telemetry(config);
}

#[test]
fn successful_open_is_logged_on_its_span() {
    let logged = capture(|| {
        let span = telemetry::store::start_open_span("mem", "prefix", 30);
        telemetry::store::record_open_outcome(&span, "ok");
    });

    assert!(logged.contains("store opened"), "{logged}");
    assert!(logged.contains("store.open"), "{logged}");
    assert!(logged.contains("store.driver"), "{logged}");
    assert!(logged.contains("INFO"), "{logged}");
}

#[test]
fn failed_open_is_logged_as_warning() {
    let logged = capture(|| {
        let span = telemetry::store::start_open_span("postgres", "prefix", 1);
        telemetry::store::record_open_outcome(&span, "error");
    });

    assert!(logged.contains("store open failed"), "{logged}");
    assert!(logged.contains("WARN"), "{logged}");
}
