//! Telemetry for the bridge.
//!
//! Structured logging, spans around each bridge operation, and counters
//! through the `metrics` facade. The host app decides where metrics go; the
//! crate installs no exporter.

mod logging;
mod metrics;
mod spans;

pub use self::logging::{init_logging, init_platform_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{record_generation, record_init, record_stop};
pub use self::spans::{BridgeSpan, SpanExt};
