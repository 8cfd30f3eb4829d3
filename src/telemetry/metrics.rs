//! Bridge counters recorded through the `metrics` facade.

use std::time::Duration;

use ::metrics::{counter, histogram};

use crate::error::BridgeError;

/// Record the outcome of an `init` call.
pub fn record_init(result: &Result<(), BridgeError>) {
    let outcome = match result {
        Ok(()) => "ok",
        Err(e) => e.kind(),
    };
    counter!("llama_bridge_init_total", "outcome" => outcome).increment(1);
}

/// Record the outcome and latency of a `generate` call.
pub fn record_generation<T>(result: &Result<T, BridgeError>, elapsed: Duration) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    counter!("llama_bridge_generate_total", "outcome" => outcome).increment(1);
    histogram!("llama_bridge_generate_latency_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// Record a `stop` call.
pub fn record_stop() {
    counter!("llama_bridge_stop_total").increment(1);
}
