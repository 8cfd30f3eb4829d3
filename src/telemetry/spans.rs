//! Span utilities and extension traits for bridge tracing.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for the span wrapped around each bridge operation.
pub struct BridgeSpan;

impl BridgeSpan {
    /// Create a span for `operation` (`init`, `generate`, `stop`).
    ///
    /// `status` and `error.message` are filled in by [`SpanExt::record_result`].
    pub fn new(operation: &'static str) -> Span {
        info_span!(
            target: crate::LOG_TAG,
            "bridge_op",
            op = operation,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}
