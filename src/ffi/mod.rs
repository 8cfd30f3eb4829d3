// Copyright 2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Process-wide bridge behind the JNI entry points.
//!
//! The Java side calls fixed `native*` methods that carry no handle, so this
//! module owns the one [`LlamaBridge`] they share. Every entry point catches
//! panics and maps them to the same failure value an ordinary error would
//! produce; nothing unwinds into the JVM.

#[cfg(feature = "jni")]
mod java;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Once, OnceLock};

use tracing::{error, warn};

use crate::bridge::LlamaBridge;
use crate::error::BridgeError;
use crate::telemetry::{init_platform_logging, record_init, LogError};
use crate::LOG_TAG;

#[cfg(feature = "gguf")]
pub type DefaultBackend = crate::backend::gguf::LlamaCppBackend;
#[cfg(not(feature = "gguf"))]
pub type DefaultBackend = crate::backend::PlaceholderBackend;

/// Returned to Java when the real response cannot be turned into a string.
pub const RESPONSE_FALLBACK: &str = "Generation failed: internal error";

static BRIDGE: OnceLock<Result<LlamaBridge<DefaultBackend>, String>> = OnceLock::new();
static LOGGING: Once = Once::new();

/// Install platform logging from the environment. Safe to call repeatedly.
pub fn init_logging_once() {
    LOGGING.call_once(|| {
        let config = crate::config::load();
        match init_platform_logging(&config.log) {
            Ok(()) | Err(LogError::AlreadyInitialized) => {}
            Err(e) => eprintln!("{LOG_TAG}: logging disabled: {e}"),
        }
    });
}

#[cfg(feature = "gguf")]
fn create_default_backend() -> Result<DefaultBackend, BridgeError> {
    let config = crate::config::load();
    crate::backend::gguf::LlamaCppBackend::new((&config.gguf).into())
}

#[cfg(not(feature = "gguf"))]
fn create_default_backend() -> Result<DefaultBackend, BridgeError> {
    Ok(crate::backend::PlaceholderBackend)
}

/// The shared bridge, created on first use.
///
/// Fails only if the backend itself could not start; the failure is sticky
/// for the life of the process.
pub fn global_bridge() -> Result<&'static LlamaBridge<DefaultBackend>, &'static str> {
    let slot = BRIDGE.get_or_init(|| {
        init_logging_once();
        create_default_backend().map(LlamaBridge::new).map_err(|e| {
            error!(target: LOG_TAG, "Failed to start inference backend: {e}");
            e.to_string()
        })
    });
    slot.as_ref().map_err(String::as_str)
}

fn guarded<T>(operation: &'static str, fallback: T, f: impl FnOnce() -> T) -> T {
    // parking_lot locks do not poison, so the bridge stays usable after a panic.
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!(target: LOG_TAG, "{operation} panicked");
        fallback
    })
}

/// `nativeInit`: true once a model is ready.
pub fn native_init(model_path: Option<&str>) -> bool {
    guarded("init", false, || match global_bridge() {
        Ok(bridge) => bridge.init(model_path),
        Err(e) => {
            error!(target: LOG_TAG, "init refused: {e}");
            false
        }
    })
}

/// `nativeInit` with a non-null path the JVM could not hand over. Fails
/// without touching state, like a null path, but logs the real cause.
pub fn native_init_unreadable(reason: &str) -> bool {
    guarded("init", false, || {
        let result = Err(BridgeError::UnreadableModelPath(reason.to_string()));
        if let Err(e) = &result {
            error!(target: LOG_TAG, "{e}");
        }
        record_init(&result);
        false
    })
}

/// `nativeGenerate`: always returns text, never fails.
pub fn native_generate(prompt: Option<&str>, max_tokens: i32, temperature: f64) -> String {
    guarded("generate", RESPONSE_FALLBACK.to_string(), || match global_bridge() {
        Ok(bridge) => bridge.generate(prompt, max_tokens, temperature),
        Err(e) => {
            warn!(target: LOG_TAG, "generate refused: {e}");
            BridgeError::NotInitialized.to_string()
        }
    })
}

/// `nativeStop`: idempotent.
pub fn native_stop() {
    guarded("stop", (), || {
        if let Ok(bridge) = global_bridge() {
            bridge.stop();
        }
    })
}
