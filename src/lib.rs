//! llama-bridge
//!
//! Native side of the `LlamaBridge` React Native module. Kotlin calls three
//! JNI entry points (init, generate, stop) which land on a [`LlamaBridge`]
//! context object wrapping an [`InferenceBackend`].
//!
//! # Layers
//!
//! - `bridge`: state holder. One lock guards the model path and readiness
//!   flag; generation runs outside it and can be cancelled by `stop`.
//! - `backend`: the inference seam. The default build ships a placeholder
//!   backend; `--features gguf` links llama.cpp through `llama-cpp-2`.
//! - `ffi`: the process-wide instance and the `Java_*` exports. Errors are
//!   returned as values, never thrown into the JVM.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod ffi;
pub mod telemetry;

pub use backend::{
    Generation, GenerationParams, GenerationSession, InferenceBackend, PlaceholderBackend,
    PLACEHOLDER_RESPONSE,
};
pub use bridge::{BridgeSnapshot, LlamaBridge};
pub use error::{BridgeError, LoadFailure, NOT_INITIALIZED_MESSAGE};

#[cfg(feature = "gguf")]
pub use backend::gguf::{GgufConfig, LlamaCppBackend};

/// Component tag carried by every log line (logcat tag on Android).
pub const LOG_TAG: &str = "LlamaBridgeNative";
