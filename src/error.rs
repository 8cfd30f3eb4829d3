//! Error types for the bridge.
//!
//! Errors stay tagged inside the crate. Only the outermost seam collapses them
//! into the `bool` / text values the Java side expects.

use std::path::PathBuf;

use thiserror::Error;

/// Text returned by `generate` when no model is ready.
pub const NOT_INITIALIZED_MESSAGE: &str = "Llama model is not initialized";

/// Why a model could not be loaded.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid model format: {0}")]
    InvalidFormat(String),

    #[error("insufficient memory to load model ({0})")]
    OutOfMemory(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors that can occur while driving the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("modelPath was null")]
    MissingModelPath,

    #[error("modelPath could not be read: {0}")]
    UnreadableModelPath(String),

    #[error("modelPath was empty")]
    EmptyModelPath,

    #[error("{}", NOT_INITIALIZED_MESSAGE)]
    NotInitialized,

    #[error("Model load failed: {0}")]
    ModelLoad(#[from] LoadFailure),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Generation cancelled")]
    Cancelled,
}

impl BridgeError {
    /// Returns true if this error is an expected caller mistake rather than a fault.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::EmptyModelPath | Self::NotInitialized | Self::Cancelled
        )
    }

    /// Short label used for the `outcome` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingModelPath => "missing_path",
            Self::UnreadableModelPath(_) => "unreadable_path",
            Self::EmptyModelPath => "empty_path",
            Self::NotInitialized => "not_initialized",
            Self::ModelLoad(_) => "load_failed",
            Self::Generation(_) => "generation_failed",
            Self::Cancelled => "cancelled",
        }
    }
}
