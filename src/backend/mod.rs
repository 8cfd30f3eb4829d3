//! Inference backends behind the bridge.
//!
//! A backend turns a model path into a [`GenerationSession`]. The bridge keeps
//! the session in an `Arc`, so `stop` can drop its reference while a
//! generation still finishes with its own.

#[cfg(feature = "gguf")]
pub mod gguf;

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::error::BridgeError;

/// Response returned by [`PlaceholderBackend`] for every prompt.
pub const PLACEHOLDER_RESPONSE: &str =
    "[llama.cpp placeholder] Please install the actual GGUF model and update the JNI bridge.";

/// Per-call generation parameters, passed through exactly as the caller sent them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Token budget. Not range-checked by the bridge.
    pub max_tokens: i32,
    /// Sampling temperature. Not range-checked by the bridge.
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { max_tokens: 120, temperature: 0.7 }
    }
}

/// Output of a completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub tokens_generated: u32,
}

/// A loaded model that can produce text.
pub trait GenerationSession: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// Long-running implementations must poll `cancel` and return
    /// [`BridgeError::Cancelled`] once it fires. Implementations that answer
    /// immediately ignore it: a call that passed the readiness check completes.
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        cancel: &CancellationToken,
    ) -> Result<Generation, BridgeError>;
}

/// Loads models into sessions. Native resources are released when the
/// returned session is dropped.
pub trait InferenceBackend: Send + Sync {
    type Session: GenerationSession + 'static;

    fn load(&self, model_path: &Path) -> Result<Self::Session, BridgeError>;
}

/// Backend used until a real model is wired in. Never touches the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBackend;

/// Session produced by [`PlaceholderBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSession;

impl InferenceBackend for PlaceholderBackend {
    type Session = PlaceholderSession;

    fn load(&self, _model_path: &Path) -> Result<Self::Session, BridgeError> {
        Ok(PlaceholderSession)
    }
}

impl GenerationSession for PlaceholderSession {
    fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
        _cancel: &CancellationToken,
    ) -> Result<Generation, BridgeError> {
        Ok(Generation { text: PLACEHOLDER_RESPONSE.to_string(), tokens_generated: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_loads_any_path() {
        let backend = PlaceholderBackend;
        assert!(backend.load(Path::new("/does/not/exist.gguf")).is_ok());
    }

    #[test]
    fn placeholder_ignores_params() {
        let session = PlaceholderSession;
        let token = CancellationToken::new();
        let a = session
            .generate("hi", &GenerationParams { max_tokens: -5, temperature: 9.0 }, &token)
            .unwrap();
        let b = session.generate("", &GenerationParams::default(), &token).unwrap();
        assert_eq!(a.text, PLACEHOLDER_RESPONSE);
        assert_eq!(a, b);
    }

    #[test]
    fn placeholder_answers_even_after_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let result = PlaceholderSession.generate("hi", &GenerationParams::default(), &token);
        assert_eq!(result.unwrap().text, PLACEHOLDER_RESPONSE);
    }
}
