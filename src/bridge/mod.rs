//! Bridge state holder.
//!
//! [`LlamaBridge`] owns the model path, the readiness flag, and the loaded
//! session behind a single mutex. State transitions (`init`, `stop`) run
//! entirely under that lock. `generate` holds it only long enough to check
//! readiness and clone the session, so `stop` can cancel a long generation
//! instead of queueing behind it.
//!
//! ```text
//!                 init(non-empty, load ok)
//!  Uninitialized ─────────────────────────▶ Ready
//!        ▲                                    │
//!        └──── stop / init("") / load error ──┘
//! ```

mod state;

use std::path::Path;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::backend::{
    Generation, GenerationParams, GenerationSession, InferenceBackend, PlaceholderBackend,
};
use crate::error::BridgeError;
use crate::telemetry::{record_generation, record_init, record_stop, BridgeSpan, SpanExt};
use crate::LOG_TAG;

use state::BridgeState;
pub use state::BridgeSnapshot;

/// Context object for one model slot.
///
/// The JNI layer keeps one process-wide instance; Rust callers and tests
/// construct as many as they need.
pub struct LlamaBridge<B: InferenceBackend = PlaceholderBackend> {
    backend: B,
    state: Mutex<BridgeState<B::Session>>,
}

impl Default for LlamaBridge<PlaceholderBackend> {
    fn default() -> Self {
        Self::new(PlaceholderBackend)
    }
}

impl<B: InferenceBackend> LlamaBridge<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, state: Mutex::new(BridgeState::new()) }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load `model_path` and mark the bridge ready.
    ///
    /// `None` fails without touching state. Anything else replaces the
    /// current session: in-flight generations are cancelled first.
    pub fn try_init(&self, model_path: Option<&str>) -> Result<(), BridgeError> {
        let span = BridgeSpan::new("init");
        let _enter = span.enter();

        let result = self.init_locked(model_path);
        span.record_result(&result);
        record_init(&result);
        result
    }

    fn init_locked(&self, model_path: Option<&str>) -> Result<(), BridgeError> {
        let Some(path) = model_path else {
            error!(target: LOG_TAG, "modelPath was null");
            return Err(BridgeError::MissingModelPath);
        };

        let mut state = self.state.lock();
        state.reset();
        state.model_path.push_str(path);
        info!(target: LOG_TAG, "Initializing llama model at {}", state.model_path);

        if state.model_path.is_empty() {
            return Err(BridgeError::EmptyModelPath);
        }

        match self.backend.load(Path::new(path)) {
            Ok(session) => {
                state.ready(session);
                Ok(())
            }
            Err(e) => {
                error!(target: LOG_TAG, error = %e, "Failed to load llama model at {}", path);
                state.reset();
                Err(e)
            }
        }
    }

    /// Boolean form of [`try_init`](Self::try_init) for the JNI boundary.
    pub fn init(&self, model_path: Option<&str>) -> bool {
        self.try_init(model_path).is_ok()
    }

    /// Run the backend on `prompt`. A missing prompt is treated as empty.
    pub fn try_generate(
        &self,
        prompt: Option<&str>,
        params: GenerationParams,
    ) -> Result<Generation, BridgeError> {
        let span = BridgeSpan::new("generate");
        let _enter = span.enter();
        let started = Instant::now();

        let result = self.generate_unlocked(prompt.unwrap_or(""), &params);
        span.record_result(&result);
        record_generation(&result, started.elapsed());
        result
    }

    fn generate_unlocked(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Generation, BridgeError> {
        let (session, cancel) = {
            let state = self.state.lock();
            let session = match (&state.session, state.initialized) {
                (Some(session), true) => session.clone(),
                _ => {
                    info!(target: LOG_TAG, "Generate requested before initialization");
                    return Err(BridgeError::NotInitialized);
                }
            };
            info!(
                target: LOG_TAG,
                "Prompt received ({} tokens): {}", params.max_tokens, prompt
            );
            (session, state.cancel.clone())
        };

        let result = session.generate(prompt, params, &cancel);
        if let Err(e) = &result {
            if e.is_warning() {
                warn!(target: LOG_TAG, "{e}");
            } else {
                error!(target: LOG_TAG, "{e}");
            }
        }
        result
    }

    /// Text form of [`try_generate`](Self::try_generate) for the JNI boundary.
    ///
    /// Always returns text: the generated output, or the error's message.
    pub fn generate(&self, prompt: Option<&str>, max_tokens: i32, temperature: f64) -> String {
        match self.try_generate(prompt, GenerationParams { max_tokens, temperature }) {
            Ok(generation) => generation.text,
            Err(e) => e.to_string(),
        }
    }

    /// Cancel any generation, release the session, and clear the path.
    /// Idempotent.
    pub fn stop(&self) {
        let span = BridgeSpan::new("stop");
        let _enter = span.enter();

        self.state.lock().reset();
        info!(target: LOG_TAG, "Stopped llama bridge");
        record_stop();
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn model_path(&self) -> String {
        self.state.lock().model_path.clone()
    }

    /// Read both fields under one lock acquisition.
    pub fn snapshot(&self) -> BridgeSnapshot {
        self.state.lock().snapshot()
    }
}
