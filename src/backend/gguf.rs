//! llama-cpp-2 backend for GGUF models.
//!
//! Model loading, context creation, and token generation via the llama-cpp-2
//! Rust bindings. Enabled with `--features gguf`.

use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::token::LlamaToken;
use tokio_util::sync::CancellationToken;

use super::{Generation, GenerationParams, GenerationSession, InferenceBackend};
use crate::config::GgufEnvConfig;
use crate::error::{BridgeError, LoadFailure};

/// GGUF loading and sampling configuration.
#[derive(Debug, Clone)]
pub struct GgufConfig {
    pub n_ctx: u32,
    /// Inference threads, 0 = auto.
    pub n_threads: u32,
    pub n_gpu_layers: u32,
    /// Budget used when the caller passes a non-positive `max_tokens`.
    pub default_max_tokens: u32,
}

impl Default for GgufConfig {
    fn default() -> Self {
        Self { n_ctx: 2048, n_threads: 0, n_gpu_layers: 0, default_max_tokens: 120 }
    }
}

impl From<&GgufEnvConfig> for GgufConfig {
    fn from(env: &GgufEnvConfig) -> Self {
        Self {
            n_ctx: env.n_ctx,
            n_threads: env.n_threads,
            n_gpu_layers: env.n_gpu_layers,
            default_max_tokens: env.default_max_tokens,
        }
    }
}

/// Loads GGUF files through llama.cpp. The llama backend is initialized once
/// per `LlamaCppBackend` and shared by every session it loads.
pub struct LlamaCppBackend {
    backend: Arc<LlamaBackend>,
    config: GgufConfig,
}

impl LlamaCppBackend {
    pub fn new(config: GgufConfig) -> Result<Self, BridgeError> {
        let backend = LlamaBackend::init()
            .map_err(|e| LoadFailure::Backend(format!("backend init: {e}")))?;
        Ok(Self { backend: Arc::new(backend), config })
    }
}

impl InferenceBackend for LlamaCppBackend {
    type Session = LlamaCppSession;

    fn load(&self, model_path: &Path) -> Result<Self::Session, BridgeError> {
        if !model_path.is_file() {
            return Err(LoadFailure::NotFound(model_path.to_path_buf()).into());
        }
        let model_params = LlamaModelParams::default().with_n_gpu_layers(self.config.n_gpu_layers);
        let model = LlamaModel::load_from_file(&self.backend, model_path, &model_params)
            .map_err(|e| classify_load_error(e.to_string()))?;
        Ok(LlamaCppSession {
            backend: Arc::clone(&self.backend),
            model,
            n_ctx: self.config.n_ctx,
            n_threads: resolve_threads(self.config.n_threads),
            default_max_tokens: self.config.default_max_tokens,
        })
    }
}

/// A loaded GGUF model. Dropping it frees the model weights.
pub struct LlamaCppSession {
    backend: Arc<LlamaBackend>,
    model: LlamaModel,
    n_ctx: u32,
    n_threads: i32,
    default_max_tokens: u32,
}

// SAFETY: LlamaModel and LlamaBackend are Send+Sync in llama-cpp-2; each
// generation creates its own LlamaContext.
unsafe impl Send for LlamaCppSession {}
unsafe impl Sync for LlamaCppSession {}

impl GenerationSession for LlamaCppSession {
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        cancel: &CancellationToken,
    ) -> Result<Generation, BridgeError> {
        let tokens = self.tokenize(prompt)?;
        let requested = requested_tokens(params.max_tokens, self.default_max_tokens);
        let max_tok = token_budget(requested, tokens.len(), self.n_ctx)?;
        let mut ctx = self.create_context()?;
        let out = self.sample_loop(&mut ctx, &tokens, max_tok, params, cancel)?;
        let text = self.detokenize(&out)?;
        let tokens_generated = u32::try_from(out.len()).unwrap_or(u32::MAX);
        Ok(Generation { text, tokens_generated })
    }
}

impl LlamaCppSession {
    fn tokenize(&self, text: &str) -> Result<Vec<LlamaToken>, BridgeError> {
        self.model
            .str_to_token(text, AddBos::Always)
            .map_err(|e| BridgeError::Generation(format!("tokenize: {e}")))
    }

    fn detokenize(&self, tokens: &[LlamaToken]) -> Result<String, BridgeError> {
        let mut dec = encoding_rs::UTF_8.new_decoder();
        let mut out = String::new();
        for &t in tokens {
            let piece = self
                .model
                .token_to_piece(t, &mut dec, false, None)
                .map_err(|e| BridgeError::Generation(format!("detok: {e}")))?;
            out.push_str(&piece);
        }
        Ok(out)
    }

    fn create_context(&self) -> Result<LlamaContext<'_>, BridgeError> {
        let p = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(self.n_ctx))
            .with_n_threads(self.n_threads)
            .with_n_threads_batch(self.n_threads);
        self.model
            .new_context(&self.backend, p)
            .map_err(|e| BridgeError::Generation(format!("ctx: {e}")))
    }

    fn sample_loop(
        &self,
        ctx: &mut LlamaContext<'_>,
        tokens: &[LlamaToken],
        max_tok: u32,
        params: &GenerationParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<LlamaToken>, BridgeError> {
        let mut batch = LlamaBatch::new(tokens.len().max(1), 1);
        add_seq(&mut batch, tokens)?;
        decode(ctx, &mut batch)?;
        let mut sampler = build_sampler(params);
        sampler.accept_many(tokens.iter().copied());
        let mut out = Vec::new();
        let mut pos = tokens.len() as i32;
        for _ in 0..max_tok {
            if cancel.is_cancelled() {
                return Err(BridgeError::Cancelled);
            }
            // -1 samples from the last token that had logits computed
            let tok = sampler.sample(ctx, -1);
            sampler.accept(tok);
            if self.model.is_eog_token(tok) {
                break;
            }
            out.push(tok);
            batch.clear();
            add_one(&mut batch, tok, pos)?;
            decode(ctx, &mut batch)?;
            pos += 1;
        }
        Ok(out)
    }
}

fn add_seq(batch: &mut LlamaBatch, tokens: &[LlamaToken]) -> Result<(), BridgeError> {
    let n = tokens.len();
    for (i, &tok) in tokens.iter().enumerate() {
        // Only the last prompt token needs logits
        batch
            .add(tok, i as i32, &[0], i == n - 1)
            .map_err(|e| BridgeError::Generation(format!("batch: {e}")))?;
    }
    Ok(())
}

fn add_one(batch: &mut LlamaBatch, tok: LlamaToken, pos: i32) -> Result<(), BridgeError> {
    batch
        .add(tok, pos, &[0], true)
        .map_err(|e| BridgeError::Generation(format!("batch: {e}")))
}

fn decode(ctx: &mut LlamaContext<'_>, batch: &mut LlamaBatch) -> Result<(), BridgeError> {
    ctx.decode(batch)
        .map_err(|e| BridgeError::Generation(format!("decode: {e}")))
}

/// Caller's budget, or `default` when it is zero or negative.
fn requested_tokens(max_tokens: i32, default: u32) -> u32 {
    u32::try_from(max_tokens)
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Clamp `requested` to the context space left after the prompt.
fn token_budget(requested: u32, prompt_len: usize, n_ctx: u32) -> Result<u32, BridgeError> {
    let prompt_len = u32::try_from(prompt_len).unwrap_or(u32::MAX);
    if prompt_len >= n_ctx {
        return Err(BridgeError::Generation(format!(
            "prompt is {prompt_len} tokens, context holds {n_ctx}"
        )));
    }
    Ok(requested.min(n_ctx - prompt_len))
}

fn build_sampler(params: &GenerationParams) -> LlamaSampler {
    let temperature = params.temperature as f32;
    if temperature <= 0.0 {
        return LlamaSampler::greedy();
    }
    LlamaSampler::chain_simple([
        LlamaSampler::top_k(40),
        LlamaSampler::top_p(0.9, 1),
        LlamaSampler::temp(temperature),
        LlamaSampler::dist(42),
    ])
}

/// Map a llama.cpp load error message onto the failure kinds callers can act on.
fn classify_load_error(message: String) -> BridgeError {
    let lower = message.to_ascii_lowercase();
    let failure = if lower.contains("memory") || lower.contains("alloc") {
        LoadFailure::OutOfMemory(message)
    } else if lower.contains("magic") || lower.contains("gguf") || lower.contains("format") {
        LoadFailure::InvalidFormat(message)
    } else {
        LoadFailure::Backend(message)
    };
    failure.into()
}

fn resolve_threads(n: u32) -> i32 {
    if n == 0 {
        // Phones throttle hard past the big cores; cap at 8
        let logical = num_cpus::get();
        i32::try_from(logical.clamp(1, 8)).unwrap_or(4)
    } else {
        i32::try_from(n).unwrap_or(4)
    }
}
