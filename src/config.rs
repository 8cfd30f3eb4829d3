//! Bridge configuration loading from environment variables.
//!
//! All values come from `LLAMA_BRIDGE_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing, since a
//! panic here would abort inside `JNI_OnLoad`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `LLAMA_BRIDGE_LOG` | info | tracing filter directive |
//! | `LLAMA_BRIDGE_LOG_FORMAT` | pretty | `json` or `pretty` |
//! | `LLAMA_BRIDGE_LOG_FILE` | unset | Write logs to this file instead of stderr |
//! | `LLAMA_BRIDGE_N_CTX` | 2048 | GGUF context window size |
//! | `LLAMA_BRIDGE_N_THREADS` | 0 | Inference threads (0 = auto) |
//! | `LLAMA_BRIDGE_N_GPU_LAYERS` | 0 | Layers offloaded to the GPU |
//! | `LLAMA_BRIDGE_DEFAULT_MAX_TOKENS` | 120 | Budget when the caller passes <= 0 |

use std::path::PathBuf;

use crate::telemetry::{LogConfig, LogFormat};

/// GGUF-specific configuration loaded from env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GgufEnvConfig {
    pub n_ctx: u32,
    pub n_threads: u32,
    pub n_gpu_layers: u32,
    pub default_max_tokens: u32,
}

impl Default for GgufEnvConfig {
    fn default() -> Self {
        Self { n_ctx: 2048, n_threads: 0, n_gpu_layers: 0, default_max_tokens: 120 }
    }
}

/// All bridge configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log: LogConfig,
    pub gguf: GgufEnvConfig,
}

/// Parse a `u32` env var, returning `default` on missing or invalid.
fn parse_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}

fn load_log_config() -> LogConfig {
    let level = std::env::var("LLAMA_BRIDGE_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let format = match std::env::var("LLAMA_BRIDGE_LOG_FORMAT") {
        Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    let output_path = std::env::var_os("LLAMA_BRIDGE_LOG_FILE")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    LogConfig { format, level, output_path }
}

fn load_gguf_config() -> GgufEnvConfig {
    let n_ctx = parse_u32("LLAMA_BRIDGE_N_CTX", 2048).max(128); // floor: 128 tokens
    let n_threads = parse_u32("LLAMA_BRIDGE_N_THREADS", 0);
    let n_gpu_layers = parse_u32("LLAMA_BRIDGE_N_GPU_LAYERS", 0);
    let default_max_tokens = parse_u32("LLAMA_BRIDGE_DEFAULT_MAX_TOKENS", 120).max(1);
    GgufEnvConfig { n_ctx, n_threads, n_gpu_layers, default_max_tokens }
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    EnvConfig { log: load_log_config(), gguf: load_gguf_config() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "LLAMA_BRIDGE_LOG",
        "LLAMA_BRIDGE_LOG_FORMAT",
        "LLAMA_BRIDGE_LOG_FILE",
        "LLAMA_BRIDGE_N_CTX",
        "LLAMA_BRIDGE_N_THREADS",
        "LLAMA_BRIDGE_N_GPU_LAYERS",
        "LLAMA_BRIDGE_DEFAULT_MAX_TOKENS",
    ];

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert!(cfg.log.output_path.is_none());
        assert_eq!(cfg.gguf, GgufEnvConfig::default());
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("LLAMA_BRIDGE_LOG", "llamabridge=debug");
        std::env::set_var("LLAMA_BRIDGE_LOG_FORMAT", "JSON");
        std::env::set_var("LLAMA_BRIDGE_LOG_FILE", "/data/local/tmp/bridge.log");
        std::env::set_var("LLAMA_BRIDGE_N_CTX", "4096");
        std::env::set_var("LLAMA_BRIDGE_N_THREADS", "4");
        std::env::set_var("LLAMA_BRIDGE_N_GPU_LAYERS", "12");
        let cfg = load();
        assert_eq!(cfg.log.level, "llamabridge=debug");
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.output_path, Some(PathBuf::from("/data/local/tmp/bridge.log")));
        assert_eq!(cfg.gguf.n_ctx, 4096);
        assert_eq!(cfg.gguf.n_threads, 4);
        assert_eq!(cfg.gguf.n_gpu_layers, 12);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("LLAMA_BRIDGE_N_CTX", "lots");
        std::env::set_var("LLAMA_BRIDGE_DEFAULT_MAX_TOKENS", "-3");
        std::env::set_var("LLAMA_BRIDGE_LOG_FORMAT", "yaml");
        std::env::set_var("LLAMA_BRIDGE_LOG", "   ");
        let cfg = load();
        assert_eq!(cfg.gguf.n_ctx, 2048);
        assert_eq!(cfg.gguf.default_max_tokens, 120);
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.log.level, "info");
        clear_env_vars();
    }

    #[test]
    fn test_floors_are_applied() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("LLAMA_BRIDGE_N_CTX", "16");
        std::env::set_var("LLAMA_BRIDGE_DEFAULT_MAX_TOKENS", "0");
        let cfg = load();
        assert_eq!(cfg.gguf.n_ctx, 128);
        assert_eq!(cfg.gguf.default_max_tokens, 1);
        clear_env_vars();
    }
}
