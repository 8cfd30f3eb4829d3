//! Tests for the process-wide bridge behind the JNI entry points.
//!
//! These share one global instance, so every test holds `GLOBAL_LOCK` and
//! starts from a stopped bridge.

#![cfg(not(feature = "gguf"))]

use std::sync::{Mutex, MutexGuard};
use std::thread;

use llamabridge::ffi::{global_bridge, native_generate, native_init, native_stop};
use llamabridge::{NOT_INITIALIZED_MESSAGE, PLACEHOLDER_RESPONSE};

static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

fn fresh() -> MutexGuard<'static, ()> {
    let guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    native_stop();
    guard
}

#[test]
fn global_bridge_is_available_with_placeholder_backend() {
    let _g = fresh();
    assert!(global_bridge().is_ok());
}

#[test]
fn init_generate_stop_round() {
    let _g = fresh();
    assert_eq!(native_generate(Some("hello"), 120, 0.7), NOT_INITIALIZED_MESSAGE);
    assert!(native_init(Some("/data/user/0/com.siksha.ai/files/model.gguf")));
    assert_eq!(native_generate(Some("hello"), 120, 0.7), PLACEHOLDER_RESPONSE);
    native_stop();
    assert_eq!(native_generate(Some("hello"), 120, 0.7), NOT_INITIALIZED_MESSAGE);
}

#[test]
fn null_inputs_do_not_fail_hard() {
    let _g = fresh();
    assert!(!native_init(None));
    assert_eq!(native_generate(None, 0, 0.0), NOT_INITIALIZED_MESSAGE);
    assert!(native_init(Some("/m.gguf")));
    assert_eq!(native_generate(None, 0, 0.0), PLACEHOLDER_RESPONSE);
}

#[test]
fn empty_path_is_rejected() {
    let _g = fresh();
    assert!(!native_init(Some("")));
    let snap = global_bridge().unwrap().snapshot();
    assert!(!snap.initialized);
    assert!(snap.model_path.is_empty());
}

#[test]
fn stop_is_idempotent_across_calls() {
    let _g = fresh();
    native_stop();
    native_stop();
    assert!(!global_bridge().unwrap().is_initialized());
}

#[test]
fn entry_points_are_callable_from_many_threads() {
    let _g = fresh();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            thread::spawn(move || {
                for _ in 0..100 {
                    native_init(Some(&format!("/models/{t}.gguf")));
                    let out = native_generate(Some("x"), 8, 0.5);
                    assert!(!out.is_empty());
                    native_stop();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert!(global_bridge().unwrap().snapshot().is_consistent());
}
