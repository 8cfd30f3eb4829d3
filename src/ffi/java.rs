// Copyright 2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! JNI exports for `com.siksha.ai.LlamaBridgeModule`.
//!
//! Kotlin declarations:
//!
//! ```kotlin
//! private external fun nativeInit(modelPath: String): Boolean
//! private external fun nativeGenerate(prompt: String, maxTokens: Int, temperature: Double): String
//! private external fun nativeStop()
//! ```

#![allow(non_snake_case)]

use std::ffi::c_void;
use std::ptr;

use jni::objects::{JObject, JString};
use jni::sys::{jboolean, jdouble, jint, jstring, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use tracing::{error, warn};

use crate::LOG_TAG;

/// Read a Java string that may be null. A non-null string that fails to
/// convert is reported as an error, not as null.
fn read_nullable_string(
    env: &mut JNIEnv<'_>,
    value: &JString<'_>,
) -> Result<Option<String>, jni::errors::Error> {
    if value.is_null() {
        return Ok(None);
    }
    match env.get_string(value) {
        Ok(s) => Ok(Some(s.into())),
        Err(e) => {
            clear_exception(env);
            Err(e)
        }
    }
}

fn clear_exception(env: &mut JNIEnv<'_>) {
    if let Err(e) = env.exception_clear() {
        warn!(target: LOG_TAG, "failed to clear pending Java exception: {e}");
    }
}

/// Hand `text` to Java, falling back to a short static message if the JVM
/// refuses the allocation. Null only if both attempts fail.
fn to_java_string(env: &mut JNIEnv<'_>, text: &str) -> jstring {
    match env.new_string(text) {
        Ok(s) => return s.into_raw(),
        Err(e) => {
            error!(target: LOG_TAG, "failed to allocate response string: {e}");
            clear_exception(env);
        }
    }
    match env.new_string(super::RESPONSE_FALLBACK) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(target: LOG_TAG, "failed to allocate fallback string: {e}");
            clear_exception(env);
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    super::init_logging_once();
    JNI_VERSION_1_6
}

/// Java signature: `boolean nativeInit(String modelPath)`
#[no_mangle]
pub extern "system" fn Java_com_siksha_ai_LlamaBridgeModule_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    model_path: JString<'local>,
) -> jboolean {
    let ok = match read_nullable_string(&mut env, &model_path) {
        Ok(path) => super::native_init(path.as_deref()),
        Err(e) => super::native_init_unreadable(&e.to_string()),
    };
    if ok {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Java signature: `String nativeGenerate(String prompt, int maxTokens, double temperature)`
#[no_mangle]
pub extern "system" fn Java_com_siksha_ai_LlamaBridgeModule_nativeGenerate<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    prompt: JString<'local>,
    max_tokens: jint,
    temperature: jdouble,
) -> jstring {
    let prompt = match read_nullable_string(&mut env, &prompt) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!(target: LOG_TAG, "prompt could not be read, using empty prompt: {e}");
            None
        }
    };
    let text = super::native_generate(prompt.as_deref(), max_tokens, temperature);
    to_java_string(&mut env, &text)
}

/// Java signature: `void nativeStop()`
#[no_mangle]
pub extern "system" fn Java_com_siksha_ai_LlamaBridgeModule_nativeStop<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    super::native_stop();
}
