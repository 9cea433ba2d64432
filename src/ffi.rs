//! FFI bindings for LikeLines
//!
//! This module provides C-compatible functions for calling LikeLines from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `likelines_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalysisConfig;
use crate::pipeline::{aggregate_to_heatmap, aggregate_to_keyframes, LikeLinesProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a pipeline result to C: the string on success, NULL plus last error otherwise
fn into_c_result(result: Result<String, crate::ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a heat-map from an aggregate JSON record.
///
/// Returns a JSON array of `size` values in [0, 1].
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `likelines_free_string`.
/// - Returns NULL on error; call `likelines_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn likelines_heatmap(json: *const c_char, size: u32) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    into_c_result(aggregate_to_heatmap(json_str, size as usize))
}

/// Compute the top-N keyframe timecodes from an aggregate JSON record.
///
/// Returns a JSON array of at most `n` timecodes; `n <= 0` yields `[]`.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `likelines_free_string`.
/// - Returns NULL on error; call `likelines_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn likelines_keyframes(json: *const c_char, n: i64) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    into_c_result(aggregate_to_keyframes(json_str, n))
}

/// Compute a full interest report with default settings.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `video_id` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `likelines_free_string`.
/// - Returns NULL on error; call `likelines_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn likelines_report(
    json: *const c_char,
    n: u32,
    video_id: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let processor = LikeLinesProcessor::new();
    into_c_result(processor.report(&json_str, n as usize, cstr_to_string(video_id)))
}

// ============================================================================
// Configured Processor API
// ============================================================================

/// Opaque handle to a LikeLinesProcessor
pub struct LikeLinesProcessorHandle {
    processor: LikeLinesProcessor,
}

/// Create a processor from an `AnalysisConfig` JSON document.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string, or NULL for defaults.
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `likelines_processor_free`.
/// - Returns NULL on error; call `likelines_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn likelines_processor_new(
    config_json: *const c_char,
) -> *mut LikeLinesProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        AnalysisConfig::default()
    } else {
        let parsed = cstr_to_string(config_json)
            .ok_or_else(|| "Invalid config string pointer".to_string())
            .and_then(|s| AnalysisConfig::from_json(&s).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(msg) => {
                set_last_error(&msg);
                return ptr::null_mut();
            }
        }
    };

    match LikeLinesProcessor::with_config(config) {
        Ok(processor) => Box::into_raw(Box::new(LikeLinesProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `likelines_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn likelines_processor_free(processor: *mut LikeLinesProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Compute an interest report with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `likelines_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - `video_id` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `likelines_free_string`.
/// - Returns NULL on error; call `likelines_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn likelines_processor_report(
    processor: *const LikeLinesProcessorHandle,
    json: *const c_char,
    n: u32,
    video_id: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    into_c_result(
        handle
            .processor
            .report(&json_str, n as usize, cstr_to_string(video_id)),
    )
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by LikeLines functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a LikeLines function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn likelines_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next LikeLines function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn likelines_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the LikeLines library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn likelines_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
