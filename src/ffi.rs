//! FFI bindings for Inkflux
//!
//! This module provides C-compatible functions for calling Inkflux from other
//! languages. Strings are null-terminated; returned strings are allocated here
//! and must be freed by the caller using `inkflux_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::slice;

use crate::preprocess::ImageNormalizer;
use crate::strokes::{
    analyze_session_json, PointerEvent, RecorderConfig, StrokeRecorder,
    DEFAULT_FATIGUE_THRESHOLD_PCT,
};
use crate::types::{PointerKind, Profile};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// NULL and "auto" select the profile automatically
fn parse_profile(profile: Option<String>) -> Result<Option<Profile>, String> {
    match profile.as_deref().map(str::trim) {
        None | Some("") | Some("auto") => Ok(None),
        Some(name) => name.parse::<Profile>().map(Some).map_err(|e| e.to_string()),
    }
}

fn threshold_or_default(threshold_percent: f64) -> f64 {
    if threshold_percent.is_finite() && threshold_percent > 0.0 {
        threshold_percent
    } else {
        DEFAULT_FATIGUE_THRESHOLD_PCT
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Normalize an encoded drawing and return the result as JSON
/// (`{"tensor": [...784 values], "profile": "...", "stats": {...}}`).
///
/// # Safety
/// - `bytes` must point to `len` readable bytes.
/// - `profile` must be NULL or a valid null-terminated C string
///   (`"auto"`, `"standard"`, `"enhanced"`).
/// - Returns a newly allocated string that must be freed with `inkflux_free_string`.
/// - Returns NULL on error; call `inkflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn inkflux_normalize(
    bytes: *const u8,
    len: usize,
    profile: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if bytes.is_null() || len == 0 {
        set_last_error("Invalid image buffer");
        return ptr::null_mut();
    }
    let data = slice::from_raw_parts(bytes, len);

    let profile = match parse_profile(cstr_to_string(profile)) {
        Ok(p) => p,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let output = match ImageNormalizer::new().normalize_bytes(data, profile) {
        Ok(output) => output,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&output) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Analyze recorded stroke samples and return a `SessionAnalysis` as JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `threshold_percent` <= 0 selects the default fatigue threshold.
/// - Returns a newly allocated string that must be freed with `inkflux_free_string`.
/// - Returns NULL on error; call `inkflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn inkflux_analyze_strokes(
    json: *const c_char,
    threshold_percent: f64,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match analyze_session_json(&json_str, threshold_or_default(threshold_percent)) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Recorder API
// ============================================================================

/// Opaque handle to a StrokeRecorder
pub struct InkfluxRecorderHandle {
    recorder: StrokeRecorder,
}

/// Pointer kind codes accepted by `inkflux_recorder_record`
pub const INKFLUX_POINTER_PEN: i32 = 0;
pub const INKFLUX_POINTER_TOUCH: i32 = 1;
pub const INKFLUX_POINTER_MOUSE: i32 = 2;

/// Create a stroke recorder.
///
/// # Safety
/// - `min_interval_ms` < 0 selects the default throttle.
/// - Must be freed with `inkflux_recorder_free`.
#[no_mangle]
pub unsafe extern "C" fn inkflux_recorder_new(
    min_interval_ms: i64,
    accept_mouse: bool,
) -> *mut InkfluxRecorderHandle {
    clear_last_error();

    let mut config = RecorderConfig {
        accept_mouse,
        ..RecorderConfig::default()
    };
    if min_interval_ms >= 0 {
        config.min_interval_ms = min_interval_ms;
    }

    let handle = Box::new(InkfluxRecorderHandle {
        recorder: StrokeRecorder::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a recorder.
///
/// # Safety
/// - `recorder` must be a valid pointer returned by `inkflux_recorder_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn inkflux_recorder_free(recorder: *mut InkfluxRecorderHandle) {
    if !recorder.is_null() {
        drop(Box::from_raw(recorder));
    }
}

/// Start a stroke. Returns 0 on success, -1 on a NULL handle.
///
/// # Safety
/// - `recorder` must be a valid pointer returned by `inkflux_recorder_new`.
#[no_mangle]
pub unsafe extern "C" fn inkflux_recorder_pen_down(recorder: *mut InkfluxRecorderHandle) -> i32 {
    clear_last_error();
    match recorder.as_mut() {
        Some(handle) => {
            handle.recorder.pen_down();
            0
        }
        None => {
            set_last_error("Null recorder pointer");
            -1
        }
    }
}

/// Finish the current stroke. Returns 0 on success, -1 on a NULL handle.
///
/// # Safety
/// - `recorder` must be a valid pointer returned by `inkflux_recorder_new`.
#[no_mangle]
pub unsafe extern "C" fn inkflux_recorder_pen_up(recorder: *mut InkfluxRecorderHandle) -> i32 {
    clear_last_error();
    match recorder.as_mut() {
        Some(handle) => {
            handle.recorder.pen_up();
            0
        }
        None => {
            set_last_error("Null recorder pointer");
            -1
        }
    }
}

/// Record a pointer event.
///
/// A negative `pressure` means the device reported none. Returns 1 when the
/// event was recorded, 0 when it was dropped, -1 on error.
///
/// # Safety
/// - `recorder` must be a valid pointer returned by `inkflux_recorder_new`.
#[no_mangle]
pub unsafe extern "C" fn inkflux_recorder_record(
    recorder: *mut InkfluxRecorderHandle,
    x: f64,
    y: f64,
    timestamp_ms: i64,
    pressure: f64,
    pointer_kind: i32,
) -> i32 {
    clear_last_error();

    let handle = match recorder.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null recorder pointer");
            return -1;
        }
    };

    let kind = match pointer_kind {
        INKFLUX_POINTER_PEN => PointerKind::Pen,
        INKFLUX_POINTER_TOUCH => PointerKind::Touch,
        INKFLUX_POINTER_MOUSE => PointerKind::Mouse,
        other => {
            set_last_error(&format!("Unknown pointer kind: {}", other));
            return -1;
        }
    };

    let event = PointerEvent {
        x,
        y,
        timestamp: timestamp_ms,
        pressure: (pressure >= 0.0).then_some(pressure),
        kind,
    };
    i32::from(handle.recorder.record(event))
}

/// Close the open stroke and return every recorded sample as a JSON array.
/// The recorder is emptied.
///
/// # Safety
/// - `recorder` must be a valid pointer returned by `inkflux_recorder_new`.
/// - Returns a newly allocated string that must be freed with `inkflux_free_string`.
#[no_mangle]
pub unsafe extern "C" fn inkflux_recorder_finish(
    recorder: *mut InkfluxRecorderHandle,
) -> *mut c_char {
    clear_last_error();

    let handle = match recorder.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null recorder pointer");
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&handle.recorder.finish()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Inkflux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an Inkflux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn inkflux_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Inkflux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn inkflux_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the Inkflux library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn inkflux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
