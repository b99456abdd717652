//! fusebox FFI
//!
//! C-compatible bindings for hosts that need to inspect or evict entries of
//! the process-wide runner cache, e.g. to release a compiled subgraph before
//! its block is freed.

use std::ffi::CString;
use std::os::raw::c_char;

use fusebox_core::CacheKey;
use fusebox_runtime::{RunnerRegistry, SignalOverrides};

mod utils;

pub use utils::*;

/// Initialize the logging system
///
/// Safe to call more than once.
#[no_mangle]
pub extern "C" fn fusebox_init_logging() {
    let _ = env_logger::try_init();
}

/// Number of runners in the process-wide cache
#[no_mangle]
pub extern "C" fn fusebox_registry_size() -> libc::size_t {
    RunnerRegistry::global().size()
}

/// Whether a runner is cached under the given key bytes
///
/// # Safety
/// - key must be null or point to `len` readable bytes
#[no_mangle]
pub unsafe extern "C" fn fusebox_registry_contains(key: *const u8, len: libc::size_t) -> bool {
    match from_byte_buffer(key, len) {
        Some(bytes) => RunnerRegistry::global().contains(&CacheKey::from_bytes(bytes)),
        None => {
            log::warn!("fusebox_registry_contains called with a null key");
            false
        }
    }
}

/// Evict the runner cached under the given key bytes
///
/// Returns false when nothing was cached under the key or the key is null.
///
/// # Safety
/// - key must be null or point to `len` readable bytes
#[no_mangle]
pub unsafe extern "C" fn fusebox_registry_remove(key: *const u8, len: libc::size_t) -> bool {
    match from_byte_buffer(key, len) {
        Some(bytes) => {
            let key = CacheKey::from_bytes(bytes);
            let removed = RunnerRegistry::global().remove(&key);
            log::debug!("fusebox_registry_remove({}) -> {}", key, removed);
            removed
        }
        None => {
            log::warn!("fusebox_registry_remove called with a null key");
            false
        }
    }
}

/// Evict every cached runner, returning how many were removed
#[no_mangle]
pub extern "C" fn fusebox_registry_clear() -> libc::size_t {
    let removed = RunnerRegistry::global().clear();
    log::info!("Cleared {} cached runners", removed);
    removed
}

/// Evict a runner preloaded under an operator's qualified name
///
/// # Safety
/// - qualified_name must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn fusebox_name_key_remove(qualified_name: *const c_char) -> bool {
    match from_c_string(qualified_name) {
        Some(name) => RunnerRegistry::global().remove(&CacheKey::name(&name)),
        None => {
            log::warn!("fusebox_name_key_remove called with a null or non-UTF-8 name");
            false
        }
    }
}

/// Turn the process-wide signal handler overrides on or off
///
/// Takes effect on the next delegated execution of every context sharing
/// the process-wide switch.
#[no_mangle]
pub extern "C" fn fusebox_set_signal_handler_overrides(enabled: bool) {
    SignalOverrides::global().set_enabled(enabled);
    log::info!("Signal handler overrides {}", if enabled { "enabled" } else { "disabled" });
}

/// Whether the process-wide signal handler overrides are on
#[no_mangle]
pub extern "C" fn fusebox_signal_handler_overrides_enabled() -> bool {
    SignalOverrides::global().is_enabled()
}

/// Free a string returned by the FFI
///
/// # Safety
/// - s must be a valid pointer returned by a fusebox_* function
/// - After calling this function, the pointer is invalid and must not be used
#[no_mangle]
pub unsafe extern "C" fn fusebox_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the version of the fusebox library
///
/// # Safety
/// - The returned string must be freed with fusebox_string_free
#[no_mangle]
pub extern "C" fn fusebox_version() -> *mut c_char {
    to_c_string(env!("CARGO_PKG_VERSION"))
}
