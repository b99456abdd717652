//! FFI utility functions

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Helper to convert Rust string to C string
pub fn to_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Helper to convert C string to Rust string
///
/// # Safety
/// - `s` must be null or a valid null-terminated C string
pub unsafe fn from_c_string(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok().map(|s| s.to_owned())
}

/// Helper to copy a caller-owned byte buffer
///
/// # Safety
/// - `data` must be null or point to `len` readable bytes
pub unsafe fn from_byte_buffer(data: *const u8, len: usize) -> Option<Vec<u8>> {
    if data.is_null() {
        return None;
    }
    Some(std::slice::from_raw_parts(data, len).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_string_round_trip() {
        let raw = to_c_string("fusebox::FusionGroup");
        let back = unsafe { from_c_string(raw) };
        assert_eq!(back.as_deref(), Some("fusebox::FusionGroup"));
        unsafe { drop(CString::from_raw(raw)) };
    }

    #[test]
    fn test_interior_nul_yields_null() {
        assert!(to_c_string("a\0b").is_null());
    }

    #[test]
    fn test_null_inputs() {
        unsafe {
            assert!(from_c_string(std::ptr::null()).is_none());
            assert!(from_byte_buffer(std::ptr::null(), 4).is_none());
        }
    }

    #[test]
    fn test_byte_buffer_copied() {
        let bytes = [1u8, 2, 3];
        let copied = unsafe { from_byte_buffer(bytes.as_ptr(), bytes.len()) };
        assert_eq!(copied, Some(vec![1, 2, 3]));
    }
}
