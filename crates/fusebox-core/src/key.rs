//! Runner cache keys
//!
//! A key is an opaque byte string. Two shapes are produced in practice:
//! - identity keys, the native-endian bytes of a block's address
//! - name keys, the UTF-8 text of an operator's qualified symbol
//!
//! The registry never distinguishes between them.

use crate::graph::BlockId;
use std::fmt;

/// Opaque runner cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Vec<u8>);

impl CacheKey {
    /// Fixed-width key derived from a block's in-memory identity
    pub fn identity(block: BlockId) -> Self {
        Self(block.as_usize().to_ne_bytes().to_vec())
    }

    /// Key derived from an operator's qualified name
    pub fn name(qualified: &str) -> Self {
        Self(qualified.as_bytes().to_vec())
    }

    /// Key from raw bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self::name(value)
    }
}

impl From<BlockId> for CacheKey {
    fn from(value: BlockId) -> Self {
        Self::identity(value)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) if !text.is_empty() && !text.chars().any(char::is_control) => {
                f.write_str(text)
            }
            _ => {
                f.write_str("0x")?;
                for byte in &self.0 {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}
