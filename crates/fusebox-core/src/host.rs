//! Host runtime boundary
//!
//! The host requires exceptions, not value-carrying errors, at its call
//! boundary. `HostException` is the single error type allowed to cross it.

use crate::stack::Stack;
use std::fmt;
use std::sync::Arc;

/// Exception class surfaced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExceptionKind {
    /// A delegated execution failed
    InvalidArgument,
    /// The operation could not be prepared
    Runtime,
}

impl fmt::Display for HostExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostExceptionKind::InvalidArgument => f.write_str("invalid_argument"),
            HostExceptionKind::Runtime => f.write_str("runtime_error"),
        }
    }
}

/// Exception raised into the host runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostException {
    kind: HostExceptionKind,
    message: String,
}

impl HostException {
    pub fn new(kind: HostExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(HostExceptionKind::InvalidArgument, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(HostExceptionKind::Runtime, message)
    }

    pub fn kind(&self) -> HostExceptionKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostException {}

/// Callable installed as an operator implementation in the host runtime
pub type Operation = Arc<dyn Fn(&mut Stack) -> Result<(), HostException> + Send + Sync>;
