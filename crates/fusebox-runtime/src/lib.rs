//! fusebox runtime - compiled runner cache and delegated execution
//!
//! This crate holds the keyed cache of compiled runners, the three-tier key
//! resolution used to find or build a runner for a fused subgraph, and the
//! wrapper that executes a runner on behalf of the host runtime.

pub mod context;
pub mod error;
pub mod interceptor;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod signals;

// Re-export main types
pub use context::{ShimContext, ShimContextBuilder, DEFAULT_BACKEND_NAME};
pub use error::{Result, RuntimeError};
pub use interceptor::{delegated_operation_for, DelegatedOperation};
pub use registry::RunnerRegistry;
pub use resolver::resolve_runner;
pub use runner::{CompiledRunner, HostManager, LocalHostManager, RunnerFactory};
pub use signals::{SignalOverrideGuard, SignalOverrides};
