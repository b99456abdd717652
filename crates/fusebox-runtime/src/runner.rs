//! Compiled runner collaborator traits
//!
//! The graph compiler behind a cached runner is external. Only its
//! construction signature and its two entry points matter here.

use crate::error::Result;
use fusebox_core::{ExecutionSettings, Stack, Subgraph};
use std::sync::Arc;

/// Compiled execution handle for one subgraph
pub trait CompiledRunner: Send + Sync {
    /// Compile on demand if needed, then execute
    fn run(&self, stack: &mut Stack) -> Result<()>;

    /// Execute a runner that was compiled ahead of time
    fn run_only(&self, stack: &mut Stack) -> Result<()>;

    /// Settings snapshot the runner was built with
    fn settings(&self) -> &ExecutionSettings;
}

/// Opaque device/backend manager handed to every runner
pub trait HostManager: Send + Sync {
    fn name(&self) -> &str;
}

/// Named host manager with no backing devices
#[derive(Debug, Clone)]
pub struct LocalHostManager {
    name: String,
}

impl LocalHostManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LocalHostManager {
    fn default() -> Self {
        Self::new("host")
    }
}

impl HostManager for LocalHostManager {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Builds a compiled runner for a subgraph
pub trait RunnerFactory: Send + Sync {
    fn build(
        &self,
        subgraph: Arc<Subgraph>,
        host: Arc<dyn HostManager>,
        backend_name: &str,
        settings: ExecutionSettings,
    ) -> Result<Arc<dyn CompiledRunner>>;
}

impl<F> RunnerFactory for F
where
    F: Fn(
            Arc<Subgraph>,
            Arc<dyn HostManager>,
            &str,
            ExecutionSettings,
        ) -> Result<Arc<dyn CompiledRunner>>
        + Send
        + Sync,
{
    fn build(
        &self,
        subgraph: Arc<Subgraph>,
        host: Arc<dyn HostManager>,
        backend_name: &str,
        settings: ExecutionSettings,
    ) -> Result<Arc<dyn CompiledRunner>> {
        self(subgraph, host, backend_name, settings)
    }
}
