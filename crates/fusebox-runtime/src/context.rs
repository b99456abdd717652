//! Shim context
//!
//! The process-scoped service everything else hangs off: the runner registry,
//! the factory that builds runners, the host manager and backend name handed
//! to that factory, the active execution settings and the signal override
//! switch. Tests build isolated contexts with their own registry; production
//! code normally shares [`RunnerRegistry::global`].

use crate::error::Result;
use crate::registry::RunnerRegistry;
use crate::runner::{CompiledRunner, HostManager, LocalHostManager, RunnerFactory};
use crate::signals::SignalOverrides;
use fusebox_core::{CacheKey, ExecutionSettings, Subgraph, Symbol};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Backend used when none is configured
pub const DEFAULT_BACKEND_NAME: &str = "Interpreter";

/// Process-scoped state for delegated execution
pub struct ShimContext {
    registry: Arc<RunnerRegistry>,
    factory: Arc<dyn RunnerFactory>,
    host_manager: Arc<dyn HostManager>,
    backend_name: String,
    settings: RwLock<ExecutionSettings>,
    signal_overrides: Arc<SignalOverrides>,
}

impl ShimContext {
    /// Start building a context around a runner factory
    pub fn builder(factory: Arc<dyn RunnerFactory>) -> ShimContextBuilder {
        ShimContextBuilder::new(factory)
    }

    pub fn registry(&self) -> &Arc<RunnerRegistry> {
        &self.registry
    }

    pub fn host_manager(&self) -> Arc<dyn HostManager> {
        Arc::clone(&self.host_manager)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Snapshot of the active settings
    pub fn settings(&self) -> ExecutionSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active settings
    ///
    /// Runners already built keep the snapshot they were built with; the
    /// signal override switch follows the new settings immediately.
    pub fn update_settings(&self, settings: ExecutionSettings) {
        self.signal_overrides
            .set_enabled(settings.enable_signal_handler_overrides);
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn signal_overrides(&self) -> &Arc<SignalOverrides> {
        &self.signal_overrides
    }

    /// Build a runner for `subgraph` from the current settings snapshot
    pub fn build_runner(&self, subgraph: Arc<Subgraph>) -> Result<Arc<dyn CompiledRunner>> {
        self.factory.build(
            subgraph,
            self.host_manager(),
            &self.backend_name,
            self.settings(),
        )
    }

    /// Register a runner ahead of time under an operator's name key
    ///
    /// Any fusion node of kind `symbol` whose subgraph has no runner of its
    /// own will use this one.
    pub fn preload_runner<F>(&self, symbol: &Symbol, builder: F) -> Result<Arc<dyn CompiledRunner>>
    where
        F: FnOnce() -> Result<Arc<dyn CompiledRunner>>,
    {
        let key = CacheKey::name(&symbol.to_qual_string());
        info!(symbol = %symbol, "preloading runner");
        self.registry.get_or_insert(key, builder)
    }

    /// Preload by compiling a representative subgraph
    pub fn preload_subgraph(
        &self,
        symbol: &Symbol,
        subgraph: Arc<Subgraph>,
    ) -> Result<Arc<dyn CompiledRunner>> {
        self.preload_runner(symbol, || self.build_runner(subgraph))
    }
}

impl std::fmt::Debug for ShimContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShimContext")
            .field("registry", &self.registry)
            .field("host_manager", &self.host_manager.name())
            .field("backend_name", &self.backend_name)
            .field("settings", &self.settings())
            .finish()
    }
}

/// Builder for [`ShimContext`]
pub struct ShimContextBuilder {
    factory: Arc<dyn RunnerFactory>,
    registry: Option<Arc<RunnerRegistry>>,
    host_manager: Option<Arc<dyn HostManager>>,
    backend_name: String,
    settings: ExecutionSettings,
    signal_overrides: Option<Arc<SignalOverrides>>,
}

impl ShimContextBuilder {
    pub fn new(factory: Arc<dyn RunnerFactory>) -> Self {
        Self {
            factory,
            registry: None,
            host_manager: None,
            backend_name: DEFAULT_BACKEND_NAME.to_string(),
            settings: ExecutionSettings::default(),
            signal_overrides: None,
        }
    }

    /// Use a specific registry instead of the process-wide one
    pub fn with_registry(mut self, registry: Arc<RunnerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_host_manager(mut self, host_manager: Arc<dyn HostManager>) -> Self {
        self.host_manager = Some(host_manager);
        self
    }

    pub fn with_backend_name(mut self, backend_name: impl Into<String>) -> Self {
        self.backend_name = backend_name.into();
        self
    }

    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a private override switch instead of the process-wide one
    pub fn with_signal_overrides(mut self, signal_overrides: Arc<SignalOverrides>) -> Self {
        self.signal_overrides = Some(signal_overrides);
        self
    }

    /// Build the context
    ///
    /// The override switch (process-wide unless replaced) is set from the
    /// settings' `enable_signal_handler_overrides`.
    pub fn build(self) -> ShimContext {
        let signal_overrides = self
            .signal_overrides
            .unwrap_or_else(SignalOverrides::global);
        signal_overrides.set_enabled(self.settings.enable_signal_handler_overrides);
        ShimContext {
            registry: self.registry.unwrap_or_else(RunnerRegistry::global),
            factory: self.factory,
            host_manager: self
                .host_manager
                .unwrap_or_else(|| Arc::new(LocalHostManager::default())),
            backend_name: self.backend_name,
            settings: RwLock::new(self.settings),
            signal_overrides,
        }
    }
}
