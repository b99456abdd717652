//! Builder pattern for installing the shim into a host

use crate::config::ShimConfig;
use crate::error::Result;
use crate::fuser::{GraphFuser, KindSetFuser};
use crate::operators::{register_delegated_op, OperatorRegistry};
use crate::passes::{register_fusion_pass, PassRegistry};
use fusebox_core::{ExecutionSettings, Symbol};
use fusebox_runtime::{HostManager, RunnerFactory, RunnerRegistry, ShimContext, SignalOverrides};
use std::sync::Arc;
use tracing::info;

type PassGate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Builder that wires a runner factory into a host's operator and pass tables
///
/// # Example
///
/// ```rust,ignore
/// use fusebox_sdk::{OperatorRegistry, PassRegistry, ShimBuilder, ShimConfig};
///
/// let operators = OperatorRegistry::new();
/// let passes = PassRegistry::new();
/// let ctx = ShimBuilder::new(factory)
///     .with_config(ShimConfig::load()?)
///     .with_supported_kinds([Symbol::new("aten", "add"), Symbol::new("aten", "relu")])
///     .install(&operators, &passes)?;
/// ```
pub struct ShimBuilder {
    factory: Arc<dyn RunnerFactory>,
    config: ShimConfig,
    registry: Option<Arc<RunnerRegistry>>,
    host_manager: Option<Arc<dyn HostManager>>,
    signal_overrides: Option<Arc<SignalOverrides>>,
    fuser: Option<Arc<dyn GraphFuser>>,
    supported_kinds: Vec<Symbol>,
    pass_gate: Option<PassGate>,
}

impl ShimBuilder {
    /// Create a new builder around the factory that compiles subgraphs
    pub fn new(factory: Arc<dyn RunnerFactory>) -> Self {
        Self {
            factory,
            config: ShimConfig::default(),
            registry: None,
            host_manager: None,
            signal_overrides: None,
            fuser: None,
            supported_kinds: Vec::new(),
            pass_gate: None,
        }
    }

    pub fn with_config(mut self, config: ShimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.config.settings = settings;
        self
    }

    pub fn with_backend_name(mut self, backend_name: impl Into<String>) -> Self {
        self.config.backend_name = backend_name.into();
        self
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

    /// Use a private signal override switch instead of the process-wide one
    pub fn with_signal_overrides(mut self, signal_overrides: Arc<SignalOverrides>) -> Self {
        self.signal_overrides = Some(signal_overrides);
        self
    }

    /// Use a custom fuser for the fusion pass
    pub fn with_fuser(mut self, fuser: Arc<dyn GraphFuser>) -> Self {
        self.fuser = Some(fuser);
        self
    }

    /// Fuse runs of these kinds with a [`KindSetFuser`] built from the configured settings
    ///
    /// Ignored when a custom fuser is set.
    pub fn with_supported_kinds(mut self, kinds: impl IntoIterator<Item = Symbol>) -> Self {
        self.supported_kinds.extend(kinds);
        self
    }

    /// Replace the default gate (the context's live `fusion_enabled` flag)
    pub fn with_pass_gate<G>(mut self, gate: G) -> Self
    where
        G: Fn() -> bool + Send + Sync + 'static,
    {
        self.pass_gate = Some(Arc::new(gate));
        self
    }

    /// Register the delegated operator and, when a fuser is available, the gated fusion pass
    pub fn install(
        self,
        operators: &OperatorRegistry,
        passes: &PassRegistry,
    ) -> Result<Arc<ShimContext>> {
        self.config.validate()?;
        let fusion_symbol = self.config.symbol()?;

        let mut context = ShimContext::builder(self.factory)
            .with_backend_name(self.config.backend_name.clone())
            .with_settings(self.config.settings.clone());
        if let Some(registry) = self.registry {
            context = context.with_registry(registry);
        }
        if let Some(host_manager) = self.host_manager {
            context = context.with_host_manager(host_manager);
        }
        if let Some(signal_overrides) = self.signal_overrides {
            context = context.with_signal_overrides(signal_overrides);
        }
        let ctx = Arc::new(context.build());

        register_delegated_op(Arc::clone(&ctx), operators, fusion_symbol.clone())?;

        let fuser = self.fuser.or_else(|| {
            if self.supported_kinds.is_empty() {
                None
            } else {
                let fuser: Arc<dyn GraphFuser> = Arc::new(
                    KindSetFuser::new(self.supported_kinds)
                        .with_settings(&self.config.settings),
                );
                Some(fuser)
            }
        });

        match fuser {
            Some(fuser) => {
                let gate = self.pass_gate.unwrap_or_else(|| {
                    let ctx = Arc::clone(&ctx);
                    Arc::new(move || ctx.settings().fusion_enabled)
                });
                register_fusion_pass(passes, fuser, fusion_symbol.clone(), move || gate());
            }
            None => info!(kind = %fusion_symbol, "no fuser configured, operator only"),
        }

        info!(
            kind = %fusion_symbol,
            backend = %self.config.backend_name,
            "fusebox installed"
        );
        Ok(ctx)
    }
}
