//! Delegated operation wrapper
//!
//! The callable installed as a fusion operator's implementation. The runner is
//! resolved once, when the host creates the operation for a node; every
//! invocation after that goes straight to the cached runner.

use crate::context::ShimContext;
use crate::error::Result;
use crate::resolver::resolve_runner;
use crate::runner::CompiledRunner;
use crate::signals::SignalOverrides;
use fusebox_core::{HostException, Node, Operation, Stack};
use std::sync::Arc;
use tracing::warn;

/// A resolved runner plus the signal override switch it executes under
#[derive(Clone)]
pub struct DelegatedOperation {
    runner: Arc<dyn CompiledRunner>,
    signal_overrides: Arc<SignalOverrides>,
}

impl DelegatedOperation {
    pub fn new(runner: Arc<dyn CompiledRunner>, signal_overrides: Arc<SignalOverrides>) -> Self {
        Self {
            runner,
            signal_overrides,
        }
    }

    pub fn runner(&self) -> &Arc<dyn CompiledRunner> {
        &self.runner
    }

    /// Execute the runner against the host stack
    ///
    /// Runner failures come back as an `InvalidArgument` host exception
    /// carrying the failure's message. Signal handlers overridden for the
    /// call are restored before returning, whichever way the call ends.
    pub fn invoke(&self, stack: &mut Stack) -> std::result::Result<(), HostException> {
        let outcome = {
            let _signals = self.signal_overrides.acquire();
            self.dispatch(stack)
        };

        outcome.map_err(|err| {
            warn!(error = %err, "delegated execution failed");
            HostException::invalid_argument(err.to_string())
        })
    }

    fn dispatch(&self, stack: &mut Stack) -> Result<()> {
        if self.runner.settings().pre_compile {
            self.runner.run_only(stack)
        } else {
            self.runner.run(stack)
        }
    }

    /// Wrap as the host's operation type
    pub fn into_operation(self) -> Operation {
        Arc::new(move |stack: &mut Stack| self.invoke(stack))
    }
}

impl std::fmt::Debug for DelegatedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatedOperation")
            .field("pre_compile", &self.runner.settings().pre_compile)
            .field("signal_overrides", &self.signal_overrides.is_enabled())
            .finish()
    }
}

/// Resolve the runner for `node` and wrap it for the host
///
/// Resolution failures (no subgraph attribute, compiler rejection) surface as
/// a `Runtime` host exception; nothing is cached for a failed construction.
pub fn delegated_operation_for(
    ctx: &ShimContext,
    node: &Node,
) -> std::result::Result<DelegatedOperation, HostException> {
    let runner = resolve_runner(ctx, node).map_err(|err| {
        warn!(kind = %node.kind(), error = %err, "could not resolve runner");
        HostException::runtime(err.to_string())
    })?;
    Ok(DelegatedOperation::new(
        runner,
        Arc::clone(ctx.signal_overrides()),
    ))
}
