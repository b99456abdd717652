//! Graph pass registration
//!
//! The host runs registered passes in order over every graph it optimizes.
//! The fusion pass is registered behind a gate that is checked each time the
//! pass runs, not once at registration.

use crate::error::Result;
use crate::fuser::GraphFuser;
use crate::operators::{register_delegated_op, OperatorRegistry};
use fusebox_core::{Graph, Symbol};
use fusebox_runtime::ShimContext;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// A graph-to-graph rewrite
pub type GraphPass = Arc<dyn Fn(&mut Graph) + Send + Sync>;

/// Ordered list of passes
#[derive(Default)]
pub struct PassRegistry {
    passes: RwLock<Vec<GraphPass>>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, pass: GraphPass) {
        self.passes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every pass over `graph` in registration order
    pub fn run_all(&self, graph: &mut Graph) {
        let passes = self
            .passes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for pass in passes {
            pass(graph);
        }
    }
}

impl std::fmt::Debug for PassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassRegistry")
            .field("passes", &self.len())
            .finish()
    }
}

/// Register a fusion pass that only runs while `enable_fn` returns true
pub fn register_fusion_pass<G>(
    passes: &PassRegistry,
    fuser: Arc<dyn GraphFuser>,
    fusion_symbol: Symbol,
    enable_fn: G,
) where
    G: Fn() -> bool + Send + Sync + 'static,
{
    info!(kind = %fusion_symbol, "registered fusion pass");
    passes.register(Arc::new(move |graph: &mut Graph| {
        if !enable_fn() {
            debug!(kind = %fusion_symbol, "fusion disabled, skipping pass");
            return;
        }
        fuser.fuse(graph, &fusion_symbol);
    }));
}

/// Register the delegated operator and its gated fusion pass together
pub fn register_fusion_op_and_pass<G>(
    ctx: Arc<ShimContext>,
    operators: &OperatorRegistry,
    passes: &PassRegistry,
    fuser: Arc<dyn GraphFuser>,
    fusion_symbol: Symbol,
    enable_fn: G,
) -> Result<()>
where
    G: Fn() -> bool + Send + Sync + 'static,
{
    register_delegated_op(ctx, operators, fusion_symbol.clone())?;
    register_fusion_pass(passes, fuser, fusion_symbol, enable_fn);
    Ok(())
}
