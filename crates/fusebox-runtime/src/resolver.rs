//! Runner key resolution
//!
//! Finding the runner for a fusion node goes through three tiers, stopping at
//! the first hit:
//! 1. the identity key of the node's subgraph block
//! 2. the name key of the node's kind, for runners preloaded ahead of time
//! 3. a new runner built for the subgraph and registered under its identity key

use crate::context::ShimContext;
use crate::error::{Result, RuntimeError};
use crate::runner::CompiledRunner;
use fusebox_core::{CacheKey, Node};
use std::sync::Arc;
use tracing::debug;

/// Find or build the runner for a fusion node
pub fn resolve_runner(ctx: &ShimContext, node: &Node) -> Result<Arc<dyn CompiledRunner>> {
    let subgraph = node
        .subgraph()
        .ok_or_else(|| RuntimeError::MissingSubgraph(node.kind().clone()))?;
    let registry = ctx.registry();

    let identity_key = CacheKey::identity(subgraph.block_id());
    if let Some(runner) = registry.get(&identity_key) {
        debug!(key = %identity_key, "runner found by subgraph identity");
        return Ok(runner);
    }

    let name_key = CacheKey::name(&node.kind().to_qual_string());
    if let Some(runner) = registry.get(&name_key) {
        debug!(key = %name_key, "runner found by preloaded symbol");
        return Ok(runner);
    }

    debug!(key = %identity_key, kind = %node.kind(), "no cached runner, building one");
    let subgraph = Arc::clone(subgraph);
    registry.get_or_insert(identity_key, || ctx.build_runner(subgraph))
}
