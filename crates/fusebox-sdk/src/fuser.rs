//! Graph fusion
//!
//! A fuser carves regions the backend can execute out of a host graph and
//! replaces each region with a single node of the fusion kind. The region
//! travels with that node as its subgraph attribute.

use fusebox_core::{Block, ExecutionSettings, Graph, Node, Subgraph, Symbol, ValueId};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info};

/// Marks fusible regions of a graph
pub trait GraphFuser: Send + Sync {
    /// Rewrite `graph` in place, returning the number of fusion nodes created
    fn fuse(&self, graph: &mut Graph, fusion_symbol: &Symbol) -> usize;
}

/// Fuses maximal runs of consecutive nodes whose kind is supported
#[derive(Debug, Clone)]
pub struct KindSetFuser {
    supported: HashSet<Symbol>,
    min_group_size: usize,
    blacklist: HashSet<String>,
}

impl KindSetFuser {
    pub fn new(supported: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            supported: supported.into_iter().collect(),
            min_group_size: 1,
            blacklist: HashSet::new(),
        }
    }

    /// Take the group size floor and blacklist from `settings`
    pub fn with_settings(mut self, settings: &ExecutionSettings) -> Self {
        self.min_group_size = settings.min_fusion_group_size.max(1);
        self.blacklist = settings.op_blacklist.iter().cloned().collect();
        self
    }

    fn is_fusible(&self, node: &Node, fusion_symbol: &Symbol) -> bool {
        node.kind() != fusion_symbol
            && node.subgraph().is_none()
            && self.supported.contains(node.kind())
            && !self.blacklist.contains(&node.kind().to_qual_string())
    }

    fn candidate_runs(&self, nodes: &[Node], fusion_symbol: &Symbol) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        let mut start = None;
        for (index, node) in nodes.iter().enumerate() {
            match (self.is_fusible(node, fusion_symbol), start) {
                (true, None) => start = Some(index),
                (false, Some(begin)) => {
                    runs.push(begin..index);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(begin) = start {
            runs.push(begin..nodes.len());
        }
        runs.retain(|run| run.len() >= self.min_group_size);
        runs
    }
}

impl GraphFuser for KindSetFuser {
    fn fuse(&self, graph: &mut Graph, fusion_symbol: &Symbol) -> usize {
        let runs = self.candidate_runs(&graph.nodes, fusion_symbol);
        if runs.is_empty() {
            return 0;
        }

        let original = std::mem::take(&mut graph.nodes);
        let mut rewritten = Vec::with_capacity(original.len());
        let mut cursor = 0;

        for run in &runs {
            rewritten.extend_from_slice(&original[cursor..run.start]);
            let inputs = run_inputs(&original[run.clone()]);
            let outputs = run_outputs(&original, run, &graph.outputs);
            debug!(
                kind = %fusion_symbol,
                nodes = run.len(),
                inputs = inputs.len(),
                outputs = outputs.len(),
                "fusing region"
            );

            let block = Block::new(
                inputs.clone(),
                original[run.clone()].to_vec(),
                outputs.clone(),
            );
            rewritten.push(
                Node::new(fusion_symbol.clone(), inputs, outputs)
                    .with_subgraph(Arc::new(Subgraph::new(block))),
            );
            cursor = run.end;
        }
        rewritten.extend_from_slice(&original[cursor..]);
        graph.nodes = rewritten;

        info!(kind = %fusion_symbol, groups = runs.len(), "fusion pass created groups");
        runs.len()
    }
}

/// Values the region consumes but does not produce, in first-use order
fn run_inputs(nodes: &[Node]) -> Vec<ValueId> {
    let mut produced = HashSet::new();
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();
    for node in nodes {
        for value in &node.inputs {
            if !produced.contains(value) && seen.insert(*value) {
                inputs.push(*value);
            }
        }
        produced.extend(node.outputs.iter().copied());
    }
    inputs
}

/// Values the region produces that something after it still needs
fn run_outputs(nodes: &[Node], run: &Range<usize>, graph_outputs: &[ValueId]) -> Vec<ValueId> {
    let mut needed: HashSet<ValueId> = graph_outputs.iter().copied().collect();
    for node in &nodes[run.end..] {
        needed.extend(node.inputs.iter().copied());
    }

    let mut outputs = Vec::new();
    for node in &nodes[run.clone()] {
        for value in &node.outputs {
            if needed.contains(value) && !outputs.contains(value) {
                outputs.push(*value);
            }
        }
    }
    outputs
}
