//! Host graph model
//!
//! A minimal view of the host's computation graph: just enough structure for
//! the fusion pass to carve out subgraphs and for the runner cache to key them.

use crate::error::{CoreError, Result};
use std::fmt;
use std::sync::Arc;

/// Qualified operator name (`namespace::name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    namespace: String,
    name: String,
}

impl Symbol {
    /// Create a symbol from its two parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse `namespace::name`
    pub fn parse(qualified: &str) -> Result<Self> {
        let (namespace, name) = qualified
            .split_once("::")
            .ok_or_else(|| CoreError::InvalidSymbol(qualified.to_string()))?;
        if namespace.is_empty() || name.is_empty() {
            return Err(CoreError::InvalidSymbol(qualified.to_string()));
        }
        Ok(Self::new(namespace, name))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The qualified form, also used as the name key for AOT preloading
    pub fn to_qual_string(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

/// SSA value identifier within a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub usize);

/// In-memory identity of a block
///
/// Only meaningful while the block is alive. Distinct blocks with identical
/// contents have distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

impl BlockId {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// A single operation in a graph or block
#[derive(Debug, Clone)]
pub struct Node {
    /// Operator kind
    pub kind: Symbol,

    /// Consumed values
    pub inputs: Vec<ValueId>,

    /// Produced values
    pub outputs: Vec<ValueId>,

    /// Subgraph attribute, set on fusion nodes
    pub subgraph: Option<Arc<Subgraph>>,
}

impl Node {
    /// Create a node without a subgraph attribute
    pub fn new(kind: Symbol, inputs: Vec<ValueId>, outputs: Vec<ValueId>) -> Self {
        Self {
            kind,
            inputs,
            outputs,
            subgraph: None,
        }
    }

    /// Attach a subgraph attribute
    pub fn with_subgraph(mut self, subgraph: Arc<Subgraph>) -> Self {
        self.subgraph = Some(subgraph);
        self
    }

    pub fn kind(&self) -> &Symbol {
        &self.kind
    }

    pub fn subgraph(&self) -> Option<&Arc<Subgraph>> {
        self.subgraph.as_ref()
    }
}

/// Ordered list of nodes with explicit inputs and outputs
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub inputs: Vec<ValueId>,
    pub nodes: Vec<Node>,
    pub outputs: Vec<ValueId>,
}

impl Block {
    pub fn new(inputs: Vec<ValueId>, nodes: Vec<Node>, outputs: Vec<ValueId>) -> Self {
        Self {
            inputs,
            nodes,
            outputs,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A region of a larger graph selected for delegation
///
/// The block lives behind its own allocation so its identity does not change
/// when the `Subgraph` value moves.
#[derive(Debug)]
pub struct Subgraph {
    block: Arc<Block>,
}

impl Subgraph {
    pub fn new(block: Block) -> Self {
        Self {
            block: Arc::new(block),
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Identity of the underlying block
    pub fn block_id(&self) -> BlockId {
        BlockId(Arc::as_ptr(&self.block) as usize)
    }
}

/// Top-level graph handed to passes
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub inputs: Vec<ValueId>,
    pub nodes: Vec<Node>,
    pub outputs: Vec<ValueId>,
}

impl Graph {
    pub fn new(inputs: Vec<ValueId>, outputs: Vec<ValueId>) -> Self {
        Self {
            inputs,
            nodes: Vec::new(),
            outputs,
        }
    }

    /// Append a node
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Nodes of the given kind
    pub fn nodes_of_kind<'a>(&'a self, kind: &'a Symbol) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |node| &node.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_parse() {
        let symbol = Symbol::parse("aten::add").unwrap();
        assert_eq!(symbol.namespace(), "aten");
        assert_eq!(symbol.name(), "add");
        assert_eq!(symbol.to_qual_string(), "aten::add");
    }

    #[test]
    fn test_symbol_parse_rejects_bad_input() {
        assert!(Symbol::parse("add").is_err());
        assert!(Symbol::parse("::add").is_err());
        assert!(Symbol::parse("aten::").is_err());
    }

    #[test]
    fn test_identical_subgraphs_have_distinct_ids() {
        let a = Subgraph::new(Block::default());
        let b = Subgraph::new(Block::default());
        assert_ne!(a.block_id(), b.block_id());
    }

    #[test]
    fn test_block_id_survives_move() {
        let subgraph = Subgraph::new(Block::default());
        let before = subgraph.block_id();
        let moved = Box::new(subgraph);
        assert_eq!(moved.block_id(), before);
    }
}
