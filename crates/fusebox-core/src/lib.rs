//! fusebox core - boundary types for the fusebox delegation shim
//!
//! This crate provides the types shared between the host runtime boundary
//! and the runner cache:
//! - Cache keys (identity and name keys)
//! - The host graph model (symbols, nodes, blocks, subgraphs)
//! - The host call stack convention
//! - Execution settings
//! - Host-facing exceptions and error types

pub mod error;
pub mod graph;
pub mod host;
pub mod key;
pub mod settings;
pub mod stack;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use graph::{Block, BlockId, Graph, Node, Subgraph, Symbol, ValueId};
pub use host::{HostException, HostExceptionKind, Operation};
pub use key::CacheKey;
pub use settings::ExecutionSettings;
pub use stack::{IValue, Stack, Tensor};
