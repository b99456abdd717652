//! Runtime error types

use fusebox_core::{CoreError, Symbol};
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The backend compiler rejected a subgraph
    #[error("Compilation failed: {0}")]
    Compilation(String),

    /// A compiled runner failed while executing
    #[error("Execution failed: {0}")]
    Execution(String),

    /// A fusion node carried no subgraph attribute
    #[error("Node {0} has no subgraph attribute")]
    MissingSubgraph(Symbol),

    /// Boundary type error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
