//! fusebox SDK
//!
//! Wires the runner cache into a host runtime: registers the delegated
//! fusion operator, installs the gated fusion pass and loads configuration.

pub mod builder;
pub mod config;
pub mod error;
pub mod fuser;
pub mod logging;
pub mod operators;
pub mod passes;

// Re-export main types
pub use builder::ShimBuilder;
pub use config::ShimConfig;
pub use error::{Result, SdkError};
pub use fuser::{GraphFuser, KindSetFuser};
pub use operators::{
    register_delegated_op, AliasAnalysisKind, OperationFactory, OperatorRegistry,
    RegisteredOperator,
};
pub use passes::{register_fusion_op_and_pass, register_fusion_pass, GraphPass, PassRegistry};

// Re-export commonly used types from dependencies
pub use fusebox_core::{CacheKey, ExecutionSettings, Graph, HostException, Node, Stack, Symbol};
pub use fusebox_runtime::{
    CompiledRunner, RunnerFactory, RunnerRegistry, ShimContext, SignalOverrides,
};
