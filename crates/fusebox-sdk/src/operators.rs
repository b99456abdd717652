//! Host operator table
//!
//! Operators are registered by symbol together with a factory that turns a
//! node of that kind into an executable [`Operation`].

use crate::error::{Result, SdkError};
use fusebox_core::{HostException, Node, Operation, Symbol};
use fusebox_runtime::{delegated_operation_for, ShimContext};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// How the host may reason about an operator's side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasAnalysisKind {
    /// No side effects, outputs depend only on inputs
    PureFunction,
    /// Assume anything may alias
    Conservative,
    /// Derive from the operator schema
    FromSchema,
}

/// Creates the operation for a node
pub type OperationFactory =
    Arc<dyn Fn(&Node) -> std::result::Result<Operation, HostException> + Send + Sync>;

/// An entry in the operator table
#[derive(Clone)]
pub struct RegisteredOperator {
    pub symbol: Symbol,
    pub alias_analysis: AliasAnalysisKind,
    pub factory: OperationFactory,
}

impl std::fmt::Debug for RegisteredOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredOperator")
            .field("symbol", &self.symbol)
            .field("alias_analysis", &self.alias_analysis)
            .finish()
    }
}

/// Operators known to the host, by symbol
#[derive(Default)]
pub struct OperatorRegistry {
    operators: RwLock<HashMap<Symbol, RegisteredOperator>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator; a symbol may only be registered once
    pub fn register(
        &self,
        symbol: Symbol,
        alias_analysis: AliasAnalysisKind,
        factory: OperationFactory,
    ) -> Result<()> {
        let mut operators = self
            .operators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if operators.contains_key(&symbol) {
            return Err(SdkError::DuplicateOperator(symbol.to_qual_string()));
        }

        info!(symbol = %symbol, ?alias_analysis, "registered operator");
        operators.insert(
            symbol.clone(),
            RegisteredOperator {
                symbol,
                alias_analysis,
                factory,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, symbol: &Symbol) -> Option<RegisteredOperator> {
        self.operators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .cloned()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.operators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.operators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create the operation the host will run for `node`
    pub fn create_operation(&self, node: &Node) -> std::result::Result<Operation, HostException> {
        let operator = self.lookup(node.kind()).ok_or_else(|| {
            HostException::runtime(format!("No operator registered for {}", node.kind()))
        })?;
        debug!(kind = %node.kind(), "creating operation");
        (operator.factory)(node)
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.len())
            .finish()
    }
}

/// Register `symbol` as a delegated fusion operator
///
/// Each node of that kind resolves its runner once, when its operation is
/// created, and executes through the interception wrapper afterwards.
pub fn register_delegated_op(
    ctx: Arc<ShimContext>,
    operators: &OperatorRegistry,
    symbol: Symbol,
) -> Result<()> {
    let factory: OperationFactory = Arc::new(move |node: &Node| {
        delegated_operation_for(&ctx, node)
            .map(|op| op.into_operation())
    });
    operators.register(symbol, AliasAnalysisKind::PureFunction, factory)
}
