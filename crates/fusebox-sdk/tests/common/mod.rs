//! Shared helpers for SDK integration tests

#![allow(dead_code)]

use fusebox_core::{Block, ExecutionSettings, IValue, Stack, Subgraph, Symbol, Tensor, ValueId};
use fusebox_runtime::{CompiledRunner, HostManager, Result, RunnerFactory, RuntimeError};
use fusebox_sdk::{Graph, Node};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn fusion_symbol() -> Symbol {
    Symbol::new("fusebox", "FusionGroup")
}

pub fn aten(name: &str) -> Symbol {
    Symbol::new("aten", name)
}

pub fn supported_kinds() -> Vec<Symbol> {
    vec![aten("add"), aten("mul"), aten("relu")]
}

/// Settings for tests that share the process signal dispositions
pub fn quiet_settings() -> ExecutionSettings {
    ExecutionSettings::default().with_signal_handler_overrides(false)
}

fn node(name: &str, inputs: &[usize], outputs: &[usize]) -> Node {
    Node::new(
        aten(name),
        inputs.iter().map(|v| ValueId(*v)).collect(),
        outputs.iter().map(|v| ValueId(*v)).collect(),
    )
}

/// v0, v1 -> add -> v2 -> relu -> v3 -> sort -> v4
pub fn add_relu_sort_graph() -> Graph {
    let mut graph = Graph::new(vec![ValueId(0), ValueId(1)], vec![ValueId(4)]);
    graph.push(node("add", &[0, 1], &[2]));
    graph.push(node("relu", &[2], &[3]));
    graph.push(node("sort", &[3], &[4]));
    graph
}

pub fn vector(values: &[f32]) -> IValue {
    IValue::Tensor(Tensor::new(vec![values.len()], values.to_vec()).unwrap())
}

pub fn top_tensor_data(stack: &Stack) -> Vec<f32> {
    stack.peek().unwrap().as_tensor().unwrap().data.clone()
}

/// Runner that evaluates its block node by node
///
/// Pops one value per block input (in push order) and pushes the block
/// outputs in order.
pub struct InterpreterRunner {
    block: Block,
    settings: ExecutionSettings,
    pub runs: AtomicUsize,
}

impl InterpreterRunner {
    fn evaluate(&self, stack: &mut Stack) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let args = stack.pop_n(self.block.inputs.len())?;
        let mut env: HashMap<ValueId, Tensor> = HashMap::new();
        for (id, value) in self.block.inputs.iter().zip(args) {
            env.insert(*id, value.into_tensor()?);
        }

        for node in &self.block.nodes {
            let result = match node.kind().name() {
                "relu" => {
                    let x = operand(&env, node, 0)?;
                    let data = x.data.iter().map(|v| v.max(0.0)).collect();
                    Tensor::new(x.shape.clone(), data)?
                }
                "add" | "mul" => {
                    let (a, b) = (operand(&env, node, 0)?, operand(&env, node, 1)?);
                    if a.shape != b.shape {
                        return Err(RuntimeError::Execution(format!(
                            "shape mismatch: {:?} vs {:?}",
                            a.shape, b.shape
                        )));
                    }
                    let add = node.kind().name() == "add";
                    let data = a
                        .data
                        .iter()
                        .zip(&b.data)
                        .map(|(x, y)| if add { x + y } else { x * y })
                        .collect();
                    Tensor::new(a.shape.clone(), data)?
                }
                other => return Err(RuntimeError::Execution(format!("no kernel for {other}"))),
            };
            env.insert(node.outputs[0], result);
        }

        for id in &self.block.outputs {
            let tensor = env
                .remove(id)
                .ok_or_else(|| RuntimeError::Execution(format!("output {:?} never produced", id)))?;
            stack.push(tensor);
        }
        Ok(())
    }
}

fn operand<'a>(env: &'a HashMap<ValueId, Tensor>, node: &Node, index: usize) -> Result<&'a Tensor> {
    node.inputs
        .get(index)
        .and_then(|id| env.get(id))
        .ok_or_else(|| RuntimeError::Execution(format!("{} is missing input {index}", node.kind())))
}

impl CompiledRunner for InterpreterRunner {
    fn run(&self, stack: &mut Stack) -> Result<()> {
        self.evaluate(stack)
    }

    fn run_only(&self, stack: &mut Stack) -> Result<()> {
        self.evaluate(stack)
    }

    fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }
}

/// Factory that accepts blocks made only of supported kinds
#[derive(Default)]
pub struct InterpreterFactory {
    builds: AtomicUsize,
}

impl InterpreterFactory {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl RunnerFactory for InterpreterFactory {
    fn build(
        &self,
        subgraph: Arc<Subgraph>,
        _host: Arc<dyn HostManager>,
        _backend_name: &str,
        settings: ExecutionSettings,
    ) -> Result<Arc<dyn CompiledRunner>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let supported = supported_kinds();
        let block = subgraph.block();
        if let Some(node) = block.nodes.iter().find(|n| !supported.contains(n.kind())) {
            let message = format!("unsupported op {}", node.kind());
            return Err(RuntimeError::Compilation(message));
        }
        Ok(Arc::new(InterpreterRunner {
            block: block.clone(),
            settings,
            runs: AtomicUsize::new(0),
        }))
    }
}
