//! Shared helpers for runtime integration tests

#![allow(dead_code)]

use fusebox_core::{
    Block, ExecutionSettings, IValue, Node, Stack, Subgraph, Symbol, Tensor, ValueId,
};
use fusebox_runtime::{
    CompiledRunner, HostManager, Result, RunnerFactory, RunnerRegistry, RuntimeError, ShimContext,
    SignalOverrides,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn fusion_symbol() -> Symbol {
    Symbol::new("fusebox", "FusionGroup")
}

/// A fusion node wrapping a fresh single-relu subgraph
pub fn fusion_node() -> Node {
    let block = Block::new(
        vec![ValueId(0)],
        vec![Node::new(
            Symbol::new("aten", "relu"),
            vec![ValueId(0)],
            vec![ValueId(1)],
        )],
        vec![ValueId(1)],
    );
    Node::new(fusion_symbol(), vec![ValueId(0)], vec![ValueId(1)])
        .with_subgraph(Arc::new(Subgraph::new(block)))
}

/// Current disposition of `signal`, read without changing it
pub fn current_handler(signal: libc::c_int) -> libc::sighandler_t {
    // SAFETY: a null `act` only queries the disposition.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        libc::sigaction(signal, std::ptr::null(), &mut action);
        action.sa_sigaction
    }
}

pub extern "C" fn marker_handler(_signal: libc::c_int) {}

pub fn marker_handler_address() -> libc::sighandler_t {
    marker_handler as extern "C" fn(libc::c_int) as libc::sighandler_t
}

/// What a mock runner does when executed
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Negate every element of the tensor on top of the stack
    Negate,
    /// Fail with an execution error
    Fail(String),
    /// Panic mid-execution
    Panic,
}

/// Runner that records how it was called
pub struct MockRunner {
    pub settings: ExecutionSettings,
    pub behavior: Behavior,
    pub run_calls: AtomicUsize,
    pub run_only_calls: AtomicUsize,
    pub observed_interrupt_handlers: Mutex<Vec<libc::sighandler_t>>,
}

impl MockRunner {
    pub fn new(settings: ExecutionSettings, behavior: Behavior) -> Self {
        Self {
            settings,
            behavior,
            run_calls: AtomicUsize::new(0),
            run_only_calls: AtomicUsize::new(0),
            observed_interrupt_handlers: Mutex::new(Vec::new()),
        }
    }

    fn execute(&self, stack: &mut Stack) -> Result<()> {
        self.observed_interrupt_handlers
            .lock()
            .unwrap()
            .push(current_handler(libc::SIGINT));

        match &self.behavior {
            Behavior::Negate => {
                let tensor = stack.pop()?.into_tensor()?;
                let negated: Vec<f32> = tensor.data.iter().map(|v| -v).collect();
                stack.push(Tensor::new(tensor.shape, negated)?);
                Ok(())
            }
            Behavior::Fail(message) => Err(RuntimeError::Execution(message.clone())),
            Behavior::Panic => panic!("runner crashed"),
        }
    }
}

impl CompiledRunner for MockRunner {
    fn run(&self, stack: &mut Stack) -> Result<()> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        self.execute(stack)
    }

    fn run_only(&self, stack: &mut Stack) -> Result<()> {
        self.run_only_calls.fetch_add(1, Ordering::SeqCst);
        self.execute(stack)
    }

    fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }
}

/// Factory that counts constructions and remembers what it was given
pub struct MockFactory {
    pub behavior: Behavior,
    pub builds: AtomicUsize,
    pub fail_compilation: Mutex<Option<String>>,
    pub build_delay: Option<Duration>,
    pub seen_backends: Mutex<Vec<String>>,
    pub seen_hosts: Mutex<Vec<String>>,
    pub built: Mutex<Vec<Arc<MockRunner>>>,
}

impl MockFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            builds: AtomicUsize::new(0),
            fail_compilation: Mutex::new(None),
            build_delay: None,
            seen_backends: Mutex::new(Vec::new()),
            seen_hosts: Mutex::new(Vec::new()),
            built: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.build_delay = Some(delay);
        self
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn last_built(&self) -> Arc<MockRunner> {
        Arc::clone(self.built.lock().unwrap().last().unwrap())
    }
}

impl RunnerFactory for MockFactory {
    fn build(
        &self,
        _subgraph: Arc<Subgraph>,
        host: Arc<dyn HostManager>,
        backend_name: &str,
        settings: ExecutionSettings,
    ) -> Result<Arc<dyn CompiledRunner>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.build_delay {
            std::thread::sleep(delay);
        }
        if let Some(message) = self.fail_compilation.lock().unwrap().clone() {
            return Err(RuntimeError::Compilation(message));
        }
        self.seen_backends
            .lock()
            .unwrap()
            .push(backend_name.to_string());
        self.seen_hosts.lock().unwrap().push(host.name().to_string());

        let runner = Arc::new(MockRunner::new(settings, self.behavior.clone()));
        self.built.lock().unwrap().push(Arc::clone(&runner));
        Ok(runner)
    }
}

/// Context over an isolated registry and override switch
pub fn isolated_context(factory: Arc<MockFactory>, settings: ExecutionSettings) -> ShimContext {
    ShimContext::builder(factory)
        .with_registry(Arc::new(RunnerRegistry::new()))
        .with_signal_overrides(Arc::new(SignalOverrides::default()))
        .with_settings(settings)
        .build()
}

pub fn tensor_stack(values: &[f32]) -> Stack {
    Stack::from_values(vec![IValue::Tensor(
        Tensor::new(vec![values.len()], values.to_vec()).unwrap(),
    )])
}

pub fn top_tensor_data(stack: &Stack) -> Vec<f32> {
    stack.peek().unwrap().as_tensor().unwrap().data.clone()
}
