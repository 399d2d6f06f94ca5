//! [`KernelEngine`]: a kernel, its grid store, and the sequential runner.

use std::sync::Arc;

use rivulet_core::{BindError, CompileError, Element, Scalar};
use rivulet_graph::FlowGraph;
use rivulet_kernel::{
    CompiledKernel, FieldArray, FlowKernel, GridDataStore, KernelLayout, NodeView,
};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::RunMetrics;
use crate::runner::{RunError, SequentialRunner};

/// Owns a kernel and the store it runs over.
///
/// Bind field arrays and constants, call [`run`](Self::run), read results
/// back from the store. Arrays may be rebound between runs.
///
/// # Examples
///
/// ```
/// use rivulet_core::{ApplicationOrder, Dtype, FieldDecl};
/// use rivulet_engine::{EngineConfig, KernelEngine};
/// use rivulet_graph::FlowGraphBuilder;
/// use rivulet_kernel::{KernelSpec, NodeView};
///
/// let mut builder = FlowGraphBuilder::new(3);
/// builder.receiver(0, 1, 1.0, 1.0).receiver(1, 2, 1.0, 1.0);
/// let spec = KernelSpec::new()
///     .field(FieldDecl::node("value", Dtype::F64))
///     .output("value")
///     .with_order(ApplicationOrder::BreadthUpstream);
/// let config = EngineConfig::new(builder.build().unwrap(), spec);
///
/// let mut engine = KernelEngine::compile(config, |layout| {
///     let value = layout.slot::<f64>("value")?;
///     Ok(move |view: &mut NodeView| {
///         let (own, receivers) = view.with_receivers(value);
///         let sum: f64 = receivers.iter().sum();
///         view.set(value, own + sum);
///     })
/// })
/// .unwrap();
///
/// engine.bind("value", vec![1.0, 1.0, 1.0]).unwrap();
/// engine.run().unwrap();
/// assert_eq!(engine.field::<f64>("value").unwrap(), &[3.0, 2.0, 1.0]);
/// ```
pub struct KernelEngine<K> {
    kernel: K,
    store: GridDataStore,
    runner: SequentialRunner,
    last_metrics: Option<RunMetrics>,
}

impl<K: FlowKernel> KernelEngine<K> {
    /// Engine running `kernel` over `graph`, with a zero-filled store.
    pub fn new(graph: impl Into<Arc<FlowGraph>>, kernel: K) -> Self {
        let store = GridDataStore::new(graph.into(), Arc::clone(kernel.layout()));
        Self {
            kernel,
            store,
            runner: SequentialRunner,
            last_metrics: None,
        }
    }

    /// Replace the array of grid field `name`.
    pub fn bind(&mut self, name: &str, array: impl Into<FieldArray>) -> Result<(), BindError> {
        self.store.bind(name, array)
    }

    /// Set a store-bound constant.
    pub fn bind_constant(&mut self, name: &str, value: impl Into<Scalar>) -> Result<(), BindError> {
        self.store.bind_constant(name, value)
    }

    /// Apply the kernel to every node once.
    pub fn run(&mut self) -> Result<RunMetrics, RunError> {
        let metrics = self.runner.run(&self.kernel, &mut self.store)?;
        self.last_metrics = Some(metrics.clone());
        Ok(metrics)
    }

    /// Values of grid field `name`.
    pub fn field<T: Element>(&self, name: &str) -> Result<&[T], CompileError> {
        let slot = self.store.layout().slot::<T>(name)?;
        Ok(self.store.field(slot))
    }

    /// The kernel.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The kernel layout.
    pub fn layout(&self) -> &KernelLayout {
        self.kernel.layout()
    }

    /// The flow graph.
    pub fn graph(&self) -> &FlowGraph {
        self.store.graph()
    }

    /// The grid store.
    pub fn store(&self) -> &GridDataStore {
        &self.store
    }

    /// Mutable grid store.
    pub fn store_mut(&mut self) -> &mut GridDataStore {
        &mut self.store
    }

    /// Metrics of the last successful run.
    pub fn last_metrics(&self) -> Option<&RunMetrics> {
        self.last_metrics.as_ref()
    }
}

impl<F> KernelEngine<CompiledKernel<F>>
where
    F: Fn(&mut NodeView) + Send + Sync,
{
    /// Validate `config` and bind the body produced by `make_body`.
    ///
    /// `make_body` receives the compiled layout so it can resolve typed
    /// slots once, outside the per-node path.
    pub fn compile<B>(config: EngineConfig, make_body: B) -> Result<Self, ConfigError>
    where
        B: FnOnce(&KernelLayout) -> Result<F, CompileError>,
    {
        let layout = config.validate()?;
        let body = make_body(&layout)?;
        Ok(Self::new(config.graph, CompiledKernel::new(layout, body)))
    }
}
