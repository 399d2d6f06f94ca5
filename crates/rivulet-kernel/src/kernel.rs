//! The [`FlowKernel`] operation bundle and [`CompiledKernel`].
//!
//! A runner, or any external scheduler, drives a kernel exclusively through
//! this trait: `create` a view per execution context, optionally `init`
//! it, then per node `get`, `apply`, `set`, and finally `free` the view.

use std::fmt;
use std::sync::Arc;

use rivulet_core::{ApplicationOrder, ViewStatus};

use crate::getter::get_node;
use crate::layout::KernelLayout;
use crate::setter::set_node;
use crate::store::GridDataStore;
use crate::view::NodeView;

/// Per-node operations of a compiled kernel.
///
/// # Contract
///
/// - `apply()` sees only the view; it must not depend on any other node
///   than those loaded by `get()`.
/// - One view per execution context. Views are never shared.
/// - Under [`ApplicationOrder::BreadthUpstream`] a node's `get()` must not
///   run before the `set()` of all of its receivers has completed.
///
/// # Object safety
///
/// This trait is object-safe; runners accept `&dyn FlowKernel`.
///
/// # Examples
///
/// ```
/// use rivulet_core::{Dtype, FieldDecl};
/// use rivulet_kernel::{CompiledKernel, FlowKernel, KernelSpec, NodeView};
///
/// let layout = KernelSpec::new()
///     .field(FieldDecl::node("h", Dtype::F64))
///     .output("h")
///     .compile()
///     .unwrap();
/// let h = layout.slot::<f64>("h").unwrap();
/// let kernel = CompiledKernel::new(layout, move |view: &mut NodeView| {
///     let v = view.get(h);
///     view.set(h, v * 0.5);
/// });
/// assert!(!kernel.has_init());
/// assert_eq!(kernel.n_threads(), 1);
/// ```
pub trait FlowKernel: Send + Sync {
    /// Layout shared by this kernel's views and stores.
    fn layout(&self) -> &Arc<KernelLayout>;

    /// Apply the kernel body to the loaded node.
    fn apply(&self, view: &mut NodeView);

    /// Allocate a view for one execution context.
    fn create(&self) -> NodeView {
        NodeView::new(self.layout())
    }

    /// Whether [`init`](Self::init) must be called on new views.
    fn has_init(&self) -> bool {
        self.layout().needs_init()
    }

    /// Copy store-bound constants into a view.
    fn init(&self, view: &mut NodeView, store: &GridDataStore) {
        view.init(store);
    }

    /// Load node `index` into `view`.
    fn get(&self, index: usize, store: &GridDataStore, view: &mut NodeView) -> ViewStatus {
        get_node(index, store, view)
    }

    /// Write the outputs of `view` to node `index`.
    fn set(&self, index: usize, view: &NodeView, store: &mut GridDataStore) -> ViewStatus {
        set_node(index, view, store)
    }

    /// Release a view.
    fn free(&self, view: NodeView) {
        drop(view);
    }

    /// Node visiting order.
    fn application_order(&self) -> ApplicationOrder {
        self.layout().order()
    }

    /// Configured number of execution contexts.
    fn n_threads(&self) -> usize {
        self.layout().n_threads()
    }
}

/// A kernel body bound to its compiled layout.
pub struct CompiledKernel<F> {
    layout: Arc<KernelLayout>,
    body: F,
}

impl<F> CompiledKernel<F>
where
    F: Fn(&mut NodeView) + Send + Sync,
{
    /// Bind `body` to `layout`.
    pub fn new(layout: impl Into<Arc<KernelLayout>>, body: F) -> Self {
        Self {
            layout: layout.into(),
            body,
        }
    }

    /// Fresh store over `graph` for this kernel's layout.
    pub fn store(&self, graph: Arc<rivulet_graph::FlowGraph>) -> GridDataStore {
        GridDataStore::new(graph, Arc::clone(&self.layout))
    }
}

impl<F> FlowKernel for CompiledKernel<F>
where
    F: Fn(&mut NodeView) + Send + Sync,
{
    fn layout(&self) -> &Arc<KernelLayout> {
        &self.layout
    }

    fn apply(&self, view: &mut NodeView) {
        (self.body)(view);
    }
}

impl<F> fmt::Debug for CompiledKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledKernel")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
