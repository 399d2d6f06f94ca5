//! Rivulet: per-node kernel execution over flow-routing graphs.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! rivulet sub-crates. For most users, adding `rivulet` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rivulet::prelude::*;
//!
//! // 0 -> 1 -> 2 -> 3, node 3 is the outlet.
//! let mut builder = FlowGraphBuilder::new(4);
//! for i in 0..3 {
//!     builder.receiver(i, i + 1, 1.0, 1.0);
//! }
//! let spec = KernelSpec::new()
//!     .field(FieldDecl::node("value", Dtype::F64))
//!     .output("value")
//!     .with_order(ApplicationOrder::BreadthUpstream);
//! let config = EngineConfig::new(builder.build().unwrap(), spec);
//!
//! let mut engine = KernelEngine::compile(config, |layout| {
//!     let value = layout.slot::<f64>("value")?;
//!     Ok(move |view: &mut NodeView| {
//!         let (own, receivers) = view.with_receivers(value);
//!         let sum: f64 = receivers.iter().sum();
//!         view.set(value, own + sum);
//!     })
//! })
//! .unwrap();
//!
//! engine.bind("value", vec![1.0; 4]).unwrap();
//! engine.run().unwrap();
//! assert_eq!(engine.field::<f64>("value").unwrap(), &[4.0, 3.0, 2.0, 1.0]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rivulet-core` | Dtypes, field declarations, policies, slots, errors |
//! | [`graph`] | `rivulet-graph` | Flow graph, builder, upstream traversal |
//! | [`kernel`] | `rivulet-kernel` | Spec compiler, store, node view, getter/setter, bundle |
//! | [`engine`] | `rivulet-engine` | Sequential runner and engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`rivulet-core`).
///
/// Dtypes and scalars, [`types::FieldDecl`], [`types::CapacityPolicy`],
/// [`types::ApplicationOrder`], typed slots, and build-time errors.
pub use rivulet_core as types;

/// Flow-routing graph connectivity (`rivulet-graph`).
///
/// [`graph::FlowGraph`] is built from raw router arrays or with
/// [`graph::FlowGraphBuilder`].
pub use rivulet_graph as graph;

/// Kernel compilation and per-node operations (`rivulet-kernel`).
///
/// The [`kernel::FlowKernel`] trait is the operation bundle an external
/// scheduler drives.
pub use rivulet_kernel as kernel;

/// Reference runner and engine (`rivulet-engine`).
pub use rivulet_engine as engine;

/// Common imports for typical rivulet usage.
///
/// ```rust
/// use rivulet::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use rivulet_core::{
        ApplicationOrder, CapacityPolicy, ConstantSlot, Dtype, FieldDecl, FieldSlot, Scalar,
        ViewStatus,
    };

    // Errors
    pub use rivulet_core::{BindError, CompileError};
    pub use rivulet_graph::GraphError;

    // Graph
    pub use rivulet_graph::{FlowGraph, FlowGraphBuilder};

    // Kernel
    pub use rivulet_kernel::{
        CompiledKernel, FlowKernel, GridDataStore, KernelLayout, KernelSpec, NodeView,
    };

    // Engine
    pub use rivulet_engine::{ConfigError, EngineConfig, KernelEngine, RunError, RunMetrics};
}
