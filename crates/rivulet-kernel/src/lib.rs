//! Kernel compilation, node views, and grid data stores for rivulet.
//!
//! A [`KernelSpec`] declares the grid fields and constants a kernel uses.
//! Compiling it yields a [`KernelLayout`], from which a [`GridDataStore`]
//! (the data a kernel runs over) and any number of [`NodeView`]s (one per
//! execution context) are built. [`get_node`] and [`set_node`] move one
//! node's data between the two, and [`FlowKernel`] bundles those
//! operations with the kernel body for a runner or external scheduler.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod family;
pub mod getter;
pub mod kernel;
pub mod layout;
pub mod metrics;
pub mod setter;
pub mod spec;
pub mod store;
pub mod view;

pub use getter::get_node;
pub use kernel::{CompiledKernel, FlowKernel};
pub use layout::{ConstantInfo, KernelLayout};
pub use metrics::BuildMetrics;
pub use setter::set_node;
pub use spec::KernelSpec;
pub use store::{FieldArray, GridDataStore};
pub use view::{NodeView, ReceiverSet};
