//! Reference runner and engine driving rivulet flow kernels.
//!
//! [`SequentialRunner`] applies a [`FlowKernel`](rivulet_kernel::FlowKernel)
//! to every node of a [`GridDataStore`](rivulet_kernel::GridDataStore) in
//! the kernel's application order, one view and one node at a time.
//! [`KernelEngine`] owns a kernel together with its store and is the usual
//! entry point. External schedulers that run nodes concurrently use the
//! kernel's operation bundle directly and do not need this crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod metrics;
pub mod runner;

pub use config::{ConfigError, EngineConfig};
pub use engine::KernelEngine;
pub use metrics::RunMetrics;
pub use runner::{NodeSequence, RunError, SequentialRunner};
