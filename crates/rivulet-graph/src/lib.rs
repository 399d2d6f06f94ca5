//! Flow-routing graph connectivity for rivulet kernels.
//!
//! This crate defines [`FlowGraph`], the immutable donor/receiver
//! adjacency a kernel is applied over, together with the breadth-first
//! upstream traversal order used by [`ApplicationOrder::BreadthUpstream`].
//!
//! Graphs arrive either fully precomputed from an external flow router
//! ([`FlowGraph::from_parts`]) or are assembled edge by edge with
//! [`FlowGraphBuilder`], which derives donors and the traversal order.
//!
//! [`ApplicationOrder::BreadthUpstream`]: rivulet_core::ApplicationOrder::BreadthUpstream

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod graph;
pub mod traversal;

pub use builder::{FlowGraphBuilder, ReceiverEdge};
pub use error::GraphError;
pub use graph::{FlowGraph, FlowGraphParts};
pub use traversal::{breadth_upstream_order, check_upstream_order};
