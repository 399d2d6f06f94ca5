//! The reference sequential runner.
//!
//! One view, one execution context: for each node of the application
//! order, call get, apply, set. The first non-`Ok` status aborts the run
//! and reports the failing node.

use std::error::Error;
use std::fmt;
use std::iter::Copied;
use std::ops::Range;
use std::slice;
use std::sync::Arc;
use std::time::Instant;

use rivulet_core::{ApplicationOrder, ViewStatus};
use rivulet_graph::FlowGraph;
use rivulet_kernel::{FlowKernel, GridDataStore};

use crate::metrics::RunMetrics;

// ── RunError ───────────────────────────────────────────────────────

/// Reasons a run was aborted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunError {
    /// The getter rejected a node (e.g. too many receivers for a fixed
    /// capacity).
    GetterFailed {
        /// The node being loaded.
        index: usize,
        /// Status returned by the getter.
        status: ViewStatus,
    },
    /// The setter rejected a node.
    SetterFailed {
        /// The node being written.
        index: usize,
        /// Status returned by the setter.
        status: ViewStatus,
    },
    /// The store was built for a different kernel layout.
    StoreMismatch,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetterFailed { index, status } => {
                write!(f, "getter failed at node {index}: {status} (status {})", status.code())
            }
            Self::SetterFailed { index, status } => {
                write!(f, "setter failed at node {index}: {status} (status {})", status.code())
            }
            Self::StoreMismatch => write!(f, "store was built for a different kernel layout"),
        }
    }
}

impl Error for RunError {}

// ── NodeSequence ───────────────────────────────────────────────────

/// Node indices in application order.
#[derive(Clone, Debug)]
pub enum NodeSequence<'a> {
    /// `0..N`.
    Index(Range<usize>),
    /// The graph's breadth-first upstream order.
    Upstream(Copied<slice::Iter<'a, usize>>),
}

impl<'a> NodeSequence<'a> {
    /// Sequence for `order` over `graph`.
    pub fn new(order: ApplicationOrder, graph: &'a FlowGraph) -> Self {
        match order {
            ApplicationOrder::Any => Self::Index(0..graph.size()),
            ApplicationOrder::BreadthUpstream => {
                Self::Upstream(graph.bfs_indices().iter().copied())
            }
        }
    }
}

impl Iterator for NodeSequence<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Self::Index(range) => range.next(),
            Self::Upstream(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Index(range) => range.size_hint(),
            Self::Upstream(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for NodeSequence<'_> {}

// ── SequentialRunner ───────────────────────────────────────────────

/// Runs a kernel over every node of a store, one node at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialRunner;

impl SequentialRunner {
    /// Apply `kernel` to every node of `store` in the kernel's order.
    ///
    /// A single view is created (and initialised if the kernel has bound
    /// constants), reused for every node, and freed at the end whether or
    /// not the run succeeded. Nodes processed before a failure keep their
    /// written outputs.
    pub fn run(
        &self,
        kernel: &dyn FlowKernel,
        store: &mut GridDataStore,
    ) -> Result<RunMetrics, RunError> {
        if !Arc::ptr_eq(kernel.layout(), store.layout()) {
            return Err(RunError::StoreMismatch);
        }
        let start = Instant::now();
        let mut metrics = RunMetrics {
            order: kernel.application_order(),
            ..RunMetrics::default()
        };

        let mut view = kernel.create();
        if kernel.has_init() {
            kernel.init(&mut view, store);
        }

        let index_start = Instant::now();
        let graph = Arc::clone(store.graph_arc());
        let sequence = NodeSequence::new(metrics.order, &graph);
        metrics.index_us = index_start.elapsed().as_micros() as u64;

        for index in sequence {
            let status = kernel.get(index, store, &mut view);
            if !status.is_ok() {
                kernel.free(view);
                return Err(RunError::GetterFailed { index, status });
            }
            metrics.max_receivers_seen = metrics.max_receivers_seen.max(view.receivers().count());
            kernel.apply(&mut view);
            let status = kernel.set(index, &view, store);
            if !status.is_ok() {
                kernel.free(view);
                return Err(RunError::SetterFailed { index, status });
            }
            metrics.nodes_visited += 1;
        }

        metrics.view_capacity = view.receivers().capacity();
        kernel.free(view);
        metrics.total_us = start.elapsed().as_micros() as u64;
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use rivulet_core::CapacityPolicy;
    use rivulet_test_utils::fixtures::receiver_sum_kernel;
    use rivulet_test_utils::{chain_graph, confluence_graph};

    use super::*;

    #[test]
    fn sequence_any_is_index_order() {
        let g = chain_graph(4);
        let seq: Vec<_> = NodeSequence::new(ApplicationOrder::Any, &g).collect();
        assert_eq!(seq, vec![0, 1, 2, 3]);
    }

    #[test]
    fn sequence_upstream_follows_graph() {
        let g = chain_graph(4);
        let seq = NodeSequence::new(ApplicationOrder::BreadthUpstream, &g);
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn fixed_capacity_overflow_aborts_with_node_index() {
        let kernel = receiver_sum_kernel(
            ApplicationOrder::Any,
            CapacityPolicy::from_max_receivers(1),
        );
        // Node 0 drains to 1 and 2.
        let mut b = rivulet_graph::FlowGraphBuilder::new(3);
        b.receiver(0, 1, 1.0, 0.5).receiver(0, 2, 1.0, 0.5).receiver(1, 2, 1.0, 1.0);
        let mut store = kernel.store(Arc::new(b.build().unwrap()));
        store.bind("value", vec![1.0, 1.0, 1.0]).unwrap();

        let err = SequentialRunner.run(&kernel, &mut store).unwrap_err();
        assert_eq!(
            err,
            RunError::GetterFailed {
                index: 0,
                status: ViewStatus::CapacityExceeded
            }
        );
        assert_eq!(
            err.to_string(),
            "getter failed at node 0: receiver capacity exceeded (status 1)"
        );
        let value = store.layout().slot::<f64>("value").unwrap();
        assert_eq!(store.field(value), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn mismatched_store_is_rejected() {
        let a = receiver_sum_kernel(ApplicationOrder::Any, CapacityPolicy::Dynamic);
        let b = receiver_sum_kernel(ApplicationOrder::Any, CapacityPolicy::Dynamic);
        let mut store = b.store(Arc::new(chain_graph(2)));
        assert_eq!(
            SequentialRunner.run(&a, &mut store).unwrap_err(),
            RunError::StoreMismatch
        );
    }

    #[test]
    fn metrics_describe_the_run() {
        let kernel = receiver_sum_kernel(ApplicationOrder::BreadthUpstream, CapacityPolicy::Dynamic);
        let mut store = kernel.store(Arc::new(confluence_graph(5)));
        let m = SequentialRunner.run(&kernel, &mut store).unwrap();
        assert_eq!(m.nodes_visited, 5);
        assert_eq!(m.max_receivers_seen, 1);
        assert_eq!(m.view_capacity, 1);
        assert_eq!(m.order, ApplicationOrder::BreadthUpstream);
    }
}
