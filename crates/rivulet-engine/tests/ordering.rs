//! Visiting order over multi-receiver graphs.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use rivulet_core::{ApplicationOrder, CapacityPolicy};
use rivulet_engine::{KernelEngine, SequentialRunner};
use rivulet_graph::{FlowGraph, FlowGraphBuilder};
use rivulet_kernel::FlowKernel;
use rivulet_test_utils::fixtures::{receiver_sum_kernel, RecordingKernel};
use rivulet_test_utils::{diamond_graph, mfd_raster, sloped_surface};

fn random_dag() -> impl Strategy<Value = FlowGraph> {
    (2usize..32)
        .prop_flat_map(|n| {
            let edge = (0..n - 1).prop_flat_map(move |from| (Just(from), from + 1..n));
            (Just(n), prop::collection::vec(edge, 0..96))
        })
        .prop_map(|(n, edges)| {
            let edges: BTreeSet<(usize, usize)> = edges.into_iter().collect();
            let mut b = FlowGraphBuilder::new(n);
            for (from, to) in edges {
                b.receiver(from, to, 1.0, 1.0);
            }
            b.build().unwrap()
        })
}

fn visit_order(graph: FlowGraph, order: ApplicationOrder) -> (Arc<FlowGraph>, Vec<usize>) {
    let graph = Arc::new(graph);
    let kernel = RecordingKernel::new(order);
    let mut store = rivulet_kernel::GridDataStore::new(Arc::clone(&graph), Arc::clone(kernel.layout()));
    SequentialRunner.run(&kernel, &mut store).unwrap();
    (graph, kernel.visited())
}

fn assert_receivers_first(graph: &FlowGraph, visited: &[usize]) {
    let mut position = vec![usize::MAX; graph.size()];
    for (pos, &node) in visited.iter().enumerate() {
        position[node] = pos;
    }
    for node in 0..graph.size() {
        for &r in graph.receivers(node) {
            assert!(
                position[r] < position[node],
                "receiver {r} of {node} visited after it"
            );
        }
    }
}

proptest! {
    #[test]
    fn breadth_upstream_visits_receivers_first(graph in random_dag()) {
        let (graph, visited) = visit_order(graph, ApplicationOrder::BreadthUpstream);
        prop_assert_eq!(visited.len(), graph.size());
        let mut position = vec![usize::MAX; graph.size()];
        for (pos, &node) in visited.iter().enumerate() {
            prop_assert_eq!(position[node], usize::MAX);
            position[node] = pos;
        }
        for node in 0..graph.size() {
            for &r in graph.receivers(node) {
                prop_assert!(position[r] < position[node]);
            }
        }
    }

    #[test]
    fn any_visits_in_index_order(graph in random_dag()) {
        let (graph, visited) = visit_order(graph, ApplicationOrder::Any);
        prop_assert_eq!(visited, (0..graph.size()).collect::<Vec<_>>());
    }

    #[test]
    fn upstream_sum_is_total_downstream_path_weight(graph in random_dag()) {
        // With all values 1, `value += sum(receivers)` in upstream order
        // yields 1 + sum over receivers of their final value.
        let n = graph.size();
        let mut engine = KernelEngine::new(
            graph,
            receiver_sum_kernel(ApplicationOrder::BreadthUpstream, CapacityPolicy::Dynamic),
        );
        engine.bind("value", vec![1.0; n]).unwrap();
        engine.run().unwrap();
        let value = engine.field::<f64>("value").unwrap();
        for node in 0..n {
            let expected = 1.0 + engine
                .graph()
                .receivers(node)
                .iter()
                .map(|&r| value[r])
                .sum::<f64>();
            prop_assert_eq!(value[node], expected);
        }
    }
}

#[test]
fn diamond_waits_for_all_receivers() {
    let (graph, visited) = visit_order(diamond_graph(), ApplicationOrder::BreadthUpstream);
    assert_eq!(visited, vec![3, 2, 0, 1]);
    assert_receivers_first(&graph, &visited);
}

#[test]
fn raster_order_and_capacity() {
    let (nrows, ncols) = (12, 9);
    let elevation = sloped_surface(nrows, ncols);
    let graph = mfd_raster(nrows, ncols, &elevation);
    let widest = graph.max_receivers();
    assert!(widest > 1);

    let (graph, visited) = visit_order(graph, ApplicationOrder::BreadthUpstream);
    assert_receivers_first(&graph, &visited);

    let mut engine = KernelEngine::new(
        Arc::clone(&graph),
        receiver_sum_kernel(ApplicationOrder::BreadthUpstream, CapacityPolicy::Dynamic),
    );
    let metrics = engine.run().unwrap();
    assert_eq!(metrics.view_capacity, widest);
    assert_eq!(metrics.max_receivers_seen, widest);
}
