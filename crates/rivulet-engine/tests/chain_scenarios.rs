//! The chain `0 -> 1 -> 2 -> 3` with `value += sum(receiver values)`.

use rivulet_core::{ApplicationOrder, CapacityPolicy};
use rivulet_engine::KernelEngine;
use rivulet_test_utils::chain_graph;
use rivulet_test_utils::fixtures::receiver_sum_kernel;

fn run_chain(order: ApplicationOrder, capacity: CapacityPolicy) -> Vec<f64> {
    let mut engine = KernelEngine::new(chain_graph(4), receiver_sum_kernel(order, capacity));
    engine.bind("value", vec![1.0, 1.0, 1.0, 1.0]).unwrap();
    let metrics = engine.run().unwrap();
    assert_eq!(metrics.nodes_visited, 4);
    assert_eq!(metrics.order, order);
    engine.field::<f64>("value").unwrap().to_vec()
}

#[test]
fn breadth_upstream_accumulates_downstream_values() {
    assert_eq!(
        run_chain(ApplicationOrder::BreadthUpstream, CapacityPolicy::Dynamic),
        vec![4.0, 3.0, 2.0, 1.0]
    );
}

#[test]
fn any_order_reads_pre_update_receivers() {
    assert_eq!(
        run_chain(ApplicationOrder::Any, CapacityPolicy::Dynamic),
        vec![2.0, 2.0, 2.0, 1.0]
    );
}

#[test]
fn fixed_capacity_gives_the_same_results() {
    let fixed = CapacityPolicy::from_max_receivers(1);
    assert_eq!(
        run_chain(ApplicationOrder::BreadthUpstream, fixed),
        vec![4.0, 3.0, 2.0, 1.0]
    );
    assert_eq!(
        run_chain(ApplicationOrder::Any, fixed),
        vec![2.0, 2.0, 2.0, 1.0]
    );
}

#[test]
fn outlet_is_unchanged_and_view_capacity_is_one() {
    let kernel = receiver_sum_kernel(ApplicationOrder::BreadthUpstream, CapacityPolicy::Dynamic);
    let mut engine = KernelEngine::new(chain_graph(4), kernel);
    engine.bind("value", vec![0.0, 0.0, 0.0, 7.0]).unwrap();
    let metrics = engine.run().unwrap();
    assert_eq!(engine.field::<f64>("value").unwrap(), &[7.0, 7.0, 7.0, 7.0]);
    assert_eq!(metrics.view_capacity, 1);
    assert_eq!(metrics.max_receivers_seen, 1);
}
