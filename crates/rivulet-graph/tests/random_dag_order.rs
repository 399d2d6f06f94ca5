use proptest::prelude::*;
use rivulet_graph::{breadth_upstream_order, check_upstream_order, FlowGraphBuilder, GraphError};

/// Random DAG: every edge points from a lower index to a strictly higher
/// one, so the highest node is always an outlet.
fn dag_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..24).prop_flat_map(|n| {
        let edge = (0..n - 1).prop_flat_map(move |from| (Just(from), from + 1..n));
        (Just(n), prop::collection::vec(edge, 0..64))
    })
}

fn build(n: usize, edges: &[(usize, usize)]) -> rivulet_graph::FlowGraph {
    let mut b = FlowGraphBuilder::new(n);
    let mut seen = std::collections::HashSet::new();
    for &(from, to) in edges {
        if seen.insert((from, to)) {
            b.receiver(from, to, 1.0, 1.0);
        }
    }
    b.build().unwrap()
}

proptest! {
    #[test]
    fn donors_mirror_receivers((n, edges) in dag_edges()) {
        let g = build(n, &edges);
        for node in 0..n {
            for &r in g.receivers(node) {
                prop_assert!(g.donors(r).contains(&node));
            }
            for &d in g.donors(node) {
                prop_assert!(g.receivers(d).contains(&node));
            }
        }
        let total_receivers: usize = g.receivers_count_array().iter().sum();
        let total_donors: usize = g.donors_count_array().iter().sum();
        prop_assert_eq!(total_receivers, total_donors);
    }

    #[test]
    fn derived_order_visits_receivers_first((n, edges) in dag_edges()) {
        let g = build(n, &edges);
        let order = g.bfs_indices().to_vec();
        prop_assert_eq!(order.len(), n);
        prop_assert!(check_upstream_order(&g, &order).is_ok());
        prop_assert_eq!(breadth_upstream_order(&g).unwrap(), order);
    }

    #[test]
    fn reversed_order_is_rejected_when_edges_exist((n, edges) in dag_edges()) {
        let g = build(n, &edges);
        let mut order = g.bfs_indices().to_vec();
        order.reverse();
        let has_edges = g.receivers_count_array().iter().any(|&c| c > 0);
        let checked = check_upstream_order(&g, &order);
        if has_edges {
            let rejected = matches!(checked, Err(GraphError::InvalidTraversal { .. }));
            prop_assert!(rejected);
        } else {
            prop_assert!(checked.is_ok());
        }
    }
}
