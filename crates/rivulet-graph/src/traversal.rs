//! Breadth-first upstream traversal order.
//!
//! The order starts at outlets and walks donor edges, admitting a node only
//! once every one of its receivers has been emitted. For single-flow graphs
//! this is plain breadth-first search from the outlets; for multiple-flow
//! graphs it is the breadth-first (Kahn) topological order of the receiver
//! relation, so a node with several receivers still follows all of them.

use std::collections::VecDeque;

use crate::error::GraphError;
use crate::graph::FlowGraph;

/// Compute the breadth-first upstream order of `graph`.
///
/// Returns [`GraphError::Cycle`] if some nodes can never be admitted.
pub fn breadth_upstream_order(graph: &FlowGraph) -> Result<Vec<usize>, GraphError> {
    let size = graph.size();
    let mut pending: Vec<usize> = graph.receivers_count_array().to_vec();
    let mut queue: VecDeque<usize> = graph.outlets().collect();
    let mut order = Vec::with_capacity(size);

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &donor in graph.donors(node) {
            pending[donor] -= 1;
            if pending[donor] == 0 {
                queue.push_back(donor);
            }
        }
    }

    if order.len() != size {
        return Err(GraphError::Cycle {
            unresolved: size - order.len(),
        });
    }
    Ok(order)
}

/// Check that `order` is a permutation of the graph's nodes in which every
/// receiver appears strictly before each of its donors.
pub fn check_upstream_order(graph: &FlowGraph, order: &[usize]) -> Result<(), GraphError> {
    let size = graph.size();
    if order.len() != size {
        return Err(GraphError::InvalidTraversal {
            reason: format!("order has {} entries, graph has {size} nodes", order.len()),
        });
    }

    let mut position = vec![usize::MAX; size];
    for (pos, &node) in order.iter().enumerate() {
        if node >= size {
            return Err(GraphError::InvalidTraversal {
                reason: format!("node {node} out of range"),
            });
        }
        if position[node] != usize::MAX {
            return Err(GraphError::InvalidTraversal {
                reason: format!("node {node} visited twice"),
            });
        }
        position[node] = pos;
    }

    for node in 0..size {
        for &receiver in graph.receivers(node) {
            if position[receiver] > position[node] {
                return Err(GraphError::InvalidTraversal {
                    reason: format!("node {node} visited before its receiver {receiver}"),
                });
            }
        }
    }
    Ok(())
}
