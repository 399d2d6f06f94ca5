//! The immutable [`FlowGraph`] and its raw-array constructor.

use crate::error::GraphError;
use crate::traversal::{breadth_upstream_order, check_upstream_order};

/// Raw connectivity arrays as produced by an external flow router.
///
/// Receiver data is stored row-major with `receiver_stride` slots per node:
/// entry `k` of node `i` lives at `i * receiver_stride + k`, and only the
/// first `receivers_count[i]` slots of a row are meaningful.
#[derive(Clone, Debug, Default)]
pub struct FlowGraphParts {
    /// Number of nodes.
    pub size: usize,
    /// Slots per row in the receiver arrays (graph-wide maximum receivers).
    pub receiver_stride: usize,
    /// Receiver node indices, `size * receiver_stride` entries.
    pub receivers: Vec<usize>,
    /// Live receiver count per node.
    pub receivers_count: Vec<usize>,
    /// Distance along each receiver edge, `size * receiver_stride` entries.
    pub receivers_distance: Vec<f64>,
    /// Flow partition weight of each receiver edge, `size * receiver_stride` entries.
    pub receivers_weight: Vec<f64>,
    /// Precomputed breadth-first upstream order. Computed when `None`.
    pub bfs_indices: Option<Vec<usize>>,
}

/// Directed flow-routing graph over `size` nodes.
///
/// Each node has zero or more receivers (downstream neighbours), each edge
/// annotated with a distance and a weight, and zero or more donors
/// (upstream neighbours). Nodes without receivers are outlets.
///
/// A `FlowGraph` is immutable once built. It is `Send + Sync` and is
/// typically shared behind an `Arc` by every execution context of a run.
///
/// # Examples
///
/// ```
/// use rivulet_graph::FlowGraphBuilder;
///
/// // 0 -> 1 -> 2, node 2 is the outlet.
/// let mut builder = FlowGraphBuilder::new(3);
/// builder.receiver(0, 1, 1.0, 1.0).receiver(1, 2, 1.0, 1.0);
/// let graph = builder.build().unwrap();
///
/// assert_eq!(graph.receivers(0), &[1]);
/// assert_eq!(graph.donors(2), &[1]);
/// assert_eq!(graph.bfs_indices(), &[2, 1, 0]);
/// ```
#[derive(Clone, Debug)]
pub struct FlowGraph {
    size: usize,
    receiver_stride: usize,
    receivers: Vec<usize>,
    receivers_count: Vec<usize>,
    receivers_distance: Vec<f64>,
    receivers_weight: Vec<f64>,
    donor_stride: usize,
    donors: Vec<usize>,
    donors_count: Vec<usize>,
    bfs_indices: Vec<usize>,
}

fn check_len(array: &'static str, len: usize, expected: usize) -> Result<(), GraphError> {
    if len != expected {
        return Err(GraphError::LengthMismatch {
            array,
            expected,
            actual: len,
        });
    }
    Ok(())
}

impl FlowGraph {
    /// Validate raw router output and derive donors.
    ///
    /// Checks array lengths, receiver indices, self-loops, duplicate and
    /// non-finite edges. If `parts.bfs_indices` is supplied it must be a
    /// permutation of `0..size` that visits every receiver before its
    /// donors; otherwise the order is computed here.
    pub fn from_parts(parts: FlowGraphParts) -> Result<Self, GraphError> {
        let FlowGraphParts {
            size,
            receiver_stride,
            receivers,
            receivers_count,
            receivers_distance,
            receivers_weight,
            bfs_indices,
        } = parts;

        if size == 0 {
            return Err(GraphError::EmptyGraph);
        }
        let cells = size.checked_mul(receiver_stride).ok_or(GraphError::LengthMismatch {
            array: "receivers",
            expected: usize::MAX,
            actual: receivers.len(),
        })?;
        check_len("receivers_count", receivers_count.len(), size)?;
        check_len("receivers", receivers.len(), cells)?;
        check_len("receivers_distance", receivers_distance.len(), cells)?;
        check_len("receivers_weight", receivers_weight.len(), cells)?;

        let mut donors_count = vec![0usize; size];
        for (node, &count) in receivers_count.iter().enumerate() {
            if count > receiver_stride {
                return Err(GraphError::TooManyReceivers {
                    node,
                    count,
                    stride: receiver_stride,
                });
            }
            let row = node * receiver_stride;
            let targets = &receivers[row..row + count];
            for (edge, &receiver) in targets.iter().enumerate() {
                if receiver >= size {
                    return Err(GraphError::NodeOutOfRange {
                        index: receiver,
                        size,
                    });
                }
                if receiver == node {
                    return Err(GraphError::SelfLoop { node });
                }
                if targets[..edge].contains(&receiver) {
                    return Err(GraphError::DuplicateEdge { node, receiver });
                }
                if !receivers_distance[row + edge].is_finite()
                    || !receivers_weight[row + edge].is_finite()
                {
                    return Err(GraphError::NonFiniteEdge { node, edge });
                }
                donors_count[receiver] += 1;
            }
        }

        // Invert receiver edges. Visiting donors in ascending index order
        // keeps each donor row sorted.
        let donor_stride = donors_count.iter().copied().max().unwrap_or(0);
        let mut donors = vec![0usize; size * donor_stride];
        let mut fill = vec![0usize; size];
        for (node, &count) in receivers_count.iter().enumerate() {
            let row = node * receiver_stride;
            for &receiver in &receivers[row..row + count] {
                donors[receiver * donor_stride + fill[receiver]] = node;
                fill[receiver] += 1;
            }
        }

        let mut graph = Self {
            size,
            receiver_stride,
            receivers,
            receivers_count,
            receivers_distance,
            receivers_weight,
            donor_stride,
            donors,
            donors_count,
            bfs_indices: Vec::new(),
        };

        graph.bfs_indices = match bfs_indices {
            Some(order) => {
                check_upstream_order(&graph, &order)?;
                order
            }
            None => breadth_upstream_order(&graph)?,
        };
        Ok(graph)
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Always returns `false`: construction rejects empty graphs.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Graph-wide maximum receivers per node (the receiver row stride).
    pub fn max_receivers(&self) -> usize {
        self.receiver_stride
    }

    /// Graph-wide maximum donors per node (the donor row stride).
    pub fn max_donors(&self) -> usize {
        self.donor_stride
    }

    /// Number of receivers of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node >= size()`.
    #[inline]
    pub fn receivers_count(&self, node: usize) -> usize {
        self.receivers_count[node]
    }

    /// Receiver indices of `node`.
    #[inline]
    pub fn receivers(&self, node: usize) -> &[usize] {
        let row = node * self.receiver_stride;
        &self.receivers[row..row + self.receivers_count[node]]
    }

    /// Edge distances to each receiver of `node`.
    #[inline]
    pub fn receiver_distances(&self, node: usize) -> &[f64] {
        let row = node * self.receiver_stride;
        &self.receivers_distance[row..row + self.receivers_count[node]]
    }

    /// Edge weights to each receiver of `node`.
    #[inline]
    pub fn receiver_weights(&self, node: usize) -> &[f64] {
        let row = node * self.receiver_stride;
        &self.receivers_weight[row..row + self.receivers_count[node]]
    }

    /// Number of donors of `node`.
    #[inline]
    pub fn donors_count(&self, node: usize) -> usize {
        self.donors_count[node]
    }

    /// Donor indices of `node`, ascending.
    #[inline]
    pub fn donors(&self, node: usize) -> &[usize] {
        let row = node * self.donor_stride;
        &self.donors[row..row + self.donors_count[node]]
    }

    /// Nodes without receivers, ascending.
    pub fn outlets(&self) -> impl Iterator<Item = usize> + '_ {
        self.receivers_count
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(node, _)| node)
    }

    /// Breadth-first upstream traversal: every node appears after all of
    /// its receivers.
    pub fn bfs_indices(&self) -> &[usize] {
        &self.bfs_indices
    }

    /// Row-major receiver index array (`size * max_receivers()` entries).
    pub fn receivers_array(&self) -> &[usize] {
        &self.receivers
    }

    /// Receiver count per node.
    pub fn receivers_count_array(&self) -> &[usize] {
        &self.receivers_count
    }

    /// Row-major receiver distance array.
    pub fn receivers_distance_array(&self) -> &[f64] {
        &self.receivers_distance
    }

    /// Row-major receiver weight array.
    pub fn receivers_weight_array(&self) -> &[f64] {
        &self.receivers_weight
    }

    /// Row-major donor index array (`size * max_donors()` entries).
    pub fn donors_array(&self) -> &[usize] {
        &self.donors
    }

    /// Donor count per node.
    pub fn donors_count_array(&self) -> &[usize] {
        &self.donors_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_parts(n: usize) -> FlowGraphParts {
        let mut parts = FlowGraphParts {
            size: n,
            receiver_stride: 1,
            receivers: vec![0; n],
            receivers_count: vec![1; n],
            receivers_distance: vec![1.0; n],
            receivers_weight: vec![1.0; n],
            bfs_indices: None,
        };
        for i in 0..n - 1 {
            parts.receivers[i] = i + 1;
        }
        parts.receivers_count[n - 1] = 0;
        parts
    }

    #[test]
    fn chain_from_parts() {
        let g = FlowGraph::from_parts(chain_parts(4)).unwrap();
        assert_eq!(g.size(), 4);
        assert_eq!(g.max_receivers(), 1);
        assert_eq!(g.max_donors(), 1);
        assert_eq!(g.receivers(0), &[1]);
        assert!(g.receivers(3).is_empty());
        assert_eq!(g.donors(3), &[2]);
        assert!(g.donors(0).is_empty());
        assert_eq!(g.outlets().collect::<Vec<_>>(), vec![3]);
        assert_eq!(g.bfs_indices(), &[3, 2, 1, 0]);
    }

    #[test]
    fn rejects_empty() {
        let parts = FlowGraphParts::default();
        assert_eq!(FlowGraph::from_parts(parts).unwrap_err(), GraphError::EmptyGraph);
    }

    #[test]
    fn rejects_short_arrays() {
        let mut parts = chain_parts(3);
        parts.receivers_weight.pop();
        assert!(matches!(
            FlowGraph::from_parts(parts),
            Err(GraphError::LengthMismatch {
                array: "receivers_weight",
                ..
            })
        ));
    }

    #[test]
    fn rejects_self_loop() {
        let mut parts = chain_parts(3);
        parts.receivers[1] = 1;
        assert_eq!(
            FlowGraph::from_parts(parts).unwrap_err(),
            GraphError::SelfLoop { node: 1 }
        );
    }

    #[test]
    fn rejects_out_of_range_receiver() {
        let mut parts = chain_parts(3);
        parts.receivers[0] = 9;
        assert_eq!(
            FlowGraph::from_parts(parts).unwrap_err(),
            GraphError::NodeOutOfRange { index: 9, size: 3 }
        );
    }

    #[test]
    fn rejects_count_above_stride() {
        let mut parts = chain_parts(3);
        parts.receivers_count[0] = 2;
        assert!(matches!(
            FlowGraph::from_parts(parts),
            Err(GraphError::TooManyReceivers { node: 0, .. })
        ));
    }

    #[test]
    fn rejects_nan_distance() {
        let mut parts = chain_parts(3);
        parts.receivers_distance[1] = f64::NAN;
        assert_eq!(
            FlowGraph::from_parts(parts).unwrap_err(),
            GraphError::NonFiniteEdge { node: 1, edge: 0 }
        );
    }

    #[test]
    fn accepts_valid_external_order() {
        let mut parts = chain_parts(3);
        parts.bfs_indices = Some(vec![2, 1, 0]);
        let g = FlowGraph::from_parts(parts).unwrap();
        assert_eq!(g.bfs_indices(), &[2, 1, 0]);
    }

    #[test]
    fn rejects_downstream_first_order() {
        let mut parts = chain_parts(3);
        parts.bfs_indices = Some(vec![0, 1, 2]);
        assert!(matches!(
            FlowGraph::from_parts(parts),
            Err(GraphError::InvalidTraversal { .. })
        ));
    }

    #[test]
    fn rejects_cycle() {
        let mut parts = chain_parts(3);
        // 0 -> 1 -> 2 -> 0
        parts.receivers[2] = 0;
        parts.receivers_count[2] = 1;
        assert_eq!(
            FlowGraph::from_parts(parts).unwrap_err(),
            GraphError::Cycle { unresolved: 3 }
        );
    }
}
