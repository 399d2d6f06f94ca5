//! Incremental construction of a [`FlowGraph`] from receiver edges.

use smallvec::SmallVec;

use crate::error::GraphError;
use crate::graph::{FlowGraph, FlowGraphParts};

/// A single downstream edge from a donor node to one of its receivers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReceiverEdge {
    /// Index of the receiver node.
    pub receiver: usize,
    /// Distance along the edge.
    pub distance: f64,
    /// Share of the donor's flow routed along this edge.
    pub weight: f64,
}

/// Builder collecting receiver edges node by node.
///
/// The receiver row stride of the built graph is the largest number of
/// edges given to any node. Validation happens in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct FlowGraphBuilder {
    edges: Vec<SmallVec<[ReceiverEdge; 8]>>,
    bfs_indices: Option<Vec<usize>>,
    /// First donor index given that was outside the graph.
    out_of_range: Option<usize>,
}

impl FlowGraphBuilder {
    /// Start a graph with `size` nodes and no edges.
    pub fn new(size: usize) -> Self {
        Self {
            edges: vec![SmallVec::new(); size],
            bfs_indices: None,
            out_of_range: None,
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    /// Add an edge from `node` to `receiver`.
    ///
    /// Out-of-range indices are recorded and reported by `build()`.
    pub fn receiver(
        &mut self,
        node: usize,
        receiver: usize,
        distance: f64,
        weight: f64,
    ) -> &mut Self {
        let edge = ReceiverEdge {
            receiver,
            distance,
            weight,
        };
        match self.edges.get_mut(node) {
            Some(row) => row.push(edge),
            None => {
                self.out_of_range.get_or_insert(node);
            }
        }
        self
    }

    /// Use a precomputed traversal order instead of deriving one.
    pub fn bfs_indices(&mut self, order: Vec<usize>) -> &mut Self {
        self.bfs_indices = Some(order);
        self
    }

    /// Validate the edges and build the graph.
    pub fn build(&self) -> Result<FlowGraph, GraphError> {
        FlowGraph::from_parts(self.to_parts()?)
    }

    fn to_parts(&self) -> Result<FlowGraphParts, GraphError> {
        let size = self.edges.len();
        if let Some(index) = self.out_of_range {
            return Err(GraphError::NodeOutOfRange { index, size });
        }
        let stride = self.edges.iter().map(SmallVec::len).max().unwrap_or(0);
        let cells = size * stride;

        let mut parts = FlowGraphParts {
            size,
            receiver_stride: stride,
            receivers: vec![0; cells],
            receivers_count: Vec::with_capacity(size),
            receivers_distance: vec![0.0; cells],
            receivers_weight: vec![0.0; cells],
            bfs_indices: self.bfs_indices.clone(),
        };

        for (node, row) in self.edges.iter().enumerate() {
            for (k, edge) in row.iter().enumerate() {
                if edge.receiver >= size {
                    return Err(GraphError::NodeOutOfRange {
                        index: edge.receiver,
                        size,
                    });
                }
                let slot = node * stride + k;
                parts.receivers[slot] = edge.receiver;
                parts.receivers_distance[slot] = edge.distance;
                parts.receivers_weight[slot] = edge.weight;
            }
            parts.receivers_count.push(row.len());
        }
        Ok(parts)
    }
}
