//! Error types for flow-graph construction and validation.

use std::fmt;

/// Errors arising from building or validating a [`FlowGraph`](crate::FlowGraph).
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Attempted to construct a graph with zero nodes.
    EmptyGraph,
    /// An edge references a node index outside `0..size`.
    NodeOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of nodes in the graph.
        size: usize,
    },
    /// A node lists itself as its own receiver.
    SelfLoop {
        /// The node.
        node: usize,
    },
    /// A node lists the same receiver twice.
    DuplicateEdge {
        /// The donor node.
        node: usize,
        /// The repeated receiver.
        receiver: usize,
    },
    /// An edge distance or weight is NaN or infinite.
    NonFiniteEdge {
        /// The donor node.
        node: usize,
        /// Position of the edge in the node's receiver list.
        edge: usize,
    },
    /// A node declares more receivers than the row stride holds.
    TooManyReceivers {
        /// The node.
        node: usize,
        /// Its declared receiver count.
        count: usize,
        /// The row stride.
        stride: usize,
    },
    /// A raw array has the wrong length for the graph size and stride.
    LengthMismatch {
        /// Which array.
        array: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// The receiver edges contain a cycle, so no upstream order exists.
    Cycle {
        /// Number of nodes that could not be ordered.
        unresolved: usize,
    },
    /// A supplied traversal order is not a valid upstream order.
    InvalidTraversal {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "flow graph must have at least one node"),
            Self::NodeOutOfRange { index, size } => {
                write!(f, "node index {index} out of range [0, {size})")
            }
            Self::SelfLoop { node } => write!(f, "node {node} is its own receiver"),
            Self::DuplicateEdge { node, receiver } => {
                write!(f, "node {node} lists receiver {receiver} twice")
            }
            Self::NonFiniteEdge { node, edge } => {
                write!(f, "receiver edge {edge} of node {node} is not finite")
            }
            Self::TooManyReceivers {
                node,
                count,
                stride,
            } => write!(
                f,
                "node {node} has {count} receivers, row stride is {stride}"
            ),
            Self::LengthMismatch {
                array,
                expected,
                actual,
            } => write!(f, "{array} has length {actual}, expected {expected}"),
            Self::Cycle { unresolved } => {
                write!(f, "receiver edges form a cycle ({unresolved} nodes unresolved)")
            }
            Self::InvalidTraversal { reason } => {
                write!(f, "invalid traversal order: {reason}")
            }
        }
    }
}

impl std::error::Error for GraphError {}
