//! Test fixtures and reference kernels for rivulet development.
//!
//! Graph fixtures cover the shapes the engine tests care about: a simple
//! chain, a confluence where several donors share a receiver, a diamond
//! where one node has several receivers, and a multiple-flow raster with
//! varied receiver counts. Reference kernels live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Arc;

use rivulet_graph::{FlowGraph, FlowGraphBuilder};

/// `0 -> 1 -> ... -> n-1`, unit distances and weights. Node `n-1` is the outlet.
pub fn chain_graph(n: usize) -> FlowGraph {
    let mut b = FlowGraphBuilder::new(n);
    for i in 0..n.saturating_sub(1) {
        b.receiver(i, i + 1, 1.0, 1.0);
    }
    b.build().expect("chain graph is valid")
}

/// Nodes `0..n-1` all drain to node `n-1`, the single outlet.
pub fn confluence_graph(n: usize) -> FlowGraph {
    let mut b = FlowGraphBuilder::new(n);
    for i in 0..n.saturating_sub(1) {
        b.receiver(i, n - 1, 1.0 + i as f64, 1.0);
    }
    b.build().expect("confluence graph is valid")
}

/// 0 and 1 drain to both 2 and 3, 2 drains to 3. Node 3 is the outlet.
pub fn diamond_graph() -> FlowGraph {
    let mut b = FlowGraphBuilder::new(4);
    b.receiver(0, 2, 1.0, 0.5)
        .receiver(0, 3, std::f64::consts::SQRT_2, 0.5)
        .receiver(1, 2, 1.0, 0.75)
        .receiver(1, 3, std::f64::consts::SQRT_2, 0.25)
        .receiver(2, 3, 1.0, 1.0);
    b.build().expect("diamond graph is valid")
}

/// Tilted surface with a small deterministic roughness, lowest at row 0.
pub fn sloped_surface(nrows: usize, ncols: usize) -> Vec<f64> {
    (0..nrows * ncols)
        .map(|i| {
            let (row, col) = (i / ncols, i % ncols);
            row as f64 + 0.1 * col as f64 + ((i * 7919) % 13) as f64 * 0.05
        })
        .collect()
}

/// Multiple-flow-direction routing over a row-major raster.
///
/// Boundary cells are outlets. Every interior cell drains to each of its
/// eight neighbours that is strictly lower, with weights proportional to
/// the slope; interior pits become outlets. Edges always point downhill,
/// so the graph is acyclic.
pub fn mfd_raster(nrows: usize, ncols: usize, elevation: &[f64]) -> FlowGraph {
    assert_eq!(elevation.len(), nrows * ncols);
    let mut b = FlowGraphBuilder::new(nrows * ncols);
    for row in 1..nrows.saturating_sub(1) {
        for col in 1..ncols.saturating_sub(1) {
            let node = row * ncols + col;
            let mut edges = Vec::with_capacity(8);
            for dr in -1isize..=1 {
                for dc in -1isize..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let r = (row as isize + dr) as usize;
                    let c = (col as isize + dc) as usize;
                    let neighbour = r * ncols + c;
                    let distance = if dr != 0 && dc != 0 {
                        std::f64::consts::SQRT_2
                    } else {
                        1.0
                    };
                    let drop = elevation[node] - elevation[neighbour];
                    if drop > 0.0 {
                        edges.push((neighbour, distance, drop / distance));
                    }
                }
            }
            let total: f64 = edges.iter().map(|e| e.2).sum();
            for (neighbour, distance, slope) in edges {
                b.receiver(node, neighbour, distance, slope / total);
            }
        }
    }
    b.build().expect("downhill edges are acyclic")
}

/// Shorthand for sharing a fixture graph.
pub fn shared(graph: FlowGraph) -> Arc<FlowGraph> {
    Arc::new(graph)
}
