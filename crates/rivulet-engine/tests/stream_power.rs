//! Implicit stream-power erosion over a multiple-flow raster.

use std::sync::Arc;

use rivulet_engine::KernelEngine;
use rivulet_test_utils::fixtures::stream_power_kernel;
use rivulet_test_utils::{mfd_raster, sloped_surface};

#[test]
fn erosion_lowers_interior_and_keeps_outlets() {
    let (nrows, ncols) = (10, 8);
    let elevation = sloped_surface(nrows, ncols);
    let graph = Arc::new(mfd_raster(nrows, ncols, &elevation));
    let n = graph.size();

    let mut engine = KernelEngine::new(Arc::clone(&graph), stream_power_kernel(1e-3, 0.5));
    engine.bind("elevation", elevation.clone()).unwrap();
    engine.bind("drainage_area", vec![100.0; n]).unwrap();
    engine.bind_constant("dt", 10.0).unwrap();
    engine.run().unwrap();

    let eroded = engine.field::<f64>("elevation").unwrap();
    for node in 0..n {
        if graph.receivers_count(node) == 0 {
            assert_eq!(eroded[node], elevation[node], "outlet {node} moved");
        } else {
            assert!(eroded[node] < elevation[node], "node {node} not eroded");
            // Implicit scheme never cuts below the lowest receiver.
            let floor = graph
                .receivers(node)
                .iter()
                .map(|&r| eroded[r])
                .fold(f64::INFINITY, f64::min);
            assert!(eroded[node] > floor);
        }
    }
    let area = engine.field::<f64>("drainage_area").unwrap();
    assert!(area.iter().all(|&a| a == 100.0));
}

#[test]
fn zero_timestep_changes_nothing() {
    let (nrows, ncols) = (6, 6);
    let elevation = sloped_surface(nrows, ncols);
    let graph = mfd_raster(nrows, ncols, &elevation);
    let n = graph.size();

    let mut engine = KernelEngine::new(graph, stream_power_kernel(1e-3, 0.5));
    engine.bind("elevation", elevation.clone()).unwrap();
    engine.bind("drainage_area", vec![50.0; n]).unwrap();
    engine.bind_constant("dt", 0.0).unwrap();
    engine.run().unwrap();
    assert_eq!(engine.field::<f64>("elevation").unwrap(), elevation.as_slice());
}
