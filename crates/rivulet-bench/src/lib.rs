//! Benchmark profiles for the rivulet flow-kernel engine.
//!
//! - [`reference_profile`]: 100x100 multiple-flow raster (10K nodes)
//! - [`stress_profile`]: 316x316 raster (~100K nodes)
//! - [`stream_power_engine`]: a ready-to-run erosion engine over a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use rivulet_engine::KernelEngine;
use rivulet_graph::FlowGraph;
use rivulet_kernel::{CompiledKernel, NodeView};
use rivulet_test_utils::fixtures::stream_power_kernel;
use rivulet_test_utils::{mfd_raster, sloped_surface};

/// A raster flow graph and the elevation it was routed on.
pub struct Profile {
    /// Multiple-flow routing graph.
    pub graph: Arc<FlowGraph>,
    /// Elevation per node.
    pub elevation: Vec<f64>,
}

fn raster_profile(nrows: usize, ncols: usize) -> Profile {
    let elevation = sloped_surface(nrows, ncols);
    let graph = Arc::new(mfd_raster(nrows, ncols, &elevation));
    Profile { graph, elevation }
}

/// 100x100 raster (10K nodes).
pub fn reference_profile() -> Profile {
    raster_profile(100, 100)
}

/// 316x316 raster (~100K nodes).
pub fn stress_profile() -> Profile {
    raster_profile(316, 316)
}

/// Stream-power erosion engine over `profile`, with all data bound.
pub fn stream_power_engine(
    profile: &Profile,
) -> KernelEngine<CompiledKernel<impl Fn(&mut NodeView) + Send + Sync>> {
    let n = profile.graph.size();
    let mut engine = KernelEngine::new(Arc::clone(&profile.graph), stream_power_kernel(1e-4, 0.5));
    engine
        .bind("elevation", profile.elevation.clone())
        .expect("elevation matches graph");
    engine
        .bind("drainage_area", vec![1.0e4; n])
        .expect("area matches graph");
    engine.bind_constant("dt", 100.0).expect("dt is bound");
    engine
}
