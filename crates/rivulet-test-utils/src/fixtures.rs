//! Reference kernels.
//!
//! - [`receiver_sum_kernel`]: `value += sum(receiver values)`, the
//!   order-sensitive kernel of the chain scenarios.
//! - [`stream_power_kernel`]: implicit multiple-flow stream-power erosion,
//!   which needs receivers finalised first.
//! - [`RecordingKernel`]: records the order in which nodes are applied.

use std::sync::{Arc, Mutex};

use rivulet_core::{ApplicationOrder, CapacityPolicy, Dtype, FieldDecl};
use rivulet_kernel::{CompiledKernel, FlowKernel, KernelLayout, KernelSpec, NodeView};

/// Spec of a kernel with one `f64` grid field `value` that is also its output.
pub fn receiver_sum_spec(order: ApplicationOrder, capacity: CapacityPolicy) -> KernelSpec {
    KernelSpec::new()
        .field(FieldDecl::node("value", Dtype::F64))
        .output("value")
        .with_order(order)
        .with_capacity(capacity)
}

/// `value = value + sum(receiver values)`.
pub fn receiver_sum_kernel(
    order: ApplicationOrder,
    capacity: CapacityPolicy,
) -> CompiledKernel<impl Fn(&mut NodeView) + Send + Sync> {
    let layout = receiver_sum_spec(order, capacity)
        .compile()
        .expect("receiver sum spec is valid");
    let value = layout.slot::<f64>("value").expect("value is declared");
    CompiledKernel::new(layout, move |view: &mut NodeView| {
        let (own, receivers) = view.with_receivers(value);
        let updated = own + receivers.iter().sum::<f64>();
        view.set(value, updated);
    })
}

/// Implicit stream-power erosion over multiple-flow receivers.
///
/// Grid fields `elevation` (output) and `drainage_area`; embedded
/// constants `k_coef` and `area_exp`; store-bound scalar `dt`. Solves
/// `h' = (h + f * sum(w * h_r / d)) / (1 + f * sum(w / d))` with
/// `f = dt * k_coef * area^area_exp`, which only holds when every
/// receiver was updated before the node.
pub fn stream_power_kernel(
    k_coef: f64,
    area_exp: f64,
) -> CompiledKernel<impl Fn(&mut NodeView) + Send + Sync> {
    let layout = KernelSpec::new()
        .field(FieldDecl::node("elevation", Dtype::F64))
        .field(FieldDecl::node("drainage_area", Dtype::F64))
        .field(FieldDecl::constant("k_coef", k_coef))
        .field(FieldDecl::constant("area_exp", area_exp))
        .field(FieldDecl::scalar("dt", Dtype::F64))
        .output("elevation")
        .with_order(ApplicationOrder::BreadthUpstream)
        .compile()
        .expect("stream power spec is valid");
    let elevation = layout.slot::<f64>("elevation").expect("declared");
    let area = layout.slot::<f64>("drainage_area").expect("declared");
    let k = layout.constant::<f64>("k_coef").expect("declared");
    let m = layout.constant::<f64>("area_exp").expect("declared");
    let dt = layout.constant::<f64>("dt").expect("declared");

    CompiledKernel::new(layout, move |view: &mut NodeView| {
        let rs = view.receivers();
        if rs.is_empty() {
            return;
        }
        let factor = view.constant(dt) * view.constant(k) * view.get(area).powf(view.constant(m));
        let mut num = 0.0;
        let mut den = 0.0;
        for ((&h_r, &w), &d) in rs.values(elevation).iter().zip(rs.weight()).zip(rs.distance()) {
            num += w * h_r / d;
            den += w / d;
        }
        let h = (view.get(elevation) + factor * num) / (1.0 + factor * den);
        view.set(elevation, h);
    })
}

/// Kernel that does not change any data and records each node it is
/// applied to.
pub struct RecordingKernel {
    layout: Arc<KernelLayout>,
    visited: Mutex<Vec<usize>>,
}

impl RecordingKernel {
    pub fn new(order: ApplicationOrder) -> Self {
        let layout = KernelSpec::new()
            .field(FieldDecl::node("value", Dtype::F64))
            .with_order(order)
            .compile()
            .expect("recording spec is valid");
        Self {
            layout: Arc::new(layout),
            visited: Mutex::new(Vec::new()),
        }
    }

    /// Nodes applied so far, in order.
    pub fn visited(&self) -> Vec<usize> {
        self.visited.lock().expect("not poisoned").clone()
    }
}

impl FlowKernel for RecordingKernel {
    fn layout(&self) -> &Arc<KernelLayout> {
        &self.layout
    }

    fn apply(&self, view: &mut NodeView) {
        self.visited.lock().expect("not poisoned").push(view.node());
    }
}
