//! Whole-grid application through the sequential runner.

use rivulet_engine::{RunError, RunMetrics, SequentialRunner};

use crate::kernel::get_kernel;
use crate::status::RivStatus;
use crate::store::get_store;
use crate::types::RivOrder;

/// C-compatible statistics of one run.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RivRunMetrics {
    /// Wall-clock time for the whole run, in microseconds.
    pub total_us: u64,
    /// Time spent preparing the node sequence, in microseconds.
    pub index_us: u64,
    /// Number of nodes processed.
    pub nodes_visited: u64,
    /// Largest receiver count loaded into the view.
    pub max_receivers_seen: u64,
    /// Receiver capacity of the view at the end of the run.
    pub view_capacity: u64,
    /// [`RivOrder`] code the nodes were visited in.
    pub order: i32,
    /// Node at which the run stopped, or -1 if it completed.
    pub failed_index: i64,
}

impl RivRunMetrics {
    fn from_rust(m: &RunMetrics) -> Self {
        Self {
            total_us: m.total_us,
            index_us: m.index_us,
            nodes_visited: m.nodes_visited as u64,
            max_receivers_seen: m.max_receivers_seen as u64,
            view_capacity: m.view_capacity as u64,
            order: RivOrder::from(m.order) as i32,
            failed_index: -1,
        }
    }
}

/// Apply `kernel` to every node of `store` in the kernel's order.
///
/// Runs on the calling thread with a single view. On a getter or setter
/// failure the run stops, nodes already processed keep their outputs and
/// `metrics_out->failed_index` names the failing node. `metrics_out` may
/// be null.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_apply_kernel(kernel: u64, store: u64, metrics_out: *mut RivRunMetrics) -> i32 {
    ffi_guard!({
        let (Some(kernel), Some(shared)) = (get_kernel(kernel), get_store(store)) else {
            return RivStatus::InvalidHandle as i32;
        };
        let mut store = ffi_write!(shared);
        let (status, metrics) = match SequentialRunner.run(&*kernel, &mut store) {
            Ok(m) => (RivStatus::Ok, RivRunMetrics::from_rust(&m)),
            Err(e) => {
                let failed_index = match &e {
                    RunError::GetterFailed { index, .. } | RunError::SetterFailed { index, .. } => {
                        *index as i64
                    }
                    RunError::StoreMismatch => -1,
                };
                let metrics = RivRunMetrics {
                    failed_index,
                    ..RivRunMetrics::default()
                };
                (RivStatus::from(&e), metrics)
            }
        };
        if !metrics_out.is_null() {
            // SAFETY: metrics_out is valid per caller contract.
            unsafe { *metrics_out = metrics };
        }
        status as i32
    })
}

#[cfg(test)]
mod tests {
    use crate::kernel::tests::receiver_sum_handle;
    use crate::spec::tests::cstr;
    use crate::spec::{
        riv_spec_add_node_field, riv_spec_add_output, riv_spec_create, riv_spec_set_max_receivers,
    };
    use crate::store::riv_store_bind_f64;
    use crate::store::tests::{chain_store, read_values};
    use crate::types::RivDtype;
    use crate::{riv_graph_create, riv_kernel_create, RivGraphParts, RivKernelDef};

    use super::*;

    fn run_chain(order: RivOrder) -> (i32, RivRunMetrics, Vec<f64>) {
        let kernel = receiver_sum_handle(order as i32, false);
        let store = chain_store(kernel, 4);
        let value = cstr("value");
        let ones = [1.0; 4];
        assert_eq!(riv_store_bind_f64(store, value.as_ptr(), ones.as_ptr(), 4), 0);
        let mut metrics = RivRunMetrics::default();
        let status = riv_apply_kernel(kernel, store, &mut metrics);
        (status, metrics, read_values(store, 4))
    }

    #[test]
    fn upstream_order_accumulates_the_whole_chain() {
        let (status, metrics, values) = run_chain(RivOrder::BreadthUpstream);
        assert_eq!(status, 0);
        assert_eq!(values, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(metrics.nodes_visited, 4);
        assert_eq!(metrics.max_receivers_seen, 1);
        assert_eq!(metrics.order, RivOrder::BreadthUpstream as i32);
        assert_eq!(metrics.failed_index, -1);
    }

    #[test]
    fn index_order_sees_original_receivers() {
        let (status, _, values) = run_chain(RivOrder::Any);
        assert_eq!(status, 0);
        assert_eq!(values, vec![2.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn capacity_overflow_stops_the_run() {
        // Node 0 drains to both 1 and 2.
        let receivers = [1u64, 2, 2, 0, 0, 0];
        let counts = [2u64, 1, 0];
        let ones = [1.0; 6];
        let parts = RivGraphParts {
            size: 3,
            receiver_stride: 2,
            receivers: receivers.as_ptr(),
            receivers_count: counts.as_ptr(),
            receivers_distance: ones.as_ptr(),
            receivers_weight: ones.as_ptr(),
            bfs_indices: std::ptr::null(),
        };
        let mut graph = 0;
        assert_eq!(riv_graph_create(&parts, &mut graph), 0);

        let mut spec = 0;
        riv_spec_create(&mut spec);
        let value = cstr("value");
        riv_spec_add_node_field(spec, value.as_ptr(), RivDtype::F64 as i32);
        riv_spec_add_output(spec, value.as_ptr());
        riv_spec_set_max_receivers(spec, 1);
        let def = RivKernelDef {
            apply_fn: Some(crate::kernel::tests::receiver_sum),
            user_data: std::ptr::null_mut(),
        };
        let mut kernel = 0;
        assert_eq!(riv_kernel_create(spec, &def, &mut kernel), 0);
        let mut store = 0;
        assert_eq!(crate::store::riv_store_create(kernel, graph, &mut store), 0);

        let mut metrics = RivRunMetrics::default();
        assert_eq!(
            riv_apply_kernel(kernel, store, &mut metrics),
            RivStatus::CapacityExceeded as i32
        );
        assert_eq!(metrics.failed_index, 0);
    }

    #[test]
    fn null_metrics_are_allowed() {
        let kernel = receiver_sum_handle(0, false);
        let store = chain_store(kernel, 2);
        assert_eq!(riv_apply_kernel(kernel, store, std::ptr::null_mut()), 0);
        assert_eq!(
            riv_apply_kernel(kernel, u64::MAX, std::ptr::null_mut()),
            RivStatus::InvalidHandle as i32
        );
    }
}
