//! Flow graph handles built from a router's raw arrays.

use std::sync::{Arc, Mutex};

use rivulet_graph::{FlowGraph, FlowGraphParts};

use crate::handle::HandleTable;
use crate::status::RivStatus;

static GRAPHS: Mutex<HandleTable<Arc<FlowGraph>>> = Mutex::new(HandleTable::new());

/// Clone the graph behind `handle`.
pub(crate) fn get_graph(handle: u64) -> Option<Arc<FlowGraph>> {
    GRAPHS.lock().ok()?.get(handle).cloned()
}

/// Connectivity arrays of a flow graph, row-major with `receiver_stride`
/// entries per node.
///
/// `receivers`, `receivers_distance` and `receivers_weight` hold
/// `size * receiver_stride` elements; `receivers_count` holds `size`.
/// `bfs_indices` is either null (derive the order) or holds `size`
/// indices visiting every receiver before its donors.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RivGraphParts {
    /// Number of nodes.
    pub size: u64,
    /// Row width of the receiver arrays.
    pub receiver_stride: u64,
    /// Receiver indices.
    pub receivers: *const u64,
    /// Receivers per node.
    pub receivers_count: *const u64,
    /// Donor-to-receiver distances.
    pub receivers_distance: *const f64,
    /// Flow partition weights.
    pub receivers_weight: *const f64,
    /// Optional precomputed breadth-first upstream order.
    pub bfs_indices: *const u64,
}

fn to_usize(values: &[u64]) -> Option<Vec<usize>> {
    values.iter().map(|&v| usize::try_from(v).ok()).collect()
}

/// Copy `len` elements from a C array. Null is only accepted when empty.
#[allow(unsafe_code)]
fn copy_array<T: Copy>(ptr: *const T, len: usize) -> Option<Vec<T>> {
    if len == 0 {
        return Some(Vec::new());
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: ptr points to len readable elements per caller contract.
    Some(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec())
}

impl RivGraphParts {
    fn to_parts(&self) -> Result<FlowGraphParts, RivStatus> {
        let invalid = RivStatus::InvalidArgument;
        let size = usize::try_from(self.size).map_err(|_| invalid)?;
        let receiver_stride = usize::try_from(self.receiver_stride).map_err(|_| invalid)?;
        let cells = size.checked_mul(receiver_stride).ok_or(invalid)?;

        let receivers = copy_array(self.receivers, cells).ok_or(invalid)?;
        let receivers_count = copy_array(self.receivers_count, size).ok_or(invalid)?;
        let bfs_indices = if self.bfs_indices.is_null() {
            None
        } else {
            Some(to_usize(&copy_array(self.bfs_indices, size).ok_or(invalid)?).ok_or(invalid)?)
        };

        Ok(FlowGraphParts {
            size,
            receiver_stride,
            receivers: to_usize(&receivers).ok_or(invalid)?,
            receivers_count: to_usize(&receivers_count).ok_or(invalid)?,
            receivers_distance: copy_array(self.receivers_distance, cells).ok_or(invalid)?,
            receivers_weight: copy_array(self.receivers_weight, cells).ok_or(invalid)?,
            bfs_indices,
        })
    }
}

/// Validate the arrays in `parts` and create a graph handle.
///
/// The arrays are copied; the caller keeps ownership of its buffers.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_graph_create(parts: *const RivGraphParts, out: *mut u64) -> i32 {
    ffi_guard!({
        if parts.is_null() || out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        // SAFETY: parts is a valid pointer per caller contract.
        let parts = match unsafe { &*parts }.to_parts() {
            Ok(p) => p,
            Err(status) => return status as i32,
        };
        let graph = match FlowGraph::from_parts(parts) {
            Ok(g) => g,
            Err(e) => return RivStatus::from(&e) as i32,
        };
        let handle = ffi_lock!(GRAPHS).insert(Arc::new(graph));
        // SAFETY: out is valid per caller contract.
        unsafe { *out = handle };
        RivStatus::Ok as i32
    })
}

/// Release a graph handle. Stores built over the graph stay valid.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_graph_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(GRAPHS).remove(handle) {
            Some(_) => RivStatus::Ok as i32,
            None => RivStatus::InvalidHandle as i32,
        }
    })
}

/// Write the number of nodes of a graph to `out`.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_graph_size(handle: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        let graph = match get_graph(handle) {
            Some(g) => g,
            None => return RivStatus::InvalidHandle as i32,
        };
        // SAFETY: out is valid per caller contract.
        unsafe { *out = graph.size() as u64 };
        RivStatus::Ok as i32
    })
}
