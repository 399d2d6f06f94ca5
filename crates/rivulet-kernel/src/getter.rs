//! Loading one node from a [`GridDataStore`] into a [`NodeView`].
//!
//! This is the per-node hot path. It never allocates when the view's
//! receiver buffers are already large enough, and it only touches the
//! first `count` entries of each buffer.

use rivulet_core::{Element, PerDtype, ViewStatus};

use crate::family::{Columns, Lane};
use crate::store::GridDataStore;
use crate::view::NodeView;

/// Load node `index` into `view`.
///
/// Node-level field values are copied first. Under a fixed capacity
/// policy a node with more receivers than the maximum then yields
/// [`ViewStatus::CapacityExceeded`], leaving the receiver set untouched.
/// Under the dynamic policy the receiver buffers are regrown to exactly
/// the receiver count whenever it exceeds their capacity.
///
/// `view` must have been created for the same layout as `store`.
pub fn get_node(index: usize, store: &GridDataStore, view: &mut NodeView) -> ViewStatus {
    let graph = store.graph();
    if index >= graph.size() {
        return ViewStatus::OutOfRange;
    }
    debug_assert!(std::sync::Arc::ptr_eq(view.layout(), store.layout()));
    let receiver_count = graph.receivers_count(index);

    let columns = store.columns();
    view.node = index;
    load_node::<f64>(columns, &mut view.values, index);
    load_node::<f32>(columns, &mut view.values, index);
    load_node::<i64>(columns, &mut view.values, index);

    let rs = &mut view.receivers;
    match view.layout.capacity().max_receivers() {
        Some(max) if receiver_count > max => return ViewStatus::CapacityExceeded,
        Some(_) => {}
        None if receiver_count > rs.capacity => rs.grow(receiver_count),
        None => {}
    }
    rs.count = receiver_count;

    let receivers = graph.receivers(index);
    rs.distance[..receiver_count].copy_from_slice(graph.receiver_distances(index));
    rs.weight[..receiver_count].copy_from_slice(graph.receiver_weights(index));
    gather::<f64>(columns, &mut rs.values, receivers);
    gather::<f32>(columns, &mut rs.values, receivers);
    gather::<i64>(columns, &mut rs.values, receivers);
    ViewStatus::Ok
}

fn load_node<T: Element>(columns: &PerDtype<Columns>, values: &mut PerDtype<Lane>, index: usize) {
    for (dst, column) in T::pick_mut(values).iter_mut().zip(T::pick(columns)) {
        *dst = column[index];
    }
}

fn gather<T: Element>(columns: &PerDtype<Columns>, bufs: &mut PerDtype<Columns>, receivers: &[usize]) {
    for (buf, column) in T::pick_mut(bufs).iter_mut().zip(T::pick(columns)) {
        for (dst, &r) in buf.iter_mut().zip(receivers) {
            *dst = column[r];
        }
    }
}
