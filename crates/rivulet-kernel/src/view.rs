//! [`NodeView`] and [`ReceiverSet`]: the per-context scratch record a kernel
//! reads and writes.
//!
//! A view is created once per execution context and reused for every node
//! that context visits. Receiver buffers are sized by the layout's
//! [`CapacityPolicy`](rivulet_core::CapacityPolicy): preallocated to the
//! fixed maximum, or grown on demand and never shrunk.

use std::sync::Arc;

use rivulet_core::{ConstantSlot, Element, FieldSlot, PerDtype};

use crate::family::{Columns, Lane};
use crate::layout::KernelLayout;
use crate::store::GridDataStore;

/// Receiver data of the node currently loaded in a [`NodeView`].
///
/// Every accessor exposes exactly [`count`](Self::count) entries, in the
/// order the graph lists the node's receivers. Backing buffers may be
/// longer.
#[derive(Clone, Debug)]
pub struct ReceiverSet {
    pub(crate) count: usize,
    pub(crate) capacity: usize,
    pub(crate) distance: Vec<f64>,
    pub(crate) weight: Vec<f64>,
    pub(crate) values: PerDtype<Columns>,
}

impl ReceiverSet {
    fn new(layout: &KernelLayout, capacity: usize) -> Self {
        let t = &layout.node_template;
        Self {
            count: 0,
            capacity,
            distance: vec![0.0; capacity],
            weight: vec![0.0; capacity],
            values: PerDtype {
                f64: vec![vec![0.0; capacity]; t.f64.len()],
                f32: vec![vec![0.0; capacity]; t.f32.len()],
                i64: vec![vec![0; capacity]; t.i64.len()],
            },
        }
    }

    /// Number of receivers of the loaded node.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the loaded node is an outlet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Length of the backing buffers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Distance along each receiver edge.
    pub fn distance(&self) -> &[f64] {
        &self.distance[..self.count]
    }

    /// Flow partition weight of each receiver edge.
    pub fn weight(&self) -> &[f64] {
        &self.weight[..self.count]
    }

    /// Values of a grid field at each receiver.
    pub fn values<T: Element>(&self, slot: FieldSlot<T>) -> &[T] {
        &T::pick(&self.values)[slot.index()][..self.count]
    }

    /// Mutable receiver values. Changes are local to the view.
    pub fn values_mut<T: Element>(&mut self, slot: FieldSlot<T>) -> &mut [T] {
        let count = self.count;
        &mut T::pick_mut(&mut self.values)[slot.index()][..count]
    }

    /// Replace every buffer with a fresh one of exactly `capacity` entries.
    pub(crate) fn grow(&mut self, capacity: usize) {
        fn regrow<T: Element>(values: &mut PerDtype<Columns>, capacity: usize) {
            for buf in T::pick_mut(values).iter_mut() {
                *buf = vec![T::default(); capacity];
            }
        }
        self.distance = vec![0.0; capacity];
        self.weight = vec![0.0; capacity];
        regrow::<f64>(&mut self.values, capacity);
        regrow::<f32>(&mut self.values, capacity);
        regrow::<i64>(&mut self.values, capacity);
        self.capacity = capacity;
    }
}

/// Reusable scratch record holding one node's data.
///
/// A view is exclusively owned by one execution context. The getter loads
/// a node's field values and receiver data into it, the kernel reads and
/// modifies it, and the setter writes the declared outputs back.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use rivulet_core::{Dtype, FieldDecl};
/// use rivulet_graph::FlowGraphBuilder;
/// use rivulet_kernel::{get_node, GridDataStore, KernelSpec, NodeView};
///
/// let mut builder = FlowGraphBuilder::new(2);
/// builder.receiver(0, 1, 1.5, 1.0);
/// let layout = Arc::new(
///     KernelSpec::new()
///         .field(FieldDecl::node("z", Dtype::F64))
///         .compile()
///         .unwrap(),
/// );
/// let z = layout.slot::<f64>("z").unwrap();
///
/// let mut store = GridDataStore::new(Arc::new(builder.build().unwrap()), layout.clone());
/// store.bind("z", vec![10.0, 4.0]).unwrap();
///
/// let mut view = NodeView::new(&layout);
/// assert!(get_node(0, &store, &mut view).is_ok());
/// assert_eq!(view.get(z), 10.0);
/// assert_eq!(view.receivers().values(z), &[4.0]);
/// assert_eq!(view.receivers().distance(), &[1.5]);
/// ```
#[derive(Clone, Debug)]
pub struct NodeView {
    pub(crate) layout: Arc<KernelLayout>,
    pub(crate) node: usize,
    pub(crate) values: PerDtype<Lane>,
    pub(crate) constants: PerDtype<Lane>,
    pub(crate) receivers: ReceiverSet,
}

impl NodeView {
    /// Zero-initialised view for `layout`.
    ///
    /// Embedded constants are written here. Under a fixed capacity policy
    /// the receiver buffers are preallocated to the maximum; under the
    /// dynamic policy they start empty.
    pub fn new(layout: &Arc<KernelLayout>) -> Self {
        let capacity = layout.capacity().initial_capacity();
        Self {
            layout: Arc::clone(layout),
            node: 0,
            values: layout.node_template.clone(),
            constants: layout.constant_defaults.clone(),
            receivers: ReceiverSet::new(layout, capacity),
        }
    }

    /// Copy store-bound constants into the view.
    ///
    /// Only needed when [`KernelLayout::needs_init`] is `true`.
    pub fn init(&mut self, store: &GridDataStore) {
        self.constants.clone_from(store.constant_lanes());
    }

    /// The layout the view was created for.
    pub fn layout(&self) -> &Arc<KernelLayout> {
        &self.layout
    }

    /// Index of the node last loaded by the getter.
    pub fn node(&self) -> usize {
        self.node
    }

    /// Value of a grid field at the loaded node.
    pub fn get<T: Element>(&self, slot: FieldSlot<T>) -> T {
        T::pick(&self.values)[slot.index()]
    }

    /// Overwrite a grid field value at the loaded node.
    pub fn set<T: Element>(&mut self, slot: FieldSlot<T>, value: T) {
        T::pick_mut(&mut self.values)[slot.index()] = value;
    }

    /// Mutable reference to a grid field value at the loaded node.
    pub fn value_mut<T: Element>(&mut self, slot: FieldSlot<T>) -> &mut T {
        &mut T::pick_mut(&mut self.values)[slot.index()]
    }

    /// Value of a constant.
    pub fn constant<T: Element>(&self, slot: ConstantSlot<T>) -> T {
        T::pick(&self.constants)[slot.index()]
    }

    /// Receiver data of the loaded node.
    pub fn receivers(&self) -> &ReceiverSet {
        &self.receivers
    }

    /// Mutable receiver data of the loaded node.
    pub fn receivers_mut(&mut self) -> &mut ReceiverSet {
        &mut self.receivers
    }

    /// Node value and receiver values of one field together.
    pub fn with_receivers<T: Element>(&self, slot: FieldSlot<T>) -> (T, &[T]) {
        (self.get(slot), self.receivers.values(slot))
    }

    /// Every `T` grid field value at the loaded node, indexed by slot.
    pub fn lane<T: Element>(&self) -> &[T] {
        T::pick(&self.values)
    }

    /// Mutable variant of [`lane`](Self::lane).
    pub fn lane_mut<T: Element>(&mut self) -> &mut [T] {
        T::pick_mut(&mut self.values)
    }

    /// Every `T` constant, indexed by slot.
    pub fn constant_lane<T: Element>(&self) -> &[T] {
        T::pick(&self.constants)
    }
}

#[cfg(test)]
mod tests {
    use rivulet_core::{CapacityPolicy, Dtype, FieldDecl};
    use rivulet_graph::FlowGraphBuilder;

    use crate::KernelSpec;

    use super::*;

    fn layout(capacity: CapacityPolicy) -> Arc<KernelLayout> {
        Arc::new(
            KernelSpec::new()
                .field(FieldDecl::node("z", Dtype::F64))
                .field(FieldDecl::node("n", Dtype::I64))
                .field(FieldDecl::constant("g", 9.81))
                .field(FieldDecl::scalar("dt", Dtype::F64))
                .with_capacity(capacity)
                .compile()
                .unwrap(),
        )
    }

    #[test]
    fn fixed_policy_preallocates() {
        let l = layout(CapacityPolicy::from_max_receivers(8));
        let v = NodeView::new(&l);
        assert_eq!(v.receivers().capacity(), 8);
        assert_eq!(v.receivers().count(), 0);
        assert!(v.receivers().distance().is_empty());
        assert_eq!(v.receivers.values.f64[0].len(), 8);
        assert_eq!(v.receivers.values.i64[0].len(), 8);
    }

    #[test]
    fn dynamic_policy_starts_empty() {
        let l = layout(CapacityPolicy::Dynamic);
        let v = NodeView::new(&l);
        assert_eq!(v.receivers().capacity(), 0);
        assert!(v.receivers.weight.is_empty());
    }

    #[test]
    fn embedded_constants_set_at_creation() {
        let l = layout(CapacityPolicy::Dynamic);
        let v = NodeView::new(&l);
        let g = l.constant::<f64>("g").unwrap();
        let dt = l.constant::<f64>("dt").unwrap();
        assert_eq!(v.constant(g), 9.81);
        assert_eq!(v.constant(dt), 0.0);
    }

    #[test]
    fn init_copies_bound_constants() {
        let l = layout(CapacityPolicy::Dynamic);
        let mut store = GridDataStore::new(
            Arc::new(FlowGraphBuilder::new(1).build().unwrap()),
            l.clone(),
        );
        store.bind_constant("dt", 0.1).unwrap();
        let mut v = NodeView::new(&l);
        v.init(&store);
        assert_eq!(v.constant(l.constant::<f64>("dt").unwrap()), 0.1);
        assert_eq!(v.constant(l.constant::<f64>("g").unwrap()), 9.81);
    }

    #[test]
    fn node_values_are_mutable() {
        let l = layout(CapacityPolicy::Dynamic);
        let mut v = NodeView::new(&l);
        let z = l.slot::<f64>("z").unwrap();
        let n = l.slot::<i64>("n").unwrap();
        v.set(z, 2.5);
        *v.value_mut(n) += 3;
        assert_eq!(v.get(z), 2.5);
        assert_eq!(v.get(n), 3);
    }

    #[test]
    fn lanes_expose_slots_by_dtype() {
        let l = layout(CapacityPolicy::Dynamic);
        let mut v = NodeView::new(&l);
        assert_eq!(v.lane::<f64>().len(), 1);
        assert_eq!(v.lane::<i64>().len(), 1);
        assert!(v.lane::<f32>().is_empty());
        assert_eq!(v.constant_lane::<f64>(), &[9.81, 0.0]);
        v.lane_mut::<i64>()[0] = 7;
        assert_eq!(v.get(l.slot::<i64>("n").unwrap()), 7);
    }

    #[test]
    fn grow_replaces_buffers_exactly() {
        let l = layout(CapacityPolicy::Dynamic);
        let mut v = NodeView::new(&l);
        v.receivers.grow(3);
        assert_eq!(v.receivers().capacity(), 3);
        assert_eq!(v.receivers.distance.len(), 3);
        assert_eq!(v.receivers.values.f64[0].len(), 3);
        assert_eq!(v.receivers.values.i64[0].len(), 3);
    }
}
