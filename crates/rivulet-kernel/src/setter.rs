//! Writing a [`NodeView`]'s outputs back into a [`GridDataStore`].

use rivulet_core::{Element, ViewStatus};

use crate::store::GridDataStore;
use crate::view::NodeView;

/// Write the declared output fields of `view` to node `index` of `store`.
///
/// Non-output fields are left untouched in the store, even if the kernel
/// changed them in the view.
pub fn set_node(index: usize, view: &NodeView, store: &mut GridDataStore) -> ViewStatus {
    if index >= store.size() {
        return ViewStatus::OutOfRange;
    }
    store_outputs::<f64>(index, view, store);
    store_outputs::<f32>(index, view, store);
    store_outputs::<i64>(index, view, store);
    ViewStatus::Ok
}

fn store_outputs<T: Element>(index: usize, view: &NodeView, store: &mut GridDataStore) {
    let values = T::pick(&view.values);
    let columns = T::pick_mut(store.columns_mut());
    for &slot in view.layout.output_slots::<T>() {
        columns[slot][index] = values[slot];
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rivulet_core::{Dtype, FieldDecl};
    use rivulet_graph::FlowGraphBuilder;

    use crate::{get_node, KernelSpec};

    use super::*;

    #[test]
    fn writes_only_outputs() {
        let mut b = FlowGraphBuilder::new(2);
        b.receiver(0, 1, 1.0, 1.0);
        let layout = Arc::new(
            KernelSpec::new()
                .field(FieldDecl::node("a", Dtype::F64))
                .field(FieldDecl::node("b", Dtype::F32))
                .field(FieldDecl::node("c", Dtype::I64))
                .output("a")
                .output("c")
                .compile()
                .unwrap(),
        );
        let a = layout.slot::<f64>("a").unwrap();
        let bs = layout.slot::<f32>("b").unwrap();
        let c = layout.slot::<i64>("c").unwrap();
        let mut store = GridDataStore::new(Arc::new(b.build().unwrap()), layout.clone());
        store.bind("a", vec![1.0, 2.0]).unwrap();
        store.bind("b", vec![1.0f32, 2.0]).unwrap();
        store.bind("c", vec![1i64, 2]).unwrap();

        let mut v = NodeView::new(&layout);
        assert!(get_node(1, &store, &mut v).is_ok());
        v.set(a, 20.0);
        v.set(bs, 20.0);
        v.set(c, 20);
        assert_eq!(set_node(1, &v, &mut store), ViewStatus::Ok);

        assert_eq!(store.field(a), &[1.0, 20.0]);
        assert_eq!(store.field(bs), &[1.0, 2.0]);
        assert_eq!(store.field(c), &[1, 20]);
    }

    #[test]
    fn out_of_range_index() {
        let layout = Arc::new(KernelSpec::new().compile().unwrap());
        let mut store = GridDataStore::new(
            Arc::new(FlowGraphBuilder::new(1).build().unwrap()),
            layout.clone(),
        );
        let v = NodeView::new(&layout);
        assert_eq!(set_node(1, &v, &mut store), ViewStatus::OutOfRange);
    }
}
