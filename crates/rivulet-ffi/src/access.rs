//! [`RivNodeAccess`]: the loaded node as seen by a C kernel body.
//!
//! A C kernel never touches a `NodeView` directly. Its apply callback
//! receives a flat struct of accessor function pointers that call back
//! into Rust with the view hidden behind `opaque`. Slots are the
//! per-dtype indices reported by `riv_kernel_field_slot` and
//! `riv_kernel_constant_slot`; an out-of-range slot yields
//! `RIV_STATUS_INVALID_ARGUMENT` and leaves the output untouched.
//!
//! Pointers handed out by the accessors are valid until the apply
//! callback returns.

use std::ffi::c_void;

use rivulet_core::{Element, FieldSlot, SlotRef};
use rivulet_kernel::NodeView;

use crate::status::RivStatus;

/// Accessors for the node currently loaded in a view.
#[repr(C)]
pub struct RivNodeAccess {
    /// Opaque pointer to the view (do not dereference in C).
    pub opaque: *mut c_void,
    /// Index of the loaded node.
    pub node: u64,
    /// Number of receivers of the loaded node.
    pub receivers_count: u64,
    /// Receiver distances: `(opaque, out_ptr) -> status`.
    pub receivers_distance: unsafe extern "C" fn(*mut c_void, *mut *const f64) -> i32,
    /// Receiver weights: `(opaque, out_ptr) -> status`.
    pub receivers_weight: unsafe extern "C" fn(*mut c_void, *mut *const f64) -> i32,
    /// Read an `f64` field at the node: `(opaque, slot, out) -> status`.
    pub get_f64: unsafe extern "C" fn(*mut c_void, u32, *mut f64) -> i32,
    /// Write an `f64` field at the node: `(opaque, slot, value) -> status`.
    pub set_f64: unsafe extern "C" fn(*mut c_void, u32, f64) -> i32,
    /// `f64` field values at the receivers: `(opaque, slot, out_ptr) -> status`.
    pub receivers_f64: unsafe extern "C" fn(*mut c_void, u32, *mut *const f64) -> i32,
    /// Read an `f64` constant: `(opaque, slot, out) -> status`.
    pub constant_f64: unsafe extern "C" fn(*mut c_void, u32, *mut f64) -> i32,
    /// Read an `f32` field at the node.
    pub get_f32: unsafe extern "C" fn(*mut c_void, u32, *mut f32) -> i32,
    /// Write an `f32` field at the node.
    pub set_f32: unsafe extern "C" fn(*mut c_void, u32, f32) -> i32,
    /// `f32` field values at the receivers.
    pub receivers_f32: unsafe extern "C" fn(*mut c_void, u32, *mut *const f32) -> i32,
    /// Read an `f32` constant.
    pub constant_f32: unsafe extern "C" fn(*mut c_void, u32, *mut f32) -> i32,
    /// Read an `i64` field at the node.
    pub get_i64: unsafe extern "C" fn(*mut c_void, u32, *mut i64) -> i32,
    /// Write an `i64` field at the node.
    pub set_i64: unsafe extern "C" fn(*mut c_void, u32, i64) -> i32,
    /// `i64` field values at the receivers.
    pub receivers_i64: unsafe extern "C" fn(*mut c_void, u32, *mut *const i64) -> i32,
    /// Read an `i64` constant.
    pub constant_i64: unsafe extern "C" fn(*mut c_void, u32, *mut i64) -> i32,
}

const _: () = assert!(std::mem::align_of::<RivNodeAccess>() == 8);

impl RivNodeAccess {
    /// Accessors over `view`. The struct must not outlive the borrow.
    pub(crate) fn new(view: &mut NodeView) -> Self {
        let node = view.node() as u64;
        let receivers_count = view.receivers().count() as u64;
        Self {
            opaque: (view as *mut NodeView).cast::<c_void>(),
            node,
            receivers_count,
            receivers_distance: distance,
            receivers_weight: weight,
            get_f64: get::<f64>,
            set_f64: set::<f64>,
            receivers_f64: receivers::<f64>,
            constant_f64: constant::<f64>,
            get_f32: get::<f32>,
            set_f32: set::<f32>,
            receivers_f32: receivers::<f32>,
            constant_f32: constant::<f32>,
            get_i64: get::<i64>,
            set_i64: set::<i64>,
            receivers_i64: receivers::<i64>,
            constant_i64: constant::<i64>,
        }
    }
}

const OK: i32 = RivStatus::Ok as i32;
const INVALID: i32 = RivStatus::InvalidArgument as i32;

#[allow(unsafe_code)]
unsafe extern "C" fn distance(opaque: *mut c_void, out: *mut *const f64) -> i32 {
    if opaque.is_null() || out.is_null() {
        return INVALID;
    }
    // SAFETY: opaque was set from a live &mut NodeView in RivNodeAccess::new.
    let view = unsafe { &*opaque.cast::<NodeView>() };
    // SAFETY: out is valid per caller contract.
    unsafe { *out = view.receivers().distance().as_ptr() };
    OK
}

#[allow(unsafe_code)]
unsafe extern "C" fn weight(opaque: *mut c_void, out: *mut *const f64) -> i32 {
    if opaque.is_null() || out.is_null() {
        return INVALID;
    }
    // SAFETY: as in `distance`.
    let view = unsafe { &*opaque.cast::<NodeView>() };
    // SAFETY: out is valid per caller contract.
    unsafe { *out = view.receivers().weight().as_ptr() };
    OK
}

#[allow(unsafe_code)]
unsafe extern "C" fn get<T: Element>(opaque: *mut c_void, slot: u32, out: *mut T) -> i32 {
    if opaque.is_null() || out.is_null() {
        return INVALID;
    }
    // SAFETY: as in `distance`.
    let view = unsafe { &*opaque.cast::<NodeView>() };
    match view.lane::<T>().get(slot as usize) {
        Some(&value) => {
            // SAFETY: out is valid per caller contract.
            unsafe { *out = value };
            OK
        }
        None => INVALID,
    }
}

#[allow(unsafe_code)]
unsafe extern "C" fn set<T: Element>(opaque: *mut c_void, slot: u32, value: T) -> i32 {
    if opaque.is_null() {
        return INVALID;
    }
    // SAFETY: as in `distance`; the view is exclusively borrowed for the callback.
    let view = unsafe { &mut *opaque.cast::<NodeView>() };
    match view.lane_mut::<T>().get_mut(slot as usize) {
        Some(target) => {
            *target = value;
            OK
        }
        None => INVALID,
    }
}

#[allow(unsafe_code)]
unsafe extern "C" fn receivers<T: Element>(
    opaque: *mut c_void,
    slot: u32,
    out: *mut *const T,
) -> i32 {
    if opaque.is_null() || out.is_null() {
        return INVALID;
    }
    // SAFETY: as in `distance`.
    let view = unsafe { &*opaque.cast::<NodeView>() };
    if slot as usize >= view.lane::<T>().len() {
        return INVALID;
    }
    let Some(slot) = FieldSlot::<T>::from_ref(SlotRef {
        dtype: T::DTYPE,
        index: slot,
    }) else {
        return INVALID;
    };
    // SAFETY: out is valid per caller contract.
    unsafe { *out = view.receivers().values(slot).as_ptr() };
    OK
}

#[allow(unsafe_code)]
unsafe extern "C" fn constant<T: Element>(opaque: *mut c_void, slot: u32, out: *mut T) -> i32 {
    if opaque.is_null() || out.is_null() {
        return INVALID;
    }
    // SAFETY: as in `distance`.
    let view = unsafe { &*opaque.cast::<NodeView>() };
    match view.constant_lane::<T>().get(slot as usize) {
        Some(&value) => {
            // SAFETY: out is valid per caller contract.
            unsafe { *out = value };
            OK
        }
        None => INVALID,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rivulet_core::{Dtype, FieldDecl};
    use rivulet_graph::FlowGraphBuilder;
    use rivulet_kernel::{get_node, GridDataStore, KernelSpec};

    use super::*;

    #[test]
    #[allow(unsafe_code)]
    fn accessors_read_and_write_the_view() {
        let layout = Arc::new(
            KernelSpec::new()
                .field(FieldDecl::node("z", Dtype::F64))
                .field(FieldDecl::node("n", Dtype::I64))
                .field(FieldDecl::constant("k", 2.5f32))
                .compile()
                .unwrap(),
        );
        let mut b = FlowGraphBuilder::new(3);
        b.receiver(0, 1, 2.0, 0.25).receiver(0, 2, 4.0, 0.75);
        let mut store = GridDataStore::new(Arc::new(b.build().unwrap()), Arc::clone(&layout));
        store.bind("z", vec![1.0, 2.0, 3.0]).unwrap();
        store.bind("n", vec![7i64, 8, 9]).unwrap();

        let mut view = NodeView::new(&layout);
        assert!(get_node(0, &store, &mut view).is_ok());
        let access = RivNodeAccess::new(&mut view);
        assert_eq!(access.node, 0);
        assert_eq!(access.receivers_count, 2);

        // SAFETY: access wraps a live view and every out pointer is a local.
        unsafe {
            let mut z = 0.0;
            assert_eq!((access.get_f64)(access.opaque, 0, &mut z), OK);
            assert_eq!(z, 1.0);
            assert_eq!((access.get_f64)(access.opaque, 1, &mut z), INVALID);

            let mut ptr: *const f64 = std::ptr::null();
            assert_eq!((access.receivers_f64)(access.opaque, 0, &mut ptr), OK);
            assert_eq!(std::slice::from_raw_parts(ptr, 2), &[2.0, 3.0]);
            assert_eq!((access.receivers_distance)(access.opaque, &mut ptr), OK);
            assert_eq!(std::slice::from_raw_parts(ptr, 2), &[2.0, 4.0]);
            assert_eq!((access.receivers_weight)(access.opaque, &mut ptr), OK);
            assert_eq!(std::slice::from_raw_parts(ptr, 2), &[0.25, 0.75]);

            let mut rn: *const i64 = std::ptr::null();
            assert_eq!((access.receivers_i64)(access.opaque, 0, &mut rn), OK);
            assert_eq!(std::slice::from_raw_parts(rn, 2), &[8, 9]);
            assert_eq!((access.receivers_f32)(access.opaque, 0, std::ptr::null_mut()), INVALID);

            let mut k = 0.0f32;
            assert_eq!((access.constant_f32)(access.opaque, 0, &mut k), OK);
            assert_eq!(k, 2.5);

            assert_eq!((access.set_i64)(access.opaque, 0, 42), OK);
            assert_eq!((access.set_f32)(access.opaque, 0, 1.0), INVALID);
        }
        assert_eq!(view.get(layout.slot::<i64>("n").unwrap()), 42);
    }
}
