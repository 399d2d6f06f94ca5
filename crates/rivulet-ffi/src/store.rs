//! Grid store handles: bind arrays and scalars, read fields back.
//!
//! Each store sits behind its own `Arc<RwLock<_>>`, so the global table is
//! only locked for the handle lookup. Getters take the store lock shared
//! and may run on several threads at once; setters and binds take it
//! exclusively.

use std::ffi::c_char;
use std::sync::{Arc, Mutex, RwLock};

use rivulet_core::{Element, Scalar};
use rivulet_kernel::{FieldArray, FlowKernel, GridDataStore};

use crate::graph::get_graph;
use crate::handle::HandleTable;
use crate::kernel::get_kernel;
use crate::spec::c_str;
use crate::status::RivStatus;

pub(crate) type StoreArc = Arc<RwLock<GridDataStore>>;

static STORES: Mutex<HandleTable<StoreArc>> = Mutex::new(HandleTable::new());

/// Clone the store behind `handle`.
pub(crate) fn get_store(handle: u64) -> Option<StoreArc> {
    STORES.lock().ok()?.get(handle).cloned()
}

/// Create a zero-filled store for `kernel` over `graph`.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_store_create(kernel: u64, graph: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        let (Some(kernel), Some(graph)) = (get_kernel(kernel), get_graph(graph)) else {
            return RivStatus::InvalidHandle as i32;
        };
        let store = GridDataStore::new(graph, Arc::clone(kernel.layout()));
        let handle = ffi_lock!(STORES).insert(Arc::new(RwLock::new(store)));
        // SAFETY: out is valid per caller contract.
        unsafe { *out = handle };
        RivStatus::Ok as i32
    })
}

/// Destroy a store.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(STORES).remove(handle) {
            Some(_) => RivStatus::Ok as i32,
            None => RivStatus::InvalidHandle as i32,
        }
    })
}

// ── Binding ────────────────────────────────────────────────────────

#[allow(unsafe_code)]
fn bind_array<T: Element>(handle: u64, name: *const c_char, data: *const T, len: usize) -> i32
where
    Vec<T>: Into<FieldArray>,
{
    let Some(name) = c_str(name) else {
        return RivStatus::InvalidArgument as i32;
    };
    if data.is_null() && len > 0 {
        return RivStatus::InvalidArgument as i32;
    }
    let values = if len == 0 {
        Vec::new()
    } else {
        // SAFETY: data points to len readable elements per caller contract.
        unsafe { std::slice::from_raw_parts(data, len) }.to_vec()
    };
    let Some(shared) = get_store(handle) else {
        return RivStatus::InvalidHandle as i32;
    };
    let mut store = ffi_write!(shared);
    match store.bind(name, values) {
        Ok(()) => RivStatus::Ok as i32,
        Err(e) => RivStatus::from(&e) as i32,
    }
}

fn bind_scalar(handle: u64, name: *const c_char, value: Scalar) -> i32 {
    let Some(name) = c_str(name) else {
        return RivStatus::InvalidArgument as i32;
    };
    let Some(shared) = get_store(handle) else {
        return RivStatus::InvalidHandle as i32;
    };
    let mut store = ffi_write!(shared);
    match store.bind_constant(name, value) {
        Ok(()) => RivStatus::Ok as i32,
        Err(e) => RivStatus::from(&e) as i32,
    }
}

/// Replace the `f64` grid field `name` with `len` values copied from `data`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_bind_f64(
    store: u64,
    name: *const c_char,
    data: *const f64,
    len: usize,
) -> i32 {
    ffi_guard!({ bind_array(store, name, data, len) })
}

/// Replace the `f32` grid field `name`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_bind_f32(
    store: u64,
    name: *const c_char,
    data: *const f32,
    len: usize,
) -> i32 {
    ffi_guard!({ bind_array(store, name, data, len) })
}

/// Replace the `i64` grid field `name`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_bind_i64(
    store: u64,
    name: *const c_char,
    data: *const i64,
    len: usize,
) -> i32 {
    ffi_guard!({ bind_array(store, name, data, len) })
}

/// Set the store-bound `f64` scalar `name`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_bind_scalar_f64(store: u64, name: *const c_char, value: f64) -> i32 {
    ffi_guard!({ bind_scalar(store, name, Scalar::F64(value)) })
}

/// Set the store-bound `f32` scalar `name`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_bind_scalar_f32(store: u64, name: *const c_char, value: f32) -> i32 {
    ffi_guard!({ bind_scalar(store, name, Scalar::F32(value)) })
}

/// Set the store-bound `i64` scalar `name`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_bind_scalar_i64(store: u64, name: *const c_char, value: i64) -> i32 {
    ffi_guard!({ bind_scalar(store, name, Scalar::I64(value)) })
}

// ── Reading ────────────────────────────────────────────────────────

#[allow(unsafe_code)]
fn read_field<T: Element>(
    handle: u64,
    name: *const c_char,
    out: *mut T,
    cap: usize,
    out_len: *mut usize,
) -> i32 {
    let Some(name) = c_str(name) else {
        return RivStatus::InvalidArgument as i32;
    };
    if out_len.is_null() || (out.is_null() && cap > 0) {
        return RivStatus::InvalidArgument as i32;
    }
    let Some(shared) = get_store(handle) else {
        return RivStatus::InvalidHandle as i32;
    };
    let store = ffi_read!(shared);
    let slot = match store.layout().slot::<T>(name) {
        Ok(s) => s,
        Err(e) => return RivStatus::from(&e) as i32,
    };
    let values = store.field(slot);
    // SAFETY: out_len is valid per caller contract.
    unsafe { *out_len = values.len() };
    if cap < values.len() {
        return RivStatus::BufferTooSmall as i32;
    }
    if !values.is_empty() {
        // SAFETY: out points to cap >= values.len() writable elements.
        unsafe { std::ptr::copy_nonoverlapping(values.as_ptr(), out, values.len()) };
    }
    RivStatus::Ok as i32
}

/// Copy the `f64` grid field `name` into `out` (capacity `cap`).
///
/// `out_len` always receives the field length; if it exceeds `cap`
/// nothing is copied and `BufferTooSmall` is returned.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_read_f64(
    store: u64,
    name: *const c_char,
    out: *mut f64,
    cap: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({ read_field(store, name, out, cap, out_len) })
}

/// Copy the `f32` grid field `name` into `out`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_read_f32(
    store: u64,
    name: *const c_char,
    out: *mut f32,
    cap: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({ read_field(store, name, out, cap, out_len) })
}

/// Copy the `i64` grid field `name` into `out`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_store_read_i64(
    store: u64,
    name: *const c_char,
    out: *mut i64,
    cap: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({ read_field(store, name, out, cap, out_len) })
}
