//! Kernel specification builder behind an opaque handle.
//!
//! C callers declare fields, outputs and run settings incrementally, then
//! pass the handle to [`riv_kernel_create`](crate::riv_kernel_create),
//! which consumes it.

use std::ffi::{c_char, CStr};
use std::sync::Mutex;

use rivulet_core::{ApplicationOrder, FieldDecl, Scalar};
use rivulet_kernel::KernelSpec;

use crate::handle::HandleTable;
use crate::status::RivStatus;
use crate::types::RivDtype;

static SPECS: Mutex<HandleTable<KernelSpec>> = Mutex::new(HandleTable::new());

pub(crate) fn specs() -> &'static Mutex<HandleTable<KernelSpec>> {
    &SPECS
}

/// Borrow a NUL-terminated UTF-8 string from C.
#[allow(unsafe_code)]
pub(crate) fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: ptr is a valid NUL-terminated string per caller contract.
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Apply `edit` to the spec behind `handle`.
fn edit_spec(handle: u64, edit: impl FnOnce(KernelSpec) -> KernelSpec) -> i32 {
    let mut table = ffi_lock!(SPECS);
    let spec = match table.get_mut(handle) {
        Some(s) => s,
        None => return RivStatus::InvalidHandle as i32,
    };
    *spec = edit(std::mem::take(spec));
    RivStatus::Ok as i32
}

// ── Lifecycle ──────────────────────────────────────────────────────

/// Create an empty specification. Returns its handle via `out`.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_spec_create(out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        let handle = ffi_lock!(SPECS).insert(KernelSpec::new());
        // SAFETY: out is valid per caller contract.
        unsafe { *out = handle };
        RivStatus::Ok as i32
    })
}

/// Destroy a specification that was not consumed by a kernel.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(SPECS).remove(handle) {
            Some(_) => RivStatus::Ok as i32,
            None => RivStatus::InvalidHandle as i32,
        }
    })
}

// ── Fields ─────────────────────────────────────────────────────────

/// Declare a grid field (one value per node) of the given [`RivDtype`].
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_add_node_field(handle: u64, name: *const c_char, dtype: i32) -> i32 {
    ffi_guard!({
        let (Some(name), Some(dtype)) = (c_str(name), RivDtype::from_raw(dtype)) else {
            return RivStatus::InvalidArgument as i32;
        };
        edit_spec(handle, |s| s.field(FieldDecl::node(name, dtype)))
    })
}

/// Declare a scalar whose value is bound on each store.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_add_scalar(handle: u64, name: *const c_char, dtype: i32) -> i32 {
    ffi_guard!({
        let (Some(name), Some(dtype)) = (c_str(name), RivDtype::from_raw(dtype)) else {
            return RivStatus::InvalidArgument as i32;
        };
        edit_spec(handle, |s| s.field(FieldDecl::scalar(name, dtype)))
    })
}

fn add_constant(handle: u64, name: *const c_char, value: Scalar) -> i32 {
    let Some(name) = c_str(name) else {
        return RivStatus::InvalidArgument as i32;
    };
    edit_spec(handle, |s| s.field(FieldDecl::constant(name, value)))
}

/// Declare an `f64` constant embedded in every view.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_add_constant_f64(handle: u64, name: *const c_char, value: f64) -> i32 {
    ffi_guard!({ add_constant(handle, name, Scalar::F64(value)) })
}

/// Declare an `f32` constant embedded in every view.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_add_constant_f32(handle: u64, name: *const c_char, value: f32) -> i32 {
    ffi_guard!({ add_constant(handle, name, Scalar::F32(value)) })
}

/// Declare an `i64` constant embedded in every view.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_add_constant_i64(handle: u64, name: *const c_char, value: i64) -> i32 {
    ffi_guard!({ add_constant(handle, name, Scalar::I64(value)) })
}

/// Mark a grid field as written back by the setter.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_add_output(handle: u64, name: *const c_char) -> i32 {
    ffi_guard!({
        let Some(name) = c_str(name) else {
            return RivStatus::InvalidArgument as i32;
        };
        edit_spec(handle, |s| s.output(name))
    })
}

// ── Settings ───────────────────────────────────────────────────────

/// Receiver capacity: positive = fixed maximum, anything else = dynamic.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_set_max_receivers(handle: u64, max_receivers: i64) -> i32 {
    ffi_guard!({ edit_spec(handle, |s| s.with_max_receivers(max_receivers)) })
}

/// Number of execution contexts. Zero is rejected when the kernel is created.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_set_threads(handle: u64, n_threads: u32) -> i32 {
    ffi_guard!({ edit_spec(handle, |s| s.with_threads(n_threads as usize)) })
}

/// Application order as a [`RivOrder`](crate::RivOrder) code.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_spec_set_order(handle: u64, order: i32) -> i32 {
    ffi_guard!({
        let order = match ApplicationOrder::from_raw(order) {
            Ok(o) => o,
            Err(e) => return RivStatus::from(&e) as i32,
        };
        edit_spec(handle, |s| s.with_order(order))
    })
}
