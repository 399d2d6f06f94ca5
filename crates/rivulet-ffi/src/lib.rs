//! C ABI for rivulet flow kernels.
//!
//! Graphs, kernel specs, kernels, grid stores and node views live behind
//! opaque `u64` handles. A C scheduler obtains the per-node operation
//! bundle of a kernel with [`riv_kernel_ops`] and drives it itself, or
//! hands the whole run to [`riv_apply_kernel`].
//!
//! Every exported function returns an `i32` status (see [`RivStatus`])
//! and never unwinds into C: panics are caught at the boundary, reported
//! as [`RivStatus::Panicked`], and their message is kept for
//! [`riv_last_panic_message`].
//!
//! This is the only rivulet crate that contains `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

/// Run an FFI body, converting a panic into [`RivStatus::Panicked`].
///
/// `return` inside the body returns from the guarded closure, so early
/// exits with a status code work as in a plain function.
macro_rules! ffi_guard {
    ($body:block) => {{
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(payload) => {
                $crate::record_panic(payload.as_ref());
                $crate::status::RivStatus::Panicked as i32
            }
        }
    }};
}

/// Lock a mutex, returning [`RivStatus::InternalError`] if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RivStatus::InternalError as i32,
        }
    };
}

/// Shared lock on an `RwLock`, [`RivStatus::InternalError`] if poisoned.
macro_rules! ffi_read {
    ($lock:expr) => {
        match $lock.read() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RivStatus::InternalError as i32,
        }
    };
}

/// Exclusive lock on an `RwLock`, [`RivStatus::InternalError`] if poisoned.
macro_rules! ffi_write {
    ($lock:expr) => {
        match $lock.write() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RivStatus::InternalError as i32,
        }
    };
}

pub mod access;
pub mod graph;
mod handle;
pub mod kernel;
pub mod run;
pub mod spec;
pub mod status;
pub mod store;
pub mod types;
pub mod view;

pub use access::RivNodeAccess;
pub use graph::{riv_graph_create, riv_graph_destroy, riv_graph_size, RivGraphParts};
pub use kernel::{
    riv_kernel_constant_slot, riv_kernel_create, riv_kernel_destroy, riv_kernel_field_slot,
    riv_kernel_ops, RivKernelDef, RivKernelOps,
};
pub use run::{riv_apply_kernel, RivRunMetrics};
pub use status::RivStatus;
pub use types::{RivDtype, RivOrder, RivSlot};

thread_local! {
    static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

pub(crate) fn record_panic(payload: &(dyn Any + Send)) {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_owned()
    };
    LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
}

/// Copy the message of the last panic caught on this thread into `buf`.
///
/// Writes at most `cap - 1` bytes followed by a NUL terminator. Returns
/// the full message length in bytes (excluding the terminator), so a
/// return value `>= cap` means the message was truncated. Returns 0 when
/// no panic has been caught. `buf` may be null to query the length.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let message = cell.borrow();
        let bytes = message.as_bytes();
        if !buf.is_null() && cap > 0 {
            let n = bytes.len().min(cap - 1);
            // SAFETY: buf points to at least cap writable bytes per caller contract.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buf, n);
                *buf.add(n) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}
