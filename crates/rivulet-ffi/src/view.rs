//! Node view handles and the per-node operations of the bundle.
//!
//! A view remembers the kernel it was created by. Every operation that
//! pairs a view with a store checks that both belong to the same kernel
//! layout and returns `KernelMismatch` otherwise.
//!
//! Lock order is view, then store. The global tables are only held for
//! handle lookups.

use std::sync::{Arc, Mutex};

use rivulet_kernel::{FlowKernel, NodeView};

use crate::handle::HandleTable;
use crate::kernel::{get_kernel, CallbackKernel};
use crate::status::RivStatus;
use crate::store::{get_store, StoreArc};

pub(crate) struct ViewEntry {
    kernel: Arc<CallbackKernel>,
    view: NodeView,
}

type ViewArc = Arc<Mutex<ViewEntry>>;

static VIEWS: Mutex<HandleTable<ViewArc>> = Mutex::new(HandleTable::new());

fn get_view(handle: u64) -> Option<ViewArc> {
    VIEWS.lock().ok()?.get(handle).cloned()
}

/// Look up a view and a store together.
fn view_and_store(view: u64, store: u64) -> Result<(ViewArc, StoreArc), RivStatus> {
    match (get_view(view), get_store(store)) {
        (Some(v), Some(s)) => Ok((v, s)),
        _ => Err(RivStatus::InvalidHandle),
    }
}

/// Allocate a view for `kernel`.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_view_create(kernel: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        let Some(kernel) = get_kernel(kernel) else {
            return RivStatus::InvalidHandle as i32;
        };
        let view = kernel.create();
        let entry = ViewEntry { kernel, view };
        let handle = ffi_lock!(VIEWS).insert(Arc::new(Mutex::new(entry)));
        // SAFETY: out is valid per caller contract.
        unsafe { *out = handle };
        RivStatus::Ok as i32
    })
}

/// Copy the store-bound constants of `store` into `view`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_view_init(view: u64, store: u64) -> i32 {
    ffi_guard!({
        let (view, store) = match view_and_store(view, store) {
            Ok(pair) => pair,
            Err(status) => return status as i32,
        };
        let mut entry = ffi_lock!(view);
        let store = ffi_read!(store);
        if !Arc::ptr_eq(entry.kernel.layout(), store.layout()) {
            return RivStatus::KernelMismatch as i32;
        }
        let ViewEntry { kernel, view } = &mut *entry;
        kernel.init(view, &store);
        RivStatus::Ok as i32
    })
}

/// Load node `index` of `store` into `view`.
///
/// Returns the view status code (0, 1 or 2) or a negative status.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_view_get(index: u64, store: u64, view: u64) -> i32 {
    ffi_guard!({
        let (view, store) = match view_and_store(view, store) {
            Ok(pair) => pair,
            Err(status) => return status as i32,
        };
        let mut entry = ffi_lock!(view);
        let store = ffi_read!(store);
        if !Arc::ptr_eq(entry.kernel.layout(), store.layout()) {
            return RivStatus::KernelMismatch as i32;
        }
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        let ViewEntry { kernel, view } = &mut *entry;
        kernel.get(index, &store, view).code()
    })
}

/// Run the kernel body on the node loaded in `view`.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_view_apply(view: u64) -> i32 {
    ffi_guard!({
        let Some(view) = get_view(view) else {
            return RivStatus::InvalidHandle as i32;
        };
        let mut entry = ffi_lock!(view);
        let ViewEntry { kernel, view } = &mut *entry;
        kernel.apply(view);
        RivStatus::Ok as i32
    })
}

/// Write the outputs of `view` to node `index` of `store`.
///
/// Returns the view status code (0 or 2) or a negative status.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_view_set(index: u64, view: u64, store: u64) -> i32 {
    ffi_guard!({
        let (view, store) = match view_and_store(view, store) {
            Ok(pair) => pair,
            Err(status) => return status as i32,
        };
        let entry = ffi_lock!(view);
        let mut store = ffi_write!(store);
        if !Arc::ptr_eq(entry.kernel.layout(), store.layout()) {
            return RivStatus::KernelMismatch as i32;
        }
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        entry.kernel.set(index, &entry.view, &mut store).code()
    })
}

/// Release a view. A call still running on another thread finishes first.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_view_free(view: u64) -> i32 {
    ffi_guard!({
        let Some(shared) = ffi_lock!(VIEWS).remove(view) else {
            return RivStatus::InvalidHandle as i32;
        };
        if let Ok(entry) = Arc::try_unwrap(shared) {
            let entry = match entry.into_inner() {
                Ok(e) => e,
                Err(_) => return RivStatus::InternalError as i32,
            };
            entry.kernel.free(entry.view);
        }
        RivStatus::Ok as i32
    })
}
