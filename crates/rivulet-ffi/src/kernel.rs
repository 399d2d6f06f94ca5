//! C kernels and their operation bundle.
//!
//! [`riv_kernel_create`] compiles a spec handle and binds a C apply
//! callback to it. [`riv_kernel_ops`] then hands a scheduler the
//! [`RivKernelOps`] struct: the per-node operations as function pointers
//! plus the kernel's application order and thread count.

use std::ffi::{c_char, c_void};
use std::sync::{Arc, Mutex};

use rivulet_kernel::{FlowKernel, KernelLayout};

use crate::access::RivNodeAccess;
use crate::handle::HandleTable;
use crate::spec::{c_str, specs};
use crate::status::RivStatus;
use crate::types::{RivOrder, RivSlot};
use crate::view::{
    riv_view_apply, riv_view_create, riv_view_free, riv_view_get, riv_view_init, riv_view_set,
};

/// Kernel body supplied by C.
///
/// `apply_fn` may be called from any thread, and concurrently when views
/// of the same kernel are driven from several threads. `user_data` must
/// stay valid until the kernel and every view created from it are gone.
#[repr(C)]
pub struct RivKernelDef {
    /// Called once per node with the loaded view (must not be null).
    pub apply_fn: Option<unsafe extern "C" fn(*mut c_void, *const RivNodeAccess)>,
    /// Passed unchanged to `apply_fn`.
    pub user_data: *mut c_void,
}

/// Per-node operations of a kernel.
///
/// `getter` and `setter` return the view status code (0 = ok,
/// 1 = receiver capacity exceeded, 2 = node out of range) when the call
/// was made, and a negative [`RivStatus`] when a handle was invalid.
/// `init` is null when the kernel has no store-bound constants.
#[repr(C)]
pub struct RivKernelOps {
    /// Kernel handle to pass to `create`.
    pub kernel: u64,
    /// `(kernel, out_view) -> status`: allocate a view.
    pub create: extern "C" fn(u64, *mut u64) -> i32,
    /// `(view, store) -> status`: copy store-bound constants into a view.
    pub init: Option<extern "C" fn(u64, u64) -> i32>,
    /// `(index, store, view) -> status`: load a node into a view.
    pub getter: extern "C" fn(u64, u64, u64) -> i32,
    /// `(view) -> status`: run the kernel body on the loaded node.
    pub apply: extern "C" fn(u64) -> i32,
    /// `(index, view, store) -> status`: write the view's outputs back.
    pub setter: extern "C" fn(u64, u64, u64) -> i32,
    /// `(view) -> status`: release a view.
    pub free: extern "C" fn(u64) -> i32,
    /// A [`RivOrder`] code.
    pub application_order: i32,
    /// Number of execution contexts the kernel was configured for.
    pub n_threads: u32,
}

/// [`FlowKernel`] whose body is a C callback.
pub(crate) struct CallbackKernel {
    layout: Arc<KernelLayout>,
    apply_fn: unsafe extern "C" fn(*mut c_void, *const RivNodeAccess),
    user_data: *mut c_void,
}

// SAFETY: the FFI contract requires apply_fn and user_data to be callable
// from any thread that drives the kernel, concurrently when the caller
// schedules views on several threads.
#[allow(unsafe_code)]
unsafe impl Send for CallbackKernel {}
#[allow(unsafe_code)]
unsafe impl Sync for CallbackKernel {}

impl FlowKernel for CallbackKernel {
    fn layout(&self) -> &Arc<KernelLayout> {
        &self.layout
    }

    #[allow(unsafe_code)]
    fn apply(&self, view: &mut rivulet_kernel::NodeView) {
        let access = RivNodeAccess::new(view);
        // SAFETY: apply_fn and user_data are valid per FFI contract; access
        // points at a view exclusively borrowed for the duration of the call.
        unsafe { (self.apply_fn)(self.user_data, &access) };
    }
}

static KERNELS: Mutex<HandleTable<Arc<CallbackKernel>>> = Mutex::new(HandleTable::new());

/// Clone the kernel behind `handle`.
pub(crate) fn get_kernel(handle: u64) -> Option<Arc<CallbackKernel>> {
    KERNELS.lock().ok()?.get(handle).cloned()
}

// ── Lifecycle ──────────────────────────────────────────────────────

/// Compile a spec and bind a C kernel body to it. Consumes the spec.
///
/// The spec handle is destroyed whether or not compilation succeeds.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_kernel_create(spec: u64, def: *const RivKernelDef, out: *mut u64) -> i32 {
    ffi_guard!({
        let spec = match ffi_lock!(specs()).remove(spec) {
            Some(s) => s,
            None => return RivStatus::InvalidHandle as i32,
        };
        if def.is_null() || out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        // SAFETY: def is a valid pointer per caller contract.
        let def = unsafe { &*def };
        let Some(apply_fn) = def.apply_fn else {
            return RivStatus::InvalidArgument as i32;
        };
        let layout = match spec.compile() {
            Ok(l) => l,
            Err(e) => return RivStatus::from(&e) as i32,
        };
        let kernel = CallbackKernel {
            layout: Arc::new(layout),
            apply_fn,
            user_data: def.user_data,
        };
        let handle = ffi_lock!(KERNELS).insert(Arc::new(kernel));
        // SAFETY: out is valid per caller contract.
        unsafe { *out = handle };
        RivStatus::Ok as i32
    })
}

/// Release a kernel handle. Views and stores created from it stay valid.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_kernel_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(KERNELS).remove(handle) {
            Some(_) => RivStatus::Ok as i32,
            None => RivStatus::InvalidHandle as i32,
        }
    })
}

// ── Slots ──────────────────────────────────────────────────────────

#[allow(unsafe_code)]
fn write_slot(
    handle: u64,
    name: *const c_char,
    out: *mut RivSlot,
    lookup: impl FnOnce(&KernelLayout, &str) -> Option<RivSlot>,
) -> i32 {
    if out.is_null() {
        return RivStatus::InvalidArgument as i32;
    }
    let Some(name) = c_str(name) else {
        return RivStatus::InvalidArgument as i32;
    };
    let Some(kernel) = get_kernel(handle) else {
        return RivStatus::InvalidHandle as i32;
    };
    match lookup(kernel.layout().as_ref(), name) {
        Some(slot) => {
            // SAFETY: out is valid per caller contract.
            unsafe { *out = slot };
            RivStatus::Ok as i32
        }
        None => RivStatus::InvalidArgument as i32,
    }
}

/// Resolve a grid field name to the slot used by the node accessors.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_kernel_field_slot(
    kernel: u64,
    name: *const c_char,
    out: *mut RivSlot,
) -> i32 {
    ffi_guard!({
        write_slot(kernel, name, out, |layout, name| {
            layout.field_slot(name).map(RivSlot::from)
        })
    })
}

/// Resolve a constant or bound scalar name to its slot.
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn riv_kernel_constant_slot(
    kernel: u64,
    name: *const c_char,
    out: *mut RivSlot,
) -> i32 {
    ffi_guard!({
        write_slot(kernel, name, out, |layout, name| {
            layout
                .constants()
                .find(|(n, _)| *n == name)
                .map(|(_, info)| RivSlot::from(info.slot))
        })
    })
}

// ── Operation bundle ───────────────────────────────────────────────

/// Fill `out` with the operation bundle of a kernel.
#[allow(unsafe_code)]
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn riv_kernel_ops(kernel: u64, out: *mut RivKernelOps) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RivStatus::InvalidArgument as i32;
        }
        let Some(k) = get_kernel(kernel) else {
            return RivStatus::InvalidHandle as i32;
        };
        let ops = RivKernelOps {
            kernel,
            create: riv_view_create,
            init: if k.has_init() { Some(riv_view_init) } else { None },
            getter: riv_view_get,
            apply: riv_view_apply,
            setter: riv_view_set,
            free: riv_view_free,
            application_order: RivOrder::from(k.application_order()) as i32,
            n_threads: u32::try_from(k.n_threads()).unwrap_or(u32::MAX),
        };
        // SAFETY: out is valid per caller contract.
        unsafe { out.write(ops) };
        RivStatus::Ok as i32
    })
}
