//! C-compatible enums and plain structs shared by several entry points.
//!
//! Enum-valued arguments cross the boundary as raw `i32` and are decoded
//! here, so an unknown discriminant from C is an `InvalidArgument`
//! rather than undefined behavior.

use rivulet_core::{ApplicationOrder, Dtype, SlotRef};

/// Element type of a field or constant.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RivDtype {
    /// `double`.
    F64 = 0,
    /// `float`.
    F32 = 1,
    /// `int64_t`.
    I64 = 2,
}

impl RivDtype {
    /// Decode a raw dtype code.
    pub fn from_raw(code: i32) -> Option<Dtype> {
        match code {
            0 => Some(Dtype::F64),
            1 => Some(Dtype::F32),
            2 => Some(Dtype::I64),
            _ => None,
        }
    }
}

impl From<Dtype> for RivDtype {
    fn from(dtype: Dtype) -> Self {
        match dtype {
            Dtype::F64 => Self::F64,
            Dtype::F32 => Self::F32,
            Dtype::I64 => Self::I64,
        }
    }
}

/// Node visiting order of a kernel.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RivOrder {
    /// Index order; the kernel does not depend on receivers being updated.
    Any = 0,
    /// Every receiver is updated before its donors.
    BreadthUpstream = 1,
}

impl From<ApplicationOrder> for RivOrder {
    fn from(order: ApplicationOrder) -> Self {
        match order {
            ApplicationOrder::Any => Self::Any,
            ApplicationOrder::BreadthUpstream => Self::BreadthUpstream,
        }
    }
}

/// Typed slot of a field or constant, as resolved by the kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RivSlot {
    /// A [`RivDtype`] code.
    pub dtype: i32,
    /// Position within that dtype's group.
    pub index: u32,
}

impl From<SlotRef> for RivSlot {
    fn from(slot: SlotRef) -> Self {
        Self {
            dtype: RivDtype::from(slot.dtype) as i32,
            index: slot.index,
        }
    }
}

const _: () = assert!(std::mem::size_of::<RivSlot>() == 8);
