//! Typed slot handles into node views and grid stores.
//!
//! A kernel resolves field names to slots once, after compilation, and
//! then addresses node values by slot in the per-node hot path. The slot
//! carries its element type statically so that a slot resolved for `f64`
//! can never read an `i64` lane.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::dtype::{Dtype, Element};

/// Untyped slot: a dtype tag plus an index within that dtype's group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotRef {
    /// Element type of the slot.
    pub dtype: Dtype,
    /// Position within the dtype group.
    pub index: u32,
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.dtype, self.index)
    }
}

macro_rules! typed_slot {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T: Element> {
            index: u32,
            _marker: PhantomData<fn() -> T>,
        }

        impl<T: Element> $name<T> {
            /// Build a typed slot from an untyped one.
            ///
            /// Returns `None` if the dtype of `slot` is not `T`.
            pub fn from_ref(slot: SlotRef) -> Option<Self> {
                (slot.dtype == T::DTYPE).then_some(Self {
                    index: slot.index,
                    _marker: PhantomData,
                })
            }

            /// Position within the dtype group.
            pub fn index(self) -> usize {
                self.index as usize
            }

            /// Erase the element type.
            pub fn erase(self) -> SlotRef {
                SlotRef {
                    dtype: T::DTYPE,
                    index: self.index,
                }
            }
        }

        impl<T: Element> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T: Element> Copy for $name<T> {}

        impl<T: Element> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }

        impl<T: Element> Eq for $name<T> {}

        impl<T: Element> Hash for $name<T> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }

        impl<T: Element> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}<{}>({})", stringify!($name), T::DTYPE, self.index)
            }
        }
    };
}

typed_slot!(
    /// Handle to a grid field (one value per node) of element type `T`.
    FieldSlot
);

typed_slot!(
    /// Handle to a constant (one value shared by all nodes) of element type `T`.
    ConstantSlot
);
