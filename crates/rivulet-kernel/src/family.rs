//! Storage families used to group kernel data by dtype.

use rivulet_core::Family;
use smallvec::SmallVec;

/// One value per slot: `Vec<T>`.
#[derive(Clone, Copy, Debug)]
pub struct Lane;

impl Family for Lane {
    type Of<T> = Vec<T>;
}

/// One array per slot: `Vec<Vec<T>>`.
#[derive(Clone, Copy, Debug)]
pub struct Columns;

impl Family for Columns {
    type Of<T> = Vec<Vec<T>>;
}

/// Slot indices within a dtype group, independent of the element type.
#[derive(Clone, Copy, Debug)]
pub struct Indices;

impl Family for Indices {
    type Of<T> = SmallVec<[usize; 4]>;
}
