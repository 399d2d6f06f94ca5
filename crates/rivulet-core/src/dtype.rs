//! Element dtypes, scalar values, and per-dtype storage grouping.
//!
//! Grid fields and constants carry one of a small closed set of numeric
//! types. Storage is grouped by dtype ([`PerDtype`]) so that copy loops in
//! the node-view getter stay monomorphic: one tight loop per dtype rather
//! than a branch per value.

use std::fmt;

/// Numeric type of a grid field or constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// 64-bit float.
    F64,
    /// 32-bit float.
    F32,
    /// 64-bit signed integer.
    I64,
}

impl Dtype {
    /// All supported dtypes, in storage order.
    pub const ALL: [Dtype; 3] = [Dtype::F64, Dtype::F32, Dtype::I64];

    /// Size of one element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::F64 | Self::I64 => 8,
            Self::F32 => 4,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F64 => write!(f, "f64"),
            Self::F32 => write!(f, "f32"),
            Self::I64 => write!(f, "i64"),
        }
    }
}

/// A single typed value, used for constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    /// 64-bit float value.
    F64(f64),
    /// 32-bit float value.
    F32(f32),
    /// 64-bit signed integer value.
    I64(i64),
}

impl Scalar {
    /// The dtype of this value.
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::F64(_) => Dtype::F64,
            Self::F32(_) => Dtype::F32,
            Self::I64(_) => Dtype::I64,
        }
    }

    /// The zero value of the given dtype.
    pub fn zero(dtype: Dtype) -> Self {
        match dtype {
            Dtype::F64 => Self::F64(0.0),
            Dtype::F32 => Self::F32(0.0),
            Dtype::I64 => Self::I64(0),
        }
    }

    /// Lossy conversion to `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::F64(v) => v,
            Self::F32(v) => f64::from(v),
            Self::I64(v) => v as f64,
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

/// A storage shape parameterised over the element type.
///
/// `Of<T>` is the container used for elements of type `T`, e.g. `Vec<T>`
/// for one value per slot or `Vec<Vec<T>>` for one array per slot.
pub trait Family {
    /// Container for elements of type `T`.
    type Of<T>;
}

/// One container per dtype, selected statically through [`Element::pick`].
pub struct PerDtype<F: Family> {
    /// Container for `f64` elements.
    pub f64: F::Of<f64>,
    /// Container for `f32` elements.
    pub f32: F::Of<f32>,
    /// Container for `i64` elements.
    pub i64: F::Of<i64>,
}

impl<F: Family> Default for PerDtype<F>
where
    F::Of<f64>: Default,
    F::Of<f32>: Default,
    F::Of<i64>: Default,
{
    fn default() -> Self {
        Self {
            f64: Default::default(),
            f32: Default::default(),
            i64: Default::default(),
        }
    }
}

impl<F: Family> Clone for PerDtype<F>
where
    F::Of<f64>: Clone,
    F::Of<f32>: Clone,
    F::Of<i64>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            f64: self.f64.clone(),
            f32: self.f32.clone(),
            i64: self.i64.clone(),
        }
    }
}

impl<F: Family> PartialEq for PerDtype<F>
where
    F::Of<f64>: PartialEq,
    F::Of<f32>: PartialEq,
    F::Of<i64>: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.f64 == other.f64 && self.f32 == other.f32 && self.i64 == other.i64
    }
}

impl<F: Family> fmt::Debug for PerDtype<F>
where
    F::Of<f64>: fmt::Debug,
    F::Of<f32>: fmt::Debug,
    F::Of<i64>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerDtype")
            .field("f64", &self.f64)
            .field("f32", &self.f32)
            .field("i64", &self.i64)
            .finish()
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for i64 {}
}

/// A numeric element type storable in grid fields and constants.
///
/// Sealed: implemented for `f64`, `f32`, and `i64` only.
pub trait Element:
    Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static + sealed::Sealed
{
    /// The runtime tag for this element type.
    const DTYPE: Dtype;

    /// Select this type's container from a [`PerDtype`] group.
    fn pick<F: Family>(set: &PerDtype<F>) -> &F::Of<Self>;

    /// Mutable variant of [`pick`](Self::pick).
    fn pick_mut<F: Family>(set: &mut PerDtype<F>) -> &mut F::Of<Self>;

    /// Extract a value of exactly this dtype from a [`Scalar`].
    fn from_scalar(value: Scalar) -> Option<Self>;

    /// Wrap this value in a [`Scalar`].
    fn to_scalar(self) -> Scalar;

    /// Lossy conversion to `f64` (used at the C boundary).
    fn to_f64(self) -> f64;

    /// Lossy conversion from `f64` (used at the C boundary).
    fn from_f64(value: f64) -> Self;
}

impl Element for f64 {
    const DTYPE: Dtype = Dtype::F64;

    fn pick<F: Family>(set: &PerDtype<F>) -> &F::Of<f64> {
        &set.f64
    }

    fn pick_mut<F: Family>(set: &mut PerDtype<F>) -> &mut F::Of<f64> {
        &mut set.f64
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::F64(v) => Some(v),
            _ => None,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::F64(self)
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Element for f32 {
    const DTYPE: Dtype = Dtype::F32;

    fn pick<F: Family>(set: &PerDtype<F>) -> &F::Of<f32> {
        &set.f32
    }

    fn pick_mut<F: Family>(set: &mut PerDtype<F>) -> &mut F::Of<f32> {
        &mut set.f32
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::F32(v) => Some(v),
            _ => None,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::F32(self)
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Element for i64 {
    const DTYPE: Dtype = Dtype::I64;

    fn pick<F: Family>(set: &PerDtype<F>) -> &F::Of<i64> {
        &set.i64
    }

    fn pick_mut<F: Family>(set: &mut PerDtype<F>) -> &mut F::Of<i64> {
        &mut set.i64
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::I64(v) => Some(v),
            _ => None,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::I64(self)
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Single;
    impl Family for Single {
        type Of<T> = Vec<T>;
    }

    #[test]
    fn pick_selects_matching_container() {
        let mut set: PerDtype<Single> = PerDtype::default();
        f64::pick_mut(&mut set).push(1.5);
        f32::pick_mut(&mut set).push(2.5);
        i64::pick_mut(&mut set).push(3);

        assert_eq!(f64::pick(&set), &vec![1.5]);
        assert_eq!(f32::pick(&set), &vec![2.5f32]);
        assert_eq!(i64::pick(&set), &vec![3]);
    }

    #[test]
    fn scalar_round_trip_respects_dtype() {
        assert_eq!(f64::from_scalar(Scalar::F64(2.0)), Some(2.0));
        assert_eq!(f64::from_scalar(Scalar::F32(2.0)), None);
        assert_eq!(i64::from_scalar(Scalar::I64(-4)), Some(-4));
        assert_eq!(7i64.to_scalar().dtype(), Dtype::I64);
    }

    #[test]
    fn zero_scalars_have_requested_dtype() {
        for dtype in Dtype::ALL {
            assert_eq!(Scalar::zero(dtype).dtype(), dtype);
            assert_eq!(Scalar::zero(dtype).as_f64(), 0.0);
        }
    }

    #[test]
    fn size_bytes() {
        assert_eq!(Dtype::F64.size_bytes(), 8);
        assert_eq!(Dtype::F32.size_bytes(), 4);
        assert_eq!(Dtype::I64.size_bytes(), 8);
    }
}
