//! [`GridDataStore`]: graph connectivity plus named field arrays and constants.

use std::sync::Arc;

use rivulet_core::{BindError, ConstantSlot, Dtype, Element, FieldSlot, PerDtype, Scalar};
use rivulet_graph::FlowGraph;

use crate::family::{Columns, Lane};
use crate::layout::KernelLayout;
use crate::spec::write_scalar;

/// An owned array of one value per node, tagged with its dtype.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldArray {
    /// `f64` values.
    F64(Vec<f64>),
    /// `f32` values.
    F32(Vec<f32>),
    /// `i64` values.
    I64(Vec<i64>),
}

impl FieldArray {
    /// Element type of the array.
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::F64(_) => Dtype::F64,
            Self::F32(_) => Dtype::F32,
            Self::I64(_) => Dtype::I64,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            Self::F64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for FieldArray {
    fn from(v: Vec<f64>) -> Self {
        Self::F64(v)
    }
}

impl From<Vec<f32>> for FieldArray {
    fn from(v: Vec<f32>) -> Self {
        Self::F32(v)
    }
}

impl From<Vec<i64>> for FieldArray {
    fn from(v: Vec<i64>) -> Self {
        Self::I64(v)
    }
}

/// Connectivity and data a kernel runs over.
///
/// The store pairs a shared [`FlowGraph`] with one array per declared grid
/// field and one value per declared constant. Arrays start zero-filled and
/// are replaced wholesale by [`bind`](Self::bind) between runs; the layout
/// and graph never change.
///
/// Getters only read the store, so a `&GridDataStore` can be shared by any
/// number of execution contexts. Setters take `&mut self`.
#[derive(Clone, Debug)]
pub struct GridDataStore {
    graph: Arc<FlowGraph>,
    layout: Arc<KernelLayout>,
    columns: PerDtype<Columns>,
    constants: PerDtype<Lane>,
}

impl GridDataStore {
    /// Zero-filled store for `layout` over `graph`.
    pub fn new(graph: Arc<FlowGraph>, layout: Arc<KernelLayout>) -> Self {
        let size = graph.size();
        let columns = PerDtype {
            f64: vec![vec![0.0; size]; layout.node_template.f64.len()],
            f32: vec![vec![0.0; size]; layout.node_template.f32.len()],
            i64: vec![vec![0; size]; layout.node_template.i64.len()],
        };
        let constants = layout.constant_defaults.clone();
        Self {
            graph,
            layout,
            columns,
            constants,
        }
    }

    /// The flow graph (receivers, donors, distances, weights).
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Shared handle to the flow graph.
    pub fn graph_arc(&self) -> &Arc<FlowGraph> {
        &self.graph
    }

    /// The layout this store was built for.
    pub fn layout(&self) -> &Arc<KernelLayout> {
        &self.layout
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.graph.size()
    }

    /// Donor indices of `node`.
    pub fn donors(&self, node: usize) -> &[usize] {
        self.graph.donors(node)
    }

    /// Donor count of `node`.
    pub fn donors_count(&self, node: usize) -> usize {
        self.graph.donors_count(node)
    }

    /// Replace the array of grid field `name`.
    ///
    /// The array must have one value per node and the declared dtype.
    pub fn bind(&mut self, name: &str, array: impl Into<FieldArray>) -> Result<(), BindError> {
        let array = array.into();
        let slot = match self.layout.field_slot(name) {
            Some(slot) => slot,
            None if self.layout.constants.contains_key(name) => {
                return Err(BindError::NotNodeField { name: name.into() })
            }
            None => return Err(BindError::UnknownField { name: name.into() }),
        };
        if slot.dtype != array.dtype() {
            return Err(BindError::DtypeMismatch {
                name: name.into(),
                expected: slot.dtype,
                actual: array.dtype(),
            });
        }
        if array.len() != self.size() {
            return Err(BindError::LengthMismatch {
                name: name.into(),
                expected: self.size(),
                actual: array.len(),
            });
        }
        let index = slot.index as usize;
        match array {
            FieldArray::F64(v) => self.columns.f64[index] = v,
            FieldArray::F32(v) => self.columns.f32[index] = v,
            FieldArray::I64(v) => self.columns.i64[index] = v,
        }
        Ok(())
    }

    /// Set the value of a store-bound constant.
    ///
    /// Embedded constants are fixed at compile time and cannot be bound.
    pub fn bind_constant(&mut self, name: &str, value: impl Into<Scalar>) -> Result<(), BindError> {
        let value = value.into();
        let info = match self.layout.constants.get(name) {
            Some(info) if info.embedded.is_none() => *info,
            Some(_) => return Err(BindError::NotBindableScalar { name: name.into() }),
            None if self.layout.field_slot(name).is_some() => {
                return Err(BindError::NotBindableScalar { name: name.into() })
            }
            None => return Err(BindError::UnknownField { name: name.into() }),
        };
        if info.slot.dtype != value.dtype() {
            return Err(BindError::DtypeMismatch {
                name: name.into(),
                expected: info.slot.dtype,
                actual: value.dtype(),
            });
        }
        write_scalar(&mut self.constants, info.slot, value);
        Ok(())
    }

    /// Values of a grid field.
    pub fn field<T: Element>(&self, slot: FieldSlot<T>) -> &[T] {
        &T::pick(&self.columns)[slot.index()]
    }

    /// Mutable values of a grid field.
    pub fn field_mut<T: Element>(&mut self, slot: FieldSlot<T>) -> &mut [T] {
        &mut T::pick_mut(&mut self.columns)[slot.index()]
    }

    /// Copy of the array bound to grid field `name`.
    pub fn to_array(&self, name: &str) -> Option<FieldArray> {
        let slot = self.layout.field_slot(name)?;
        let index = slot.index as usize;
        Some(match slot.dtype {
            Dtype::F64 => FieldArray::F64(self.columns.f64[index].clone()),
            Dtype::F32 => FieldArray::F32(self.columns.f32[index].clone()),
            Dtype::I64 => FieldArray::I64(self.columns.i64[index].clone()),
        })
    }

    /// Current value of a constant.
    pub fn constant<T: Element>(&self, slot: ConstantSlot<T>) -> T {
        T::pick(&self.constants)[slot.index()]
    }

    pub(crate) fn columns(&self) -> &PerDtype<Columns> {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut PerDtype<Columns> {
        &mut self.columns
    }

    pub(crate) fn constant_lanes(&self) -> &PerDtype<Lane> {
        &self.constants
    }
}
