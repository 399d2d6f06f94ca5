//! Kernel specification and compilation into a [`KernelLayout`].
//!
//! [`KernelSpec`] is the whole build-time configuration surface of a
//! kernel: field declarations, outputs, receiver capacity policy, thread
//! count and application order. [`compile`](KernelSpec::compile) checks it
//! once and assigns every field a slot; nothing is validated per node.

use std::collections::HashSet;
use std::time::Instant;

use indexmap::IndexMap;
use smallvec::SmallVec;

use rivulet_core::{
    ApplicationOrder, CapacityPolicy, CompileError, Dtype, Element, FieldDecl, FieldShape,
    OrderError, PerDtype, Scalar, SlotRef,
};

use crate::family::{Indices, Lane};
use crate::layout::{ConstantInfo, KernelLayout};
use crate::metrics::BuildMetrics;

/// Build-time description of a flow kernel.
///
/// # Examples
///
/// ```
/// use rivulet_core::{Dtype, FieldDecl};
/// use rivulet_kernel::KernelSpec;
///
/// let layout = KernelSpec::new()
///     .field(FieldDecl::node("value", Dtype::F64))
///     .output("value")
///     .compile()
///     .unwrap();
/// assert_eq!(layout.node_field_count(), 1);
/// assert!(!layout.needs_init());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KernelSpec {
    /// Grid fields and constants, in declaration order.
    pub fields: Vec<FieldDecl>,
    /// Names of grid fields written back to the store after each node.
    pub outputs: Vec<String>,
    /// Receiver buffer policy of node views. Default: dynamic.
    pub capacity: CapacityPolicy,
    /// Number of execution contexts. Default: 1.
    pub n_threads: usize,
    /// Node visiting order. Default: [`ApplicationOrder::Any`].
    pub order: ApplicationOrder,
}

impl Default for KernelSpec {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            outputs: Vec::new(),
            capacity: CapacityPolicy::Dynamic,
            n_threads: 1,
            order: ApplicationOrder::Any,
        }
    }
}

impl KernelSpec {
    /// Empty specification with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a grid field or constant.
    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.fields.push(decl);
        self
    }

    /// Mark a grid field as written back by the setter.
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    /// Set the receiver capacity policy.
    pub fn with_capacity(mut self, capacity: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the capacity from a signed maximum; see
    /// [`CapacityPolicy::from_max_receivers`].
    pub fn with_max_receivers(self, max_receivers: i64) -> Self {
        self.with_capacity(CapacityPolicy::from_max_receivers(max_receivers))
    }

    /// Set the thread count.
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    /// Set the application order.
    pub fn with_order(mut self, order: ApplicationOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the application order from its raw code.
    pub fn with_order_code(self, code: i32) -> Result<Self, OrderError> {
        Ok(self.with_order(ApplicationOrder::from_raw(code)?))
    }

    /// Validate the specification and assign slots.
    ///
    /// Fails if a declaration is malformed, a name is declared twice, the
    /// thread count is zero, or any output is not a grid field. All
    /// offending outputs are reported together.
    pub fn compile(&self) -> Result<KernelLayout, CompileError> {
        if self.n_threads == 0 {
            return Err(CompileError::ZeroThreads);
        }
        let mut metrics = BuildMetrics::default();

        let start = Instant::now();
        let mut node_decls = Vec::new();
        let mut scalar_decls = Vec::new();
        let mut seen = HashSet::with_capacity(self.fields.len());
        for decl in &self.fields {
            decl.validate()?;
            if !seen.insert(decl.name.as_str()) {
                return Err(CompileError::DuplicateField {
                    name: decl.name.clone(),
                });
            }
            match decl.shape {
                FieldShape::Node => node_decls.push(decl),
                FieldShape::Scalar => scalar_decls.push(decl),
            }
        }
        metrics.partition_us = start.elapsed().as_micros() as u64;

        let start = Instant::now();
        let mut node_counts = DtypeCounter::default();
        let mut node_fields = IndexMap::with_capacity(node_decls.len());
        for decl in &node_decls {
            node_fields.insert(decl.name.clone(), node_counts.next(decl.dtype));
        }
        let node_template = node_counts.zeroed();

        let mut constant_counts = DtypeCounter::default();
        let mut constants = IndexMap::with_capacity(scalar_decls.len());
        for decl in &scalar_decls {
            let slot = constant_counts.next(decl.dtype);
            constants.insert(
                decl.name.clone(),
                ConstantInfo {
                    slot,
                    embedded: decl.value,
                },
            );
        }
        let mut constant_defaults = constant_counts.zeroed();
        for info in constants.values() {
            if let Some(value) = info.embedded {
                write_scalar(&mut constant_defaults, info.slot, value);
            }
        }
        metrics.layout_us = start.elapsed().as_micros() as u64;

        let start = Instant::now();
        let mut outputs: SmallVec<[SlotRef; 4]> = SmallVec::new();
        let mut missing = Vec::new();
        for name in &self.outputs {
            match node_fields.get(name.as_str()) {
                Some(&slot) if !outputs.contains(&slot) => outputs.push(slot),
                Some(_) => {}
                None if !missing.contains(name) => missing.push(name.clone()),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(CompileError::OutputNotNodeField { names: missing });
        }
        let mut output_slots = PerDtype::<Indices>::default();
        for slot in &outputs {
            let index = slot.index as usize;
            match slot.dtype {
                Dtype::F64 => output_slots.f64.push(index),
                Dtype::F32 => output_slots.f32.push(index),
                Dtype::I64 => output_slots.i64.push(index),
            }
        }
        metrics.validate_us = start.elapsed().as_micros() as u64;

        metrics.node_fields = node_fields.len();
        metrics.embedded_constants = constants.values().filter(|c| c.embedded.is_some()).count();
        metrics.bound_constants = constants.len() - metrics.embedded_constants;

        Ok(KernelLayout {
            node_fields,
            constants,
            outputs,
            output_slots,
            node_template,
            constant_defaults,
            capacity: self.capacity,
            order: self.order,
            n_threads: self.n_threads,
            metrics,
        })
    }
}

/// Hands out dense per-dtype slot indices.
#[derive(Default)]
struct DtypeCounter {
    f64: u32,
    f32: u32,
    i64: u32,
}

impl DtypeCounter {
    fn next(&mut self, dtype: Dtype) -> SlotRef {
        let counter = match dtype {
            Dtype::F64 => &mut self.f64,
            Dtype::F32 => &mut self.f32,
            Dtype::I64 => &mut self.i64,
        };
        let index = *counter;
        *counter += 1;
        SlotRef { dtype, index }
    }

    fn zeroed(&self) -> PerDtype<Lane> {
        PerDtype {
            f64: vec![0.0; self.f64 as usize],
            f32: vec![0.0; self.f32 as usize],
            i64: vec![0; self.i64 as usize],
        }
    }
}

/// Store `value` at `slot` in a set of lanes. The dtypes must agree.
pub(crate) fn write_scalar(lanes: &mut PerDtype<Lane>, slot: SlotRef, value: Scalar) {
    fn put<T: Element>(lanes: &mut PerDtype<Lane>, index: u32, value: Scalar) {
        if let Some(v) = T::from_scalar(value) {
            T::pick_mut(lanes)[index as usize] = v;
        }
    }
    match slot.dtype {
        Dtype::F64 => put::<f64>(lanes, slot.index, value),
        Dtype::F32 => put::<f32>(lanes, slot.index, value),
        Dtype::I64 => put::<i64>(lanes, slot.index, value),
    }
}
