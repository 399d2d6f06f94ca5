//! The compiled [`KernelLayout`]: slot assignments and run configuration.
//!
//! A layout is produced once by [`KernelSpec::compile`](crate::KernelSpec::compile)
//! and shared (behind an `Arc`) by the kernel, its grid store, and every
//! node view created for it. It never changes afterwards.

use indexmap::IndexMap;
use smallvec::SmallVec;

use rivulet_core::{
    ApplicationOrder, CapacityPolicy, CompileError, ConstantSlot, Dtype, Element, FieldSlot,
    PerDtype, Scalar, SlotRef,
};

use crate::family::{Indices, Lane};
use crate::metrics::BuildMetrics;

/// Slot of a constant and, when fixed at build time, its embedded value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantInfo {
    /// Position within the constant lanes.
    pub slot: SlotRef,
    /// Value written at view creation. `None` for store-bound constants.
    pub embedded: Option<Scalar>,
}

/// Field-to-slot mapping and configuration of a compiled kernel.
///
/// Grid fields and constants are each numbered densely per dtype, so a
/// [`SlotRef`] of `f32#1` is the second `f32` grid field (or constant).
#[derive(Clone, Debug)]
pub struct KernelLayout {
    pub(crate) node_fields: IndexMap<String, SlotRef>,
    pub(crate) constants: IndexMap<String, ConstantInfo>,
    pub(crate) outputs: SmallVec<[SlotRef; 4]>,
    pub(crate) output_slots: PerDtype<Indices>,
    pub(crate) node_template: PerDtype<Lane>,
    pub(crate) constant_defaults: PerDtype<Lane>,
    pub(crate) capacity: CapacityPolicy,
    pub(crate) order: ApplicationOrder,
    pub(crate) n_threads: usize,
    pub(crate) metrics: BuildMetrics,
}

impl KernelLayout {
    /// Receiver buffer policy for node views.
    pub fn capacity(&self) -> CapacityPolicy {
        self.capacity
    }

    /// Node visiting order requested by the kernel.
    pub fn order(&self) -> ApplicationOrder {
        self.order
    }

    /// Number of execution contexts the kernel is configured for.
    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    /// Statistics collected while compiling.
    pub fn build_metrics(&self) -> &BuildMetrics {
        &self.metrics
    }

    /// Grid fields in declaration order.
    pub fn node_fields(&self) -> impl Iterator<Item = (&str, SlotRef)> + '_ {
        self.node_fields.iter().map(|(name, &slot)| (name.as_str(), slot))
    }

    /// Number of grid fields.
    pub fn node_field_count(&self) -> usize {
        self.node_fields.len()
    }

    /// Constants in declaration order.
    pub fn constants(&self) -> impl Iterator<Item = (&str, &ConstantInfo)> + '_ {
        self.constants.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Whether any constant must be copied from the store by `init`.
    ///
    /// When `false` every constant was embedded at view creation and the
    /// `init` operation may be skipped entirely.
    pub fn needs_init(&self) -> bool {
        self.constants.values().any(|c| c.embedded.is_none())
    }

    /// Grid fields written back by the setter.
    pub fn outputs(&self) -> &[SlotRef] {
        &self.outputs
    }

    /// Whether `slot` is written back by the setter.
    pub fn is_output(&self, slot: SlotRef) -> bool {
        self.outputs.contains(&slot)
    }

    /// Untyped slot of a grid field.
    pub fn field_slot(&self, name: &str) -> Option<SlotRef> {
        self.node_fields.get(name).copied()
    }

    /// Name of the grid field at `slot`.
    pub fn field_name(&self, slot: SlotRef) -> Option<&str> {
        self.node_fields
            .iter()
            .find(|(_, &s)| s == slot)
            .map(|(name, _)| name.as_str())
    }

    /// Resolve a grid field to a typed slot.
    pub fn slot<T: Element>(&self, name: &str) -> Result<FieldSlot<T>, CompileError> {
        let slot = self
            .field_slot(name)
            .ok_or_else(|| CompileError::UnknownField { name: name.into() })?;
        FieldSlot::from_ref(slot).ok_or(CompileError::SlotDtypeMismatch {
            name: name.into(),
            declared: slot.dtype,
            requested: T::DTYPE,
        })
    }

    /// Resolve a constant to a typed slot.
    pub fn constant<T: Element>(&self, name: &str) -> Result<ConstantSlot<T>, CompileError> {
        let info = self
            .constants
            .get(name)
            .ok_or_else(|| CompileError::UnknownField { name: name.into() })?;
        ConstantSlot::from_ref(info.slot).ok_or(CompileError::SlotDtypeMismatch {
            name: name.into(),
            declared: info.slot.dtype,
            requested: T::DTYPE,
        })
    }

    /// Number of grid fields of the given dtype.
    pub fn node_fields_of(&self, dtype: Dtype) -> usize {
        match dtype {
            Dtype::F64 => self.node_template.f64.len(),
            Dtype::F32 => self.node_template.f32.len(),
            Dtype::I64 => self.node_template.i64.len(),
        }
    }

    pub(crate) fn output_slots<T: Element>(&self) -> &[usize] {
        T::pick(&self.output_slots)
    }
}

#[cfg(test)]
mod tests {
    use rivulet_core::FieldDecl;

    use crate::KernelSpec;

    use super::*;

    fn layout() -> KernelLayout {
        KernelSpec::new()
            .field(FieldDecl::node("elevation", Dtype::F64))
            .field(FieldDecl::node("area", Dtype::F64))
            .field(FieldDecl::node("basin", Dtype::I64))
            .field(FieldDecl::constant("k", 2.0e-5))
            .field(FieldDecl::scalar("dt", Dtype::F32))
            .output("elevation")
            .compile()
            .unwrap()
    }

    #[test]
    fn slots_are_dense_per_dtype() {
        let l = layout();
        assert_eq!(
            l.field_slot("area"),
            Some(SlotRef {
                dtype: Dtype::F64,
                index: 1
            })
        );
        assert_eq!(l.slot::<i64>("basin").unwrap().index(), 0);
        assert_eq!(l.node_fields_of(Dtype::F64), 2);
        assert_eq!(l.node_fields_of(Dtype::F32), 0);
        assert_eq!(l.field_name(l.field_slot("basin").unwrap()), Some("basin"));
    }

    #[test]
    fn typed_lookup_checks_dtype() {
        let l = layout();
        assert_eq!(
            l.slot::<f32>("elevation").unwrap_err(),
            CompileError::SlotDtypeMismatch {
                name: "elevation".into(),
                declared: Dtype::F64,
                requested: Dtype::F32,
            }
        );
        assert!(matches!(
            l.slot::<f64>("k"),
            Err(CompileError::UnknownField { .. })
        ));
        assert!(l.constant::<f32>("dt").is_ok());
        assert!(l.constant::<f64>("elevation").is_err());
    }

    #[test]
    fn bound_constant_requires_init() {
        let l = layout();
        assert!(l.needs_init());
        let (_, dt) = l.constants().find(|(n, _)| *n == "dt").unwrap();
        assert_eq!(dt.embedded, None);
        let (_, k) = l.constants().find(|(n, _)| *n == "k").unwrap();
        assert_eq!(k.embedded, Some(Scalar::F64(2.0e-5)));
    }

    #[test]
    fn outputs_are_recorded() {
        let l = layout();
        let elevation = l.field_slot("elevation").unwrap();
        assert_eq!(l.outputs(), &[elevation]);
        assert!(l.is_output(elevation));
        assert!(!l.is_output(l.field_slot("area").unwrap()));
        assert_eq!(l.output_slots::<f64>(), &[0]);
        assert!(l.output_slots::<i64>().is_empty());
    }
}
