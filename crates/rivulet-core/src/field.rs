//! Field declarations: the build-time description of kernel data.
//!
//! Every name a kernel touches is declared once as either a grid field
//! (one value per node, [`FieldShape::Node`]) or a scalar shared by all
//! nodes ([`FieldShape::Scalar`]). A scalar declared with a value is an
//! *embedded* constant, fixed at node-view creation; a scalar declared by
//! type only is *bound* on the grid store and copied into each view by
//! the view `init` operation.

use crate::dtype::{Dtype, Scalar};
use crate::error::CompileError;

/// Whether a declared name holds one value per node or one shared value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// Array over graph nodes ("grid data").
    Node,
    /// Single value shared by all nodes ("constant").
    Scalar,
}

/// Declaration of a single named field or constant.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    /// Name used by kernels and by store binding.
    pub name: String,
    /// Node array or shared scalar.
    pub shape: FieldShape,
    /// Element type.
    pub dtype: Dtype,
    /// Embedded value, for scalars known at build time.
    pub value: Option<Scalar>,
}

impl FieldDecl {
    /// Declare a grid field with one value per node.
    pub fn node(name: impl Into<String>, dtype: Dtype) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::Node,
            dtype,
            value: None,
        }
    }

    /// Declare a scalar bound on the store before each run.
    pub fn scalar(name: impl Into<String>, dtype: Dtype) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::Scalar,
            dtype,
            value: None,
        }
    }

    /// Declare a scalar whose value is embedded at view creation.
    pub fn constant(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            shape: FieldShape::Scalar,
            dtype: value.dtype(),
            value: Some(value),
        }
    }

    /// Returns `true` for grid fields.
    pub fn is_node(&self) -> bool {
        self.shape == FieldShape::Node
    }

    /// Returns `true` for scalars that must be bound on the store.
    pub fn is_bound_scalar(&self) -> bool {
        self.shape == FieldShape::Scalar && self.value.is_none()
    }

    /// Check structural invariants of a single declaration.
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.name.is_empty() {
            return Err(CompileError::EmptyFieldName);
        }
        match (self.shape, self.value) {
            (FieldShape::Node, Some(_)) => Err(CompileError::ValueOnNodeField {
                name: self.name.clone(),
            }),
            (FieldShape::Scalar, Some(v)) if v.dtype() != self.dtype => {
                Err(CompileError::ConstantDtypeMismatch {
                    name: self.name.clone(),
                    declared: self.dtype,
                    value: v.dtype(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_shape() {
        let n = FieldDecl::node("elevation", Dtype::F64);
        assert!(n.is_node());
        assert!(!n.is_bound_scalar());

        let s = FieldDecl::scalar("dt", Dtype::F64);
        assert!(!s.is_node());
        assert!(s.is_bound_scalar());

        let c = FieldDecl::constant("m_exp", 0.5f64);
        assert!(!c.is_node());
        assert!(!c.is_bound_scalar());
        assert_eq!(c.dtype, Dtype::F64);
    }

    #[test]
    fn validate_rejects_empty_name() {
        let d = FieldDecl::node("", Dtype::F64);
        assert_eq!(d.validate(), Err(CompileError::EmptyFieldName));
    }

    #[test]
    fn validate_rejects_value_on_node_field() {
        let mut d = FieldDecl::node("h", Dtype::F64);
        d.value = Some(Scalar::F64(1.0));
        assert!(matches!(
            d.validate(),
            Err(CompileError::ValueOnNodeField { .. })
        ));
    }

    #[test]
    fn validate_rejects_mismatched_constant() {
        let mut d = FieldDecl::constant("k", 1i64);
        d.dtype = Dtype::F32;
        assert!(matches!(
            d.validate(),
            Err(CompileError::ConstantDtypeMismatch { .. })
        ));
    }
}
