//! Build-time error types.
//!
//! Configuration problems are reported when a kernel is compiled or when
//! arrays are bound to a store, never from inside the per-node loop.
//! Per-node outcomes use [`ViewStatus`](crate::ViewStatus) instead.

use std::error::Error;
use std::fmt;

use crate::dtype::Dtype;

/// Errors from compiling a kernel specification or resolving slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// A field was declared with an empty name.
    EmptyFieldName,
    /// The same name was declared twice.
    DuplicateField {
        /// The repeated name.
        name: String,
    },
    /// One or more declared outputs are not grid fields.
    OutputNotNodeField {
        /// Every offending output name, in declaration order.
        names: Vec<String>,
    },
    /// A grid field declaration carries an embedded value.
    ValueOnNodeField {
        /// The field name.
        name: String,
    },
    /// An embedded constant's value does not match its declared dtype.
    ConstantDtypeMismatch {
        /// The constant name.
        name: String,
        /// Declared dtype.
        declared: Dtype,
        /// Dtype of the embedded value.
        value: Dtype,
    },
    /// A slot lookup named a field that is not declared (or has the
    /// wrong shape for the lookup).
    UnknownField {
        /// The requested name.
        name: String,
    },
    /// A typed slot lookup asked for the wrong element type.
    SlotDtypeMismatch {
        /// The field name.
        name: String,
        /// Dtype of the declared field.
        declared: Dtype,
        /// Dtype requested by the caller.
        requested: Dtype,
    },
    /// The thread count is zero.
    ZeroThreads,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFieldName => write!(f, "field name must not be empty"),
            Self::DuplicateField { name } => write!(f, "field '{name}' declared twice"),
            Self::OutputNotNodeField { names } => {
                let plural = if names.len() > 1 { "s" } else { "" };
                write!(f, "output name{plural} {names:?} not declared as grid data")
            }
            Self::ValueOnNodeField { name } => {
                write!(f, "grid field '{name}' cannot carry an embedded value")
            }
            Self::ConstantDtypeMismatch {
                name,
                declared,
                value,
            } => write!(
                f,
                "constant '{name}' declared as {declared} but given a {value} value"
            ),
            Self::UnknownField { name } => write!(f, "unknown field '{name}'"),
            Self::SlotDtypeMismatch {
                name,
                declared,
                requested,
            } => write!(
                f,
                "field '{name}' has dtype {declared}, requested {requested}"
            ),
            Self::ZeroThreads => write!(f, "thread count must be at least 1"),
        }
    }
}

impl Error for CompileError {}

/// Errors from binding arrays or scalars to a grid store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindError {
    /// No field or scalar with this name is declared.
    UnknownField {
        /// The requested name.
        name: String,
    },
    /// An array was bound to a scalar name.
    NotNodeField {
        /// The scalar name.
        name: String,
    },
    /// A scalar was bound to a grid field name or to an embedded constant.
    NotBindableScalar {
        /// The offending name.
        name: String,
    },
    /// The bound value has the wrong element type.
    DtypeMismatch {
        /// The field name.
        name: String,
        /// Declared dtype.
        expected: Dtype,
        /// Dtype of the bound value.
        actual: Dtype,
    },
    /// The bound array length differs from the graph size.
    LengthMismatch {
        /// The field name.
        name: String,
        /// Graph size.
        expected: usize,
        /// Length of the bound array.
        actual: usize,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { name } => write!(f, "unknown field '{name}'"),
            Self::NotNodeField { name } => {
                write!(f, "'{name}' is a scalar, not a grid field")
            }
            Self::NotBindableScalar { name } => {
                write!(f, "'{name}' is not a bindable scalar")
            }
            Self::DtypeMismatch {
                name,
                expected,
                actual,
            } => write!(f, "'{name}' expects {expected}, got {actual}"),
            Self::LengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "'{name}' must have one value per node ({expected}), got {actual}"
            ),
        }
    }
}

impl Error for BindError {}
