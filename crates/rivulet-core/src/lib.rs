//! Core types for the rivulet flow-kernel engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other rivulet crate: element dtypes and
//! scalar values, field declarations, capacity and ordering policies,
//! typed slots, per-node status codes, and build-time error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dtype;
pub mod error;
pub mod field;
pub mod id;
pub mod policy;
pub mod status;

pub use dtype::{Dtype, Element, Family, PerDtype, Scalar};
pub use error::{BindError, CompileError};
pub use field::{FieldDecl, FieldShape};
pub use id::{ConstantSlot, FieldSlot, SlotRef};
pub use policy::{ApplicationOrder, CapacityPolicy, OrderError};
pub use status::ViewStatus;
