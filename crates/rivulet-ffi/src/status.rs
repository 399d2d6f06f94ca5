//! C-compatible status codes.
//!
//! [`RivStatus`] is `repr(i32)`: 0 is success and every failure is
//! negative. Conversions from each rivulet error type are provided so
//! entry points can report `RivStatus::from(&err) as i32`.
//!
//! The per-node view operations are the exception: they return the
//! non-negative [`ViewStatus`] code on a completed call and a negative
//! [`RivStatus`] only when the call itself could not be made.

use rivulet_core::{BindError, CompileError, OrderError, ViewStatus};
use rivulet_engine::{ConfigError, RunError};
use rivulet_graph::GraphError;

/// Status code returned by FFI functions. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RivStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// A pointer is null, a string is not UTF-8, or a code is unknown.
    InvalidArgument = -2,
    /// The kernel specification failed to compile.
    CompileError = -3,
    /// The flow graph arrays are inconsistent.
    GraphError = -4,
    /// An array or scalar could not be bound to the store.
    BindError = -5,
    /// A node has more receivers than the fixed view capacity.
    CapacityExceeded = -6,
    /// A node index is outside the graph.
    OutOfRange = -7,
    /// The application order code is not supported.
    UnsupportedOrder = -8,
    /// The store or view belongs to a different kernel.
    KernelMismatch = -9,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -10,
    /// Internal error (e.g. a lock poisoned by an earlier panic).
    InternalError = -11,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&CompileError> for RivStatus {
    fn from(_: &CompileError) -> Self {
        Self::CompileError
    }
}

impl From<&BindError> for RivStatus {
    fn from(_: &BindError) -> Self {
        Self::BindError
    }
}

impl From<&GraphError> for RivStatus {
    fn from(_: &GraphError) -> Self {
        Self::GraphError
    }
}

impl From<&OrderError> for RivStatus {
    fn from(_: &OrderError) -> Self {
        Self::UnsupportedOrder
    }
}

impl From<&ConfigError> for RivStatus {
    fn from(e: &ConfigError) -> Self {
        match e {
            ConfigError::Compile(e) => e.into(),
            ConfigError::Graph(e) => e.into(),
            ConfigError::Order(e) => e.into(),
        }
    }
}

impl From<ViewStatus> for RivStatus {
    fn from(status: ViewStatus) -> Self {
        match status {
            ViewStatus::Ok => Self::Ok,
            ViewStatus::CapacityExceeded => Self::CapacityExceeded,
            ViewStatus::OutOfRange => Self::OutOfRange,
        }
    }
}

impl From<&RunError> for RivStatus {
    fn from(e: &RunError) -> Self {
        match e {
            RunError::GetterFailed { status, .. } | RunError::SetterFailed { status, .. } => {
                (*status).into()
            }
            RunError::StoreMismatch => Self::KernelMismatch,
        }
    }
}
