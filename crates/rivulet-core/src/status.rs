//! Per-node status codes returned by the view getter and setter.
//!
//! These are the run-time outcomes that cross the kernel boundary. They are
//! plain integers rather than error values so that an external scheduler
//! can inspect them without knowledge of rivulet's error types.

use std::fmt;

/// Outcome of a getter or setter call on one node.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum ViewStatus {
    /// The view (or store) was updated for the node.
    Ok = 0,
    /// The node has more receivers than the fixed capacity allows.
    CapacityExceeded = 1,
    /// The node index is outside the graph.
    OutOfRange = 2,
}

impl ViewStatus {
    /// Returns `true` for [`ViewStatus::Ok`].
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// The raw status code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::CapacityExceeded => write!(f, "receiver capacity exceeded"),
            Self::OutOfRange => write!(f, "node index out of range"),
        }
    }
}
