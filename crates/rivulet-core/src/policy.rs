//! Receiver capacity policy and kernel application order.

use std::error::Error;
use std::fmt;
use std::num::NonZeroUsize;

/// How a node view sizes its receiver buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Buffers are preallocated to this many receivers and never grow.
    /// The getter rejects nodes with more receivers.
    Fixed(NonZeroUsize),
    /// Buffers start empty and grow to the largest receiver count seen.
    /// They never shrink.
    #[default]
    Dynamic,
}

impl CapacityPolicy {
    /// Map a signed "maximum receivers" setting to a policy.
    ///
    /// Positive values select [`Fixed`](Self::Fixed); zero and negative
    /// values (conventionally `-1`) select [`Dynamic`](Self::Dynamic).
    pub fn from_max_receivers(max_receivers: i64) -> Self {
        usize::try_from(max_receivers)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(Self::Dynamic, Self::Fixed)
    }

    /// Buffer length allocated at view creation.
    pub fn initial_capacity(self) -> usize {
        match self {
            Self::Fixed(n) => n.get(),
            Self::Dynamic => 0,
        }
    }

    /// The fixed maximum, if any.
    pub fn max_receivers(self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n.get()),
            Self::Dynamic => None,
        }
    }
}

/// Sequence in which a runner visits graph nodes.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApplicationOrder {
    /// Increasing node index `0..N`. No inter-node ordering is implied.
    #[default]
    Any = 0,
    /// Breadth-first from outlets following donor edges: every node's
    /// receivers are visited strictly before the node itself.
    BreadthUpstream = 1,
}

impl ApplicationOrder {
    /// Decode a raw order code (as used at the C boundary).
    pub fn from_raw(value: i32) -> Result<Self, OrderError> {
        match value {
            0 => Ok(Self::Any),
            1 => Ok(Self::BreadthUpstream),
            _ => Err(OrderError::Unsupported { value }),
        }
    }
}

impl fmt::Display for ApplicationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::BreadthUpstream => write!(f, "breadth_upstream"),
        }
    }
}

/// An application order code that no runner supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderError {
    /// The raw code does not name a known order.
    Unsupported {
        /// The rejected code.
        value: i32,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { value } => {
                write!(f, "unsupported kernel application order {value}")
            }
        }
    }
}

impl Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn positive_max_is_fixed(n in 1i64..100_000) {
            let policy = CapacityPolicy::from_max_receivers(n);
            prop_assert_eq!(policy.max_receivers(), Some(n as usize));
            prop_assert_eq!(policy.initial_capacity(), n as usize);
        }

        #[test]
        fn non_positive_max_is_dynamic(n in i64::MIN..=0) {
            prop_assert_eq!(CapacityPolicy::from_max_receivers(n), CapacityPolicy::Dynamic);
        }
    }

    #[test]
    fn max_receivers_convention() {
        assert_eq!(CapacityPolicy::from_max_receivers(-1), CapacityPolicy::Dynamic);
        assert_eq!(CapacityPolicy::from_max_receivers(0), CapacityPolicy::Dynamic);
        let fixed = CapacityPolicy::from_max_receivers(8);
        assert_eq!(fixed.max_receivers(), Some(8));
        assert_eq!(fixed.initial_capacity(), 8);
        assert_eq!(CapacityPolicy::Dynamic.initial_capacity(), 0);
    }

    #[test]
    fn order_codes() {
        assert_eq!(ApplicationOrder::from_raw(0), Ok(ApplicationOrder::Any));
        assert_eq!(
            ApplicationOrder::from_raw(1),
            Ok(ApplicationOrder::BreadthUpstream)
        );
        assert_eq!(
            ApplicationOrder::from_raw(7),
            Err(OrderError::Unsupported { value: 7 })
        );
        assert_eq!(ApplicationOrder::BreadthUpstream as i32, 1);
    }
}
