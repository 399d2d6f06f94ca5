//! Build-time statistics for kernel compilation.

/// Timing and size data collected while compiling a [`KernelSpec`](crate::KernelSpec).
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildMetrics {
    /// Time spent validating declarations and partitioning them into grid
    /// fields and constants.
    pub partition_us: u64,
    /// Time spent assigning slots and building constant defaults.
    pub layout_us: u64,
    /// Time spent checking the declared outputs.
    pub validate_us: u64,
    /// Number of grid fields.
    pub node_fields: usize,
    /// Number of constants bound on the store and copied by `init`.
    pub bound_constants: usize,
    /// Number of constants embedded at view creation.
    pub embedded_constants: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = BuildMetrics::default();
        assert_eq!(m.partition_us, 0);
        assert_eq!(m.layout_us, 0);
        assert_eq!(m.validate_us, 0);
        assert_eq!(m.node_fields, 0);
        assert_eq!(m.bound_constants, 0);
        assert_eq!(m.embedded_constants, 0);
    }
}
