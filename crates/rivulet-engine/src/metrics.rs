//! Per-run statistics for the reference runner.

use rivulet_core::ApplicationOrder;

/// Timing and shape data collected during a single run.
///
/// Durations are in microseconds. The runner fills these after each
/// completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Wall-clock time for the whole run, in microseconds.
    pub total_us: u64,
    /// Time spent preparing the node sequence, in microseconds.
    pub index_us: u64,
    /// Number of nodes processed.
    pub nodes_visited: usize,
    /// Largest receiver count loaded into the view.
    pub max_receivers_seen: usize,
    /// Receiver buffer capacity of the view at the end of the run.
    pub view_capacity: usize,
    /// Order the nodes were visited in.
    pub order: ApplicationOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.index_us, 0);
        assert_eq!(m.nodes_visited, 0);
        assert_eq!(m.max_receivers_seen, 0);
        assert_eq!(m.view_capacity, 0);
        assert_eq!(m.order, ApplicationOrder::Any);
    }
}
