//! Execution statistics
//!
//! Counts executions and failures per block type and keeps a bounded window
//! of recent latencies for percentile summaries.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Latency samples kept per block type.
const LATENCY_WINDOW: usize = 1024;

/// Key that collects every block type the registry does not declare.
pub const UNREGISTERED_KEY: &str = "<unknown>";

/// Aggregation applied to recorded latencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggregationType {
    /// Average (mean) of all values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// 50th percentile (median)
    P50,
    /// 95th percentile
    P95,
    /// 99th percentile
    P99,
}

#[derive(Debug, Default)]
struct TypeStats {
    executions: u64,
    failures: u64,
    latencies_ms: VecDeque<f64>,
}

/// Thread-safe execution counters
#[derive(Debug, Default)]
pub struct ExecutionStats {
    by_type: Mutex<HashMap<String, TypeStats>>,
}

impl ExecutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one execution of `block_type`.
    ///
    /// Callers pass [`UNREGISTERED_KEY`] for types outside the registry so
    /// the map stays bounded by the registry size.
    ///
    /// # Examples
    /// ```
    /// use macro_agent::core::metrics::ExecutionStats;
    ///
    /// let stats = ExecutionStats::new();
    /// stats.record("wait", true, 12.5);
    /// stats.record("wait", false, 0.1);
    /// assert_eq!(stats.executions(), 2);
    /// assert_eq!(stats.failures(), 1);
    /// ```
    pub fn record(&self, block_type: &str, success: bool, elapsed_ms: f64) {
        let mut by_type = self.by_type.lock();
        let stats = by_type.entry(block_type.to_string()).or_default();
        stats.executions += 1;
        if !success {
            stats.failures += 1;
        }
        if stats.latencies_ms.len() == LATENCY_WINDOW {
            stats.latencies_ms.pop_front();
        }
        stats.latencies_ms.push_back(elapsed_ms);
    }

    pub fn executions(&self) -> u64 {
        self.by_type.lock().values().map(|s| s.executions).sum()
    }

    pub fn failures(&self) -> u64 {
        self.by_type.lock().values().map(|s| s.failures).sum()
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let by_type = self.by_type.lock();
        let mut snapshot = StatsSnapshot::default();
        for (block_type, stats) in by_type.iter() {
            let values: Vec<f64> = stats.latencies_ms.iter().copied().collect();
            snapshot.executions += stats.executions;
            snapshot.failures += stats.failures;
            snapshot.blocks.insert(
                block_type.clone(),
                BlockTypeStats {
                    executions: stats.executions,
                    failures: stats.failures,
                    avg_ms: aggregate(&values, AggregationType::Avg),
                    min_ms: aggregate(&values, AggregationType::Min),
                    max_ms: aggregate(&values, AggregationType::Max),
                    p50_ms: aggregate(&values, AggregationType::P50),
                    p95_ms: aggregate(&values, AggregationType::P95),
                    p99_ms: aggregate(&values, AggregationType::P99),
                },
            );
        }
        snapshot
    }
}

/// Counters for one block type; latencies cover the recent window only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTypeStats {
    pub executions: u64,
    pub failures: u64,
    pub avg_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub executions: u64,
    pub failures: u64,
    pub blocks: BTreeMap<String, BlockTypeStats>,
}

fn aggregate(values: &[f64], agg_type: AggregationType) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    match agg_type {
        AggregationType::Avg => Some(values.iter().sum::<f64>() / values.len() as f64),
        AggregationType::Min => values.iter().copied().reduce(f64::min),
        AggregationType::Max => values.iter().copied().reduce(f64::max),
        AggregationType::P50 => percentile(values, 0.5),
        AggregationType::P95 => percentile(values, 0.95),
        AggregationType::P99 => percentile(values, 0.99),
    }
}

/// Percentile with linear interpolation between the two nearest values.
fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let idx = (sorted.len() as f64 - 1.0) * p;
    let idx_lower = idx.floor() as usize;
    let idx_upper = idx.ceil() as usize;

    if idx_lower == idx_upper {
        sorted.get(idx_lower).copied()
    } else {
        let lower = sorted[idx_lower];
        let upper = sorted[idx_upper];
        let fraction = idx - idx_lower as f64;
        Some(lower + (upper - lower) * fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_type() {
        let stats = ExecutionStats::new();
        stats.record("press_key", true, 1.0);
        stats.record("press_key", false, 2.0);
        stats.record("wait", true, 1000.0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.executions, 3);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.blocks["press_key"].executions, 2);
        assert_eq!(snapshot.blocks["press_key"].failures, 1);
        assert_eq!(snapshot.blocks["wait"].max_ms, Some(1000.0));
    }

    #[test]
    fn test_aggregation_avg_min_max() {
        let stats = ExecutionStats::new();
        for ms in [5.0, 2.0, 8.0, 1.0] {
            stats.record("move", true, ms);
        }

        let snapshot = stats.snapshot();
        let moves = &snapshot.blocks["move"];
        assert_eq!(moves.avg_ms, Some(4.0));
        assert_eq!(moves.min_ms, Some(1.0));
        assert_eq!(moves.max_ms, Some(8.0));
        assert!(!snapshot.blocks.contains_key("glide"));
    }

    #[test]
    fn test_percentiles() {
        let stats = ExecutionStats::new();
        for i in 1..=100 {
            stats.record("value", true, i as f64);
        }

        let snapshot = stats.snapshot();
        let value = &snapshot.blocks["value"];
        assert!((value.p50_ms.unwrap() - 50.5).abs() < 0.1);
        assert!((value.p95_ms.unwrap() - 95.05).abs() < 0.1);
        assert!((value.p99_ms.unwrap() - 99.01).abs() < 0.1);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let stats = ExecutionStats::new();
        for i in 0..(LATENCY_WINDOW + 10) {
            stats.record("join", true, i as f64);
        }

        assert_eq!(stats.executions(), (LATENCY_WINDOW + 10) as u64);
        // The oldest samples have been dropped.
        assert_eq!(stats.snapshot().blocks["join"].min_ms, Some(10.0));
    }

    #[test]
    fn test_snapshot_serializes_every_aggregate() {
        let stats = ExecutionStats::new();
        stats.record("start", true, 2.0);
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        let start = &json["blocks"]["start"];
        for key in ["avg_ms", "min_ms", "max_ms", "p50_ms", "p95_ms", "p99_ms"] {
            assert_eq!(start[key], 2.0, "{}", key);
        }
    }
}
