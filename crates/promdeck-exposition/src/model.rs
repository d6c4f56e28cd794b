//! Parsed metrics model.
//!
//! A parsed snapshot is three maps keyed by metric name. Gauges and
//! counters key on the bare name (last sample line wins; labels ride on
//! the sample). Histograms key on the base name with the
//! `_bucket`/`_sum`/`_count` suffix stripped and accumulate across however
//! many lines the series is spread over.

use std::collections::BTreeMap;

/// One sample line: the parsed value plus whatever labels the line carried.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSample {
    pub value: f64,
    pub labels: BTreeMap<String, String>,
}

impl MetricSample {
    pub fn new(value: f64, labels: BTreeMap<String, String>) -> Self {
        Self { value, labels }
    }
}

/// One `_bucket` line of a histogram. The `le` bound is kept verbatim so
/// `+Inf` survives instead of collapsing into a float.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSample {
    pub le: String,
    pub count: f64,
}

/// A histogram assembled from its `_bucket`, `_sum` and `_count` series.
///
/// Lines may arrive in any order and any of the three parts may be missing
/// from a truncated exposition, so `sum` and `count` stay optional until
/// their lines show up.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistogramAccumulator {
    pub buckets: Vec<BucketSample>,
    pub sum: Option<f64>,
    pub count: Option<f64>,
}

impl HistogramAccumulator {
    pub fn push_bucket(&mut self, le: String, count: f64) {
        self.buckets.push(BucketSample { le, count });
    }

    /// Mean observation: `sum / count`, or `0.0` while either part is
    /// still missing or the count is zero.
    pub fn average(&self) -> f64 {
        match (self.sum, self.count) {
            (Some(sum), Some(count)) if count != 0.0 => sum / count,
            _ => 0.0,
        }
    }
}

/// Everything extracted from one exposition payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedMetrics {
    pub gauges: BTreeMap<String, MetricSample>,
    pub counters: BTreeMap<String, MetricSample>,
    pub histograms: BTreeMap<String, HistogramAccumulator>,
}

impl ParsedMetrics {
    /// True when not a single series was recognised in the payload.
    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty() && self.counters.is_empty() && self.histograms.is_empty()
    }
}
