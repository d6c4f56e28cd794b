//! Prometheus text exposition handling for Promdeck.
//!
//! ```text
//! promdeck-exposition
//! ├── validate   format sniff for uploaded payloads
//! ├── parser     permissive line parser
//! └── model      gauges / counters / histograms maps
//! ```
//!
//! Classification is heuristic on purpose: a series name containing
//! `total` or `errors` is a counter, a `_bucket`/`_sum`/`_count` suffix
//! feeds a histogram, anything else is a gauge. Uploads are snapshots
//! from arbitrary exporters, so there is no schema to lean on.

pub mod model;
pub mod parser;
pub mod validate;

pub use model::{BucketSample, HistogramAccumulator, MetricSample, ParsedMetrics};
pub use parser::parse;
pub use validate::looks_like_exposition;
