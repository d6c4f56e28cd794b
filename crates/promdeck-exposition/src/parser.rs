//! Prometheus text exposition parser.
//!
//! Permissive by contract: comment lines and lines that do not carry both a
//! series token and a value token are skipped, never rejected. The only
//! error-like outcome a caller can observe is an empty [`ParsedMetrics`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::model::{MetricSample, ParsedMetrics};

/// First token of a sample line: `name` or `name{labels}`.
static SERIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z_:][a-zA-Z0-9_:]*)(?:\{(.*)\})?$").expect("series pattern compiles")
});

/// Parse a full exposition payload into the three metric maps.
///
/// Dispatch per series name: `_bucket`/`_sum`/`_count` suffixes feed the
/// histogram under the stripped base name; everything else lands in
/// `counters` when the name contains `total` or `errors`, in `gauges`
/// otherwise. Repeated names overwrite, last line wins.
pub fn parse(text: &str) -> ParsedMetrics {
    let mut parsed = ParsedMetrics::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let (Some(series), Some(raw_value)) = (tokens.next(), tokens.next()) else {
            trace!(line, "skipping line without series and value tokens");
            continue;
        };
        // Trailing tokens (exposition timestamps) are ignored.

        let Some(caps) = SERIES_RE.captures(series) else {
            trace!(series, "skipping unparsable series token");
            continue;
        };
        let name = &caps[1];
        let labels = caps
            .get(2)
            .map(|block| parse_labels(block.as_str()))
            .unwrap_or_default();

        // Non-numeric values become NaN and flow through unrejected.
        let value: f64 = raw_value.parse().unwrap_or(f64::NAN);

        if let Some(base) = name.strip_suffix("_bucket") {
            let le = labels.get("le").cloned().unwrap_or_default();
            parsed
                .histograms
                .entry(base.to_string())
                .or_default()
                .push_bucket(le, value);
        } else if let Some(base) = name.strip_suffix("_sum") {
            parsed.histograms.entry(base.to_string()).or_default().sum = Some(value);
        } else if let Some(base) = name.strip_suffix("_count") {
            parsed.histograms.entry(base.to_string()).or_default().count = Some(value);
        } else if name.contains("total") || name.contains("errors") {
            parsed
                .counters
                .insert(name.to_string(), MetricSample::new(value, labels));
        } else {
            parsed
                .gauges
                .insert(name.to_string(), MetricSample::new(value, labels));
        }
    }

    parsed
}

/// Tokenize a `key="value",key="value"` label block.
///
/// Quotes around values are stripped; pieces without a `=` are dropped.
fn parse_labels(block: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    for piece in block.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let Some((key, value)) = piece.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let value = value.strip_prefix('"').unwrap_or(value);
        let value = value.strip_suffix('"').unwrap_or(value);
        labels.insert(key.trim().to_string(), value.to_string());
    }
    labels
}
