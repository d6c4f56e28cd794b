//! View structs behind the dashboard and upload pages.
//!
//! All formatting happens while the views are built; the Askama side
//! only loops over ready-made display strings and bar widths.

use std::collections::BTreeMap;

use promdeck_exposition::{HistogramAccumulator, ParsedMetrics};
use promdeck_store::SnapshotMeta;

/// Counter surfaced as the standalone headline statistic. cloudflared
/// allocates one ephemeral source port per proxied TCP session, so this
/// doubles as "source ports used".
pub const TCP_SESSIONS_METRIC: &str = "cloudflared_tcp_total_sessions";

// ── Dashboard View ──────────────────────────────────────────────

pub struct DashboardView {
    /// Capture time of the rendered snapshot, or a fresh-upload note.
    pub captured_display: String,
    pub has_capture_time: bool,
    /// Headline value of [`TCP_SESSIONS_METRIC`], `0` when absent.
    pub spotlight_display: String,
    pub gauges: Vec<GaugeRow>,
    pub counters: Vec<CounterBar>,
    pub histograms: Vec<HistogramCard>,
}

pub struct GaugeRow {
    pub name: String,
    pub value_display: String,
}

pub struct CounterBar {
    pub label: String,
    pub value_display: String,
    pub width_display: String,
}

pub struct HistogramCard {
    pub name: String,
    pub average_display: String,
    pub buckets: Vec<BucketBar>,
}

pub struct BucketBar {
    pub le: String,
    pub count_display: String,
    pub width_display: String,
}

impl DashboardView {
    /// Build the full dashboard view for one parsed snapshot.
    ///
    /// `captured_at_millis` is the stored capture time; `None` marks the
    /// view rendered directly after an upload.
    pub fn build(metrics: &ParsedMetrics, captured_at_millis: Option<u64>) -> Self {
        let spotlight_value = metrics
            .counters
            .get(TCP_SESSIONS_METRIC)
            .map(|s| s.value)
            .unwrap_or(0.0);

        let gauges: Vec<GaugeRow> = metrics
            .gauges
            .iter()
            .map(|(name, sample)| GaugeRow {
                name: name.clone(),
                value_display: format_metric_value(name, sample.value),
            })
            .collect();

        let max_counter = metrics
            .counters
            .values()
            .map(|s| s.value)
            .fold(0.0_f64, f64::max);
        let counters: Vec<CounterBar> = metrics
            .counters
            .iter()
            .map(|(name, sample)| CounterBar {
                label: format_series_label(name, &sample.labels),
                value_display: format_grouped(sample.value),
                width_display: format!("{:.1}", bar_width(sample.value, max_counter)),
            })
            .collect();

        let histograms: Vec<HistogramCard> = metrics
            .histograms
            .iter()
            .map(|(name, accumulator)| HistogramCard::from_accumulator(name, accumulator))
            .collect();

        let (captured_display, has_capture_time) = match captured_at_millis {
            Some(millis) => (format_timestamp_millis(millis), true),
            None => ("freshly uploaded".to_string(), false),
        };

        Self {
            captured_display,
            has_capture_time,
            spotlight_display: format_grouped(spotlight_value),
            gauges,
            counters,
            histograms,
        }
    }
}

impl HistogramCard {
    fn from_accumulator(name: &str, accumulator: &HistogramAccumulator) -> Self {
        let max_count = accumulator
            .buckets
            .iter()
            .map(|b| b.count)
            .fold(0.0_f64, f64::max);
        let buckets = accumulator
            .buckets
            .iter()
            .map(|b| BucketBar {
                le: b.le.clone(),
                count_display: format_grouped(b.count),
                width_display: format!("{:.1}", bar_width(b.count, max_count)),
            })
            .collect();

        Self {
            name: name.to_string(),
            average_display: format_grouped(accumulator.average()),
            buckets,
        }
    }
}

// ── Recent Uploads ──────────────────────────────────────────────

pub struct RecentUpload {
    pub timestamp: u64,
    pub captured_display: String,
    pub href: String,
}

/// Map stored snapshot listings into upload-page link rows.
pub fn recent_uploads(snapshots: &[SnapshotMeta]) -> Vec<RecentUpload> {
    snapshots
        .iter()
        .map(|meta| RecentUpload {
            timestamp: meta.timestamp,
            captured_display: format_timestamp_millis(meta.timestamp),
            href: format!("/?timestamp={}", meta.timestamp),
        })
        .collect()
}

// ── Format Helpers ──────────────────────────────────────────────

/// Unit-aware gauge formatting keyed off the metric name. `bytes` metrics
/// become MB and `latency` metrics get a ms suffix; the rest are grouped.
pub fn format_metric_value(name: &str, value: f64) -> String {
    const MB: f64 = 1024.0 * 1024.0;

    if name.contains("bytes") {
        format!("{:.2} MB", value / MB)
    } else if name.contains("latency") {
        format!("{} ms", format_grouped(value))
    } else {
        format_grouped(value)
    }
}

/// Thousands-grouped decimal with at most three fraction digits.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let formatted = format!("{:.3}", value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (formatted.as_str(), ""),
    };

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// `name` or `name{k="v",…}` as shown on counter bars.
pub fn format_series_label(name: &str, labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let pairs: Vec<String> = labels.iter().map(|(k, v)| format!("{k}=\"{v}\"")).collect();
    format!("{name}{{{}}}", pairs.join(","))
}

pub fn format_timestamp_millis(timestamp_millis: u64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_millis as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn bar_width(value: f64, max: f64) -> f64 {
    if max > 0.0 { (value / max) * 100.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promdeck_exposition::parse;

    #[test]
    fn format_grouped_values() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(18.0), "18");
        assert_eq!(format_grouped(1234567.0), "1,234,567");
        assert_eq!(format_grouped(0.5), "0.5");
        assert_eq!(format_grouped(1234.5678), "1,234.568");
        assert_eq!(format_grouped(-1234.0), "-1,234");
        assert_eq!(format_grouped(f64::NAN), "NaN");
    }

    #[test]
    fn metric_value_units_by_name() {
        assert_eq!(
            format_metric_value("process_heap_bytes", 3.0 * 1024.0 * 1024.0),
            "3.00 MB"
        );
        assert_eq!(format_metric_value("proxy_latency_p50", 12.0), "12 ms");
        assert_eq!(format_metric_value("active_streams", 2500.0), "2,500");
    }

    #[test]
    fn series_label_formats() {
        assert_eq!(format_series_label("requests_total", &BTreeMap::new()), "requests_total");

        let labels = BTreeMap::from([
            ("code".to_string(), "200".to_string()),
            ("method".to_string(), "GET".to_string()),
        ]);
        assert_eq!(
            format_series_label("requests_total", &labels),
            "requests_total{code=\"200\",method=\"GET\"}"
        );
    }

    #[test]
    fn timestamp_display() {
        assert_eq!(format_timestamp_millis(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(
            format_timestamp_millis(1700000000000),
            "2023-11-14 22:13:20 UTC"
        );
    }

    #[test]
    fn spotlight_defaults_to_zero() {
        let view = DashboardView::build(&ParsedMetrics::default(), None);
        assert_eq!(view.spotlight_display, "0");
    }

    #[test]
    fn spotlight_reads_tcp_sessions_counter() {
        let parsed = parse("cloudflared_tcp_total_sessions 18\n");
        let view = DashboardView::build(&parsed, None);
        assert_eq!(view.spotlight_display, "18");
    }

    #[test]
    fn counter_bars_normalized_to_largest() {
        let parsed = parse("a_total 50\nb_total 100\n");
        let view = DashboardView::build(&parsed, None);

        let widths: Vec<&str> = view.counters.iter().map(|c| c.width_display.as_str()).collect();
        assert_eq!(widths, vec!["50.0", "100.0"]);
    }

    #[test]
    fn histogram_card_keeps_input_bucket_order() {
        let parsed = parse(
            "lat_bucket{le=\"0.5\"} 2\nlat_bucket{le=\"+Inf\"} 8\nlat_sum 10\nlat_count 4\n",
        );
        let view = DashboardView::build(&parsed, None);

        let card = &view.histograms[0];
        assert_eq!(card.name, "lat");
        assert_eq!(card.average_display, "2.5");
        let bounds: Vec<&str> = card.buckets.iter().map(|b| b.le.as_str()).collect();
        assert_eq!(bounds, vec!["0.5", "+Inf"]);
        assert_eq!(card.buckets[0].width_display, "25.0");
        assert_eq!(card.buckets[1].width_display, "100.0");
    }

    #[test]
    fn capture_time_modes() {
        let parsed = ParsedMetrics::default();

        let stored = DashboardView::build(&parsed, Some(1700000000000));
        assert!(stored.has_capture_time);
        assert_eq!(stored.captured_display, "2023-11-14 22:13:20 UTC");

        let fresh = DashboardView::build(&parsed, None);
        assert!(!fresh.has_capture_time);
        assert_eq!(fresh.captured_display, "freshly uploaded");
    }

    #[test]
    fn empty_classes_build_empty_sections() {
        let parsed = parse("only_gauge 1\n");
        let view = DashboardView::build(&parsed, None);

        assert_eq!(view.gauges.len(), 1);
        assert!(view.counters.is_empty());
        assert!(view.histograms.is_empty());
    }

    #[test]
    fn recent_uploads_link_by_timestamp() {
        let metas = vec![SnapshotMeta {
            key: "metrics_1700000000000".to_string(),
            timestamp: 1700000000000,
        }];
        let uploads = recent_uploads(&metas);

        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].href, "/?timestamp=1700000000000");
        assert_eq!(uploads[0].captured_display, "2023-11-14 22:13:20 UTC");
    }
}
