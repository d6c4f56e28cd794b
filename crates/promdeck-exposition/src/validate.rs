//! Best-effort sniff for Prometheus exposition format.
//!
//! This is a gate for obviously wrong uploads (HTML, JSON, binary noise),
//! not a grammar check. One comment line or one plausible sample line is
//! enough to accept the whole payload; the parser downstream tolerates
//! everything else.

use std::sync::LazyLock;

use regex::Regex;

/// A plausible sample line: identifier, optional label block, a number.
static SAMPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*(?:\{.*\})?\s+[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?")
        .expect("sample pattern compiles")
});

/// True when at least one line of `text` looks like exposition format.
///
/// Never errors; the empty string and free-form prose are simply `false`.
pub fn looks_like_exposition(text: &str) -> bool {
    text.lines().any(|line| {
        let line = line.trim();
        line.starts_with('#') || SAMPLE_RE.is_match(line)
    })
}
