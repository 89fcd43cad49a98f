//! Typed diagnostic trail for a single lookup.
//!
//! Every provider attempt made while resolving a barcode is recorded as a
//! [`TraceEntry`]. The trail is append-only and ordered by execution, and it
//! is bounded: once [`MAX_TRACE_ENTRIES`] entries are held, further pushes are
//! counted in [`Trace::dropped`] and discarded.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on the number of entries a single [`Trace`] retains.
pub const MAX_TRACE_ENTRIES: usize = 128;

/// Longest `detail` string kept on an entry, in characters.
const MAX_DETAIL_CHARS: usize = 512;

/// Pipeline stage that produced a trace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Barcode to product title resolution.
    Upc,
    /// Title cleanup and candidate generation.
    Normalize,
    /// Scored search against the movie database.
    Search,
    /// Full detail fetch for the chosen match.
    Details,
    /// Secondary ratings cross-reference.
    CrossReference,
    /// Final result assembly and the outer error boundary.
    Assembly,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Upc => "upc",
            Self::Normalize => "normalize",
            Self::Search => "search",
            Self::Details => "details",
            Self::CrossReference => "cross_reference",
            Self::Assembly => "assembly",
        };
        f.write_str(s)
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    Skipped,
}

/// One recorded attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub stage: Stage,
    /// Name of the concrete attempt, e.g. `"upcitemdb"` or `"omdb_by_id"`.
    pub label: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Bounded, append-only list of [`TraceEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
    #[serde(default)]
    dropped: usize,
}

impl Trace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries past the bound are counted and discarded.
    pub fn push(
        &mut self,
        stage: Stage,
        label: impl Into<String>,
        outcome: Outcome,
        detail: Option<String>,
    ) {
        let label = label.into();
        let detail = detail.map(truncate_detail);

        match outcome {
            Outcome::Failure => tracing::warn!(
                stage = %stage,
                label = %label,
                detail = detail.as_deref().unwrap_or(""),
                "lookup step failed"
            ),
            _ => tracing::debug!(
                stage = %stage,
                label = %label,
                outcome = ?outcome,
                detail = detail.as_deref().unwrap_or(""),
                "lookup step"
            ),
        }

        if self.entries.len() >= MAX_TRACE_ENTRIES {
            self.dropped += 1;
            return;
        }

        self.entries.push(TraceEntry {
            stage,
            label,
            outcome,
            detail,
        });
    }

    /// Record a successful attempt.
    pub fn success(&mut self, stage: Stage, label: impl Into<String>, detail: impl Into<String>) {
        self.push(stage, label, Outcome::Success, Some(detail.into()));
    }

    /// Record a failed attempt.
    pub fn failure(&mut self, stage: Stage, label: impl Into<String>, detail: impl Into<String>) {
        self.push(stage, label, Outcome::Failure, Some(detail.into()));
    }

    /// Record an attempt that was not made.
    pub fn skipped(&mut self, stage: Stage, label: impl Into<String>, detail: impl Into<String>) {
        self.push(stage, label, Outcome::Skipped, Some(detail.into()));
    }

    /// All retained entries, in execution order.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of entries discarded because the trace was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry recorded for `stage` under `label`.
    pub fn find(&self, stage: Stage, label: &str) -> Option<&TraceEntry> {
        self.entries
            .iter()
            .find(|e| e.stage == stage && e.label == label)
    }

    /// Whether any attempt for `stage` under `label` succeeded.
    pub fn has_success(&self, stage: Stage, label: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.stage == stage && e.label == label && e.outcome == Outcome::Success)
    }

    /// Outcomes recorded for `stage`, in order.
    pub fn outcomes(&self, stage: Stage) -> Vec<(&str, Outcome)> {
        self.entries
            .iter()
            .filter(|e| e.stage == stage)
            .map(|e| (e.label.as_str(), e.outcome))
            .collect()
    }
}

fn truncate_detail(detail: String) -> String {
    match detail.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((idx, _)) => {
            let mut cut = detail[..idx].to_string();
            cut.push('…');
            cut
        }
        None => detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_execution_order() {
        let mut trace = Trace::new();
        trace.failure(Stage::Upc, "upcitemdb", "HTTP 429");
        trace.success(Stage::Upc, "local_override", "Casino Royale");
        trace.skipped(Stage::CrossReference, "omdb", "no key");

        let labels: Vec<_> = trace.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["upcitemdb", "local_override", "omdb"]);
        assert_eq!(
            trace.outcomes(Stage::Upc),
            vec![
                ("upcitemdb", Outcome::Failure),
                ("local_override", Outcome::Success)
            ]
        );
    }

    #[test]
    fn bounded_at_max_entries() {
        let mut trace = Trace::new();
        for i in 0..MAX_TRACE_ENTRIES + 7 {
            trace.failure(Stage::Search, format!("attempt-{i}"), "x");
        }
        assert_eq!(trace.len(), MAX_TRACE_ENTRIES);
        assert_eq!(trace.dropped(), 7);
        // The earliest entries survive.
        assert_eq!(trace.entries()[0].label, "attempt-0");
    }

    #[test]
    fn long_details_are_truncated() {
        let mut trace = Trace::new();
        trace.failure(Stage::Details, "tmdb_details", "é".repeat(2000));
        let detail = trace.entries()[0].detail.as_ref().unwrap();
        assert_eq!(detail.chars().count(), MAX_DETAIL_CHARS + 1);
        assert!(detail.ends_with('…'));
    }

    #[test]
    fn find_and_has_success() {
        let mut trace = Trace::new();
        trace.failure(Stage::Upc, "upcitemdb", "down");
        assert!(trace.find(Stage::Upc, "upcitemdb").is_some());
        assert!(!trace.has_success(Stage::Upc, "upcitemdb"));
        assert!(trace.find(Stage::Search, "upcitemdb").is_none());
    }

    #[test]
    fn serializes_snake_case() {
        let mut trace = Trace::new();
        trace.success(Stage::CrossReference, "omdb_by_id", "tt0381061");
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["entries"][0]["stage"], "cross_reference");
        assert_eq!(json["entries"][0]["outcome"], "success");
        assert_eq!(json["dropped"], 0);
    }
}
