//! Search results and the state published to subscribers.

use crate::error::SearchFailure;
use crate::models::exercise::ExerciseRecord;
use crate::models::filters::SearchFilters;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of one query execution. Read-only once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub records: Vec<Arc<ExerciseRecord>>,
    pub total: usize,
    pub elapsed_ms: u64,
    pub highlight_terms: BTreeSet<String>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A window of the ranked records. Out-of-range offsets yield an empty slice.
    pub fn page(&self, offset: usize, limit: usize) -> &[Arc<ExerciseRecord>] {
        let start = offset.min(self.records.len());
        let end = start.saturating_add(limit).min(self.records.len());
        &self.records[start..end]
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lifecycle phase of the controller's latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Nothing pending; `result` (or `error`) reflects the latest request.
    Idle,
    /// Waiting for the input to go quiet.
    Debouncing,
    /// A search is running for the latest request.
    Searching,
}

/// Snapshot delivered to subscribers after every state change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub phase: SearchPhase,
    /// Publication counter; strictly increases with every published state.
    pub revision: u64,
    /// Request sequence this state belongs to.
    pub sequence: u64,
    pub query: String,
    pub filters: SearchFilters,
    pub result: Arc<SearchResult>,
    /// Time spent producing `result` for this request (≈0 on a cache hit).
    pub elapsed_ms: u64,
    pub summary: String,
    pub from_cache: bool,
    pub error: Option<SearchFailure>,
    /// Most recent successful result; survives later failures until `clear()`.
    pub last_success: Option<Arc<SearchResult>>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::initial()
    }
}

impl SearchState {
    pub(crate) fn initial() -> Self {
        Self {
            phase: SearchPhase::Idle,
            revision: 0,
            sequence: 0,
            query: String::new(),
            filters: SearchFilters::default(),
            result: Arc::new(SearchResult::empty()),
            elapsed_ms: 0,
            summary: String::new(),
            from_cache: false,
            error: None,
            last_success: None,
        }
    }

    pub fn total(&self) -> usize {
        self.result.total
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Human-readable one-line description of a completed search, e.g.
/// `3 results for "press" with 1 filter (2ms)`.
pub fn summarize(total: usize, query: &str, filter_count: usize, elapsed_ms: u64) -> String {
    let results = if total == 1 { "result" } else { "results" };
    let filters = if filter_count == 1 { "filter" } else { "filters" };
    let query = query.trim();

    if query.is_empty() {
        format!("{total} {results} with {filter_count} {filters} ({elapsed_ms}ms)")
    } else {
        format!("{total} {results} for \"{query}\" with {filter_count} {filters} ({elapsed_ms}ms)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(names: &[&str]) -> SearchResult {
        let records: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Arc::new(ExerciseRecord::new(i.to_string(), *name)))
            .collect();
        SearchResult {
            total: records.len(),
            records,
            ..SearchResult::default()
        }
    }

    #[test]
    fn test_page_bounds() {
        let result = result_with(&["a", "b", "c", "d", "e"]);

        assert_eq!(result.page(0, 2).len(), 2);
        assert_eq!(result.page(4, 10).len(), 1);
        assert!(result.page(10, 2).is_empty());
        assert_eq!(result.page(1, usize::MAX)[0].name, "b");
    }

    #[test]
    fn test_summary_format() {
        assert_eq!(
            summarize(3, "press", 2, 4),
            "3 results for \"press\" with 2 filters (4ms)"
        );
        assert_eq!(summarize(1, "squat", 1, 0), "1 result for \"squat\" with 1 filter (0ms)");
        assert_eq!(summarize(12, "  ", 0, 1), "12 results with 0 filters (1ms)");
    }
}
