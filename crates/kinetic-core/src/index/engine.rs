//! Synchronous parse → filter → rank pipeline.

use super::filter::filter_records;
use super::query::ParsedQuery;
use super::rank::rank_records;
use crate::models::{SearchFilters, SearchResult};
use crate::store::RecordStore;
use std::time::Instant;

/// Execute one search against a store snapshot. Never suspends.
pub fn run_search(
    store: &RecordStore,
    query: &ParsedQuery,
    filters: &SearchFilters,
) -> SearchResult {
    let started = Instant::now();

    let matched = filter_records(store, query, filters);
    let records = rank_records(matched, query);

    SearchResult {
        total: records.len(),
        records,
        elapsed_ms: started.elapsed().as_millis() as u64,
        highlight_terms: query.highlight_terms(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::query::parse_query;
    use crate::models::{ExerciseRecord, FilterPatch};

    #[test]
    fn test_run_search_filters_and_ranks() {
        let store = RecordStore::from_records(vec![
            ExerciseRecord::new("1", "Push Up").with_category("bodyweight"),
            ExerciseRecord::new("2", "Bench Press").with_category("strength"),
            ExerciseRecord::new("3", "Arnold Press").with_category("strength"),
        ]);
        let filters = SearchFilters::default()
            .merged(&FilterPatch::new().categories(["strength"]))
            .unwrap();

        let result = run_search(&store, &parse_query("Press"), &filters);

        assert_eq!(result.total, 2);
        assert_eq!(result.records[0].name, "Arnold Press");
        assert_eq!(result.records[1].name, "Bench Press");
        assert!(result.highlight_terms.contains("press"));
    }

    #[test]
    fn test_run_search_empty_store() {
        let store = RecordStore::from_records(Vec::new());
        let result = run_search(&store, &parse_query("anything"), &SearchFilters::default());
        assert_eq!(result.total, 0);
        assert!(result.is_empty());
    }
}
