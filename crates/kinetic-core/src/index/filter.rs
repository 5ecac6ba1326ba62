//! Record filtering: free-text clauses AND structured filters.
//!
//! Matching is plain case-insensitive substring containment. There is no typo
//! tolerance; `"sqaut"` does not find `"Squat"`.

use super::query::{Clause, ParsedQuery};
use crate::models::{ExerciseRecord, SearchFilters};
use crate::store::{IndexedRecord, RecordStore};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Records matching `query` and `filters`, in store order.
pub fn filter_records(
    store: &RecordStore,
    query: &ParsedQuery,
    filters: &SearchFilters,
) -> Vec<Arc<ExerciseRecord>> {
    store
        .entries()
        .iter()
        .filter(|entry| matches(entry, query, filters))
        .map(|entry| Arc::clone(&entry.record))
        .collect()
}

/// Whether a single record satisfies every text clause and every filter dimension.
pub fn matches(entry: &IndexedRecord, query: &ParsedQuery, filters: &SearchFilters) -> bool {
    matches_text(&entry.search_text, query) && matches_filters(entry, filters)
}

fn matches_text(text: &str, query: &ParsedQuery) -> bool {
    query.clauses().iter().all(|clause| match clause {
        Clause::Term(term) => text.contains(term.as_str()),
        Clause::AnyOf(terms) => terms.iter().any(|term| text.contains(term.as_str())),
        Clause::Exclude(term) => !text.contains(term.as_str()),
    })
}

fn matches_filters(entry: &IndexedRecord, filters: &SearchFilters) -> bool {
    let category_ok = filters.categories.is_empty()
        || entry
            .category
            .as_ref()
            .is_some_and(|category| filters.categories.contains(category));

    let difficulty_ok = filters.difficulty.is_empty()
        || entry
            .record
            .difficulty
            .is_some_and(|difficulty| filters.difficulty.contains(&difficulty));

    category_ok
        && difficulty_ok
        && intersects(&filters.equipment, &entry.equipment)
        && intersects(&filters.muscles, &entry.muscles)
}

/// An empty selection accepts everything; otherwise any shared value is enough.
fn intersects(selected: &BTreeSet<String>, values: &BTreeSet<String>) -> bool {
    selected.is_empty() || !selected.is_disjoint(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::query::parse_query;
    use crate::models::{Difficulty, FilterPatch};

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            ExerciseRecord::new("1", "Bench Press")
                .with_category("strength")
                .with_equipment(["Barbell"])
                .with_primary_muscles(["Chest"])
                .with_difficulty(Difficulty::Intermediate),
            ExerciseRecord::new("2", "Incline Press")
                .with_category("strength")
                .with_equipment(["Dumbbell"])
                .with_primary_muscles(["Chest"])
                .with_difficulty(Difficulty::Intermediate),
            ExerciseRecord::new("3", "Goblet Squat")
                .with_category("strength")
                .with_equipment(["Kettlebell"])
                .with_primary_muscles(["Quadriceps"])
                .with_secondary_muscles(["Glutes"])
                .with_difficulty(Difficulty::Beginner),
            ExerciseRecord::new("4", "Jumping Jacks")
                .with_category("cardio")
                .with_instructions(["Jump while raising the arms overhead"]),
        ])
    }

    fn filters(patch: FilterPatch) -> SearchFilters {
        SearchFilters::default().merged(&patch).unwrap()
    }

    fn ids(records: &[Arc<ExerciseRecord>]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let result = filter_records(&store(), &parse_query(""), &SearchFilters::default());
        assert_eq!(ids(&result), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_every_term_required() {
        let empty = SearchFilters::default();
        let result = filter_records(&store(), &parse_query("press chest"), &empty);
        assert_eq!(ids(&result), vec!["1", "2"]);

        let result = filter_records(&store(), &parse_query("press quadriceps"), &empty);
        assert!(result.is_empty());
    }

    #[test]
    fn test_terms_match_instructions_and_muscles() {
        let empty = SearchFilters::default();
        let matching = |text: &str| filter_records(&store(), &parse_query(text), &empty);
        assert_eq!(ids(&matching("overhead")), vec!["4"]);
        assert_eq!(ids(&matching("GLUTES")), vec!["3"]);
        assert_eq!(ids(&matching("kettle")), vec!["3"]);
    }

    #[test]
    fn test_not_term_excludes() {
        let query = parse_query("press -incline");
        let result = filter_records(&store(), &query, &SearchFilters::default());
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn test_or_group() {
        let query = parse_query("squat or jacks");
        let result = filter_records(&store(), &query, &SearchFilters::default());
        assert_eq!(ids(&result), vec!["3", "4"]);
    }

    #[test]
    fn test_no_typo_tolerance() {
        let result = filter_records(&store(), &parse_query("sqaut"), &SearchFilters::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_filters_and_across_dimensions() {
        let selected = filters(
            FilterPatch::new()
                .categories(["Strength"])
                .equipment(["barbell", "kettlebell"]),
        );
        let result = filter_records(&store(), &parse_query(""), &selected);
        assert_eq!(ids(&result), vec!["1", "3"]);
    }

    #[test]
    fn test_category_and_equipment_narrow_ten_records() {
        let store = RecordStore::from_records(vec![
            ExerciseRecord::new("1", "Back Squat")
                .with_category("strength")
                .with_equipment(["barbell"]),
            ExerciseRecord::new("2", "Deadlift")
                .with_category("strength")
                .with_equipment(["barbell"]),
            ExerciseRecord::new("3", "Barbell Row")
                .with_category("strength")
                .with_equipment(["barbell"]),
            ExerciseRecord::new("4", "Dumbbell Curl")
                .with_category("strength")
                .with_equipment(["dumbbell"]),
            ExerciseRecord::new("5", "Power Clean")
                .with_category("olympic weightlifting")
                .with_equipment(["barbell"]),
            ExerciseRecord::new("6", "Barbell Rollout")
                .with_category("stretching")
                .with_equipment(["barbell"]),
            ExerciseRecord::new("7", "Rowing")
                .with_category("cardio")
                .with_equipment(["machine"]),
            ExerciseRecord::new("8", "Burpee").with_category("plyometrics"),
            ExerciseRecord::new("9", "Hamstring Stretch").with_category("stretching"),
            ExerciseRecord::new("10", "Sled Push").with_equipment(["barbell"]),
        ]);
        let selected = filters(
            FilterPatch::new()
                .categories(["strength"])
                .equipment(["barbell"]),
        );

        let result = filter_records(&store, &parse_query(""), &selected);
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_muscle_filter_uses_secondary() {
        let selected = filters(FilterPatch::new().muscles(["glutes"]));
        let result = filter_records(&store(), &parse_query(""), &selected);
        assert_eq!(ids(&result), vec!["3"]);
    }

    #[test]
    fn test_difficulty_filter_skips_unrated() {
        let selected = filters(FilterPatch::new().difficulty(["beginner", "intermediate"]));
        let result = filter_records(&store(), &parse_query(""), &selected);
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_category_filter_rejects_missing_category() {
        let records = RecordStore::from_records(vec![ExerciseRecord::new("x", "Mystery Move")]);
        let selected = filters(FilterPatch::new().categories(["strength"]));
        assert!(filter_records(&records, &parse_query(""), &selected).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let store = store();
        let query = parse_query("press -incline");
        let selected = filters(FilterPatch::new().muscles(["chest"]));

        let first = filter_records(&store, &query, &selected);
        let second = filter_records(&store, &query, &selected);
        assert_eq!(first, second);
    }
}
