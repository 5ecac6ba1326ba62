//! Relevance ordering.

use super::query::ParsedQuery;
use crate::models::ExerciseRecord;
use std::sync::Arc;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Sort key that orders names the way a reader expects: case-insensitive, with
/// accented letters next to their base letter (`"Écarté"` sorts with `"e"`).
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Order records by relevance to `query`.
///
/// Records whose name contains the whole normalized query come first; each group is
/// then alphabetical by [`collation_key`]. The sort is stable, so records with equal
/// keys keep their input order.
pub fn rank_records(
    mut records: Vec<Arc<ExerciseRecord>>,
    query: &ParsedQuery,
) -> Vec<Arc<ExerciseRecord>> {
    let needle = query.normalized();

    records.sort_by_cached_key(|record| {
        let name_match = !needle.is_empty() && record.name.to_lowercase().contains(needle);
        (!name_match, collation_key(&record.name))
    });
    records
}
