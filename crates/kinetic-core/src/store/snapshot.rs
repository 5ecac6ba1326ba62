//! Immutable, pre-folded snapshot of the exercise corpus.

use crate::models::{Difficulty, ExerciseRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Separator between searchable fields. Query terms never contain whitespace, so a
/// term cannot match across two fields.
const FIELD_SEPARATOR: &str = "\n";

/// A record plus the lowercased values the filter engine compares against.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    pub record: Arc<ExerciseRecord>,
    /// Name, description, instructions, muscles and equipment, lowercased.
    pub search_text: String,
    pub category: Option<String>,
    pub equipment: BTreeSet<String>,
    pub muscles: BTreeSet<String>,
}

impl IndexedRecord {
    fn new(record: ExerciseRecord) -> Self {
        let equipment: BTreeSet<String> =
            record.equipment.iter().map(|e| e.to_lowercase()).collect();
        let muscles: BTreeSet<String> = record.muscles().map(str::to_lowercase).collect();

        let mut fields: Vec<&str> = vec![record.name.as_str()];
        if let Some(description) = &record.description {
            fields.push(description);
        }
        fields.extend(record.instructions.iter().map(String::as_str));
        fields.extend(record.muscles());
        fields.extend(record.equipment.iter().map(String::as_str));
        let search_text = fields.join(FIELD_SEPARATOR).to_lowercase();

        Self {
            category: record.category.as_ref().map(|c| c.to_lowercase()),
            search_text,
            equipment,
            muscles,
            record: Arc::new(record),
        }
    }
}

/// Distinct filterable values present in the store, for populating filter pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub categories: BTreeSet<String>,
    pub equipment: BTreeSet<String>,
    pub muscles: BTreeSet<String>,
    pub difficulty: BTreeSet<Difficulty>,
}

/// Snapshot of the corpus for one search session.
///
/// Built wholesale from a fetch and never mutated; a refresh replaces the whole
/// snapshot.
#[derive(Debug, Clone)]
pub struct RecordStore {
    entries: Vec<IndexedRecord>,
    by_id: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl RecordStore {
    /// Index `records`, keeping the first occurrence of any duplicated id.
    pub fn from_records(records: Vec<ExerciseRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id.clone()) {
                warn!("Dropping duplicate exercise id {}", record.id);
                continue;
            }
            entries.push(IndexedRecord::new(record));
        }

        let by_id = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.record.id.clone(), i))
            .collect();

        Self {
            entries,
            by_id,
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed entries in load order.
    pub fn entries(&self) -> &[IndexedRecord] {
        &self.entries
    }

    /// Records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ExerciseRecord>> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ExerciseRecord>> {
        self.by_id.get(id).map(|&i| &self.entries[i].record)
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Distinct lowercased category, equipment and muscle values plus difficulties.
    pub fn facets(&self) -> Facets {
        let mut facets = Facets::default();
        for entry in &self.entries {
            if let Some(category) = &entry.category {
                facets.categories.insert(category.clone());
            }
            facets.equipment.extend(entry.equipment.iter().cloned());
            facets.muscles.extend(entry.muscles.iter().cloned());
            if let Some(difficulty) = entry.record.difficulty {
                facets.difficulty.insert(difficulty);
            }
        }
        facets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ExerciseRecord> {
        vec![
            ExerciseRecord::new("1", "Bench Press")
                .with_category("Strength")
                .with_equipment(["Barbell", "Bench"])
                .with_primary_muscles(["Chest"])
                .with_secondary_muscles(["Triceps"])
                .with_difficulty(Difficulty::Intermediate)
                .with_instructions(["Lower the bar to the chest", "Press up"]),
            ExerciseRecord::new("2", "Plank")
                .with_category("Core")
                .with_description("Isometric hold"),
        ]
    }

    #[test]
    fn test_search_text_covers_fields() {
        let store = RecordStore::from_records(sample());
        let bench = &store.entries()[0];

        assert!(bench.search_text.contains("bench press"));
        assert!(bench.search_text.contains("lower the bar"));
        assert!(bench.search_text.contains("triceps"));
        assert!(bench.search_text.contains("barbell"));
        assert!(!bench.search_text.contains("strength"));

        let plank = &store.entries()[1];
        assert!(plank.search_text.contains("isometric"));
    }

    #[test]
    fn test_filter_fields_are_lowercased() {
        let store = RecordStore::from_records(sample());
        let bench = &store.entries()[0];

        assert_eq!(bench.category.as_deref(), Some("strength"));
        assert!(bench.equipment.contains("barbell"));
        assert!(bench.muscles.contains("chest"));
        assert!(bench.muscles.contains("triceps"));
        assert_eq!(bench.record.name, "Bench Press");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut records = sample();
        records.push(ExerciseRecord::new("1", "Duplicate"));

        let store = RecordStore::from_records(records);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1").unwrap().name, "Bench Press");
    }

    #[test]
    fn test_facets() {
        let store = RecordStore::from_records(sample());
        let facets = store.facets();

        assert_eq!(
            facets.categories.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["core", "strength"]
        );
        assert!(facets.equipment.contains("bench"));
        assert!(facets.muscles.contains("triceps"));
        assert!(facets.difficulty.contains(&Difficulty::Intermediate));
    }

    #[test]
    fn test_empty_store() {
        let store = RecordStore::from_records(Vec::new());
        assert!(store.is_empty());
        assert!(store.get("anything").is_none());
        assert_eq!(store.facets(), Facets::default());
    }
}
