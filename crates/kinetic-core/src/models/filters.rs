//! Structured search filters.

use crate::error::{KineticError, Result};
use crate::models::exercise::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A filterable dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterDimension {
    Categories,
    Equipment,
    Muscles,
    Difficulty,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] = [
        FilterDimension::Categories,
        FilterDimension::Equipment,
        FilterDimension::Muscles,
        FilterDimension::Difficulty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDimension::Categories => "categories",
            FilterDimension::Equipment => "equipment",
            FilterDimension::Muscles => "muscles",
            FilterDimension::Difficulty => "difficulty",
        }
    }
}

impl FromStr for FilterDimension {
    type Err = KineticError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "categories" => Ok(FilterDimension::Categories),
            "equipment" => Ok(FilterDimension::Equipment),
            "muscles" => Ok(FilterDimension::Muscles),
            "difficulty" => Ok(FilterDimension::Difficulty),
            other => Err(KineticError::invalid_filter(
                other,
                "unknown filter dimension",
            )),
        }
    }
}

impl std::fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currently selected filter values. An empty set places no constraint on its dimension.
///
/// String values are stored trimmed and lowercased so that matching and cache keys
/// are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub categories: BTreeSet<String>,
    pub equipment: BTreeSet<String>,
    pub muscles: BTreeSet<String>,
    pub difficulty: BTreeSet<Difficulty>,
}

impl SearchFilters {
    /// True when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.equipment.is_empty()
            && self.muscles.is_empty()
            && self.difficulty.is_empty()
    }

    /// Number of selected values across all dimensions.
    pub fn active_count(&self) -> usize {
        self.categories.len() + self.equipment.len() + self.muscles.len() + self.difficulty.len()
    }

    /// Return a copy with `patch` applied. Fails without side effects if any value
    /// in the patch is rejected.
    pub fn merged(&self, patch: &FilterPatch) -> Result<SearchFilters> {
        let mut next = self.clone();
        if let Some(values) = &patch.categories {
            next.categories = normalize_values(FilterDimension::Categories, values)?;
        }
        if let Some(values) = &patch.equipment {
            next.equipment = normalize_values(FilterDimension::Equipment, values)?;
        }
        if let Some(values) = &patch.muscles {
            next.muscles = normalize_values(FilterDimension::Muscles, values)?;
        }
        if let Some(values) = &patch.difficulty {
            next.difficulty = values
                .iter()
                .map(|v| v.parse::<Difficulty>())
                .collect::<Result<BTreeSet<_>>>()?;
        }
        Ok(next)
    }

    /// Deterministic serialization used in cache keys.
    pub fn fingerprint(&self) -> String {
        let difficulty: Vec<&str> = self.difficulty.iter().map(Difficulty::as_str).collect();
        format!(
            "c={};e={};m={};d={}",
            join_set(&self.categories),
            join_set(&self.equipment),
            join_set(&self.muscles),
            difficulty.join(",")
        )
    }
}

fn join_set(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

fn normalize_values(dimension: FilterDimension, values: &[String]) -> Result<BTreeSet<String>> {
    values
        .iter()
        .map(|value| {
            let normalized = value.trim().to_lowercase();
            if normalized.is_empty() {
                Err(KineticError::invalid_filter(
                    dimension.as_str(),
                    "blank values are not allowed",
                ))
            } else {
                Ok(normalized)
            }
        })
        .collect()
}

/// A partial update to [`SearchFilters`].
///
/// `Some(values)` replaces that dimension (an empty list clears it); `None` leaves it
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FilterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Vec<String>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn equipment<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn muscles<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.muscles = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn difficulty<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.difficulty = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set a dimension by its wire name.
    pub fn set(mut self, dimension: FilterDimension, values: Vec<String>) -> Self {
        match dimension {
            FilterDimension::Categories => self.categories = Some(values),
            FilterDimension::Equipment => self.equipment = Some(values),
            FilterDimension::Muscles => self.muscles = Some(values),
            FilterDimension::Difficulty => self.difficulty = Some(values),
        }
        self
    }

    /// Build a patch from `(dimension, values)` pairs, rejecting unknown dimensions.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: AsRef<str>,
    {
        pairs.into_iter().try_fold(Self::new(), |patch, (key, values)| {
            let dimension: FilterDimension = key.as_ref().parse()?;
            Ok(patch.set(dimension, values))
        })
    }

    /// Build a patch from a dynamic JSON object, rejecting unknown keys.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| KineticError::invalid_filter("patch", e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_none()
            && self.equipment.is_none()
            && self.muscles.is_none()
            && self.difficulty.is_none()
    }
}
