//! Centralized configuration for Kinetic.
//!
//! `SearchConfig` holds the compiled-in defaults; `SearchOptions` carries the
//! per-controller overrides and can be loaded from a host application's settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search engine defaults.
pub struct SearchConfig;

impl SearchConfig {
    /// Quiet period after the last input before a search runs.
    pub const DEBOUNCE: Duration = Duration::from_millis(300);
    /// Maximum number of memoized (query, filters) results.
    pub const CACHE_CAPACITY: usize = 50;
    /// Upper bound on a single record fetch.
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
    /// Records per page when a caller does not specify a limit.
    pub const DEFAULT_PAGE_SIZE: usize = 20;
}

/// Runtime options for a `SearchController`.
///
/// Durations are read and written as whole milliseconds (`debounce_ms`,
/// `cache_max_age_ms`, `fetch_timeout_ms`). An explicit `null` disables the
/// optional limits; an omitted key keeps the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchOptions {
    /// Debounce window applied to `set_query` / `set_filters`.
    #[serde(rename = "debounce_ms", with = "duration_ms")]
    pub debounce: Duration,
    /// Result cache capacity (values below 1 are treated as 1).
    pub cache_capacity: usize,
    /// Optional maximum age of a cached result (`None` = unlimited).
    #[serde(rename = "cache_max_age_ms", with = "option_duration_ms")]
    pub cache_max_age: Option<Duration>,
    /// Optional timeout for record fetches (`None` = wait indefinitely).
    #[serde(rename = "fetch_timeout_ms", with = "option_duration_ms")]
    pub fetch_timeout: Option<Duration>,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => super::duration_ms::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: SearchConfig::DEBOUNCE,
            cache_capacity: SearchConfig::CACHE_CAPACITY,
            cache_max_age: None,
            fetch_timeout: Some(SearchConfig::FETCH_TIMEOUT),
        }
    }
}

impl SearchOptions {
    /// Parse options from a JSON document, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
