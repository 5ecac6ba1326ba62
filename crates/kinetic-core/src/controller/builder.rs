//! Builder for configuring SearchController initialization.

use super::SearchController;
use crate::config::SearchOptions;
use crate::store::RecordSource;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring SearchController initialization.
///
/// # Example
///
/// ```rust,ignore
/// use kinetic_core::{JsonFileSource, SearchController};
/// use std::time::Duration;
///
/// let controller = SearchController::builder(JsonFileSource::new("exercises.json"))
///     .debounce(Duration::from_millis(150))
///     .cache_capacity(100)
///     .build()
///     .await;
/// ```
pub struct SearchControllerBuilder {
    source: Arc<dyn RecordSource>,
    options: SearchOptions,
    preload: bool,
}

impl SearchControllerBuilder {
    /// Create a builder for a shared record source.
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            options: SearchOptions::default(),
            preload: true,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Quiet period between the last input change and the search.
    ///
    /// Default: 300ms
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.options.debounce = delay;
        self
    }

    /// Maximum number of cached results.
    ///
    /// Default: 50
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.options.cache_capacity = capacity;
        self
    }

    /// Expire cached results older than `max_age`. `None` keeps them until evicted.
    ///
    /// Default: `None`
    pub fn cache_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.options.cache_max_age = max_age;
        self
    }

    /// Give up on a record fetch after `limit`. `None` waits indefinitely.
    ///
    /// Default: 15s
    pub fn fetch_timeout(mut self, limit: Option<Duration>) -> Self {
        self.options.fetch_timeout = limit;
        self
    }

    /// Fetch the corpus during `build`.
    ///
    /// When disabled, the first search performs the fetch.
    ///
    /// Default: `true`
    pub fn preload(mut self, enable: bool) -> Self {
        self.preload = enable;
        self
    }

    /// Build the controller on the current tokio runtime.
    ///
    /// A failed preload is published as an error state rather than returned.
    pub async fn build(self) -> SearchController {
        let controller = SearchController::from_parts(self.source, self.options);
        if self.preload {
            controller.preload().await;
        }
        controller
    }
}

impl std::fmt::Debug for SearchControllerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchControllerBuilder")
            .field("source", &self.source.describe())
            .field("options", &self.options)
            .field("preload", &self.preload)
            .finish()
    }
}
