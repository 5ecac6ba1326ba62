//! Result cache for the search controller.
//!
//! Memoizes `(query, filters) → SearchResult` for one controller. Entries are
//! evicted least-recently-used first once capacity is reached; an optional max age
//! expires entries lazily on lookup.

mod result_cache;

pub use result_cache::{CacheEntry, CacheKey, CacheStats, ResultCache};
