//! Kinetic Core - Headless exercise search engine.
//!
//! This crate loads an exercise corpus once, then answers free-text queries
//! combined with category, equipment, muscle and difficulty filters. Results are
//! ranked, memoized in a bounded LRU cache and published through a debounced
//! controller that never lets a slow search overwrite a newer one.
//!
//! # Example
//!
//! ```rust,ignore
//! use kinetic_core::{FilterPatch, JsonFileSource, SearchController};
//!
//! #[tokio::main]
//! async fn main() -> kinetic_core::Result<()> {
//!     let controller = SearchController::initialize(JsonFileSource::new("exercises.json")).await;
//!
//!     controller.set_filters(FilterPatch::new().equipment(["barbell"]))?;
//!     controller.set_query("press -incline");
//!
//!     let state = controller.settled().await;
//!     println!("{}", state.summary);
//!     for record in state.result.page(0, 10) {
//!         println!("{}", record.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod index;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStats, ResultCache};
pub use config::{SearchConfig, SearchOptions};
pub use controller::{ControllerStats, SearchController, SearchControllerBuilder, Subscription};
pub use error::{ErrorKind, KineticError, Result, SearchFailure};
pub use index::{parse_query, run_search, ParsedQuery};
pub use models::{
    Difficulty, ExerciseRecord, FilterDimension, FilterPatch, SearchFilters, SearchPhase,
    SearchResult, SearchState,
};
pub use store::{Facets, FnSource, JsonFileSource, RecordSource, RecordStore, StaticSource};
