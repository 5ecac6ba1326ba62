//! Data model shared by the store, the search pipeline and the controller.

mod exercise;
mod filters;
mod state;

pub use exercise::{Difficulty, ExerciseRecord};
pub use filters::{FilterDimension, FilterPatch, SearchFilters};
pub use state::{summarize, SearchPhase, SearchResult, SearchState};
