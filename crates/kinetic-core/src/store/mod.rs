//! Record store and the sources that populate it.
//!
//! A source fetches the full corpus; the store turns it into an immutable snapshot
//! with pre-folded text so the filter engine never allocates per comparison.

mod snapshot;
mod source;

pub use snapshot::{Facets, IndexedRecord, RecordStore};
pub use source::{FnSource, JsonFileSource, RecordSource, StaticSource};
