//! In-memory search pipeline.
//!
//! This module provides:
//! - Query parsing into required, alternative and excluded terms
//! - Substring filtering combined with structured filters
//! - Relevance ranking
//!
//! Every function here is pure and synchronous.

mod engine;
mod filter;
mod query;
mod rank;

pub use engine::run_search;
pub use filter::{filter_records, matches};
pub use query::{parse_query, Clause, Operator, ParsedQuery};
pub use rank::{collation_key, rank_records};
