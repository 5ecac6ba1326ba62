//! Free-text query parsing.

use serde::Serialize;
use std::collections::BTreeSet;

/// Literal word that joins two terms into alternatives.
const OR_KEYWORD: &str = "or";

/// Prefix marking a term that must not match.
const NOT_PREFIX: char = '-';

/// How a clause combines with the rest of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
    Not,
}

/// One unit of a parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Must appear.
    Term(String),
    /// At least one must appear.
    AnyOf(Vec<String>),
    /// Must not appear.
    Exclude(String),
}

impl Clause {
    pub fn operator(&self) -> Operator {
        match self {
            Clause::Term(_) => Operator::And,
            Clause::AnyOf(_) => Operator::Or,
            Clause::Exclude(_) => Operator::Not,
        }
    }
}

/// Normalized query: lowercased tokens grouped into clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    normalized: String,
    clauses: Vec<Clause>,
}

impl ParsedQuery {
    /// Tokens joined by single spaces; the form used for ranking and cache keys.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// True when the query places no text constraint.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Positive terms (required and alternatives) in query order.
    pub fn terms(&self) -> Vec<&str> {
        self.clauses
            .iter()
            .flat_map(|clause| match clause {
                Clause::Term(term) => vec![term.as_str()],
                Clause::AnyOf(terms) => terms.iter().map(String::as_str).collect(),
                Clause::Exclude(_) => Vec::new(),
            })
            .collect()
    }

    /// Terms that exclude a record.
    pub fn excluded(&self) -> Vec<&str> {
        self.clauses
            .iter()
            .filter_map(|clause| match clause {
                Clause::Exclude(term) => Some(term.as_str()),
                _ => None,
            })
            .collect()
    }

    /// One operator per clause.
    pub fn operators(&self) -> Vec<Operator> {
        self.clauses.iter().map(Clause::operator).collect()
    }

    /// Terms a UI should highlight in matching records.
    pub fn highlight_terms(&self) -> BTreeSet<String> {
        self.terms().into_iter().map(str::to_string).collect()
    }
}

fn is_positive(token: &str) -> bool {
    token != OR_KEYWORD && !token.starts_with(NOT_PREFIX)
}

/// Parse a raw query.
///
/// - `"Bench Press"` → `[Term(bench), Term(press)]`
/// - `"press -incline"` → `[Term(press), Exclude(incline)]`
/// - `"squat or lunge"` → `[AnyOf(squat, lunge)]`
///
/// A lone `-` is ignored, and an `or` without a positive term on both sides is
/// dropped.
pub fn parse_query(raw: &str) -> ParsedQuery {
    let lowered = raw.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let mut clauses: Vec<Clause> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        if let Some(excluded) = token.strip_prefix(NOT_PREFIX) {
            if !excluded.is_empty() {
                clauses.push(Clause::Exclude(excluded.to_string()));
            }
            i += 1;
            continue;
        }

        if token == OR_KEYWORD {
            let next = tokens.get(i + 1).copied().filter(|t| is_positive(t));
            let joined = match (clauses.last_mut(), next) {
                (Some(last @ Clause::Term(_)), Some(next)) => {
                    if let Clause::Term(prev) = std::mem::replace(last, Clause::AnyOf(Vec::new())) {
                        *last = Clause::AnyOf(vec![prev, next.to_string()]);
                    }
                    true
                }
                (Some(Clause::AnyOf(alternatives)), Some(next)) => {
                    alternatives.push(next.to_string());
                    true
                }
                _ => false,
            };
            i += if joined { 2 } else { 1 };
            continue;
        }

        clauses.push(Clause::Term(token.to_string()));
        i += 1;
    }

    ParsedQuery {
        normalized: tokens.join(" "),
        clauses,
    }
}
