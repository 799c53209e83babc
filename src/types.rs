use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engines::generation::ast::Expr;

/// Which objective the search is optimizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// 1-D integer generation: score `round(f(i))` for prime hits.
    PrimeGen,
    /// 2-D embedding: score the point sets `(f(n), g(n))` for prime structure.
    PrimeFold,
}

/// Search algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Lahc,
    Ga,
    Sa,
}

/// One candidate under evaluation: a single expression (PrimeGen) or an
/// ordered pair (PrimeFold).
#[derive(Debug, Clone)]
pub enum Candidate {
    Gen(Expr),
    Fold(Expr, Expr),
}

impl Candidate {
    pub fn mode(&self) -> SearchMode {
        match self {
            Candidate::Gen(_) => SearchMode::PrimeGen,
            Candidate::Fold(_, _) => SearchMode::PrimeFold,
        }
    }

    /// Canonical dedup key. Candidates with equal keys evaluate identically.
    pub fn key(&self) -> String {
        match self {
            Candidate::Gen(f) => f.to_string(),
            Candidate::Fold(f, g) => format!("{},{}", f, g),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Gen(f) => write!(out, "f(n) = {}", f),
            Candidate::Fold(f, g) => write!(out, "f(n) = {}, g(n) = {}", f, g),
        }
    }
}

/// Composite fitness score: weighted total plus per-metric components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub total: f64,
    pub components: ScoreComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreComponents {
    #[serde(rename_all = "camelCase")]
    PrimeGen {
        unique_numbers: usize,
        unique_primes: usize,
        hit_ratio: f64,
        /// Diagnostic only, not part of the total.
        complexity: f64,
    },
    #[serde(rename_all = "camelCase")]
    PrimeFold {
        area_coverage: f64,
        separation: f64,
        contrast: f64,
        significance: f64,
        specificity: f64,
    },
}

impl Score {
    /// All-zero score for the given mode, used for degenerate candidates.
    pub fn zero(mode: SearchMode) -> Self {
        let components = match mode {
            SearchMode::PrimeGen => ScoreComponents::PrimeGen {
                unique_numbers: 0,
                unique_primes: 0,
                hit_ratio: 0.0,
                complexity: 0.0,
            },
            SearchMode::PrimeFold => ScoreComponents::PrimeFold {
                area_coverage: 0.0,
                separation: 0.0,
                contrast: 0.0,
                significance: 0.0,
                specificity: 0.0,
            },
        };
        Self { total: 0.0, components }
    }
}

/// Per-tick progress report passed to the run callback.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub iteration: usize,
    pub max_iterations: usize,
    pub current_expr: String,
    pub current_score: Option<f64>,
    pub best_expr: String,
    pub best_score: Option<f64>,
}

/// Final summary when a run stops or completes.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub best_expr: String,
    pub best_score: Option<f64>,
    pub iterations: usize,
}
