//! 1-D generator fitness: how many distinct primes does `round(f(i))` hit
//! over the sample range.

use std::collections::HashSet;

use crate::data::PrimeCache;
use crate::engines::generation::Expr;
use crate::types::{Score, ScoreComponents};

/// Rounded outputs past this magnitude are treated like non-finite values;
/// the i64 cast would saturate there and trial division at that size would
/// dominate a run.
const SEQUENCE_VALUE_LIMIT: f64 = 1e9;

pub struct PrimeGenEvaluator {
    sample_size: usize,
}

impl PrimeGenEvaluator {
    pub fn new(sample_size: usize) -> Self {
        Self { sample_size }
    }

    pub fn evaluate(&self, expr: &Expr, cache: &mut PrimeCache) -> Score {
        let mut sequence = Vec::with_capacity(self.sample_size);
        for i in 1..=self.sample_size as i64 {
            let value = expr.evaluate(i).round();
            if value.is_finite() && value.abs() <= SEQUENCE_VALUE_LIMIT {
                sequence.push(value as i64);
            } else {
                sequence.push(0);
            }
        }

        let unique_numbers: HashSet<i64> = sequence.iter().copied().collect();
        let mut unique_primes = HashSet::new();
        for &value in &sequence {
            let magnitude = value.abs();
            if magnitude >= 2 && cache.is_prime(magnitude) {
                unique_primes.insert(magnitude);
            }
        }

        let hit_ratio = unique_primes.len() as f64 / self.sample_size as f64;

        Score {
            total: hit_ratio.max(0.0),
            components: ScoreComponents::PrimeGen {
                unique_numbers: unique_numbers.len(),
                unique_primes: unique_primes.len(),
                hit_ratio,
                complexity: complexity(&expr.to_string()),
            },
        }
    }
}

/// Rough size measure over the rendered expression, reported alongside the
/// score but never part of it.
fn complexity(expr: &str) -> f64 {
    const OPERATIONS: [&str; 11] = [
        "sin", "cos", "sqrt", "log", "abs", "+", "-", "*", "/", "%", "^",
    ];
    let mut complexity = 1.0;
    for op in OPERATIONS {
        complexity += expr.matches(op).count() as f64;
    }
    complexity + expr.len() as f64 * 0.01
}
