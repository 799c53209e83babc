//! Late Acceptance Hill Climbing.
//!
//! A candidate is accepted when it beats the current solution or the tail
//! of a bounded acceptance history, which lets the search ride out
//! plateaus without a cooling schedule.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::types::Candidate;

use super::{beats, scorable_candidate, total_of, Optimizer, SearchContext, StepUpdate};

const SYMMETRIC_MUTATION_RATE: f64 = 0.20;
const INIT_ATTEMPTS: usize = 20;

pub struct LahcOptimizer {
    current: Candidate,
    current_score: Option<f64>,
    best: Candidate,
    best_score: Option<f64>,
    history: VecDeque<Option<f64>>,
    history_length: usize,
    seen: HashSet<String>,
}

impl LahcOptimizer {
    pub fn new(ctx: &mut SearchContext) -> Self {
        let (current, score) = scorable_candidate(ctx, INIT_ATTEMPTS);
        let current_score = total_of(&score);
        let mut seen = HashSet::new();
        seen.insert(current.key());
        debug!("lahc start: {} ({:?})", current, current_score);
        Self {
            best: current.clone(),
            best_score: current_score,
            history: VecDeque::new(),
            history_length: ctx.config.search.lahc.history_length,
            current,
            current_score,
            seen,
        }
    }
}

/// Accept when the candidate strictly beats the current score or the
/// newest entry of the history window.
fn accepts(
    candidate: Option<f64>,
    current: Option<f64>,
    history: &VecDeque<Option<f64>>,
) -> bool {
    let late = history.back().copied().flatten();
    beats(candidate, current) || beats(candidate, late)
}

impl Optimizer for LahcOptimizer {
    fn step(&mut self, ctx: &mut SearchContext) -> StepUpdate {
        let candidate = ctx.mutate_candidate(&self.current, SYMMETRIC_MUTATION_RATE, true);
        let key = candidate.key();
        let fresh = !self.seen.contains(&key);
        let candidate_score = if fresh {
            total_of(&ctx.score(&candidate))
        } else {
            None
        };

        if fresh {
            self.seen.insert(key);
            if accepts(candidate_score, self.current_score, &self.history) {
                self.current = candidate.clone();
                self.current_score = candidate_score;
                if beats(candidate_score, self.best_score) {
                    self.best = candidate.clone();
                    self.best_score = candidate_score;
                }
            }
        }

        self.history.push_back(self.current_score);
        if self.history.len() > self.history_length {
            self.history.pop_front();
        }

        StepUpdate {
            current: candidate.to_string(),
            current_score: candidate_score,
            best: self.best.to_string(),
            best_score: self.best_score,
        }
    }

    fn best(&self) -> (&Candidate, Option<f64>) {
        (&self.best, self.best_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::{Algorithm, SearchMode};

    fn context() -> SearchContext {
        let mut config = AppConfig::default();
        config.search.mode = SearchMode::PrimeGen;
        config.search.algorithm = Algorithm::Lahc;
        config.search.sample_size = 50;
        config.search.seed = Some(21);
        SearchContext::new(config)
    }

    #[test]
    fn test_acceptance_compares_current_and_newest_history_entry() {
        let history: VecDeque<Option<f64>> = [Some(0.2), Some(0.3)].into_iter().collect();
        // Beats current 0.25 even though it loses to the history tail.
        assert!(accepts(Some(0.28), Some(0.25), &history));
        // Beats the tail 0.3 even against a stronger current.
        assert!(accepts(Some(0.35), Some(0.4), &history));
        // Beats only the oldest entry, which does not count.
        assert!(!accepts(Some(0.25), Some(0.4), &history));
        assert!(!accepts(Some(0.1), Some(0.25), &history));
        // Ties are rejected on both comparisons.
        assert!(!accepts(Some(0.3), Some(0.3), &history));
        // Unscorable candidates never pass.
        assert!(!accepts(None, Some(0.0), &history));
    }

    #[test]
    fn test_best_never_regresses() {
        let mut ctx = context();
        let mut optimizer = LahcOptimizer::new(&mut ctx);
        let mut previous = optimizer.best().1;
        for _ in 0..300 {
            optimizer.step(&mut ctx);
            let best = optimizer.best().1;
            if let (Some(b), Some(p)) = (best, previous) {
                assert!(b >= p);
            }
            previous = best;
        }
    }

    #[test]
    fn test_history_window_is_bounded() {
        let mut ctx = context();
        let mut optimizer = LahcOptimizer::new(&mut ctx);
        for _ in 0..200 {
            optimizer.step(&mut ctx);
        }
        assert_eq!(
            optimizer.history.len(),
            ctx.config.search.lahc.history_length
        );
    }

    #[test]
    fn test_duplicates_are_not_rescored() {
        let mut ctx = context();
        let mut optimizer = LahcOptimizer::new(&mut ctx);
        for _ in 0..300 {
            optimizer.step(&mut ctx);
        }
        // Every accepted key is unique by construction.
        assert!(optimizer.seen.len() <= 301);
    }
}
