//! Simulated annealing with a geometric cooling schedule.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::types::Candidate;

use super::{beats, scorable_candidate, total_of, Optimizer, SearchContext, StepUpdate};

const SYMMETRIC_MUTATION_RATE: f64 = 0.15;
const PROPOSAL_ATTEMPTS: usize = 10;
const INIT_ATTEMPTS: usize = 20;

pub struct SaOptimizer {
    current: Candidate,
    current_score: Option<f64>,
    best: Candidate,
    best_score: Option<f64>,
    temperature: f64,
    cooling_rate: f64,
    seen: HashSet<String>,
}

impl SaOptimizer {
    pub fn new(ctx: &mut SearchContext) -> Self {
        let (current, score) = scorable_candidate(ctx, INIT_ATTEMPTS);
        let current_score = total_of(&score);
        let mut seen = HashSet::new();
        seen.insert(current.key());
        debug!("sa start: {} ({:?})", current, current_score);
        Self {
            best: current.clone(),
            best_score: current_score,
            temperature: ctx.config.search.sa.initial_temperature,
            cooling_rate: ctx.config.search.sa.cooling_rate,
            current,
            current_score,
            seen,
        }
    }
}

impl Optimizer for SaOptimizer {
    fn step(&mut self, ctx: &mut SearchContext) -> StepUpdate {
        // Retry a few times past duplicates and unscorable pairs; give up
        // on this tick if none surfaces.
        let mut candidate = ctx.mutate_candidate(&self.current, SYMMETRIC_MUTATION_RATE, false);
        let mut key = candidate.key();
        let mut candidate_score = None;
        for attempt in 0.. {
            if !self.seen.contains(&key) {
                candidate_score = ctx.score(&candidate).map(|s| s.total);
                if candidate_score.is_some() {
                    break;
                }
            }
            if attempt + 1 >= PROPOSAL_ATTEMPTS {
                break;
            }
            candidate = ctx.mutate_candidate(&self.current, SYMMETRIC_MUTATION_RATE, false);
            key = candidate.key();
        }

        if let Some(score) = candidate_score {
            self.seen.insert(key);
            let current = self.current_score.unwrap_or(f64::NEG_INFINITY);
            let delta = score - current;
            let accept =
                delta > 0.0 || ctx.rng().gen::<f64>() < (delta / self.temperature).exp();
            if accept {
                self.current = candidate.clone();
                self.current_score = Some(score);
                if beats(Some(score), self.best_score) {
                    self.best = candidate.clone();
                    self.best_score = Some(score);
                }
            }
        }

        self.temperature *= self.cooling_rate;

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

    fn context(seed: u64) -> SearchContext {
        let mut config = AppConfig::default();
        config.search.mode = SearchMode::PrimeGen;
        config.search.algorithm = Algorithm::Sa;
        config.search.sample_size = 50;
        config.search.seed = Some(seed);
        SearchContext::new(config)
    }

    #[test]
    fn test_temperature_cools_every_step() {
        let mut ctx = context(31);
        let mut optimizer = SaOptimizer::new(&mut ctx);
        let initial = optimizer.temperature;
        for _ in 0..100 {
            optimizer.step(&mut ctx);
        }
        let expected = initial * ctx.config.search.sa.cooling_rate.powi(100);
        assert!((optimizer.temperature - expected).abs() < 1e-9);
    }

    #[test]
    fn test_best_never_regresses() {
        let mut ctx = context(32);
        let mut optimizer = SaOptimizer::new(&mut ctx);
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
    fn test_accepted_keys_are_unique() {
        let mut ctx = context(33);
        let mut optimizer = SaOptimizer::new(&mut ctx);
        for _ in 0..200 {
            optimizer.step(&mut ctx);
        }
        // One key per scored proposal plus the initial candidate.
        assert!(optimizer.seen.len() <= 201);
    }
}
