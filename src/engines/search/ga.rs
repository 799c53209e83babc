//! Generational GA with tournament selection, elitism, and dedup-checked
//! refill. One [`Optimizer::step`] is one full generation.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::types::Candidate;

use super::{beats, total_of, Optimizer, SearchContext, StepUpdate};

const FULL_RANDOM_MUTATION_RATE: f64 = 0.1;
const SYMMETRIC_MUTATION_RATE: f64 = 0.15;
const TOURNAMENT_RETRIES: usize = 10;
/// Refill attempts per generation before falling back to fresh random
/// candidates, so a saturated search space cannot wedge the loop.
const REFILL_ATTEMPTS: usize = 200;

pub struct GaOptimizer {
    population: Vec<(Candidate, Option<f64>)>,
    population_size: usize,
    tournament_size: usize,
    best: Candidate,
    best_score: Option<f64>,
    seen: HashSet<String>,
}

impl GaOptimizer {
    pub fn new(ctx: &mut SearchContext) -> Self {
        let population_size = ctx.config.search.ga.population_size;
        let tournament_size = ctx.config.search.ga.tournament_size;

        let mut seen = HashSet::new();
        let mut population = Vec::with_capacity(population_size);
        let mut attempts = 0;
        while population.len() < population_size {
            let candidate = ctx.random_candidate();
            let key = candidate.key();
            if seen.contains(&key) && attempts < REFILL_ATTEMPTS {
                attempts += 1;
                continue;
            }
            seen.insert(key);
            let score = total_of(&ctx.score(&candidate));
            population.push((candidate, score));
        }

        let mut best = population[0].0.clone();
        let mut best_score = population[0].1;
        for (candidate, score) in &population[1..] {
            if beats(*score, best_score) {
                best = candidate.clone();
                best_score = *score;
            }
        }

        debug!("ga start: best {} ({:?})", best, best_score);
        Self {
            population,
            population_size,
            tournament_size,
            best,
            best_score,
            seen,
        }
    }

    fn select_parent(&self, ctx: &mut SearchContext) -> Candidate {
        let pick_scored = |ctx: &mut SearchContext, this: &Self| {
            let mut pick = &this.population[ctx.rng().gen_range(0..this.population.len())];
            for _ in 0..TOURNAMENT_RETRIES {
                if pick.1.is_some() {
                    break;
                }
                pick = &this.population[ctx.rng().gen_range(0..this.population.len())];
            }
            pick.clone()
        };

        let (mut best, mut best_score) = pick_scored(ctx, self);
        for _ in 1..self.tournament_size {
            let (candidate, score) = pick_scored(ctx, self);
            if beats(score, best_score) {
                best = candidate;
                best_score = score;
            }
        }
        best
    }

    fn mutate_child(&self, ctx: &mut SearchContext, child: &Candidate) -> Candidate {
        if ctx.rng().gen::<f64>() < FULL_RANDOM_MUTATION_RATE {
            return ctx.random_candidate();
        }
        if child.mode() == crate::types::SearchMode::PrimeFold {
            // Crossover supplies most of the variation; mutation only adds
            // the occasional symmetry nudge.
            return ctx.mutate_candidate(child, SYMMETRIC_MUTATION_RATE, false);
        }
        child.clone()
    }

    fn admit(
        &mut self,
        ctx: &mut SearchContext,
        candidate: Candidate,
        next: &mut Vec<(Candidate, Option<f64>)>,
    ) -> bool {
        let key = candidate.key();
        if self.seen.contains(&key) {
            return false;
        }
        let Some(score) = ctx.score(&candidate) else {
            return false;
        };
        self.seen.insert(key);
        if beats(Some(score.total), self.best_score) {
            self.best = candidate.clone();
            self.best_score = Some(score.total);
        }
        next.push((candidate, Some(score.total)));
        true
    }
}

impl Optimizer for GaOptimizer {
    fn step(&mut self, ctx: &mut SearchContext) -> StepUpdate {
        let mut next = Vec::with_capacity(self.population_size);
        // Elite slot: the best candidate survives unconditionally.
        next.push((self.best.clone(), self.best_score));

        let mut attempts = 0;
        let mut last_child = self.best.clone();
        let mut last_score = self.best_score;
        while next.len() < self.population_size {
            let (child_a, child_b) = if attempts < REFILL_ATTEMPTS {
                let parent_a = self.select_parent(ctx);
                let parent_b = self.select_parent(ctx);
                ctx.crossover_candidates(&parent_a, &parent_b)
            } else {
                // Saturated: fall back to fresh random candidates.
                (ctx.random_candidate(), ctx.random_candidate())
            };
            attempts += 1;

            for child in [child_a, child_b] {
                if next.len() >= self.population_size {
                    break;
                }
                let mutated = self.mutate_child(ctx, &child);
                if attempts > REFILL_ATTEMPTS * 2 {
                    // Last resort: admit without the dedup check.
                    let score = total_of(&ctx.score(&mutated));
                    next.push((mutated.clone(), score));
                    last_child = mutated;
                    last_score = score;
                } else if self.admit(ctx, mutated.clone(), &mut next) {
                    last_child = mutated;
                    last_score = next.last().map(|(_, s)| *s).unwrap_or(None);
                }
            }
        }
        self.population = next;

        StepUpdate {
            current: last_child.to_string(),
            current_score: last_score,
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

    fn context(mode: SearchMode, seed: u64) -> SearchContext {
        let mut config = AppConfig::default();
        config.search.mode = mode;
        config.search.algorithm = Algorithm::Ga;
        config.search.sample_size = 50;
        config.search.seed = Some(seed);
        SearchContext::new(config)
    }

    #[test]
    fn test_population_size_is_invariant() {
        let mut ctx = context(SearchMode::PrimeGen, 41);
        let mut optimizer = GaOptimizer::new(&mut ctx);
        assert_eq!(optimizer.population.len(), 10);
        for _ in 0..5 {
            optimizer.step(&mut ctx);
            assert_eq!(optimizer.population.len(), 10);
        }
    }

    #[test]
    fn test_elite_survives_every_generation() {
        let mut ctx = context(SearchMode::PrimeGen, 42);
        let mut optimizer = GaOptimizer::new(&mut ctx);
        for _ in 0..5 {
            let best_before = optimizer.best().0.key();
            let score_before = optimizer.best().1;
            optimizer.step(&mut ctx);
            let kept = optimizer
                .population
                .iter()
                .any(|(c, _)| c.key() == best_before);
            assert!(kept || beats(optimizer.best().1, score_before));
        }
    }

    #[test]
    fn test_best_never_regresses() {
        let mut ctx = context(SearchMode::PrimeFold, 43);
        let mut optimizer = GaOptimizer::new(&mut ctx);
        let mut previous = optimizer.best().1;
        for _ in 0..5 {
            optimizer.step(&mut ctx);
            let best = optimizer.best().1;
            if let (Some(b), Some(p)) = (best, previous) {
                assert!(b >= p);
            }
            previous = best;
        }
    }
}
