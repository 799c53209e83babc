//! Metaheuristic search over expression candidates.
//!
//! All three strategies share the same contract: [`SearchContext`] owns the
//! RNG, the prime data, and the evaluators, and one [`Optimizer::step`]
//! advances the strategy by a single tick. Candidates are whole ASTs;
//! strings only appear for display and dedup keys.

pub mod controller;
pub mod ga;
pub mod lahc;
pub mod sa;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AppConfig;
use crate::data::PrimeCache;
use crate::engines::evaluation::{PrimeFoldEvaluator, PrimeGenEvaluator};
use crate::engines::generation::{
    derive_pair, mutate_tree, random_tree, symmetric_mutation, DEFAULT_MAX_DEPTH,
};
use crate::types::{Candidate, Score, SearchMode};

pub use controller::{ProgressCallback, RunState, SearchController};
pub use ga::GaOptimizer;
pub use lahc::LahcOptimizer;
pub use sa::SaOptimizer;

/// Everything a strategy needs to propose and score candidates. One context
/// per run; no shared or global state.
pub struct SearchContext {
    pub config: AppConfig,
    cache: PrimeCache,
    primegen: PrimeGenEvaluator,
    primefold: PrimeFoldEvaluator,
    rng: StdRng,
}

impl SearchContext {
    pub fn new(config: AppConfig) -> Self {
        let mut cache = PrimeCache::new();
        let sample_size = config.search.sample_size;
        let primegen = PrimeGenEvaluator::new(sample_size);
        let primefold =
            PrimeFoldEvaluator::new(sample_size, config.fitness.clone(), &mut cache);
        let rng = match config.search.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            cache,
            primegen,
            primefold,
            rng,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.config.search.mode
    }

    /// Score a candidate. `None` means the candidate is unscorable: an
    /// embedding pair without enough finite points.
    pub fn score(&mut self, candidate: &Candidate) -> Option<Score> {
        match candidate {
            Candidate::Gen(expr) => Some(self.primegen.evaluate(expr, &mut self.cache)),
            Candidate::Fold(f, g) => self.primefold.try_evaluate(f, g, &mut self.rng),
        }
    }

    pub fn random_candidate(&mut self) -> Candidate {
        match self.mode() {
            SearchMode::PrimeGen => {
                Candidate::Gen(random_tree(&mut self.rng, DEFAULT_MAX_DEPTH))
            }
            SearchMode::PrimeFold => {
                if self.config.search.enforce_symmetry {
                    let base = random_tree(&mut self.rng, DEFAULT_MAX_DEPTH);
                    let (f, g) = derive_pair(&base, &mut self.rng);
                    Candidate::Fold(f, g)
                } else {
                    let f = random_tree(&mut self.rng, DEFAULT_MAX_DEPTH);
                    let g = random_tree(&mut self.rng, DEFAULT_MAX_DEPTH);
                    Candidate::Fold(f, g)
                }
            }
        }
    }

    /// Mutate a candidate. For pairs, `symmetric_rate` is the chance of a
    /// symmetry-preserving mutation instead of an independent one;
    /// `mutate_both` controls whether both trees or a random one change.
    pub fn mutate_candidate(
        &mut self,
        candidate: &Candidate,
        symmetric_rate: f64,
        mutate_both: bool,
    ) -> Candidate {
        match candidate {
            Candidate::Gen(expr) => Candidate::Gen(mutate_tree(expr, &mut self.rng)),
            Candidate::Fold(f, g) => {
                if self.config.search.enforce_symmetry {
                    let mutated = mutate_tree(f, &mut self.rng);
                    let (new_f, new_g) = derive_pair(&mutated, &mut self.rng);
                    return Candidate::Fold(new_f, new_g);
                }
                if self.rng.gen::<f64>() < symmetric_rate {
                    if let Some((new_f, new_g)) = symmetric_mutation(f, g, &mut self.rng) {
                        return Candidate::Fold(new_f, new_g);
                    }
                }
                if mutate_both {
                    Candidate::Fold(mutate_tree(f, &mut self.rng), mutate_tree(g, &mut self.rng))
                } else if self.rng.gen::<f64>() < 0.5 {
                    Candidate::Fold(mutate_tree(f, &mut self.rng), g.clone())
                } else {
                    Candidate::Fold(f.clone(), mutate_tree(g, &mut self.rng))
                }
            }
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Cross two parent pairs by exchanging their second components.
    /// Single-expression candidates pass through unchanged. Parents are
    /// never modified.
    pub fn crossover_candidates(
        &mut self,
        a: &Candidate,
        b: &Candidate,
    ) -> (Candidate, Candidate) {
        match (a, b) {
            (Candidate::Fold(f1, g1), Candidate::Fold(f2, g2)) => {
                if self.config.search.enforce_symmetry {
                    let base = if self.rng.gen::<bool>() { f1 } else { f2 };
                    let (f, g) = derive_pair(&base.clone(), &mut self.rng);
                    let child = Candidate::Fold(f, g);
                    (child.clone(), child)
                } else {
                    (
                        Candidate::Fold(f1.clone(), g2.clone()),
                        Candidate::Fold(f2.clone(), g1.clone()),
                    )
                }
            }
            _ => (a.clone(), b.clone()),
        }
    }
}

/// What one tick produced, for progress reporting.
#[derive(Debug, Clone)]
pub struct StepUpdate {
    pub current: String,
    pub current_score: Option<f64>,
    pub best: String,
    pub best_score: Option<f64>,
}

pub trait Optimizer {
    /// Advance by one tick, returning what was proposed and the best so far.
    fn step(&mut self, ctx: &mut SearchContext) -> StepUpdate;

    fn best(&self) -> (&Candidate, Option<f64>);
}

/// Generate candidates until one scores, with a cap to stay total. The
/// fallback after `attempts` failures is the last candidate with score
/// `None`.
pub(crate) fn scorable_candidate(
    ctx: &mut SearchContext,
    attempts: usize,
) -> (Candidate, Option<Score>) {
    let mut candidate = ctx.random_candidate();
    for _ in 0..attempts {
        if let Some(score) = ctx.score(&candidate) {
            return (candidate, Some(score));
        }
        candidate = ctx.random_candidate();
    }
    let score = ctx.score(&candidate);
    (candidate, score)
}

pub(crate) fn total_of(score: &Option<Score>) -> Option<f64> {
    score.as_ref().map(|s| s.total)
}

/// `None` scores lose every comparison.
pub(crate) fn beats(candidate: Option<f64>, incumbent: Option<f64>) -> bool {
    match (candidate, incumbent) {
        (Some(c), Some(i)) => c > i,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
