//! 2-D embedding fitness: does `(f(n), g(n))` place primes differently
//! from composites, without collapsing onto a line or a point.

use rand::Rng;

use crate::config::FitnessConfig;
use crate::data::PrimeCache;
use crate::engines::generation::Expr;
use crate::types::{Score, ScoreComponents, SearchMode};

use super::geometry::{
    centroid, clustering_quality, hough_line_strength, hull_area, isotropy_score,
    js_divergence, local_density_cv, mean_nearest_distance, normalize_coords, pca_linearity,
    quadrant_entropy, scale_balance_score, spread, Point,
};

/// Each point set needs at least this many finite projections to be worth
/// scoring.
const MIN_POINTS: usize = 10;

const DENSITY_RADIUS: f64 = 0.1;
const DENSITY_SAMPLE: usize = 200;
const CLUSTERING_SAMPLE: usize = 150;

pub struct PrimeFoldEvaluator {
    sample_size: usize,
    config: FitnessConfig,
    primes: Vec<u64>,
    composites: Vec<u64>,
}

impl PrimeFoldEvaluator {
    pub fn new(sample_size: usize, config: FitnessConfig, cache: &mut PrimeCache) -> Self {
        let (primes, composites) = cache.sample_data(sample_size);
        Self {
            sample_size,
            config,
            primes,
            composites,
        }
    }

    /// Project `inputs` through the pair, keeping only points where both
    /// coordinates are finite, up to the sample size.
    fn project(&self, f: &Expr, g: &Expr, inputs: &[u64]) -> Vec<Point> {
        let mut coords = Vec::with_capacity(self.sample_size);
        for &n in inputs {
            let x = f.evaluate(n as i64);
            let y = g.evaluate(n as i64);
            if x.is_finite() && y.is_finite() {
                coords.push([x, y]);
                if coords.len() >= self.sample_size {
                    break;
                }
            }
        }
        coords
    }

    /// Uniform random indices over the same range the primes came from,
    /// projected through the pair.
    fn random_baseline<R: Rng>(&self, f: &Expr, g: &Expr, rng: &mut R) -> Vec<Point> {
        let Some(&max_prime) = self.primes.iter().max() else {
            return Vec::new();
        };
        let mut coords = Vec::with_capacity(self.sample_size);
        for _ in 0..self.sample_size {
            let n = rng.gen_range(1..=max_prime) as i64;
            let x = f.evaluate(n);
            let y = g.evaluate(n);
            if x.is_finite() && y.is_finite() {
                coords.push([x, y]);
            }
        }
        coords
    }

    /// Score the pair, or `None` when either point set is too sparse to
    /// mean anything.
    pub fn try_evaluate<R: Rng>(
        &self,
        f: &Expr,
        g: &Expr,
        rng: &mut R,
    ) -> Option<Score> {
        let prime_coords = self.project(f, g, &self.primes);
        let composite_coords = self.project(f, g, &self.composites);
        if prime_coords.len() < MIN_POINTS || composite_coords.len() < MIN_POINTS {
            return None;
        }

        let (normalized_primes, normalized_composites) =
            normalize_coords(&prime_coords, &composite_coords);

        let config = &self.config;
        let area_coverage = if config.area_coverage.enabled {
            area_coverage_score(&prime_coords, &normalized_primes)
        } else {
            0.0
        };

        // Insufficient coverage short-circuits the expensive metrics.
        if config.area_coverage.enabled && area_coverage < config.area_coverage_threshold {
            return Some(Score {
                total: area_coverage * 0.1,
                components: ScoreComponents::PrimeFold {
                    area_coverage,
                    separation: 0.0,
                    contrast: 0.0,
                    significance: 0.0,
                    specificity: 0.0,
                },
            });
        }

        let normalized_random = if config.needs_baseline() {
            let baseline = self.random_baseline(f, g, rng);
            normalize_coords(&baseline, &[]).0
        } else {
            Vec::new()
        };

        let separation = if config.separation.enabled {
            mean_nearest_distance(&normalized_primes, &normalized_composites, self.sample_size)
        } else {
            0.0
        };
        let contrast = if config.contrast.enabled {
            structural_contrast(&normalized_primes, &normalized_composites)
        } else {
            0.0
        };
        let significance = if config.significance.enabled {
            statistical_significance(&normalized_primes, &normalized_composites, &normalized_random)
        } else {
            0.0
        };
        let specificity = if config.specificity.enabled {
            pattern_specificity(&normalized_primes, &normalized_composites, &normalized_random)
        } else {
            0.0
        };

        let mut total = 0.0;
        if config.area_coverage.enabled {
            total += config.area_coverage.weight * area_coverage;
        }
        if config.separation.enabled {
            total += config.separation.weight * separation;
        }
        if config.contrast.enabled {
            total += config.contrast.weight * contrast;
        }
        if config.significance.enabled {
            total += config.significance.weight * significance;
        }
        if config.specificity.enabled {
            total += config.specificity.weight * specificity;
        }

        Some(Score {
            total: total.max(0.0),
            components: ScoreComponents::PrimeFold {
                area_coverage,
                separation,
                contrast,
                significance,
                specificity,
            },
        })
    }

    /// Like [`try_evaluate`](Self::try_evaluate), with degenerate pairs
    /// collapsed to a zero score.
    pub fn evaluate<R: Rng>(&self, f: &Expr, g: &Expr, rng: &mut R) -> Score {
        self.try_evaluate(f, g, rng)
            .unwrap_or_else(|| Score::zero(SearchMode::PrimeFold))
    }
}

/// Hull area (over the normalized square, max 4) scaled by isotropy and by
/// the raw-coordinate scale balance. Lines and needle-thin clouds score
/// near zero no matter how long they are.
fn area_coverage_score(original: &[Point], normalized: &[Point]) -> f64 {
    if original.len() < 3 {
        return 0.0;
    }
    let normalized_hull = (hull_area(normalized) / 4.0).min(1.0);
    normalized_hull * isotropy_score(normalized) * scale_balance_score(original)
}

/// Ratio of local-density variation: above 1 when the prime cloud is less
/// uniform than the composite cloud.
fn structural_contrast(primes: &[Point], composites: &[Point]) -> f64 {
    let prime_cv = local_density_cv(primes, DENSITY_RADIUS, DENSITY_SAMPLE);
    let composite_cv = local_density_cv(composites, DENSITY_RADIUS, DENSITY_SAMPLE);
    let epsilon = 1e-9;
    if composite_cv <= epsilon {
        if prime_cv > epsilon {
            1.0
        } else {
            0.0
        }
    } else {
        prime_cv / composite_cv
    }
}

fn distribution_difference(a: &[Point], b: &[Point]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let centroid_a = centroid(a);
    let centroid_b = centroid(b);
    let centroid_distance =
        ((centroid_a[0] - centroid_b[0]).powi(2) + (centroid_a[1] - centroid_b[1]).powi(2)).sqrt();
    let spread_difference = (spread(a) - spread(b)).abs();
    centroid_distance + spread_difference + js_divergence(a, b)
}

/// How much more the primes deviate from the random baseline than the
/// composites do.
fn statistical_significance(primes: &[Point], composites: &[Point], random: &[Point]) -> f64 {
    let prime_vs_random = distribution_difference(primes, random);
    let composite_vs_random = distribution_difference(composites, random);
    (prime_vs_random - composite_vs_random).max(0.0)
}

fn linear_structure(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    (hough_line_strength(points) + pca_linearity(points)) / 2.0
}

/// Average of three prime-vs-composite contrasts against the baseline:
/// clustering tightness, linear structure, and quadrant occupancy.
fn pattern_specificity(primes: &[Point], composites: &[Point], random: &[Point]) -> f64 {
    let clustering = (clustering_quality(primes, CLUSTERING_SAMPLE)
        - clustering_quality(random, CLUSTERING_SAMPLE))
        - (clustering_quality(composites, CLUSTERING_SAMPLE)
            - clustering_quality(random, CLUSTERING_SAMPLE));

    let linearity = (linear_structure(primes) - linear_structure(random))
        - (linear_structure(composites) - linear_structure(random));

    let distribution = (quadrant_entropy(primes) - quadrant_entropy(random)).abs()
        - (quadrant_entropy(composites) - quadrant_entropy(random)).abs();

    (clustering.max(0.0) + linearity.max(0.0) + distribution.max(0.0)) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::parse;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn evaluator() -> (PrimeFoldEvaluator, StdRng) {
        let mut cache = PrimeCache::new();
        let evaluator = PrimeFoldEvaluator::new(100, FitnessConfig::default(), &mut cache);
        (evaluator, StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_sparse_projection_is_unscorable() {
        let (evaluator, mut rng) = evaluator();
        // 1 / (n - n) never produces a finite point.
        let degenerate = parse("1 / (n - n)").unwrap();
        let other = parse("n").unwrap();
        assert!(evaluator
            .try_evaluate(&degenerate, &other, &mut rng)
            .is_none());
        let zero = evaluator.evaluate(&degenerate, &other, &mut rng);
        assert_eq!(zero.total, 0.0);
    }

    #[test]
    fn test_linear_pair_gated_by_area_coverage() {
        let (evaluator, mut rng) = evaluator();
        // (n, n) is a perfect diagonal: hull area 0, isotropy 0.
        let f = parse("n").unwrap();
        let g = parse("n").unwrap();
        let score = evaluator.evaluate(&f, &g, &mut rng);
        match score.components {
            ScoreComponents::PrimeFold {
                area_coverage,
                separation,
                contrast,
                significance,
                specificity,
            } => {
                assert!(area_coverage < 0.15);
                assert_eq!(separation, 0.0);
                assert_eq!(contrast, 0.0);
                assert_eq!(significance, 0.0);
                assert_eq!(specificity, 0.0);
                assert!((score.total - area_coverage * 0.1).abs() < 1e-12);
            }
            _ => panic!("wrong component kind"),
        }
    }

    #[test]
    fn test_spiral_pair_scores_above_line() {
        let (evaluator, mut rng) = evaluator();
        // A trig spiral fills the plane far better than a diagonal.
        let f = parse("sqrt(n) * cos(n)").unwrap();
        let g = parse("sqrt(n) * sin(n)").unwrap();
        let spiral = evaluator.evaluate(&f, &g, &mut rng);

        let diag = parse("n").unwrap();
        let line = evaluator.evaluate(&diag, &diag, &mut rng);

        assert!(spiral.total > line.total);
        match spiral.components {
            ScoreComponents::PrimeFold { area_coverage, .. } => {
                assert!(area_coverage > 0.15);
            }
            _ => panic!("wrong component kind"),
        }
    }

    #[test]
    fn test_disabled_metrics_do_not_contribute() {
        let mut cache = PrimeCache::new();
        let mut config = FitnessConfig::default();
        config.separation.enabled = false;
        config.significance.enabled = false;
        config.specificity.enabled = false;
        let evaluator = PrimeFoldEvaluator::new(100, config, &mut cache);
        let mut rng = StdRng::seed_from_u64(11);

        let f = parse("sqrt(n) * cos(n)").unwrap();
        let g = parse("sqrt(n) * sin(n)").unwrap();
        let score = evaluator.evaluate(&f, &g, &mut rng);
        match score.components {
            ScoreComponents::PrimeFold {
                area_coverage,
                separation,
                contrast,
                significance,
                specificity,
            } => {
                assert_eq!(separation, 0.0);
                assert_eq!(significance, 0.0);
                assert_eq!(specificity, 0.0);
                let expected = 0.50 * area_coverage + 0.20 * contrast;
                assert!((score.total - expected).abs() < 1e-12);
            }
            _ => panic!("wrong component kind"),
        }
    }
}
