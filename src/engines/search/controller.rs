//! Run lifecycle around a single optimizer: start, progress ticks,
//! cooperative stop, final outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::types::{Algorithm, Progress, SearchOutcome};

use super::{GaOptimizer, LahcOptimizer, Optimizer, SaOptimizer, SearchContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Stopped early by request; the best found so far still stands.
    Stopped,
    Completed,
}

pub trait ProgressCallback {
    fn on_progress(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressCallback for F {
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

pub struct SearchController {
    state: RunState,
    stop: Arc<AtomicBool>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchController {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Flag checked at every tick boundary; set it from another thread to
    /// stop the run after the current step finishes.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn run(
        &mut self,
        config: AppConfig,
        callback: &mut dyn ProgressCallback,
    ) -> Result<SearchOutcome> {
        config.validate()?;
        self.stop.store(false, Ordering::SeqCst);
        self.state = RunState::Running;

        let max_iterations = config.search.max_iterations;
        let algorithm = config.search.algorithm;
        info!(
            "starting {:?} search, {:?} mode, {} iterations",
            algorithm, config.search.mode, max_iterations
        );

        let mut ctx = SearchContext::new(config);
        let mut optimizer: Box<dyn Optimizer> = match algorithm {
            Algorithm::Lahc => Box::new(LahcOptimizer::new(&mut ctx)),
            Algorithm::Ga => Box::new(GaOptimizer::new(&mut ctx)),
            Algorithm::Sa => Box::new(SaOptimizer::new(&mut ctx)),
        };

        let mut iterations = 0;
        for iteration in 1..=max_iterations {
            if self.stop.load(Ordering::SeqCst) {
                self.state = RunState::Stopped;
                break;
            }
            let update = optimizer.step(&mut ctx);
            iterations = iteration;
            callback.on_progress(&Progress {
                iteration,
                max_iterations,
                current_expr: update.current,
                current_score: update.current_score,
                best_expr: update.best,
                best_score: update.best_score,
            });
        }

        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }

        let (best, best_score) = optimizer.best();
        info!(
            "search {:?} after {} iterations: {} ({:?})",
            self.state, iterations, best, best_score
        );
        Ok(SearchOutcome {
            best_expr: best.to_string(),
            best_score,
            iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchMode;
    use std::sync::atomic::Ordering;

    fn config(algorithm: Algorithm) -> AppConfig {
        let mut config = AppConfig::default();
        config.search.mode = SearchMode::PrimeGen;
        config.search.algorithm = algorithm;
        config.search.max_iterations = 50;
        config.search.sample_size = 50;
        config.search.seed = Some(17);
        config
    }

    #[test]
    fn test_run_completes_and_reports_progress() {
        let mut controller = SearchController::new();
        let mut ticks = 0;
        let outcome = controller
            .run(config(Algorithm::Lahc), &mut |p: &Progress| {
                ticks += 1;
                assert!(p.iteration <= p.max_iterations);
            })
            .unwrap();
        assert_eq!(controller.state(), RunState::Completed);
        assert_eq!(ticks, 50);
        assert_eq!(outcome.iterations, 50);
        assert!(outcome.best_score.is_some());
    }

    #[test]
    fn test_stop_flag_halts_early() {
        let mut controller = SearchController::new();
        let stop = controller.stop_handle();
        let outcome = controller
            .run(config(Algorithm::Sa), &mut move |p: &Progress| {
                if p.iteration == 10 {
                    stop.store(true, Ordering::SeqCst);
                }
            })
            .unwrap();
        assert_eq!(controller.state(), RunState::Stopped);
        assert_eq!(outcome.iterations, 10);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut controller = SearchController::new();
        let mut bad = config(Algorithm::Lahc);
        bad.search.max_iterations = 0;
        assert!(controller.run(bad, &mut |_: &Progress| {}).is_err());
        assert_eq!(controller.state(), RunState::Idle);
    }
}
