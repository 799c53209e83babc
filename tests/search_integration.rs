use primefold::config::AppConfig;
use primefold::engines::generation::parse;
use primefold::types::Progress;
use primefold::{Algorithm, RunState, SearchController, SearchMode};

fn base_config(mode: SearchMode, algorithm: Algorithm, seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.search.mode = mode;
    config.search.algorithm = algorithm;
    config.search.max_iterations = 60;
    config.search.sample_size = 50;
    config.search.seed = Some(seed);
    config
}

fn run(config: AppConfig) -> (primefold::SearchOutcome, Vec<Option<f64>>) {
    let mut controller = SearchController::new();
    let mut best_trace = Vec::new();
    let outcome = controller
        .run(config, &mut |p: &Progress| best_trace.push(p.best_score))
        .expect("search run failed");
    assert_eq!(controller.state(), RunState::Completed);
    (outcome, best_trace)
}

fn assert_best_is_monotone(trace: &[Option<f64>]) {
    let mut previous = f64::NEG_INFINITY;
    for best in trace.iter().flatten() {
        assert!(*best >= previous, "best score regressed: {} < {}", best, previous);
        previous = *best;
    }
}

fn assert_outcome_parses(outcome: &primefold::SearchOutcome, mode: SearchMode) {
    let text = &outcome.best_expr;
    match mode {
        SearchMode::PrimeGen => {
            let expr = text.strip_prefix("f(n) = ").expect("missing f(n) prefix");
            parse(expr).expect("winner does not parse");
        }
        SearchMode::PrimeFold => {
            let (f_part, g_part) = text.split_once(", g(n) = ").expect("missing pair format");
            let f = f_part.strip_prefix("f(n) = ").expect("missing f(n) prefix");
            parse(f).expect("f does not parse");
            parse(g_part).expect("g does not parse");
        }
    }
}

#[test]
fn lahc_generator_run_finds_prime_hits() {
    let mut config = base_config(SearchMode::PrimeGen, Algorithm::Lahc, 101);
    config.search.max_iterations = 200;
    let (outcome, trace) = run(config);
    assert_eq!(outcome.iterations, 200);
    assert_best_is_monotone(&trace);
    assert_outcome_parses(&outcome, SearchMode::PrimeGen);
    // The identity alone already hits 15 primes below 50, so any sane run
    // ends above zero.
    assert!(outcome.best_score.unwrap_or(0.0) > 0.0);
}

#[test]
fn sa_generator_run_completes() {
    let (outcome, trace) = run(base_config(SearchMode::PrimeGen, Algorithm::Sa, 102));
    assert_eq!(trace.len(), 60);
    assert_best_is_monotone(&trace);
    assert_outcome_parses(&outcome, SearchMode::PrimeGen);
}

#[test]
fn ga_generator_run_completes() {
    let mut config = base_config(SearchMode::PrimeGen, Algorithm::Ga, 103);
    // One GA step is a whole generation.
    config.search.max_iterations = 10;
    let (outcome, trace) = run(config);
    assert_eq!(trace.len(), 10);
    assert_best_is_monotone(&trace);
    assert_outcome_parses(&outcome, SearchMode::PrimeGen);
}

#[test]
fn lahc_embedding_run_completes() {
    let (outcome, trace) = run(base_config(SearchMode::PrimeFold, Algorithm::Lahc, 104));
    assert_best_is_monotone(&trace);
    assert_outcome_parses(&outcome, SearchMode::PrimeFold);
}

#[test]
fn sa_embedding_run_completes() {
    let (outcome, trace) = run(base_config(SearchMode::PrimeFold, Algorithm::Sa, 105));
    assert_best_is_monotone(&trace);
    assert_outcome_parses(&outcome, SearchMode::PrimeFold);
}

#[test]
fn ga_embedding_run_completes() {
    let mut config = base_config(SearchMode::PrimeFold, Algorithm::Ga, 106);
    config.search.max_iterations = 5;
    let (outcome, trace) = run(config);
    assert_eq!(trace.len(), 5);
    assert_best_is_monotone(&trace);
    assert_outcome_parses(&outcome, SearchMode::PrimeFold);
}

#[test]
fn symmetry_mode_produces_pairs() {
    let mut config = base_config(SearchMode::PrimeFold, Algorithm::Lahc, 107);
    config.search.enforce_symmetry = true;
    let (outcome, _) = run(config);
    assert_outcome_parses(&outcome, SearchMode::PrimeFold);
}

#[test]
fn identical_seeds_reproduce_identical_runs() {
    let (a, _) = run(base_config(SearchMode::PrimeGen, Algorithm::Lahc, 108));
    let (b, _) = run(base_config(SearchMode::PrimeGen, Algorithm::Lahc, 108));
    assert_eq!(a.best_expr, b.best_expr);
    assert_eq!(a.best_score, b.best_score);
}
