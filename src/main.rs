use log::info;

use primefold::types::Progress;
use primefold::{ConfigManager, SearchController};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    if let Some(path) = std::env::args().nth(1) {
        manager.load_from_file(&path)?;
        info!("loaded configuration from {}", path);
    }
    let config = manager.get();

    let max_iterations = config.search.max_iterations;
    let report_every = (max_iterations / 10).max(1);

    let mut controller = SearchController::new();
    let outcome = controller.run(config, &mut |progress: &Progress| {
        if progress.iteration % report_every == 0 {
            info!(
                "[{}/{}] best {:?}: {}",
                progress.iteration,
                progress.max_iterations,
                progress.best_score,
                progress.best_expr
            );
        }
    })?;

    println!("{}", outcome.best_expr);
    match outcome.best_score {
        Some(score) => println!("score: {:.6} after {} iterations", score, outcome.iterations),
        None => println!("no scorable candidate found in {} iterations", outcome.iterations),
    }
    Ok(())
}
