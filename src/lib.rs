pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use config::{AppConfig, ConfigManager};
pub use engines::search::{ProgressCallback, RunState, SearchController};
pub use error::{PrimeFoldError, Result};
pub use types::{Algorithm, Candidate, Progress, Score, SearchMode, SearchOutcome};
