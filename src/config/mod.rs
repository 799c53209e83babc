pub mod fitness;
pub mod manager;
pub mod search;
pub mod traits;

pub use fitness::{FitnessConfig, MetricConfig};
pub use manager::{AppConfig, ConfigManager};
pub use search::{GaParams, LahcParams, SaParams, SearchConfig};
