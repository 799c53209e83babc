pub mod geometry;
pub mod primefold;
pub mod primegen;

pub use primefold::PrimeFoldEvaluator;
pub use primegen::PrimeGenEvaluator;
