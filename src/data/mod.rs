pub mod primes;

pub use primes::{CacheStats, PrimeCache};
