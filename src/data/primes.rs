//! Memoizing primality oracle backing both fitness evaluators.

use std::collections::HashSet;

use log::debug;

const CACHE_LIMIT: u64 = 100_000;

const SMALL_PRIMES: [u64; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub prime_entries: usize,
    pub composite_entries: usize,
    pub max_cached_prime: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Primality cache with trial division for misses. Results up to
/// [`CACHE_LIMIT`] are memoized; larger queries are recomputed each time.
#[derive(Debug)]
pub struct PrimeCache {
    primes: HashSet<u64>,
    composites: HashSet<u64>,
    max_cached_prime: u64,
    hits: u64,
    misses: u64,
}

impl Default for PrimeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimeCache {
    pub fn new() -> Self {
        Self {
            primes: SMALL_PRIMES.iter().copied().collect(),
            composites: HashSet::new(),
            max_cached_prime: *SMALL_PRIMES.last().expect("seed primes non-empty"),
            hits: 0,
            misses: 0,
        }
    }

    pub fn is_prime(&mut self, n: i64) -> bool {
        if n < 2 {
            return false;
        }
        let n = n as u64;
        if n == 2 {
            return true;
        }
        if n % 2 == 0 {
            return false;
        }

        if n <= self.max_cached_prime {
            if self.primes.contains(&n) {
                self.hits += 1;
                return true;
            }
            if self.composites.contains(&n) {
                self.hits += 1;
                return false;
            }
        }

        self.misses += 1;
        let prime = trial_division(n);
        if n <= CACHE_LIMIT {
            if prime {
                self.primes.insert(n);
                self.max_cached_prime = self.max_cached_prime.max(n);
            } else {
                self.composites.insert(n);
            }
        }
        prime
    }

    pub fn primes_up_to(&mut self, limit: u64) -> Vec<u64> {
        (2..=limit).filter(|&i| self.is_prime(i as i64)).collect()
    }

    pub fn composites_up_to(&mut self, limit: u64) -> Vec<u64> {
        (4..=limit).filter(|&i| !self.is_prime(i as i64)).collect()
    }

    /// The first `sample_size` primes and composites, scanned over a range
    /// wide enough to hold both.
    pub fn sample_data(&mut self, sample_size: usize) -> (Vec<u64>, Vec<u64>) {
        let max_number = 1000.max(sample_size as u64 * 5);
        self.warm_up_to(max_number);
        let mut primes = self.primes_up_to(max_number);
        primes.truncate(sample_size);
        let mut composites = self.composites_up_to(max_number);
        composites.truncate(sample_size);
        (primes, composites)
    }

    /// Sieve of Eratosthenes bulk fill, far cheaper than per-number trial
    /// division when a whole range is needed.
    pub fn warm_up_to(&mut self, limit: u64) {
        let limit = limit.min(CACHE_LIMIT);
        if limit < 2 || limit <= self.max_cached_prime {
            return;
        }
        debug!("sieving primes up to {}", limit);
        let size = (limit + 1) as usize;
        let mut sieve = vec![true; size];
        sieve[0] = false;
        sieve[1] = false;
        let mut i = 2_usize;
        while i * i < size {
            if sieve[i] {
                let mut j = i * i;
                while j < size {
                    sieve[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        for (n, &prime) in sieve.iter().enumerate().skip(2) {
            if prime {
                self.primes.insert(n as u64);
                self.max_cached_prime = self.max_cached_prime.max(n as u64);
            } else {
                self.composites.insert(n as u64);
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            prime_entries: self.primes.len(),
            composite_entries: self.composites.len(),
            max_cached_prime: self.max_cached_prime,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

fn trial_division(n: u64) -> bool {
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}
