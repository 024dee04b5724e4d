use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Smallest chunk a parallel operation hands to a single worker.
/// Workloads at or below this size run on the calling thread.
pub const DEFAULT_LIMIT: usize = 623;

/// Tolerance used by floating point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Tunables read by every parallel operation before it partitions its workload.
///
/// A `threads` value of 0 makes every operation run sequentially on the
/// calling thread. The calling thread always acts as one extra worker, so
/// `threads = 3` splits work four ways.
///
/// ```
/// use parmat::Config;
///
/// let config = Config::default().with_threads(4).with_limit(0).normalized();
/// assert_eq!(4, config.threads);
/// assert_eq!(1, config.limit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// number of background worker threads
    pub threads: usize,
    /// minimum chunk size
    pub limit: usize,
    /// floating point comparison tolerance
    pub epsilon: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0,
            limit: DEFAULT_LIMIT,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Config {
    /// read a JSON config file, fields missing from the file keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config.normalized())
    }

    /// set the number of worker threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// set the minimum chunk size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// set the comparison tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Clamp out-of-range tunables instead of rejecting them.
    /// A zero limit becomes 1.
    pub fn normalized(mut self) -> Self {
        if self.limit == 0 {
            self.limit = 1;
        }
        self
    }
}
