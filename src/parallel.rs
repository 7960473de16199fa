//! Thread pool sizing
//!
//! Mask evaluation and per-variable filtering run on Rayon's global thread
//! pool. `--threads` picks its size; without it every core is used.

use crate::errors::{MpasPostError, Result};
use rayon::ThreadPoolBuilder;
use tracing::info;

/// Size of the global Rayon pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: usize,
}

impl ParallelConfig {
    /// Pool size from the `--threads` option, falling back to all cores
    pub fn from_arg(threads: Option<usize>) -> Self {
        let num_threads = threads.filter(|&n| n > 0).unwrap_or_else(num_cpus::get);
        Self { num_threads }
    }

    /// Build the global pool; can only succeed once per process
    pub fn setup_global_pool(&self) -> Result<()> {
        ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build_global()
            .map_err(|e| {
                MpasPostError::ThreadPoolError(format!(
                    "Failed to initialize thread pool with {} threads: {}",
                    self.num_threads, e
                ))
            })?;

        info!(threads = self.num_threads, cores = num_cpus::get(), "configured thread pool");
        Ok(())
    }
}
