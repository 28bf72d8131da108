//! Click counting for fragments.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Counts how often fragments are viewed, keyed by file name.
pub trait ClickCounter: Send + Sync {
    /// Record one view of a fragment.
    fn record(&self, filename: &str);

    /// Number of recorded views of a fragment.
    fn clicks(&self, filename: &str) -> u64;

    /// The `n` most viewed file names with their counts, most viewed first.
    fn top(&self, n: usize) -> Vec<(String, u64)>;
}

/// In-process click counter.
#[derive(Debug, Default)]
pub struct MemoryClickCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl MemoryClickCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClickCounter for MemoryClickCounter {
    fn record(&self, filename: &str) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(filename.to_owned()).or_insert(0) += 1;
    }

    fn clicks(&self, filename: &str) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.get(filename).copied().unwrap_or(0)
    }

    fn top(&self, n: usize) -> Vec<(String, u64)> {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(String, u64)> =
            counts.iter().map(|(name, count)| (name.clone(), *count)).collect();
        drop(counts);

        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}
