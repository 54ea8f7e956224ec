//! Match records, the shared result map, and run reports

use crate::hash::Algorithm;
use crate::search::parallel::worker::WorkerState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Evidence that a candidate hashes to the target, with the worker that found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub worker_id: usize,
    pub original: String,
    pub hash: String,
    pub algorithm: Algorithm,
}

/// Key under which a worker stores its `seq`-th match.
pub fn match_key(worker_id: usize, seq: u64) -> String {
    format!("match_{}_{}", worker_id, seq)
}

/// Recover `(worker_id, seq)` from a key built by [`match_key`].
pub fn parse_match_key(key: &str) -> Option<(usize, u64)> {
    let rest = key.strip_prefix("match_")?;
    let (worker, seq) = rest.split_once('_')?;
    Some((worker.parse().ok()?, seq.parse().ok()?))
}

/// Concurrent map of match records shared by all workers.
///
/// Workers only ever write keys containing their own id, so writers never
/// contend for the same entry. Reads for collection happen after every
/// worker has been joined.
#[derive(Debug, Default)]
pub struct ResultMap {
    entries: DashMap<String, MatchRecord>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a worker's `seq`-th match and return its key.
    pub fn record(&self, worker_id: usize, seq: u64, record: MatchRecord) -> String {
        let key = match_key(worker_id, seq);
        self.entries.insert(key.clone(), record);
        key
    }

    /// Insert under an explicit key, returning any record it replaced.
    pub fn insert(&self, key: impl Into<String>, record: MatchRecord) -> Option<MatchRecord> {
        self.entries.insert(key.into(), record)
    }

    pub fn get(&self, key: &str) -> Option<MatchRecord> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unordered copy of every entry.
    pub fn snapshot(&self) -> Vec<(String, MatchRecord)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// What one worker did before it stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub state: WorkerState,
    pub chunks_processed: u64,
    pub candidates_processed: u64,
    pub candidates_hashed: u64,
    pub matches: u64,
}

/// Outcome of a completed pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Matches in collection order (see `collect_results`).
    pub matches: Vec<MatchRecord>,
    pub elapsed: Duration,
    pub valid_lines: u64,
    pub chunks_loaded: usize,
    /// Most workers that held a hashing permit at the same time.
    pub peak_concurrency: usize,
    pub workers: Vec<WorkerReport>,
}

impl PipelineReport {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn candidates_processed(&self) -> u64 {
        self.workers.iter().map(|w| w.candidates_processed).sum()
    }

    /// Lines processed per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.valid_lines as f64 / secs
        }
    }

    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed));
        s.push_str(&format!("Lines processed: {}\n", self.valid_lines));
        s.push_str(&format!("Chunks loaded: {}\n", self.chunks_loaded));
        s.push_str(&format!("Throughput: {:.0} lines/sec\n", self.throughput()));
        for worker in &self.workers {
            s.push_str(&format!(
                "Worker {}: {} chunks, {} candidates, {} matches\n",
                worker.worker_id,
                worker.chunks_processed,
                worker.candidates_processed,
                worker.matches
            ));
        }
        s.push_str(&format!("Peak concurrent hashing: {}\n", self.peak_concurrency));
        s.push_str(&format!("Matches found: {}\n", self.match_count()));
        s
    }
}
