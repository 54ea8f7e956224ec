//! Worker loop: drain the task queue, test candidates, record matches.
//!
//! ```text
//! Ready -> Running -> (fetch -> test -> record?)* -> Stopped
//! ```
//!
//! A worker stops only when it reads a stop sentinel (or the queue is
//! disconnected during cleanup). Empty chunks are processed like any other.

use crate::hash::{Algorithm, Hasher};
use crate::search::parallel::channel::{ChannelItem, TaskReceiver};
use crate::search::parallel::permit::ConcurrencyLimit;
use crate::search::result::{MatchRecord, ResultMap, WorkerReport};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Candidate that makes a worker panic mid-chunk in unit tests.
#[cfg(test)]
pub(crate) const FAULT_CANDIDATE: &str = "\u{0}worker-fault";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkerState {
    Ready,
    Running,
    Stopped,
}

/// Shared inputs handed to every worker in a pool
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub queue: TaskReceiver,
    pub results: Arc<ResultMap>,
    pub hasher: Arc<Hasher>,
    /// Normalized (lowercase) target digest; `None` disables hashing.
    pub target: Option<Arc<str>>,
    pub permits: Arc<ConcurrencyLimit>,
}

#[derive(Debug)]
pub struct Worker {
    id: usize,
    ctx: WorkerContext,
    state: WorkerState,
    chunks_processed: u64,
    candidates_processed: u64,
    candidates_hashed: u64,
    matches: u64,
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext) -> Self {
        Self {
            id,
            ctx,
            state: WorkerState::Ready,
            chunks_processed: 0,
            candidates_processed: 0,
            candidates_hashed: 0,
            matches: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Consume chunks until a stop sentinel arrives.
    pub fn run(mut self) -> WorkerReport {
        self.state = WorkerState::Running;
        debug!(worker_id = self.id, "worker started");

        loop {
            match self.ctx.queue.get() {
                ChannelItem::Stop => break,
                ChannelItem::Chunk(chunk) => self.process_chunk(&chunk),
            }
        }

        self.state = WorkerState::Stopped;
        debug!(
            worker_id = self.id,
            chunks = self.chunks_processed,
            candidates = self.candidates_processed,
            matches = self.matches,
            "worker stopped"
        );
        self.report()
    }

    fn process_chunk(&mut self, chunk: &[String]) {
        self.chunks_processed += 1;
        self.candidates_processed += chunk.len() as u64;

        let Some(target) = self.ctx.target.clone() else {
            return;
        };
        if chunk.is_empty() {
            return;
        }

        let _permit = self.ctx.permits.acquire();
        for candidate in chunk {
            #[cfg(test)]
            if candidate == FAULT_CANDIDATE {
                panic!("worker {} hit a fault candidate", self.id);
            }
            self.candidates_hashed += 1;
            if self.ctx.hasher.matches(candidate, &target) {
                self.record_match(candidate, &target);
            }
        }
    }

    fn record_match(&mut self, candidate: &str, target: &str) {
        let record = MatchRecord {
            worker_id: self.id,
            original: candidate.to_string(),
            hash: target.to_string(),
            algorithm: self.algorithm(),
        };
        let key = self.ctx.results.record(self.id, self.matches, record);
        self.matches += 1;
        info!(worker_id = self.id, key = %key, "match found: {}", candidate);
    }

    fn algorithm(&self) -> Algorithm {
        self.ctx.hasher.algorithm()
    }

    fn report(&self) -> WorkerReport {
        WorkerReport {
            worker_id: self.id,
            state: self.state,
            chunks_processed: self.chunks_processed,
            candidates_processed: self.candidates_processed,
            candidates_hashed: self.candidates_hashed,
            matches: self.matches,
        }
    }
}
