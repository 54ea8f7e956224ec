//! Pipeline orchestrator: wires input -> task queue -> worker pool -> collector.
//!
//! The orchestrator thread spawns every worker before the first chunk is
//! queued, streams chunks in, sends one stop sentinel per worker after the
//! last chunk, then joins the workers in order. On error or cancellation
//! it runs cleanup: pending work is discarded, the queue is disconnected
//! and workers get a bounded grace period before they are abandoned.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::hash::Hasher;
use crate::input::Receiver;
use crate::logging::Logger;
use crate::search::CandidateChunk;
use crate::search::chunker::chunk_list;
use crate::search::parallel::channel::TaskQueue;
use crate::search::parallel::collector::{collect_results, persist_results, print_results};
use crate::search::parallel::permit::ConcurrencyLimit;
use crate::search::parallel::worker::{Worker, WorkerContext};
use crate::search::result::{MatchRecord, PipelineReport, ResultMap, WorkerReport};
use crate::validation::{is_valid_hash, normalize_hash};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How long cleanup waits for workers before abandoning them.
pub const CLEANUP_GRACE_PERIOD: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared flag requesting that a running pipeline stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A spawned worker thread.
pub(crate) struct WorkerHandle {
    pub(crate) worker_id: usize,
    pub(crate) handle: JoinHandle<WorkerReport>,
}

/// Everything the engine produced before reporting.
struct EngineOutput {
    matches: Vec<MatchRecord>,
    chunks_loaded: usize,
    peak_concurrency: usize,
    workers: Vec<WorkerReport>,
}

/// One configured cracking run.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    logger: Logger,
    hasher: Arc<Hasher>,
    cancel: CancelToken,
    grace_period: Duration,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, logger: Logger) -> Result<Self> {
        config.validate()?;
        let hasher = Arc::new(Hasher::from_config(&config.hash));
        Ok(Self {
            config,
            logger,
            hasher,
            cancel: CancelToken::new(),
            grace_period: CLEANUP_GRACE_PERIOD,
        })
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle that stops this pipeline from another thread (e.g. a Ctrl-C handler).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run over the configured input file.
    pub fn run(&self) -> Result<PipelineReport> {
        let _guard = self.logger.enter();
        info!("{}", "=".repeat(60));
        info!("PARALLEL HASH CRACKING ENGINE");
        info!("{}", "=".repeat(60));

        let mut receiver = Receiver::new(&self.config.input, self.config.general.chunk_size);
        let result = self.validate_setup(&receiver).and_then(|target| {
            let start = Instant::now();
            let output = self.execute(target, receiver.read_chunks()?)?;
            let valid_lines = receiver.get_statistics().valid_lines;
            Ok(self.finish(output, start, valid_lines))
        });

        self.log_outcome(&result);
        result
    }

    /// Run over an in-memory candidate list instead of the input file.
    pub fn search_candidates(&self, candidates: &[String]) -> Result<PipelineReport> {
        let _guard = self.logger.enter();

        let result = self.validate_target().and_then(|target| {
            let start = Instant::now();
            let chunks = chunk_list(candidates, self.config.general.chunk_size)?
                .map(|chunk| -> Result<CandidateChunk> { Ok(chunk.to_vec()) });
            let output = self.execute(target, chunks)?;
            Ok(self.finish(output, start, candidates.len() as u64))
        });

        self.log_outcome(&result);
        result
    }

    /// Check the input file and target digest; returns the normalized target.
    pub fn validate_setup(&self, receiver: &Receiver) -> Result<Option<String>> {
        info!("Validating pipeline setup...");

        if !receiver.validate_file() {
            return Err(PipelineError::validation(format!(
                "input file not found or unreadable: {}",
                receiver.path().display()
            )));
        }

        let target = self.validate_target()?;
        info!("Validation passed");
        Ok(target)
    }

    fn validate_target(&self) -> Result<Option<String>> {
        let Some(target) = self.config.target_hash() else {
            warn!("No target hash specified - will process but not find matches");
            return Ok(None);
        };

        let algorithm = self.config.hash.algorithm;
        if !is_valid_hash(target, algorithm, self.config.hash.pbkdf2_salt_length) {
            return Err(PipelineError::validation(format!(
                "invalid target hash for algorithm {}",
                algorithm
            )));
        }
        Ok(Some(normalize_hash(target)))
    }

    fn execute<I>(&self, target: Option<String>, chunks: I) -> Result<EngineOutput>
    where
        I: IntoIterator<Item = Result<CandidateChunk>>,
    {
        let worker_count = self.config.general.worker_count;
        let queue = TaskQueue::new();
        let results = Arc::new(ResultMap::new());
        let permits = ConcurrencyLimit::new(self.config.general.concurrency_limit());
        let ctx = WorkerContext {
            queue: queue.receiver(),
            results: Arc::clone(&results),
            hasher: Arc::clone(&self.hasher),
            target: target.map(Arc::from),
            permits: Arc::clone(&permits),
        };

        let mut handles = match self.start_workers(worker_count, &ctx) {
            Ok(handles) => handles,
            Err((e, started)) => return Err(self.cleanup(queue, started, e)),
        };
        drop(ctx);

        let chunks_loaded = match self
            .load_data_to_queue(&queue, chunks)
            .and_then(|loaded| queue.send_poison_pills(worker_count).map(|_| loaded))
        {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.cleanup(queue, handles, e)),
        };

        let workers = match self.wait_for_workers(&mut handles) {
            Ok(reports) => reports,
            Err(e) => return Err(self.cleanup(queue, handles, e)),
        };

        let persisted = persist_results(&results, &self.config.output.results_path)?;
        debug!(
            count = persisted,
            path = %self.config.output.results_path.display(),
            "results persisted"
        );

        Ok(EngineOutput {
            matches: collect_results(&results),
            chunks_loaded,
            peak_concurrency: permits.peak_in_use(),
            workers,
        })
    }

    fn start_workers(
        &self,
        worker_count: usize,
        ctx: &WorkerContext,
    ) -> std::result::Result<Vec<WorkerHandle>, (PipelineError, Vec<WorkerHandle>)> {
        info!("Starting {} worker threads...", worker_count);

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let worker = Worker::new(worker_id, ctx.clone());
            let logger = self.logger.clone();
            let spawned = thread::Builder::new()
                .name(format!("worker-{}", worker.id()))
                .spawn(move || {
                    let _guard = logger.enter();
                    worker.run()
                });

            match spawned {
                Ok(handle) => handles.push(WorkerHandle { worker_id, handle }),
                Err(e) => return Err((PipelineError::Io(e), handles)),
            }
        }

        info!(
            "Started {} workers ({} may hash concurrently)",
            handles.len(),
            ctx.permits.total()
        );
        Ok(handles)
    }

    fn load_data_to_queue<I>(&self, queue: &TaskQueue, chunks: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<CandidateChunk>>,
    {
        info!("Loading data into task queue...");

        let mut chunk_count = 0;
        for chunk in chunks {
            if self.cancel.is_cancelled() {
                return Err(PipelineError::Interrupted);
            }
            queue.put(chunk?)?;
            chunk_count += 1;
        }

        info!("Loaded {} chunks into queue", chunk_count);
        Ok(chunk_count)
    }

    /// Join workers in order. Handles that were not joined stay in `handles`.
    fn wait_for_workers(&self, handles: &mut Vec<WorkerHandle>) -> Result<Vec<WorkerReport>> {
        info!("Waiting for workers to complete...");

        let mut reports = Vec::with_capacity(handles.len());
        while let Some(next) = handles.first() {
            if !next.handle.is_finished() {
                if self.cancel.is_cancelled() {
                    return Err(PipelineError::Interrupted);
                }
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            let worker = handles.remove(0);
            reports.push(join_worker(worker)?);
        }

        info!("All workers completed");
        Ok(reports)
    }

    /// Stop everything still running and hand back `cause`.
    fn cleanup(
        &self,
        queue: TaskQueue,
        handles: Vec<WorkerHandle>,
        cause: PipelineError,
    ) -> PipelineError {
        warn!("Cleaning up...");

        let discarded = queue.drain();
        drop(queue);
        if discarded > 0 {
            debug!(discarded, "discarded pending queue items");
        }

        let deadline = Instant::now() + self.grace_period;
        for worker in handles {
            while !worker.handle.is_finished() && Instant::now() < deadline {
                thread::sleep(POLL_INTERVAL);
            }
            if worker.handle.is_finished() {
                if let Err(e) = join_worker(worker) {
                    warn!("{}", e);
                }
            } else {
                warn!(
                    worker_id = worker.worker_id,
                    "worker did not stop within {:?}; abandoning it", self.grace_period
                );
            }
        }

        cause
    }

    fn finish(&self, output: EngineOutput, start: Instant, valid_lines: u64) -> PipelineReport {
        let elapsed = start.elapsed();

        print_results(&output.matches, &self.logger);
        self.logger
            .log_pipeline_stats(elapsed, valid_lines, output.matches.len());

        PipelineReport {
            matches: output.matches,
            elapsed,
            valid_lines,
            chunks_loaded: output.chunks_loaded,
            peak_concurrency: output.peak_concurrency,
            workers: output.workers,
        }
    }

    fn log_outcome(&self, result: &Result<PipelineReport>) {
        match result {
            Ok(_) => {
                info!("{}", "=".repeat(60));
                info!("Pipeline completed successfully");
                info!("{}", "=".repeat(60));
            }
            Err(PipelineError::Interrupted) => warn!("Pipeline interrupted by user"),
            Err(e) if e.is_setup_error() => error!("Setup validation failed: {}", e),
            Err(e) => error!("Pipeline error: {}", e),
        }
    }
}

/// Join one worker, turning a panic into `WorkerFault`.
pub(crate) fn join_worker(worker: WorkerHandle) -> Result<WorkerReport> {
    worker
        .handle
        .join()
        .map_err(|payload| PipelineError::WorkerFault {
            worker_id: worker.worker_id,
            message: panic_message(payload.as_ref()),
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
