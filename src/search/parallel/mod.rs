//! Parallel cracking engine.
//!
//! # Architecture
//!
//! - A **coordinator** that validates the run, starts the worker pool,
//!   feeds the task queue and joins the workers
//! - Multiple **workers** that pull candidate chunks and test them against
//!   the target digest
//! - A **channel** carrying chunks and stop sentinels from the coordinator
//!   to the workers
//! - A **permit** pool capping how many workers hash at once
//! - A **collector** that orders, logs and persists the shared match map
//!
//! # Example
//!
//! ```ignore
//! use hashcrack::{Logger, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default()
//!     .with_workers(4)
//!     .with_chunk_size(500)
//!     .with_target("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08");
//!
//! let pipeline = Pipeline::new(config, Logger::new(None, false)?)?;
//! let report = pipeline.run()?;
//! ```

pub mod channel;
pub mod collector;
pub mod coordinator;
pub mod permit;
pub mod worker;

pub use channel::{ChannelItem, TaskQueue, TaskReceiver};
pub use collector::{collect_results, persist_results, print_results};
pub use coordinator::{CLEANUP_GRACE_PERIOD, CancelToken, Pipeline};
pub use permit::{ConcurrencyLimit, Permit};
pub use worker::{Worker, WorkerContext, WorkerState};
