//! Candidate search: partitioning work, running the worker pool and
//! collecting matches.

pub mod chunker;
pub mod parallel;
pub mod result;

pub use chunker::{RangeChunks, chunk_list, chunk_range, distribute_work};
pub use parallel::{CancelToken, Pipeline};
pub use result::{MatchRecord, PipelineReport, ResultMap, WorkerReport};

/// One unit of work: the candidate plaintexts a worker tests in one go.
pub type CandidateChunk = Vec<String>;
