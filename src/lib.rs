//! Parallel hash cracking engine.
//!
//! A candidate corpus (one plaintext per CSV line) is split into chunks,
//! fanned out to a pool of worker threads over a shared task queue, and
//! every candidate whose digest matches the target hash is recorded in a
//! concurrent result map. SHA-256/384/512 and salted PBKDF2-HMAC-SHA256
//! are supported.

pub mod config;
pub mod error;
pub mod hash;
pub mod input;
pub mod logging;
pub mod search;
pub mod validation;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use hash::{Algorithm, Hasher};
pub use input::{Receiver, ReceiverStatistics};
pub use logging::Logger;
pub use search::{CancelToken, MatchRecord, Pipeline, PipelineReport};
