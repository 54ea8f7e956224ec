//! Error taxonomy for the cracking pipeline.

use thiserror::Error;

/// Errors raised by configuration, validation and the parallel engine.
///
/// `Configuration` and `Validation` are raised before any worker is
/// spawned. The remaining variants come out of a running pipeline and always
/// go through the orchestrator's cleanup path first.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("worker {worker_id} failed: {message}")]
    WorkerFault { worker_id: usize, message: String },

    #[error("pipeline interrupted by user")]
    Interrupted,

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PipelineError::Validation(message.into())
    }

    /// True for errors that abort the run before any worker exists.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Configuration(_) | PipelineError::Validation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
