//! Error types for training orchestration.

use thiserror::Error;

/// Result type alias for training orchestration operations.
pub type TrainResult<T> = std::result::Result<T, TrainError>;

/// Errors that can occur while driving a training run.
///
/// Configuration and dataset-shape problems are rejected before any model
/// step executes. Collaborator failures are not recovered locally; they
/// abort the run, since a training run that cannot compute a step has no
/// meaningful partial result.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The training split does not yield a single full minibatch, which
    /// would otherwise silently produce degenerate loop bounds.
    #[error("training split of {size} examples yields no minibatches at batch size {batch_size}")]
    DegenerateBatching {
        /// Number of examples in the training split.
        size: usize,
        /// Configured minibatch size.
        batch_size: usize,
    },

    /// An evaluation pass returned no per-batch losses, so its mean is
    /// undefined.
    #[error("{pass} evaluation returned no batch losses")]
    EmptyEvaluation {
        /// Which evaluation pass produced the empty result.
        pass: &'static str,
    },

    /// A model step function failed.
    #[error("model step failed: {0}")]
    Step(String),
}
