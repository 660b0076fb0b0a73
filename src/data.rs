//! Dataset-shape bookkeeping for the training loops.
//!
//! The orchestrator never touches example data; the model owns data access
//! and is addressed purely by minibatch index. What the orchestrator does
//! own is the minibatch arithmetic: how many training minibatches exist,
//! how long the patience budget is, and how often to check validation
//! performance. All three quantities are integers end-to-end with floor
//! division; fractional counts leaking in from float arithmetic are a known
//! bug class in reimplementations of this loop.

use serde::{Deserialize, Serialize};

use crate::error::{TrainError, TrainResult};

/// Example counts for the three dataset splits.
///
/// Each split is an ordered collection of (input, label) pairs held by the
/// model; only the sizes are visible here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSizes {
    /// Number of examples in the training split.
    pub train: usize,
    /// Number of examples in the validation split.
    pub validation: usize,
    /// Number of examples in the test split.
    pub test: usize,
}

impl SplitSizes {
    /// Creates a new split-size record.
    #[must_use]
    pub fn new(train: usize, validation: usize, test: usize) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }
}

/// Derived minibatch constants for a training run.
///
/// Computed once before either phase begins. Minibatches are contiguous
/// index ranges `[i * batch_size, (i + 1) * batch_size)`; a trailing
/// partial batch is dropped by the floor division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    batch_size: usize,
    n_train_batches: usize,
}

impl BatchPlan {
    /// Derives the batch plan from the training split size and batch size.
    ///
    /// # Errors
    ///
    /// Returns `TrainError::InvalidConfig` if `batch_size` is zero and
    /// `TrainError::DegenerateBatching` if the training split is smaller
    /// than a single minibatch. Both are rejected here so the downstream
    /// loop bounds and the validation-frequency modulus are always well
    /// defined.
    pub fn new(train_size: usize, batch_size: usize) -> TrainResult<Self> {
        if batch_size == 0 {
            return Err(TrainError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }

        let n_train_batches = train_size / batch_size;
        if n_train_batches == 0 {
            return Err(TrainError::DegenerateBatching {
                size: train_size,
                batch_size,
            });
        }

        Ok(Self {
            batch_size,
            n_train_batches,
        })
    }

    /// Returns the configured minibatch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the number of full training minibatches. Always at least 1.
    #[must_use]
    pub fn n_train_batches(&self) -> usize {
        self.n_train_batches
    }

    /// Returns the patience budget: the number of iterations fine-tuning
    /// may proceed past the best validation check before early stopping
    /// would trigger.
    #[must_use]
    pub fn patience(&self) -> usize {
        4 * self.n_train_batches
    }

    /// Returns the number of iterations between validation checks.
    ///
    /// `min(n_train_batches, patience / 2)` with integer division; with the
    /// default patience factor this checks once per epoch, on the last
    /// minibatch. Never zero, since `n_train_batches >= 1`.
    #[must_use]
    pub fn validation_frequency(&self) -> usize {
        self.n_train_batches.min(self.patience() / 2)
    }

    /// Returns the zero-based global iteration index for a minibatch within
    /// a 1-based epoch.
    #[must_use]
    pub fn iteration(&self, epoch: usize, minibatch_index: usize) -> usize {
        (epoch - 1) * self.n_train_batches + minibatch_index
    }
}

/// Mean of a sequence of per-batch losses.
///
/// # Errors
///
/// Returns `TrainError::EmptyEvaluation` if the sequence is empty, rather
/// than letting a NaN mean propagate into the best-state comparison.
pub(crate) fn mean_loss(losses: &[f64], pass: &'static str) -> TrainResult<f64> {
    if losses.is_empty() {
        return Err(TrainError::EmptyEvaluation { pass });
    }
    Ok(losses.iter().sum::<f64>() / losses.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dataset_constants() {
        // 100 examples at batch size 10: check once per epoch, on the last
        // minibatch of each epoch.
        let plan = BatchPlan::new(100, 10).unwrap();
        assert_eq!(plan.n_train_batches(), 10);
        assert_eq!(plan.patience(), 40);
        assert_eq!(plan.validation_frequency(), 10);
    }

    #[test]
    fn test_trailing_partial_batch_is_dropped() {
        let plan = BatchPlan::new(105, 10).unwrap();
        assert_eq!(plan.n_train_batches(), 10);
    }

    #[test]
    fn test_frequency_capped_by_half_patience() {
        // A single minibatch: patience 4, frequency min(1, 2) = 1.
        let plan = BatchPlan::new(10, 10).unwrap();
        assert_eq!(plan.n_train_batches(), 1);
        assert_eq!(plan.patience(), 4);
        assert_eq!(plan.validation_frequency(), 1);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        assert!(matches!(
            BatchPlan::new(100, 0),
            Err(TrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_split_smaller_than_batch() {
        assert!(matches!(
            BatchPlan::new(5, 10),
            Err(TrainError::DegenerateBatching {
                size: 5,
                batch_size: 10
            })
        ));
    }

    #[test]
    fn test_iteration_index_is_zero_based() {
        let plan = BatchPlan::new(100, 10).unwrap();
        assert_eq!(plan.iteration(1, 0), 0);
        assert_eq!(plan.iteration(1, 9), 9);
        assert_eq!(plan.iteration(2, 0), 10);
        assert_eq!(plan.iteration(3, 4), 24);
    }

    #[test]
    fn test_mean_loss() {
        let mean = mean_loss(&[1.0, 2.0, 3.0], "validation").unwrap();
        assert!((mean - 2.0).abs() < 1e-12);

        assert!(matches!(
            mean_loss(&[], "test"),
            Err(TrainError::EmptyEvaluation { pass: "test" })
        ));
    }
}
