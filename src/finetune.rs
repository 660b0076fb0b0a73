//! Supervised fine-tuning with validation-driven model selection.
//!
//! Fine-tuning adjusts all model parameters jointly, epoch by epoch, while
//! periodically measuring held-out validation loss. The best-performing
//! parameter snapshot is identified by strict improvement of that loss, and
//! the test split is evaluated only at improving checks so the reported
//! test score always belongs to the selected model.
//!
//! # Patience
//!
//! The patience budget (`4 * n_train_batches`) is always derived alongside
//! the validation frequency. By default it is bookkeeping only and the loop
//! runs to `training_epochs`; with [`TrainConfig::early_stopping`] enabled
//! the run stops at the first validation check more than `patience`
//! iterations past the best one.
//!
//! [`TrainConfig::early_stopping`]: crate::config::TrainConfig::early_stopping

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::data::{mean_loss, BatchPlan};
use crate::error::TrainResult;
use crate::report::{BestSummary, ProgressReporter, TrainingEvent};
use crate::schedule::LearningRateSchedule;
use crate::LayeredModel;

/// The best parameter snapshot seen so far, identified by validation loss.
///
/// A run that has not yet improved carries no checkpoint at all; there is
/// no sentinel iteration, only `Option<BestCheckpoint>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestCheckpoint {
    /// Mean validation loss at the improving check.
    pub validation_loss: f64,
    /// Zero-based global iteration of the improving check.
    pub iter: usize,
    /// Mean test loss measured at the improving check.
    pub test_score: f64,
}

impl BestCheckpoint {
    /// Returns whether a new validation loss strictly improves on this
    /// checkpoint. Ties do not improve, so the earliest iteration achieving
    /// a given minimal loss is retained.
    #[must_use]
    pub fn is_improved_by(&self, validation_loss: f64) -> bool {
        validation_loss < self.validation_loss
    }
}

/// Outcome of a completed fine-tuning phase.
#[derive(Debug, Clone)]
pub struct FineTuneOutcome {
    /// Best checkpoint recorded, or `None` if no validation check improved.
    pub best: Option<BestCheckpoint>,
    /// Number of epochs actually run (equals `training_epochs` unless early
    /// stopping fired).
    pub epochs_run: usize,
    /// Total training minibatch steps executed.
    pub steps_executed: usize,
    /// Whether the patience budget ended the run before `training_epochs`.
    pub stopped_early: bool,
    /// Wall-clock duration of the phase in milliseconds.
    pub duration_ms: f64,
}

/// Orchestrator for the supervised fine-tuning phase.
#[derive(Debug)]
pub struct FineTuningOrchestrator {
    plan: BatchPlan,
    schedule: LearningRateSchedule,
    training_epochs: usize,
    early_stopping: bool,
}

impl FineTuningOrchestrator {
    /// Creates a fine-tuning orchestrator.
    ///
    /// # Arguments
    ///
    /// * `plan` - Minibatch plan derived from the training split
    /// * `schedule` - Per-epoch learning-rate schedule
    /// * `training_epochs` - Maximum number of epochs to run
    /// * `early_stopping` - Whether the patience budget stops the run
    #[must_use]
    pub fn new(
        plan: BatchPlan,
        schedule: LearningRateSchedule,
        training_epochs: usize,
        early_stopping: bool,
    ) -> Self {
        Self {
            plan,
            schedule,
            training_epochs,
            early_stopping,
        }
    }

    /// Runs the fine-tuning loop to completion.
    ///
    /// Every minibatch is trained with the epoch's effective learning rate.
    /// A validation check fires when `(iter + 1) % validation_frequency == 0`
    /// with `iter` the zero-based global iteration; on strict improvement of
    /// the mean validation loss, the best state is updated and the test
    /// split evaluated. A [`TrainingEvent::Summary`] is emitted once the
    /// loop ends.
    ///
    /// # Errors
    ///
    /// Propagates the first `train_step`, `validate`, or `test` failure.
    pub fn run<M: LayeredModel>(
        &self,
        model: &mut M,
        reporter: &mut dyn ProgressReporter,
    ) -> TrainResult<FineTuneOutcome> {
        let start = Instant::now();
        let n_train_batches = self.plan.n_train_batches();
        let patience = self.plan.patience();
        let validation_frequency = self.plan.validation_frequency();

        tracing::debug!(
            n_train_batches,
            patience,
            validation_frequency,
            training_epochs = self.training_epochs,
            early_stopping = self.early_stopping,
            "starting fine-tuning"
        );

        let mut best: Option<BestCheckpoint> = None;
        let mut steps_executed = 0usize;
        let mut stopped_early = false;
        let mut epoch = 0usize;

        'training: while epoch < self.training_epochs {
            epoch += 1;
            let learning_rate = self.schedule.effective_lr(epoch);

            for minibatch_index in 0..n_train_batches {
                model.train_step(minibatch_index, learning_rate)?;
                steps_executed += 1;

                let iter = self.plan.iteration(epoch, minibatch_index);
                if (iter + 1) % validation_frequency != 0 {
                    continue;
                }

                let losses = model.validate()?;
                let this_loss = mean_loss(&losses, "validation")?;
                reporter.report(&TrainingEvent::Validation {
                    epoch,
                    minibatch: minibatch_index,
                    n_train_batches,
                    loss: this_loss,
                    learning_rate,
                });

                let improved = best.map_or(true, |b| b.is_improved_by(this_loss));
                if improved {
                    let test_losses = model.test()?;
                    let test_score = mean_loss(&test_losses, "test")?;
                    best = Some(BestCheckpoint {
                        validation_loss: this_loss,
                        iter,
                        test_score,
                    });
                    reporter.report(&TrainingEvent::TestScore {
                        epoch,
                        minibatch: minibatch_index,
                        n_train_batches,
                        score: test_score,
                    });
                }

                if self.early_stopping {
                    if let Some(b) = best {
                        if iter > b.iter + patience {
                            tracing::debug!(iter, best_iter = b.iter, patience, "patience exhausted");
                            stopped_early = true;
                            break 'training;
                        }
                    }
                }
            }
        }

        reporter.report(&TrainingEvent::Summary {
            best: best.map(|b| BestSummary {
                validation_loss: b.validation_loss,
                iter: b.iter,
                test_score: b.test_score,
            }),
        });

        Ok(FineTuneOutcome {
            best,
            epochs_run: epoch,
            steps_executed,
            stopped_early,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}
