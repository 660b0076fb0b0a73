//! Structured progress reporting.
//!
//! Progress is delivered as structured events through the
//! [`ProgressReporter`] trait rather than printed from inside the control
//! loops. This keeps orchestration semantics independent of the output
//! medium: a console sink reproduces the classic human-readable progress
//! stream, a memory sink backs test assertions, and a null sink gives
//! silent operation.

use serde::{Deserialize, Serialize};

/// A structured training progress event.
///
/// Epoch numbers are 1-based as shown to the operator; minibatch indices
/// are zero-based positions within the epoch. Validation losses and test
/// scores are fractional error rates in `[0, 1]`; the console sink renders
/// them as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainingEvent {
    /// One pretraining epoch for one layer completed.
    PretrainEpoch {
        /// Zero-based layer index.
        layer: usize,
        /// Zero-based pretraining epoch within the layer.
        epoch: usize,
        /// Mean per-minibatch cost over the epoch.
        mean_cost: f64,
    },

    /// A validation check fired during fine-tuning.
    Validation {
        /// 1-based fine-tuning epoch.
        epoch: usize,
        /// Zero-based minibatch index within the epoch.
        minibatch: usize,
        /// Total training minibatches per epoch.
        n_train_batches: usize,
        /// Mean validation loss at this check.
        loss: f64,
        /// Effective learning rate in force at this check.
        learning_rate: f64,
    },

    /// The test split was evaluated because validation improved.
    TestScore {
        /// 1-based fine-tuning epoch.
        epoch: usize,
        /// Zero-based minibatch index within the epoch.
        minibatch: usize,
        /// Total training minibatches per epoch.
        n_train_batches: usize,
        /// Mean test loss of the new best model.
        score: f64,
    },

    /// Fine-tuning finished.
    Summary {
        /// Best validation loss, its zero-based iteration, and the test
        /// score recorded at that iteration. `None` if no validation check
        /// ever improved.
        best: Option<BestSummary>,
    },
}

/// Final best-model summary carried by [`TrainingEvent::Summary`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestSummary {
    /// Best mean validation loss observed.
    pub validation_loss: f64,
    /// Zero-based iteration at which it was observed.
    pub iter: usize,
    /// Mean test loss recorded at that iteration.
    pub test_score: f64,
}

/// Sink for training progress events.
///
/// Implementations must not influence control flow; the orchestrators emit
/// events and continue regardless of what the sink does with them.
pub trait ProgressReporter {
    /// Receives one progress event.
    fn report(&mut self, event: &TrainingEvent);
}

/// Reporter that renders events as human-readable progress lines on stdout.
///
/// Line formats follow the classic tutorial output: losses and scores are
/// shown as percentages, iterations as 1-based positions.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn report(&mut self, event: &TrainingEvent) {
        match event {
            TrainingEvent::PretrainEpoch {
                layer,
                epoch,
                mean_cost,
            } => {
                println!("Pre-training layer {layer}, epoch {epoch}, cost {mean_cost}");
            }
            TrainingEvent::Validation {
                epoch,
                minibatch,
                n_train_batches,
                loss,
                learning_rate,
            } => {
                println!(
                    "epoch {epoch}, minibatch {}/{n_train_batches}, validation error {:.6} %, learning rate {learning_rate}",
                    minibatch + 1,
                    loss * 100.0
                );
            }
            TrainingEvent::TestScore {
                epoch,
                minibatch,
                n_train_batches,
                score,
            } => {
                println!(
                    "     epoch {epoch}, minibatch {}/{n_train_batches}, test error of best model {:.6} %",
                    minibatch + 1,
                    score * 100.0
                );
            }
            TrainingEvent::Summary { best } => match best {
                Some(best) => println!(
                    "Optimization complete with best validation score of {:.6} %, obtained at iteration {}, with test performance {:.6} %",
                    best.validation_loss * 100.0,
                    best.iter + 1,
                    best.test_score * 100.0
                ),
                None => println!("Optimization complete; no improving checkpoint found"),
            },
        }
    }
}

/// Reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&mut self, _event: &TrainingEvent) {}
}

/// Reporter that buffers every event in memory.
///
/// Intended for tests and programmatic inspection of a run.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Vec<TrainingEvent>,
}

impl MemoryReporter {
    /// Creates an empty memory reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffered events in emission order.
    #[must_use]
    pub fn events(&self) -> &[TrainingEvent] {
        &self.events
    }

    /// Returns the buffered validation events in emission order.
    #[must_use]
    pub fn validation_events(&self) -> Vec<&TrainingEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, TrainingEvent::Validation { .. }))
            .collect()
    }

    /// Returns the buffered test-score events in emission order.
    #[must_use]
    pub fn test_events(&self) -> Vec<&TrainingEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, TrainingEvent::TestScore { .. }))
            .collect()
    }
}

impl ProgressReporter for MemoryReporter {
    fn report(&mut self, event: &TrainingEvent) {
        self.events.push(event.clone());
    }
}
