//! Greedy layer-wise pretraining.
//!
//! Pretraining initializes each layer's parameters independently, with no
//! supervised objective. The iteration order is strict: layer outermost,
//! epoch in the middle, minibatch innermost. Layer `i + 1` is touched only
//! after layer `i`'s epochs complete; the orchestrator does not propagate
//! representations between layers, it only enforces the ordering and
//! forwards opaque step calls to the model.

use std::time::Instant;

use crate::data::BatchPlan;
use crate::error::TrainResult;
use crate::report::{ProgressReporter, TrainingEvent};
use crate::LayeredModel;

/// Running cost statistics for one pretraining epoch.
///
/// Per-minibatch costs are not retained; only the running sum survives the
/// epoch, which is all the reported mean needs.
#[derive(Debug, Clone, Default)]
pub struct EpochCostStats {
    /// Number of minibatch steps recorded.
    pub steps_completed: usize,
    /// Running sum of per-minibatch costs.
    pub cost_sum: f64,
}

impl EpochCostStats {
    /// Records one minibatch cost.
    pub fn record_step(&mut self, cost: f64) {
        self.steps_completed += 1;
        self.cost_sum += cost;
    }

    /// Returns the mean cost over the recorded steps.
    #[must_use]
    pub fn mean_cost(&self) -> f64 {
        if self.steps_completed == 0 {
            0.0
        } else {
            self.cost_sum / self.steps_completed as f64
        }
    }
}

/// Outcome of a completed pretraining phase.
#[derive(Debug, Clone)]
pub struct PretrainOutcome {
    /// Number of layers pretrained.
    pub layers: usize,
    /// Epochs run per layer.
    pub epochs_per_layer: usize,
    /// Total minibatch steps executed across all layers and epochs.
    pub steps_executed: usize,
    /// Wall-clock duration of the phase in milliseconds.
    pub duration_ms: f64,
}

/// Orchestrator for the unsupervised pretraining phase.
///
/// Mutates the model's parameters in place, monotonically; there is no
/// rollback. Each `pretrain_step` call touches only the addressed layer and
/// returns a scalar cost whose computation is opaque to the orchestrator.
#[derive(Debug)]
pub struct PretrainingOrchestrator {
    plan: BatchPlan,
    epochs: usize,
    lr: f64,
    k: usize,
}

impl PretrainingOrchestrator {
    /// Creates a pretraining orchestrator.
    ///
    /// # Arguments
    ///
    /// * `plan` - Minibatch plan derived from the training split
    /// * `epochs` - Pretraining epochs per layer
    /// * `lr` - Pretraining learning rate
    /// * `k` - Sampling-step count forwarded to the model unmodified
    #[must_use]
    pub fn new(plan: BatchPlan, epochs: usize, lr: f64, k: usize) -> Self {
        Self {
            plan,
            epochs,
            lr,
            k,
        }
    }

    /// Runs pretraining over every layer of the model.
    ///
    /// Emits one [`TrainingEvent::PretrainEpoch`] per layer per epoch with
    /// the epoch's mean minibatch cost.
    ///
    /// # Errors
    ///
    /// Propagates the first `pretrain_step` failure; the run has no
    /// meaningful partial result past that point.
    pub fn run<M: LayeredModel>(
        &self,
        model: &mut M,
        reporter: &mut dyn ProgressReporter,
    ) -> TrainResult<PretrainOutcome> {
        let start = Instant::now();
        let n_layers = model.n_layers();
        let n_batches = self.plan.n_train_batches();
        let mut steps_executed = 0usize;

        tracing::debug!(
            n_layers,
            epochs = self.epochs,
            n_batches,
            "starting layer-wise pretraining"
        );

        for layer in 0..n_layers {
            for epoch in 0..self.epochs {
                let mut stats = EpochCostStats::default();
                for batch_index in 0..n_batches {
                    let cost = model.pretrain_step(layer, batch_index, self.lr, self.k)?;
                    stats.record_step(cost);
                }
                steps_executed += stats.steps_completed;

                reporter.report(&TrainingEvent::PretrainEpoch {
                    layer,
                    epoch,
                    mean_cost: stats.mean_cost(),
                });
            }
            tracing::debug!(layer, "layer pretraining complete");
        }

        Ok(PretrainOutcome {
            layers: n_layers,
            epochs_per_layer: self.epochs,
            steps_executed,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use crate::TrainResult;

    /// Stub model recording the exact order of pretraining calls.
    struct OrderRecordingModel {
        layers: usize,
        calls: Vec<(usize, usize)>,
        cost: f64,
    }

    impl LayeredModel for OrderRecordingModel {
        fn n_layers(&self) -> usize {
            self.layers
        }

        fn pretrain_step(
            &mut self,
            layer: usize,
            batch: usize,
            _lr: f64,
            _k: usize,
        ) -> TrainResult<f64> {
            self.calls.push((layer, batch));
            Ok(self.cost)
        }

        fn train_step(&mut self, _batch: usize, _lr: f64) -> TrainResult<f64> {
            unreachable!("pretraining never calls train_step")
        }

        fn validate(&mut self) -> TrainResult<Vec<f64>> {
            unreachable!("pretraining never validates")
        }

        fn test(&mut self) -> TrainResult<Vec<f64>> {
            unreachable!("pretraining never tests")
        }
    }

    #[test]
    fn test_strict_layer_epoch_minibatch_order() {
        let plan = BatchPlan::new(30, 10).unwrap();
        let orchestrator = PretrainingOrchestrator::new(plan, 2, 0.01, 1);
        let mut model = OrderRecordingModel {
            layers: 2,
            calls: Vec::new(),
            cost: 0.5,
        };
        let mut reporter = MemoryReporter::new();

        let outcome = orchestrator.run(&mut model, &mut reporter).unwrap();

        // 2 layers x 2 epochs x 3 batches
        assert_eq!(outcome.steps_executed, 12);
        let expected: Vec<(usize, usize)> = vec![
            (0, 0),
            (0, 1),
            (0, 2),
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 0),
            (1, 1),
            (1, 2),
            (1, 0),
            (1, 1),
            (1, 2),
        ];
        assert_eq!(model.calls, expected);

        // One event per layer per epoch.
        assert_eq!(reporter.events().len(), 4);
    }

    #[test]
    fn test_constant_cost_means_constant_mean() {
        // Mean of a constant cost is that cost, independent of batch count.
        let plan = BatchPlan::new(70, 10).unwrap();
        let orchestrator = PretrainingOrchestrator::new(plan, 1, 0.01, 1);
        let mut model = OrderRecordingModel {
            layers: 1,
            calls: Vec::new(),
            cost: 1.25,
        };
        let mut reporter = MemoryReporter::new();

        orchestrator.run(&mut model, &mut reporter).unwrap();

        match reporter.events()[0] {
            TrainingEvent::PretrainEpoch { mean_cost, .. } => {
                assert!((mean_cost - 1.25).abs() < 1e-12);
            }
            ref other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_zero_epochs_runs_nothing() {
        let plan = BatchPlan::new(30, 10).unwrap();
        let orchestrator = PretrainingOrchestrator::new(plan, 0, 0.01, 1);
        let mut model = OrderRecordingModel {
            layers: 3,
            calls: Vec::new(),
            cost: 0.5,
        };
        let mut reporter = MemoryReporter::new();

        let outcome = orchestrator.run(&mut model, &mut reporter).unwrap();
        assert_eq!(outcome.steps_executed, 0);
        assert!(model.calls.is_empty());
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_epoch_cost_stats_running_mean() {
        let mut stats = EpochCostStats::default();
        stats.record_step(1.0);
        stats.record_step(2.0);
        stats.record_step(6.0);
        assert_eq!(stats.steps_completed, 3);
        assert!((stats.mean_cost() - 3.0).abs() < 1e-12);
    }
}
