//! # layerwise-trainer-rs
//!
//! Training orchestration for layered predictive models in two phases:
//! greedy, unsupervised layer-by-layer **pretraining** followed by jointly
//! supervised **fine-tuning** with learning-rate scheduling and
//! validation-driven best-model selection.
//!
//! ## Overview
//!
//! The crate owns the control protocol of a training run and nothing else.
//! Layer mathematics, dataset access, persistence, and device placement all
//! live behind the [`LayeredModel`] trait: the orchestrators address the
//! model purely by layer and minibatch index and consume scalar costs and
//! per-batch losses.
//!
//! ```text
//!            ┌──────────────────────────┐
//!            │ PretrainingOrchestrator  │   layer → epoch → minibatch
//!            └────────────┬─────────────┘
//!                         │ model initialized in place
//!                         ▼
//!            ┌──────────────────────────┐
//!            │ FineTuningOrchestrator   │   epoch → minibatch
//!            │  · LR schedule per epoch │
//!            │  · validation checks     │
//!            │  · strict-< best state   │
//!            └────────────┬─────────────┘
//!                         ▼
//!              FineTuneOutcome (best checkpoint, or none)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use layerwise_trainer_rs::{
//!     ConsoleReporter, SplitSizes, TrainConfig, TrainingSession,
//! };
//!
//! let config = TrainConfig::builder().decay(true).training_epochs(50).build();
//! let session = TrainingSession::new(config)?;
//!
//! let splits = SplitSizes::new(50_000, 10_000, 10_000);
//! let mut reporter = ConsoleReporter::default();
//! let outcome = session.run(&mut model, splits, &mut reporter)?;
//!
//! match outcome.finetune.best {
//!     Some(best) => println!("best at iteration {}", best.iter),
//!     None => println!("no improving checkpoint found"),
//! }
//! # Ok::<(), layerwise_trainer_rs::TrainError>(())
//! ```
//!
//! ## Determinism
//!
//! A run is a single logical thread of control: step calls are issued
//! strictly one at a time in index order, never reordered or overlapped.
//! Given deterministic model step functions (seeding is owned by the model)
//! the whole run is deterministic, including which iteration is selected as
//! best — ties in validation loss keep the earliest iteration.
//!
//! ## Modules
//!
//! - [`config`] - Run configuration, TOML load/save, validation
//! - [`error`] - Error types and the [`TrainResult`] alias
//! - [`data`] - Split sizes and integer minibatch arithmetic
//! - [`schedule`] - Per-epoch learning-rate schedules
//! - [`report`] - Structured progress events and reporter sinks
//! - [`pretrain`] - The layer-wise pretraining orchestrator
//! - [`finetune`] - The fine-tuning orchestrator and best-state tracking

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
// Allow precision loss casts - acceptable in ML numerical code
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod data;
pub mod error;
pub mod finetune;
pub mod pretrain;
pub mod report;
pub mod schedule;

// Re-exports for convenient access
pub use config::{TrainConfig, TrainConfigBuilder};
pub use data::{BatchPlan, SplitSizes};
pub use error::{TrainError, TrainResult};
pub use finetune::{BestCheckpoint, FineTuneOutcome, FineTuningOrchestrator};
pub use pretrain::{PretrainOutcome, PretrainingOrchestrator};
pub use report::{
    BestSummary, ConsoleReporter, MemoryReporter, NullReporter, ProgressReporter, TrainingEvent,
};
pub use schedule::LearningRateSchedule;

/// Capability interface a layered model must expose to be driven by the
/// orchestrators.
///
/// The four step/evaluation operations are opaque: the orchestrator has no
/// visibility into parameter counts, sampling procedures, or loss functions,
/// and never touches example data. Minibatches are addressed by contiguous
/// zero-based index; `validate` and `test` sweep their entire split.
///
/// All calls are blocking. Implementations may parallelize or offload
/// internally, but the orchestrators issue calls strictly one at a time and
/// treat any returned error as fatal to the run.
pub trait LayeredModel {
    /// Returns the number of layers to pretrain.
    fn n_layers(&self) -> usize;

    /// Executes one unsupervised pretraining step on the addressed layer
    /// and minibatch, mutating only that layer's parameters.
    ///
    /// `k` is the sampling-step count, forwarded from the configuration
    /// unmodified; its interpretation is owned by the model.
    ///
    /// # Returns
    ///
    /// The scalar cost of the step.
    fn pretrain_step(&mut self, layer: usize, batch: usize, lr: f64, k: usize)
        -> TrainResult<f64>;

    /// Executes one supervised fine-tuning step on the addressed minibatch,
    /// mutating all parameters.
    ///
    /// # Returns
    ///
    /// The scalar cost of the step.
    fn train_step(&mut self, batch: usize, lr: f64) -> TrainResult<f64>;

    /// Evaluates the validation split.
    ///
    /// # Returns
    ///
    /// Per-batch error values; must be non-empty.
    fn validate(&mut self) -> TrainResult<Vec<f64>>;

    /// Evaluates the test split.
    ///
    /// # Returns
    ///
    /// Per-batch error values; must be non-empty.
    fn test(&mut self) -> TrainResult<Vec<f64>>;
}

/// Combined outcome of a full two-phase training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Outcome of the pretraining phase.
    pub pretrain: PretrainOutcome,
    /// Outcome of the fine-tuning phase.
    pub finetune: FineTuneOutcome,
}

/// Driver for a complete two-phase training run.
///
/// Validates the configuration once at construction, then runs pretraining
/// to completion followed by fine-tuning against the same model, feeding
/// both orchestrators the same reporter.
#[derive(Debug, Clone)]
pub struct TrainingSession {
    config: TrainConfig,
}

impl TrainingSession {
    /// Creates a session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `TrainError::InvalidConfig` if the configuration is rejected
    /// by [`TrainConfig::validate`].
    pub fn new(config: TrainConfig) -> TrainResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Runs pretraining followed by fine-tuning.
    ///
    /// The minibatch plan is derived once from the training split size and
    /// shared by both phases; a training split smaller than one minibatch
    /// is rejected here, before any model step executes.
    ///
    /// # Errors
    ///
    /// Returns dataset-shape errors from plan derivation, or the first
    /// collaborator failure from either phase.
    pub fn run<M: LayeredModel>(
        &self,
        model: &mut M,
        splits: SplitSizes,
        reporter: &mut dyn ProgressReporter,
    ) -> TrainResult<TrainingOutcome> {
        let plan = BatchPlan::new(splits.train, self.config.batch_size)?;

        let pretrainer = PretrainingOrchestrator::new(
            plan,
            self.config.pretraining_epochs,
            self.config.pretrain_lr,
            self.config.k,
        );
        let pretrain = pretrainer.run(model, reporter)?;
        tracing::info!(
            layers = pretrain.layers,
            duration_ms = pretrain.duration_ms,
            "pretraining complete"
        );

        let finetuner = FineTuningOrchestrator::new(
            plan,
            LearningRateSchedule::from_config(&self.config),
            self.config.training_epochs,
            self.config.early_stopping,
        );
        let finetune = finetuner.run(model, reporter)?;
        tracing::info!(
            epochs_run = finetune.epochs_run,
            stopped_early = finetune.stopped_early,
            duration_ms = finetune.duration_ms,
            "fine-tuning complete"
        );

        Ok(TrainingOutcome { pretrain, finetune })
    }
}
