//! Configuration for two-phase training runs.
//!
//! This module provides the configuration struct and builder for customizing
//! a training run, covering both the pretraining and fine-tuning phases.
//!
//! # Overview
//!
//! The configuration system is designed to be:
//! - **Serializable** - Load/save configurations from TOML files
//! - **Validated** - Invalid configurations are rejected before any training step
//! - **Defaulted** - The defaults reproduce the reference training setup
//!
//! # Example
//!
//! ```rust
//! use layerwise_trainer_rs::config::TrainConfig;
//!
//! // Using defaults
//! let config = TrainConfig::default();
//!
//! // Using builder pattern
//! let config = TrainConfig::builder()
//!     .finetune_lr(0.05)
//!     .decay(true)
//!     .training_epochs(50)
//!     .build();
//!
//! // Loading from file
//! // let config = TrainConfig::from_file("train.toml")?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{TrainError, TrainResult};

/// Configuration for a two-phase training run.
///
/// Created once at orchestration start and never mutated afterwards.
///
/// # Defaults
///
/// | Parameter | Default | Description |
/// |-----------|---------|-------------|
/// | `finetune_lr` | 0.1 | base fine-tuning learning rate |
/// | `decay` | false | enable inverse-time learning-rate decay |
/// | `training_epochs` | 100 | max fine-tuning epochs |
/// | `pretraining_epochs` | 10 | epochs per layer during pretraining |
/// | `pretrain_lr` | 0.01 | pretraining learning rate |
/// | `k` | 1 | sampling-step count passed to the model |
/// | `batch_size` | 10 | minibatch size, shared by both phases |
/// | `early_stopping` | false | consult patience to stop fine-tuning early |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Base learning rate for the fine-tuning phase.
    #[serde(default = "default_finetune_lr")]
    pub finetune_lr: f64,

    /// Whether the fine-tuning learning rate decays over epochs.
    ///
    /// When enabled, the effective rate at 1-based epoch `e` is
    /// `finetune_lr / (1 + e / 10)`.
    #[serde(default = "default_decay")]
    pub decay: bool,

    /// Maximum number of fine-tuning epochs.
    #[serde(default = "default_training_epochs")]
    pub training_epochs: usize,

    /// Number of pretraining epochs per layer.
    #[serde(default = "default_pretraining_epochs")]
    pub pretraining_epochs: usize,

    /// Learning rate used during layer-wise pretraining.
    #[serde(default = "default_pretrain_lr")]
    pub pretrain_lr: f64,

    /// Sampling-step count forwarded to each pretraining step.
    ///
    /// Opaque to the orchestrator; its meaning (e.g. Gibbs steps in CD/PCD)
    /// is owned by the model. Must be at least 1.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Minibatch size shared by both phases. Must be at least 1.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Whether fine-tuning stops once the patience budget is exhausted.
    ///
    /// The patience budget (`4 * n_train_batches` iterations past the best
    /// validation check) is always computed. With this flag off the run
    /// proceeds to `training_epochs` regardless; with it on, the run stops
    /// at the first validation check past the budget.
    #[serde(default = "default_early_stopping")]
    pub early_stopping: bool,
}

// Default value functions for serde
fn default_finetune_lr() -> f64 {
    0.1
}
fn default_decay() -> bool {
    false
}
fn default_training_epochs() -> usize {
    100
}
fn default_pretraining_epochs() -> usize {
    10
}
fn default_pretrain_lr() -> f64 {
    0.01
}
fn default_k() -> usize {
    1
}
fn default_batch_size() -> usize {
    10
}
fn default_early_stopping() -> bool {
    false
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            finetune_lr: default_finetune_lr(),
            decay: default_decay(),
            training_epochs: default_training_epochs(),
            pretraining_epochs: default_pretraining_epochs(),
            pretrain_lr: default_pretrain_lr(),
            k: default_k(),
            batch_size: default_batch_size(),
            early_stopping: default_early_stopping(),
        }
    }
}

impl TrainConfig {
    /// Creates a new configuration builder.
    ///
    /// # Example
    ///
    /// ```rust
    /// use layerwise_trainer_rs::config::TrainConfig;
    ///
    /// let config = TrainConfig::builder()
    ///     .training_epochs(20)
    ///     .batch_size(32)
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> TrainConfigBuilder {
        TrainConfigBuilder::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> TrainResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TrainError::InvalidConfig(format!("failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| TrainError::InvalidConfig(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> TrainResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TrainError::InvalidConfig(format!("failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| TrainError::InvalidConfig(format!("failed to write config file: {e}")))
    }

    /// Validates the configuration.
    ///
    /// Checks every parameter the orchestration arithmetic depends on, so
    /// that a bad run fails before any model step executes.
    ///
    /// # Errors
    ///
    /// Returns `TrainError::InvalidConfig` describing the first violation.
    pub fn validate(&self) -> TrainResult<()> {
        if self.batch_size == 0 {
            return Err(TrainError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }

        if self.k == 0 {
            return Err(TrainError::InvalidConfig("k must be >= 1".to_string()));
        }

        if !self.finetune_lr.is_finite() || self.finetune_lr <= 0.0 {
            return Err(TrainError::InvalidConfig(format!(
                "finetune_lr must be finite and > 0, got {}",
                self.finetune_lr
            )));
        }

        if !self.pretrain_lr.is_finite() || self.pretrain_lr <= 0.0 {
            return Err(TrainError::InvalidConfig(format!(
                "pretrain_lr must be finite and > 0, got {}",
                self.pretrain_lr
            )));
        }

        Ok(())
    }
}

/// Builder for [`TrainConfig`].
#[derive(Debug, Default)]
pub struct TrainConfigBuilder {
    finetune_lr: Option<f64>,
    decay: Option<bool>,
    training_epochs: Option<usize>,
    pretraining_epochs: Option<usize>,
    pretrain_lr: Option<f64>,
    k: Option<usize>,
    batch_size: Option<usize>,
    early_stopping: Option<bool>,
}

impl TrainConfigBuilder {
    /// Sets the base fine-tuning learning rate.
    #[must_use]
    pub fn finetune_lr(mut self, lr: f64) -> Self {
        self.finetune_lr = Some(lr);
        self
    }

    /// Sets whether the fine-tuning learning rate decays.
    #[must_use]
    pub fn decay(mut self, decay: bool) -> Self {
        self.decay = Some(decay);
        self
    }

    /// Sets the maximum number of fine-tuning epochs.
    #[must_use]
    pub fn training_epochs(mut self, epochs: usize) -> Self {
        self.training_epochs = Some(epochs);
        self
    }

    /// Sets the number of pretraining epochs per layer.
    #[must_use]
    pub fn pretraining_epochs(mut self, epochs: usize) -> Self {
        self.pretraining_epochs = Some(epochs);
        self
    }

    /// Sets the pretraining learning rate.
    #[must_use]
    pub fn pretrain_lr(mut self, lr: f64) -> Self {
        self.pretrain_lr = Some(lr);
        self
    }

    /// Sets the sampling-step count.
    #[must_use]
    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Sets the minibatch size.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets whether patience-based early stopping is enabled.
    #[must_use]
    pub fn early_stopping(mut self, enabled: bool) -> Self {
        self.early_stopping = Some(enabled);
        self
    }

    /// Builds the configuration with defaults for unset values.
    #[must_use]
    pub fn build(self) -> TrainConfig {
        TrainConfig {
            finetune_lr: self.finetune_lr.unwrap_or_else(default_finetune_lr),
            decay: self.decay.unwrap_or_else(default_decay),
            training_epochs: self.training_epochs.unwrap_or_else(default_training_epochs),
            pretraining_epochs: self
                .pretraining_epochs
                .unwrap_or_else(default_pretraining_epochs),
            pretrain_lr: self.pretrain_lr.unwrap_or_else(default_pretrain_lr),
            k: self.k.unwrap_or_else(default_k),
            batch_size: self.batch_size.unwrap_or_else(default_batch_size),
            early_stopping: self.early_stopping.unwrap_or_else(default_early_stopping),
        }
    }
}
