//! Learning-rate schedules for the fine-tuning phase.

use serde::{Deserialize, Serialize};

use crate::config::TrainConfig;

/// Learning-rate schedule evaluated once per fine-tuning epoch.
///
/// The effective rate is recomputed at the top of every minibatch step from
/// the current 1-based epoch; the schedule itself carries no mutable state,
/// so a run is reproducible from the configuration alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LearningRateSchedule {
    /// The base rate is used unchanged for every epoch.
    Constant {
        /// Base learning rate.
        base: f64,
    },
    /// Inverse-time decay: `base / (1 + epoch / 10)` at 1-based `epoch`.
    InverseTimeDecay {
        /// Base learning rate before decay.
        base: f64,
    },
}

impl LearningRateSchedule {
    /// Builds the schedule selected by the configuration's `decay` flag.
    #[must_use]
    pub fn from_config(config: &TrainConfig) -> Self {
        if config.decay {
            Self::InverseTimeDecay {
                base: config.finetune_lr,
            }
        } else {
            Self::Constant {
                base: config.finetune_lr,
            }
        }
    }

    /// Returns the effective learning rate for a 1-based epoch.
    #[must_use]
    pub fn effective_lr(&self, epoch: usize) -> f64 {
        match self {
            Self::Constant { base } => *base,
            Self::InverseTimeDecay { base } => base / (1.0 + epoch as f64 / 10.0),
        }
    }
}
