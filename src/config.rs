use std::path::PathBuf;

use serde::Serialize;

use crate::data::model::{Condition, FeatureKind};

// ---------------------------------------------------------------------------
// Experiment constants
// ---------------------------------------------------------------------------

/// Everything the experiment needs, fixed at compile time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperimentConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub optimizer: RmsPropConfig,
    pub fit: FitOptions,
}

/// Where features come from and how the dataset is cut.
#[derive(Debug, Clone, Serialize)]
pub struct DataConfig {
    /// Directory holding one file per feature group.
    pub dir: PathBuf,
    /// Representation fed to the classifier.
    pub features: FeatureKind,
    /// Recording condition fed to the classifier.
    pub condition: Condition,
    /// Leading columns kept; also the sequence length seen by the LSTM.
    pub width: usize,
    pub test_fraction: f64,
    pub split_seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            features: FeatureKind::Mfcc,
            condition: Condition::A2,
            width: 13,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub hidden: usize,
    pub dropout: f64,
    /// Seeds weight initialisation and dropout masks.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden: 32,
            dropout: 0.4,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RmsPropConfig {
    pub learning_rate: f64,
    pub rho: f64,
    pub epsilon: f64,
    /// Each gradient element is clipped to `[-clip_value, clip_value]`.
    pub clip_value: f64,
}

impl Default for RmsPropConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.005,
            rho: 0.9,
            epsilon: 1e-7,
            clip_value: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    /// Trailing fraction of the training rows held out for validation.
    pub validation_split: f64,
    /// Reshuffle the training rows every epoch.
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 30,
            batch_size: 32,
            validation_split: 0.25,
            shuffle: true,
            seed: 7,
        }
    }
}
