use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Array3};
use serde::Serialize;

/// A 2-D feature matrix: rows are samples (or frames), columns are coefficients.
pub type FeatureMatrix = Array2<f64>;

// ---------------------------------------------------------------------------
// Group keys
// ---------------------------------------------------------------------------

/// Which precomputed representation a matrix holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FeatureKind {
    /// STFT magnitude spectrogram.
    Spectrogram,
    /// Mel-frequency cepstral coefficients.
    Mfcc,
    /// Log mel filterbank energies.
    Fbank,
}

impl FeatureKind {
    fn prefix(self) -> &'static str {
        match self {
            FeatureKind::Spectrogram => "S",
            FeatureKind::Mfcc => "mfcc",
            FeatureKind::Fbank => "fbank",
        }
    }
}

/// Normal or pathological voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VoiceClass {
    Normal,
    Abnormal,
}

impl VoiceClass {
    pub const ALL: [VoiceClass; 2] = [VoiceClass::Normal, VoiceClass::Abnormal];

    /// Label value used by the classifier: +1 normal, -1 abnormal.
    pub fn label(self) -> f64 {
        match self {
            VoiceClass::Normal => 1.0,
            VoiceClass::Abnormal => -1.0,
        }
    }
}

impl fmt::Display for VoiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceClass::Normal => write!(f, "normal"),
            VoiceClass::Abnormal => write!(f, "abnormal"),
        }
    }
}

/// Recording condition (sustained vowel task).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Condition {
    A2,
    I1,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::A2, Condition::I1];
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::A2 => write!(f, "a2"),
            Condition::I1 => write!(f, "i1"),
        }
    }
}

/// Identifies one labelled group of recordings, e.g. `mfcc_abnormal_i1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub kind: FeatureKind,
    pub class: VoiceClass,
    pub condition: Condition,
}

impl GroupKey {
    pub fn new(kind: FeatureKind, class: VoiceClass, condition: Condition) -> Self {
        Self {
            kind,
            class,
            condition,
        }
    }

    /// Canonical group name, which is also the file stem on disk.
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.kind.prefix(), self.class, self.condition)
    }

    /// Every class/condition combination for one feature kind, normal first.
    pub fn all_for(kind: FeatureKind) -> Vec<GroupKey> {
        Condition::ALL
            .iter()
            .flat_map(|&cond| {
                VoiceClass::ALL
                    .iter()
                    .map(move |&class| GroupKey::new(kind, class, cond))
            })
            .collect()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ---------------------------------------------------------------------------
// FeatureSet – the result of one loader call
// ---------------------------------------------------------------------------

/// Named feature matrices, ordered by group name.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    groups: BTreeMap<String, FeatureMatrix>,
}

impl FeatureSet {
    pub fn insert(&mut self, key: GroupKey, matrix: FeatureMatrix) {
        self.groups.insert(key.name(), matrix);
    }

    pub fn get(&self, key: GroupKey) -> Option<&FeatureMatrix> {
        self.groups.get(&key.name())
    }

    /// Like [`FeatureSet::get`] but a missing group is an error.
    pub fn require(&self, key: GroupKey) -> Result<&FeatureMatrix> {
        self.get(key)
            .with_context(|| format!("feature group '{key}' was not loaded"))
    }

    /// `(name, (rows, cols))` for every group, in name order.
    pub fn shapes(&self) -> Vec<(&str, (usize, usize))> {
        self.groups
            .iter()
            .map(|(name, m)| (name.as_str(), m.dim()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

// ---------------------------------------------------------------------------
// Dataset / Split
// ---------------------------------------------------------------------------

/// Features with aligned ±1 labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: FeatureMatrix,
    pub y: Array1<f64>,
}

/// Disjoint train/test partitions, features shaped `(rows, steps, 1)`.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array3<f64>,
    pub x_test: Array3<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}
