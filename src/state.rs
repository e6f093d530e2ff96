use crate::color::SeriesColors;
use crate::nn::classifier::{Evaluation, History};

// ---------------------------------------------------------------------------
// Report state
// ---------------------------------------------------------------------------

/// One curve as `[epoch, value]` points, epochs counted from 1.
pub type Curve = Vec<[f64; 2]>;

/// Everything the report window shows, independent of rendering.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub acc: Curve,
    pub val_acc: Curve,
    pub loss: Curve,
    pub val_loss: Curve,

    /// Final metrics on the held-out test partition.
    pub test: Evaluation,

    /// Shape lines printed during the run, repeated in the side panel.
    pub summary: Vec<String>,

    pub colors: SeriesColors,
}

fn curve(values: &[f64]) -> Curve {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| [(i + 1) as f64, v])
        .collect()
}

impl ReportState {
    pub fn new(history: &History, test: Evaluation, summary: Vec<String>) -> Self {
        Self {
            acc: curve(&history.accuracy()),
            val_acc: curve(&history.val_accuracy()),
            loss: curve(&history.loss()),
            val_loss: curve(&history.val_loss()),
            test,
            summary,
            colors: SeriesColors::default(),
        }
    }

    pub fn epochs(&self) -> usize {
        self.loss.len()
    }
}
