//! Console output: shapes at each stage, per-epoch progress and test metrics.
//!
//! Every printer also returns the lines it wrote so the report window can
//! repeat them.

use crate::data::model::{FeatureSet, Split};
use crate::nn::classifier::{EpochMetrics, Evaluation};

fn emit(lines: Vec<String>) -> Vec<String> {
    for line in &lines {
        println!("{line}");
    }
    lines
}

pub fn feature_shapes(set: &FeatureSet) -> Vec<String> {
    emit(
        set.shapes()
            .into_iter()
            .map(|(name, (rows, cols))| format!("{name}: ({rows}, {cols})"))
            .collect(),
    )
}

pub fn split_shapes(split: &Split) -> Vec<String> {
    let (a, b, c) = split.x_train.dim();
    let (d, e, f) = split.x_test.dim();
    emit(vec![
        format!("x_train: ({a}, {b}, {c})"),
        format!("x_test: ({d}, {e}, {f})"),
        format!("y_train: ({},)", split.y_train.len()),
        format!("y_test: ({},)", split.y_test.len()),
    ])
}

pub fn epoch_line(epoch: usize, epochs: usize, metrics: &EpochMetrics) -> String {
    let mut line = format!(
        "Epoch {epoch}/{epochs} - loss: {:.4} - acc: {:.4}",
        metrics.loss, metrics.accuracy
    );
    if let Some(val) = metrics.validation {
        line.push_str(&format!(
            " - val_loss: {:.4} - val_acc: {:.4}",
            val.loss, val.accuracy
        ));
    }
    line
}

pub fn epoch(epoch: usize, epochs: usize, metrics: &EpochMetrics) {
    println!("{}", epoch_line(epoch, epochs, metrics));
}

pub fn test_metrics(result: &Evaluation) -> Vec<String> {
    emit(vec![
        format!("test loss: {:.4}", result.loss),
        format!("test accuracy: {:.4}", result.accuracy),
    ])
}
