//! Binary cross-entropy and accuracy for a tanh output against ±1 labels.
//!
//! Outputs and labels are mapped to `[0, 1]` with `(v + 1) / 2` before the
//! usual cross-entropy, so a tanh unit behaves like a logistic one.

use ndarray::{Array1, Zip};

/// Fuzz factor used to clip probabilities away from 0 and 1.
pub const EPSILON: f64 = 1e-7;

fn probability(v: f64) -> f64 {
    (v + 1.0) / 2.0
}

/// Mean binary cross-entropy.
pub fn binary_cross_entropy(output: &Array1<f64>, labels: &Array1<f64>) -> f64 {
    if output.is_empty() {
        return 0.0;
    }
    let total: f64 = Zip::from(output).and(labels).fold(0.0, |acc, &out, &y| {
        let p = probability(out).clamp(EPSILON, 1.0 - EPSILON);
        let t = probability(y);
        acc - (t * p.ln() + (1.0 - t) * (1.0 - p).ln())
    });
    total / output.len() as f64
}

/// Gradient of [`binary_cross_entropy`] w.r.t. the pre-tanh activation.
///
/// With `p = (tanh(a) + 1) / 2` the chain collapses to `2 (p - t) / n`.
/// Clipped probabilities get no gradient.
pub fn binary_cross_entropy_grad(output: &Array1<f64>, labels: &Array1<f64>) -> Array1<f64> {
    let n = output.len().max(1) as f64;
    Zip::from(output).and(labels).map_collect(|&out, &y| {
        let p = probability(out);
        if (EPSILON..=1.0 - EPSILON).contains(&p) {
            2.0 * (p - probability(y)) / n
        } else {
            0.0
        }
    })
}

/// Predicted class for an output: +1 when non-negative, else -1.
pub fn predicted_class(out: f64) -> f64 {
    if out >= 0.0 { 1.0 } else { -1.0 }
}

/// Fraction of rows whose predicted class equals the label.
pub fn accuracy(output: &Array1<f64>, labels: &Array1<f64>) -> f64 {
    if output.is_empty() {
        return 0.0;
    }
    let hits = Zip::from(output)
        .and(labels)
        .fold(0usize, |acc, &out, &y| acc + usize::from(predicted_class(out) == y));
    hits as f64 / output.len() as f64
}
