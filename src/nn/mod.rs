//! Recurrent classifier: layers, loss, optimizer and training loop.
//!
//! ```text
//!   x: (batch, steps, 1)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   lstm    │  final hidden state (batch, hidden)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  dropout  │  training only
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ dense(1)  │  → tanh, kept inside (-1, 1)
//!   └──────────┘
//! ```

use ndarray::Array2;

pub mod classifier;
pub mod dense;
pub mod dropout;
pub mod init;
pub mod loss;
pub mod lstm;
pub mod optimizer;

/// A trainable weight matrix with its accumulated gradient.
#[derive(Debug, Clone)]
pub struct Param {
    pub value: Array2<f64>,
    pub grad: Array2<f64>,
}

impl Param {
    pub fn new(value: Array2<f64>) -> Self {
        let grad = Array2::zeros(value.raw_dim());
        Self { value, grad }
    }
}
