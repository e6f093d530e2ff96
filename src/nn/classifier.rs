use ndarray::{Array1, Array2, Array3, ArrayView3, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::Param;
use super::dense::Dense;
use super::dropout::Dropout;
use super::loss::{accuracy, binary_cross_entropy, binary_cross_entropy_grad};
use super::lstm::Lstm;
use super::optimizer::RmsProp;
use crate::config::{FitOptions, ModelConfig};
use crate::error::DatasetError;

/// Outputs are clamped to this magnitude so they stay strictly inside (-1, 1).
const OUTPUT_BOUND: f64 = 1.0 - 1e-7;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Loss and accuracy over one dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

/// Metrics recorded at the end of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    pub loss: f64,
    pub accuracy: f64,
    /// `None` when no validation rows were held out.
    pub validation: Option<Evaluation>,
}

/// Per-epoch training record returned by [`Compiled::fit`].
#[derive(Debug, Clone, Default)]
pub struct History {
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn loss(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.loss).collect()
    }

    pub fn accuracy(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.accuracy).collect()
    }

    pub fn val_loss(&self) -> Vec<f64> {
        self.epochs
            .iter()
            .filter_map(|e| e.validation.map(|v| v.loss))
            .collect()
    }

    pub fn val_accuracy(&self) -> Vec<f64> {
        self.epochs
            .iter()
            .filter_map(|e| e.validation.map(|v| v.accuracy))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// LstmClassifier – the network itself
// ---------------------------------------------------------------------------

/// LSTM → dropout → dense(1) → tanh binary classifier over fixed-length
/// sequences shaped `(rows, steps, features)`.
#[derive(Debug, Clone)]
pub struct LstmClassifier {
    steps: usize,
    lstm: Lstm,
    dropout: Dropout,
    dense: Dense,
    rng: StdRng,
}

/// Everything a training step needs to backpropagate.
struct ForwardPass {
    caches: Vec<super::lstm::StepCache>,
    dropped: Array2<f64>,
    mask: Array2<f64>,
    output: Array1<f64>,
}

impl LstmClassifier {
    pub fn new(steps: usize, features: usize, config: &ModelConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let lstm = Lstm::new(features, config.hidden, &mut rng);
        let dense = Dense::new(config.hidden, 1, &mut rng);
        Self {
            steps,
            lstm,
            dropout: Dropout::new(config.dropout),
            dense,
            rng,
        }
    }

    /// Expected input shape `(steps, features)` per row.
    pub fn input_shape(&self) -> (usize, usize) {
        (self.steps, self.lstm.features())
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.lstm.kernel.value.len()
            + self.lstm.recurrent.value.len()
            + self.lstm.bias.value.len()
            + self.dense.kernel.value.len()
            + self.dense.bias.value.len()
    }

    /// Attach an optimizer; the result can be trained.
    pub fn compile(self, optimizer: RmsProp) -> Compiled {
        Compiled {
            model: self,
            optimizer,
        }
    }

    fn check_input(&self, x: &ArrayView3<'_, f64>, labels: Option<usize>) -> Result<(), DatasetError> {
        let (rows, steps, features) = x.dim();
        let (expected_steps, expected_features) = self.input_shape();
        if steps != expected_steps || features != expected_features {
            return Err(DatasetError::InputShape {
                expected_steps,
                expected_features,
                steps,
                features,
            });
        }
        match labels {
            Some(n) if n != rows => Err(DatasetError::RowMismatch {
                features: rows,
                labels: n,
            }),
            _ => Ok(()),
        }
    }

    fn infer(&self, x: ArrayView3<'_, f64>) -> Array1<f64> {
        let (hidden, _) = self.lstm.forward(x);
        bounded_tanh(self.dense.forward(&hidden))
    }

    /// Forward pass without dropout. Every output lies in (-1, 1).
    pub fn predict(&self, x: &Array3<f64>) -> Result<Array1<f64>, DatasetError> {
        self.check_input(&x.view(), None)?;
        Ok(self.infer(x.view()))
    }

    /// Loss and accuracy on `(x, y)` without touching the parameters.
    pub fn evaluate(&self, x: &Array3<f64>, y: &Array1<f64>) -> Result<Evaluation, DatasetError> {
        self.check_input(&x.view(), Some(y.len()))?;
        if y.is_empty() {
            return Err(DatasetError::Empty("evaluation set"));
        }
        Ok(self.evaluate_unchecked(x.view(), y))
    }

    fn evaluate_unchecked(&self, x: ArrayView3<'_, f64>, y: &Array1<f64>) -> Evaluation {
        let output = self.infer(x);
        Evaluation {
            loss: binary_cross_entropy(&output, y),
            accuracy: accuracy(&output, y),
        }
    }

    fn forward_train(&mut self, x: ArrayView3<'_, f64>) -> ForwardPass {
        let (hidden, caches) = self.lstm.forward(x);
        let mask = self.dropout.mask(hidden.dim(), &mut self.rng);
        let dropped = hidden * &mask;
        let output = bounded_tanh(self.dense.forward(&dropped));
        ForwardPass {
            caches,
            dropped,
            mask,
            output,
        }
    }

    /// Forward and backward over one batch, leaving gradients in the
    /// parameters. Returns the batch loss and accuracy.
    fn accumulate_gradients(&mut self, x: ArrayView3<'_, f64>, y: &Array1<f64>) -> Evaluation {
        let pass = self.forward_train(x);
        let d_logit = binary_cross_entropy_grad(&pass.output, y).insert_axis(Axis(1));
        let d_dropped = self.dense.backward(&pass.dropped, &d_logit);
        let d_hidden = d_dropped * &pass.mask;
        self.lstm.backward(&pass.caches, d_hidden);
        Evaluation {
            loss: binary_cross_entropy(&pass.output, y),
            accuracy: accuracy(&pass.output, y),
        }
    }

    fn params_mut(&mut self) -> Vec<&mut Param> {
        let [kernel, recurrent, bias] = self.lstm.params_mut();
        let [dense_kernel, dense_bias] = self.dense.params_mut();
        vec![kernel, recurrent, bias, dense_kernel, dense_bias]
    }
}

fn bounded_tanh(logits: Array2<f64>) -> Array1<f64> {
    logits
        .index_axis_move(Axis(1), 0)
        .mapv(|v| v.tanh().clamp(-OUTPUT_BOUND, OUTPUT_BOUND))
}

// ---------------------------------------------------------------------------
// Compiled – classifier plus optimizer
// ---------------------------------------------------------------------------

/// A classifier with its optimizer attached, ready for [`Compiled::fit`].
#[derive(Debug, Clone)]
pub struct Compiled {
    model: LstmClassifier,
    optimizer: RmsProp,
}

impl Compiled {
    pub fn evaluate(&self, x: &Array3<f64>, y: &Array1<f64>) -> Result<Evaluation, DatasetError> {
        self.model.evaluate(x, y)
    }

    /// Train on `(x, y)` for `options.epochs` epochs.
    ///
    /// The trailing `validation_split` fraction of the rows is held out once,
    /// before any shuffling. `on_epoch` is called after each epoch with its
    /// 1-based index and metrics.
    pub fn fit<F>(
        &mut self,
        x: &Array3<f64>,
        y: &Array1<f64>,
        options: &FitOptions,
        mut on_epoch: F,
    ) -> Result<History, DatasetError>
    where
        F: FnMut(usize, &EpochMetrics),
    {
        self.model.check_input(&x.view(), Some(y.len()))?;
        if options.batch_size == 0 {
            return Err(DatasetError::Empty("batch"));
        }
        if !(0.0..1.0).contains(&options.validation_split) {
            return Err(DatasetError::InvalidFraction(options.validation_split));
        }

        let rows = y.len();
        let split_at = (rows as f64 * (1.0 - options.validation_split)) as usize;
        if split_at == 0 {
            return Err(DatasetError::Empty("training rows"));
        }
        let (x_fit, x_val) = x.view().split_at(Axis(0), split_at);
        let y_fit = y.slice(ndarray::s![..split_at]).to_owned();
        let y_val = y.slice(ndarray::s![split_at..]).to_owned();
        if y_val.is_empty() && options.validation_split > 0.0 {
            log::warn!("validation split of {rows} rows is empty");
        }

        log::info!(
            "Train on {} samples, validate on {} samples",
            y_fit.len(),
            y_val.len()
        );

        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut order: Vec<usize> = (0..split_at).collect();
        let mut history = History::default();

        for epoch in 1..=options.epochs {
            if options.shuffle {
                order.shuffle(&mut rng);
            }

            let mut loss_sum = 0.0;
            let mut acc_sum = 0.0;
            for (batch_no, chunk) in order.chunks(options.batch_size).enumerate() {
                let xb = x_fit.select(Axis(0), chunk);
                let yb = y_fit.select(Axis(0), chunk);

                let batch = self.model.accumulate_gradients(xb.view(), &yb);
                let mut params = self.model.params_mut();
                self.optimizer.step(&mut params);

                log::trace!("epoch {epoch} batch {batch_no}: loss {:.4}", batch.loss);
                loss_sum += batch.loss * chunk.len() as f64;
                acc_sum += batch.accuracy * chunk.len() as f64;
            }

            let validation = (!y_val.is_empty())
                .then(|| self.model.evaluate_unchecked(x_val.view(), &y_val));
            let metrics = EpochMetrics {
                loss: loss_sum / split_at as f64,
                accuracy: acc_sum / split_at as f64,
                validation,
            };
            log::debug!("epoch {epoch}/{}: {metrics:?}", options.epochs);
            on_epoch(epoch, &metrics);
            history.epochs.push(metrics);
        }

        Ok(history)
    }
}
