use ndarray::{Array2, ArrayView3, Axis, s};
use rand::Rng;

use super::Param;
use super::init::{glorot_uniform, orthogonal};

// ---------------------------------------------------------------------------
// Long short-term memory layer
// ---------------------------------------------------------------------------

/// Single LSTM layer returning the last hidden state.
///
/// Weights are packed gate-wise in the order input, forget, cell, output:
/// - `kernel`: `(features, 4 * hidden)`
/// - `recurrent`: `(hidden, 4 * hidden)`
/// - `bias`: `(1, 4 * hidden)`, forget slice initialised to 1
#[derive(Debug, Clone)]
pub struct Lstm {
    hidden: usize,
    pub kernel: Param,
    pub recurrent: Param,
    pub bias: Param,
}

/// Activations of one time step, kept for backpropagation.
#[derive(Debug, Clone)]
pub struct StepCache {
    x: Array2<f64>,
    h_prev: Array2<f64>,
    c_prev: Array2<f64>,
    input: Array2<f64>,
    forget: Array2<f64>,
    cell: Array2<f64>,
    output: Array2<f64>,
    tanh_c: Array2<f64>,
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}

impl Lstm {
    pub fn new<R: Rng>(features: usize, hidden: usize, rng: &mut R) -> Self {
        let mut bias = Array2::zeros((1, 4 * hidden));
        bias.slice_mut(s![.., hidden..2 * hidden]).fill(1.0);
        Self {
            hidden,
            kernel: Param::new(glorot_uniform(rng, features, 4 * hidden)),
            recurrent: Param::new(orthogonal(rng, hidden, 4 * hidden)),
            bias: Param::new(bias),
        }
    }

    pub fn features(&self) -> usize {
        self.kernel.value.nrows()
    }

    /// Run the whole sequence `(batch, steps, features)` and return the final
    /// hidden state `(batch, hidden)` with the per-step caches.
    pub fn forward(&self, x: ArrayView3<'_, f64>) -> (Array2<f64>, Vec<StepCache>) {
        let (batch, steps, _) = x.dim();
        let n = self.hidden;
        let mut h = Array2::<f64>::zeros((batch, n));
        let mut c = Array2::<f64>::zeros((batch, n));
        let mut caches = Vec::with_capacity(steps);

        for t in 0..steps {
            let x_t = x.index_axis(Axis(1), t).to_owned();
            let z = x_t.dot(&self.kernel.value) + h.dot(&self.recurrent.value) + &self.bias.value;

            let input = z.slice(s![.., 0..n]).mapv(sigmoid);
            let forget = z.slice(s![.., n..2 * n]).mapv(sigmoid);
            let cell = z.slice(s![.., 2 * n..3 * n]).mapv(f64::tanh);
            let output = z.slice(s![.., 3 * n..4 * n]).mapv(sigmoid);

            let c_next = &forget * &c + &input * &cell;
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &output * &tanh_c;

            caches.push(StepCache {
                x: x_t,
                h_prev: std::mem::replace(&mut h, h_next),
                c_prev: std::mem::replace(&mut c, c_next),
                input,
                forget,
                cell,
                output,
                tanh_c,
            });
        }

        (h, caches)
    }

    /// Backpropagate `d_hidden` (gradient of the loss w.r.t. the final hidden
    /// state) through time, accumulating into the parameter gradients.
    pub fn backward(&mut self, caches: &[StepCache], d_hidden: Array2<f64>) {
        let n = self.hidden;
        let mut dh = d_hidden;
        let mut dc = Array2::<f64>::zeros(dh.raw_dim());

        for step in caches.iter().rev() {
            let d_output = &dh * &step.tanh_c;
            dc = dc + &dh * &step.output * &step.tanh_c.mapv(|v| 1.0 - v * v);

            let d_input = &dc * &step.cell;
            let d_cell = &dc * &step.input;
            let d_forget = &dc * &step.c_prev;

            let mut dz = Array2::<f64>::zeros((dh.nrows(), 4 * n));
            dz.slice_mut(s![.., 0..n])
                .assign(&(d_input * &step.input.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., n..2 * n])
                .assign(&(d_forget * &step.forget.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., 2 * n..3 * n])
                .assign(&(d_cell * &step.cell.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![.., 3 * n..4 * n])
                .assign(&(d_output * &step.output.mapv(|v| v * (1.0 - v))));

            self.kernel.grad += &step.x.t().dot(&dz);
            self.recurrent.grad += &step.h_prev.t().dot(&dz);
            self.bias.grad += &dz.sum_axis(Axis(0)).insert_axis(Axis(0));

            dh = dz.dot(&self.recurrent.value.t());
            dc = dc * &step.forget;
        }
    }

    pub fn params_mut(&mut self) -> [&mut Param; 3] {
        [&mut self.kernel, &mut self.recurrent, &mut self.bias]
    }
}
