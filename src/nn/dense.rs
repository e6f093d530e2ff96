use ndarray::{Array2, Axis};
use rand::Rng;

use super::Param;
use super::init::glorot_uniform;

/// Fully connected layer `y = x · W + b`.
#[derive(Debug, Clone)]
pub struct Dense {
    pub kernel: Param,
    pub bias: Param,
}

impl Dense {
    pub fn new<R: Rng>(inputs: usize, units: usize, rng: &mut R) -> Self {
        Self {
            kernel: Param::new(glorot_uniform(rng, inputs, units)),
            bias: Param::new(Array2::zeros((1, units))),
        }
    }

    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.kernel.value) + &self.bias.value
    }

    /// Accumulate parameter gradients for `d_out` and return the gradient
    /// w.r.t. the layer input.
    pub fn backward(&mut self, x: &Array2<f64>, d_out: &Array2<f64>) -> Array2<f64> {
        self.kernel.grad += &x.t().dot(d_out);
        self.bias.grad += &d_out.sum_axis(Axis(0)).insert_axis(Axis(0));
        d_out.dot(&self.kernel.value.t())
    }

    pub fn params_mut(&mut self) -> [&mut Param; 2] {
        [&mut self.kernel, &mut self.bias]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn forward_and_backward_by_hand() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dense = Dense::new(2, 1, &mut rng);
        dense.kernel.value = array![[2.0], [-1.0]];
        dense.bias.value = array![[0.5]];

        let x = array![[1.0, 3.0], [0.0, 1.0]];
        assert_eq!(dense.forward(&x), array![[-0.5], [-0.5]]);

        let dx = dense.backward(&x, &array![[1.0], [2.0]]);
        assert_eq!(dense.kernel.grad, array![[1.0], [5.0]]);
        assert_eq!(dense.bias.grad, array![[3.0]]);
        assert_eq!(dx, array![[2.0, -1.0], [4.0, -2.0]]);
    }
}
