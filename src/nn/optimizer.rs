use ndarray::{Array2, Zip};

use super::Param;
use crate::config::RmsPropConfig;

/// RMSprop with element-wise gradient clipping.
///
/// `a ← ρ·a + (1-ρ)·g²`, `w ← w - lr·g / (√a + ε)`, where `g` is first
/// clipped to `[-clip_value, clip_value]`.
#[derive(Debug, Clone)]
pub struct RmsProp {
    config: RmsPropConfig,
    accumulators: Vec<Array2<f64>>,
}

impl RmsProp {
    pub fn new(config: RmsPropConfig) -> Self {
        Self {
            config,
            accumulators: Vec::new(),
        }
    }

    /// Apply one update to `params` and reset their gradients. The parameter
    /// list must be passed in the same order on every call.
    pub fn step(&mut self, params: &mut [&mut Param]) {
        if self.accumulators.len() != params.len() {
            self.accumulators = params
                .iter()
                .map(|p| Array2::zeros(p.value.raw_dim()))
                .collect();
        }

        let RmsPropConfig {
            learning_rate,
            rho,
            epsilon,
            clip_value,
        } = self.config;

        for (param, accum) in params.iter_mut().zip(self.accumulators.iter_mut()) {
            let Param { value, grad } = &mut **param;
            Zip::from(value)
                .and(accum)
                .and(&*grad)
                .for_each(|w, a, &g| {
                    let g = g.clamp(-clip_value, clip_value);
                    *a = rho * *a + (1.0 - rho) * g * g;
                    *w -= learning_rate * g / (a.sqrt() + epsilon);
                });
            grad.fill(0.0);
        }
    }
}
