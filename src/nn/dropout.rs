use ndarray::Array2;
use rand::Rng;

/// Inverted dropout: kept units are scaled by `1 / (1 - rate)` while
/// training so inference needs no rescaling.
#[derive(Debug, Clone, Copy)]
pub struct Dropout {
    rate: f64,
}

impl Dropout {
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 0.99),
        }
    }

    /// Draw a mask of zeros and `1 / (1 - rate)` values.
    pub fn mask<R: Rng>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f64> {
        let keep = 1.0 - self.rate;
        let scale = 1.0 / keep;
        Array2::from_shape_fn(shape, |_| {
            if rng.gen::<f64>() < keep { scale } else { 0.0 }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn mask_drops_about_rate_and_rescales() {
        let mut rng = StdRng::seed_from_u64(9);
        let dropout = Dropout::new(0.4);
        let mask = dropout.mask((200, 50), &mut rng);

        let dropped = mask.iter().filter(|&&v| v == 0.0).count() as f64 / mask.len() as f64;
        assert!((dropped - 0.4).abs() < 0.03, "dropped {dropped}");
        assert!(mask.iter().all(|&v| v == 0.0 || (v - 1.0 / 0.6).abs() < 1e-12));
        // Expected activation is preserved.
        assert!((mask.mean().unwrap() - 1.0).abs() < 0.05);
    }

    #[test]
    fn zero_rate_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let mask = Dropout::new(0.0).mask((4, 4), &mut rng);
        assert!(mask.iter().all(|&v| v == 1.0));
    }
}
