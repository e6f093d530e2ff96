use ndarray::Array2;
use rand::Rng;

/// Glorot/Xavier uniform: `U(-l, l)` with `l = sqrt(6 / (fan_in + fan_out))`.
pub fn glorot_uniform<R: Rng>(rng: &mut R, fan_in: usize, fan_out: usize) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-limit..limit))
}

/// Matrix of shape `(rows, cols)` with orthonormal rows (`rows <= cols`)
/// or orthonormal columns (`rows > cols`).
pub fn orthogonal<R: Rng>(rng: &mut R, rows: usize, cols: usize) -> Array2<f64> {
    let (short, long) = if rows <= cols { (rows, cols) } else { (cols, rows) };
    let mut basis = Array2::from_shape_fn((short, long), |_| standard_normal(rng));

    // Modified Gram-Schmidt over the short axis.
    for i in 0..short {
        for j in 0..i {
            let proj = basis.row(i).dot(&basis.row(j));
            let prev = basis.row(j).to_owned();
            basis.row_mut(i).scaled_add(-proj, &prev);
        }
        let norm = basis.row(i).dot(&basis.row(i)).sqrt();
        if norm > f64::EPSILON {
            basis.row_mut(i).mapv_inplace(|v| v / norm);
        }
    }

    if rows <= cols {
        basis
    } else {
        basis.reversed_axes()
    }
}

/// Box-Muller draw from `N(0, 1)`.
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
