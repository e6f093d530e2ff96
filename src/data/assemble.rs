use ndarray::{Array1, Array3, Axis, concatenate, s};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::model::{Dataset, FeatureMatrix, Split, VoiceClass};
use crate::error::DatasetError;

/// Stack `top` above `bottom`. Both must have the same width.
pub fn concat_rows(top: &FeatureMatrix, bottom: &FeatureMatrix) -> Result<FeatureMatrix, DatasetError> {
    if top.ncols() != bottom.ncols() {
        return Err(DatasetError::WidthMismatch {
            left: top.ncols(),
            right: bottom.ncols(),
        });
    }
    concatenate(Axis(0), &[top.view(), bottom.view()]).map_err(|_| DatasetError::WidthMismatch {
        left: top.ncols(),
        right: bottom.ncols(),
    })
}

/// `normal_rows` copies of +1 followed by `abnormal_rows` copies of -1.
pub fn labels(normal_rows: usize, abnormal_rows: usize) -> Array1<f64> {
    let normal = VoiceClass::Normal.label();
    let abnormal = VoiceClass::Abnormal.label();
    Array1::from_iter(
        std::iter::repeat(normal)
            .take(normal_rows)
            .chain(std::iter::repeat(abnormal).take(abnormal_rows)),
    )
}

/// Keep the first `width` columns.
pub fn truncate_columns(x: &FeatureMatrix, width: usize) -> Result<FeatureMatrix, DatasetError> {
    if width == 0 {
        return Err(DatasetError::Empty("column selection"));
    }
    if x.ncols() < width {
        return Err(DatasetError::TooFewColumns {
            requested: width,
            available: x.ncols(),
        });
    }
    Ok(x.slice(s![.., ..width]).to_owned())
}

/// Concatenate the two classes, label them and cut to `width` columns.
pub fn build_dataset(
    normal: &FeatureMatrix,
    abnormal: &FeatureMatrix,
    width: usize,
) -> Result<Dataset, DatasetError> {
    if normal.nrows() + abnormal.nrows() == 0 {
        return Err(DatasetError::Empty("feature matrix"));
    }
    let x = concat_rows(normal, abnormal)?;
    let x = truncate_columns(&x, width)?;
    let y = labels(normal.nrows(), abnormal.nrows());
    log::debug!("assembled dataset x={:?} y={:?}", x.dim(), y.dim());
    Ok(Dataset { x, y })
}

/// Add a trailing singleton axis: `(n, w)` → `(n, w, 1)`.
pub fn expand_trailing(x: &FeatureMatrix) -> Array3<f64> {
    x.clone().insert_axis(Axis(2))
}

/// Number of test rows for `n` samples: `ceil(test_fraction * n)`.
pub fn test_rows(n: usize, test_fraction: f64) -> usize {
    (test_fraction * n as f64).ceil() as usize
}

/// Partition the dataset into train and test rows.
///
/// With `shuffle` the rows are permuted by a generator seeded with `seed`
/// before partitioning, so the same seed always gives the same split.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
    shuffle: bool,
) -> Result<Split, DatasetError> {
    let n = dataset.x.nrows();
    if dataset.y.len() != n {
        return Err(DatasetError::RowMismatch {
            features: n,
            labels: dataset.y.len(),
        });
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidFraction(test_fraction));
    }

    let n_test = test_rows(n, test_fraction);
    let n_train = n.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(DatasetError::Empty("train or test partition"));
    }

    let mut order: Vec<usize> = (0..n).collect();
    if shuffle {
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
    }
    let (train_idx, test_idx) = order.split_at(n_train);

    let x_train = dataset.x.select(Axis(0), train_idx);
    let x_test = dataset.x.select(Axis(0), test_idx);
    let y_train = dataset.y.select(Axis(0), train_idx);
    let y_test = dataset.y.select(Axis(0), test_idx);

    Ok(Split {
        x_train: expand_trailing(&x_train),
        x_test: expand_trailing(&x_test),
        y_train,
        y_test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use proptest::prelude::*;

    fn filled(rows: usize, cols: usize, value: f64) -> FeatureMatrix {
        Array2::from_shape_fn((rows, cols), |(i, j)| value + i as f64 * 0.01 + j as f64)
    }

    #[test]
    fn hundred_and_hundred_rows_split_160_40() {
        let normal = filled(100, 24, 1.0);
        let abnormal = filled(100, 24, -1.0);

        let ds = build_dataset(&normal, &abnormal, 24).unwrap();
        assert_eq!(ds.x.dim(), (200, 24));
        assert_eq!(ds.y.len(), 200);

        let split = train_test_split(&ds, 0.2, 42, true).unwrap();
        assert_eq!(split.x_train.dim(), (160, 24, 1));
        assert_eq!(split.x_test.dim(), (40, 24, 1));
        assert_eq!(split.y_train.len(), 160);
        assert_eq!(split.y_test.len(), 40);
    }

    #[test]
    fn labels_are_positive_then_negative() {
        let y = labels(2, 3);
        assert_eq!(y.to_vec(), vec![1.0, 1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn truncation_keeps_leading_columns() {
        let x = filled(3, 30, 0.0);
        let t = truncate_columns(&x, 13).unwrap();
        assert_eq!(t.dim(), (3, 13));
        assert_eq!(t[[2, 12]], x[[2, 12]]);
    }

    #[test]
    fn truncation_past_width_is_an_error() {
        let x = filled(4, 13, 0.0);
        assert_eq!(
            truncate_columns(&x, 24),
            Err(DatasetError::TooFewColumns {
                requested: 24,
                available: 13
            })
        );
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let err = concat_rows(&filled(2, 3, 0.0), &filled(2, 4, 0.0)).unwrap_err();
        assert_eq!(err, DatasetError::WidthMismatch { left: 3, right: 4 });
    }

    #[test]
    fn split_rows_keep_their_labels() {
        // Normal rows are all positive, abnormal rows all negative.
        let ds = build_dataset(&filled(30, 5, 10.0), &filled(20, 5, -100.0), 5).unwrap();
        let split = train_test_split(&ds, 0.2, 42, true).unwrap();
        for (x, y) in [(&split.x_train, &split.y_train), (&split.x_test, &split.y_test)] {
            for (row, &label) in x.outer_iter().zip(y.iter()) {
                assert_eq!(row[[0, 0]] > 0.0, label > 0.0);
            }
        }
    }

    #[test]
    fn unshuffled_split_keeps_order() {
        let ds = build_dataset(&filled(8, 2, 0.0), &filled(2, 2, 50.0), 2).unwrap();
        let split = train_test_split(&ds, 0.2, 0, false).unwrap();
        assert_eq!(split.y_test.to_vec(), vec![-1.0, -1.0]);
        assert_eq!(split.x_train[[0, 0, 0]], ds.x[[0, 0]]);
    }

    #[test]
    fn bad_fractions_are_rejected() {
        let ds = build_dataset(&filled(5, 2, 0.0), &filled(5, 2, 0.0), 2).unwrap();
        for f in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                train_test_split(&ds, f, 1, true),
                Err(DatasetError::InvalidFraction(_))
            ));
        }
    }

    proptest! {
        #[test]
        fn split_preserves_rows(normal in 1usize..80, abnormal in 1usize..80, seed in any::<u64>()) {
            let ds = build_dataset(&filled(normal, 4, 1.0), &filled(abnormal, 4, -1.0), 4).unwrap();
            prop_assert_eq!(ds.x.nrows(), ds.y.len());

            let split = train_test_split(&ds, 0.2, seed, true).unwrap();
            let n = normal + abnormal;
            prop_assert_eq!(split.x_train.dim().0 + split.x_test.dim().0, n);
            prop_assert_eq!(split.x_train.dim().0, split.y_train.len());
            prop_assert_eq!(split.x_test.dim().0, split.y_test.len());
            prop_assert_eq!(split.x_test.dim().0, (0.2 * n as f64).ceil() as usize);

            let label_sum = split.y_train.sum() + split.y_test.sum();
            prop_assert_eq!(label_sum, normal as f64 - abnormal as f64);
        }

        #[test]
        fn split_is_deterministic_for_a_seed(seed in any::<u64>()) {
            let ds = build_dataset(&filled(40, 3, 0.0), &filled(35, 3, 7.0), 3).unwrap();
            let a = train_test_split(&ds, 0.2, seed, true).unwrap();
            let b = train_test_split(&ds, 0.2, seed, true).unwrap();
            prop_assert_eq!(a.x_train, b.x_train);
            prop_assert_eq!(a.x_test, b.x_test);
            prop_assert_eq!(a.y_test, b.y_test);
        }
    }
}
