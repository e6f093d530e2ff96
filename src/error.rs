use thiserror::Error;

/// Shape and contract violations between pipeline stages.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("cannot concatenate matrices of width {left} and {right}")]
    WidthMismatch { left: usize, right: usize },

    #[error("requested {requested} columns but the features only have {available}")]
    TooFewColumns { requested: usize, available: usize },

    #[error("{features} feature rows but {labels} labels")]
    RowMismatch { features: usize, labels: usize },

    #[error("fraction {0} is outside (0, 1)")]
    InvalidFraction(f64),

    #[error("{0} is empty")]
    Empty(&'static str),

    #[error("expected input of shape (_, {expected_steps}, {expected_features}), got (_, {steps}, {features})")]
    InputShape {
        expected_steps: usize,
        expected_features: usize,
        steps: usize,
        features: usize,
    },
}
