use thiserror::Error;

/// Construction-time model failures.
///
/// Every variant is raised before any forward pass runs and none of them is
/// recoverable: a failing configuration is a programming error, not a
/// transient condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The requested module configuration cannot produce a valid network.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Failures in the label/annotation data layer.
///
/// Inputs are assumed pre-validated by upstream loaders, so these surface to
/// the caller without any retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A label id does not fit the configured label space.
    #[error("label id {id} out of range for label space of size {size}")]
    IndexOutOfRange { id: usize, size: usize },

    /// Predicted and ground-truth sequences cannot be paired up.
    #[error("cannot pair {predicted} predictions with {ground_truth} ground-truth records")]
    LengthMismatch { predicted: usize, ground_truth: usize },

    /// A raw attribute name is not of the `category::detail` form.
    #[error("malformed attribute name `{0}`, expected `category::detail`")]
    MalformedAttribute(String),

    /// A raw attribute-id list contains a token that is not an integer.
    #[error("malformed attribute id list `{0}`")]
    MalformedLabelIds(String),
}
