use thiserror::Error;

/// Errors raised by the compression stages.
///
/// Both stages are pure array transforms, so the taxonomy is narrow: a cache
/// whose rows disagree on length, a parameter outside its domain, or a
/// low-pass reconstruction that overshoots `f32`. Ratios are never an error;
/// they are clamped by the stages themselves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KvError {
    #[error("dimension mismatch at token {index}: expected {expected} features, found {found}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A reconstructed value left the `f32` range.
    #[error("non-finite output at token {index}, feature {feature}")]
    NonFiniteOutput { index: usize, feature: usize },
}

impl KvError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Error returned by a [`crate::Tool`] invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error(transparent)]
    Compression(#[from] KvError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    /// True when the caller sent something malformed, as opposed to the tool failing.
    pub fn is_invalid_params(&self) -> bool {
        !matches!(self, ToolError::Other(_))
    }
}
