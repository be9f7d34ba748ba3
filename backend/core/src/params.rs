use serde::{Deserialize, Serialize};

use crate::error::KvError;

/// Default number of leading tokens preserved verbatim by the spectral stage.
pub const DEFAULT_SINK_TOKENS: i64 = 10;

/// Default fraction of frequency coefficients kept by the spectral stage.
pub const DEFAULT_COMPRESSION_RATIO: f64 = 0.7;

/// Default averaging window width of the fusion stage.
pub const DEFAULT_KERNEL_SIZE: i64 = 7;

/// Default output length of the fusion stage, as a fraction of its input.
pub const DEFAULT_TARGET_RATIO: f64 = 0.5;

/// Per-call tunables as received at a boundary (request, CLI flags, config).
///
/// Integers are kept signed so that negative values coming from JSON can be
/// reported as [`KvError::InvalidParameter`] instead of failing to parse.
/// `target_size`, when present, takes precedence over `target_ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionParameters {
    pub sink_tokens: i64,
    pub compression_ratio: f64,
    pub kernel_size: i64,
    pub target_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_size: Option<i64>,
}

impl Default for CompressionParameters {
    fn default() -> Self {
        Self {
            sink_tokens: DEFAULT_SINK_TOKENS,
            compression_ratio: DEFAULT_COMPRESSION_RATIO,
            kernel_size: DEFAULT_KERNEL_SIZE,
            target_ratio: DEFAULT_TARGET_RATIO,
            target_size: None,
        }
    }
}

/// Parameters after range checks, typed for the stage functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedParameters {
    pub sink_tokens: usize,
    pub compression_ratio: f64,
    pub kernel_size: usize,
    pub target_ratio: f64,
    pub target_size: Option<usize>,
}

impl CompressionParameters {
    pub fn validate(&self) -> Result<ValidatedParameters, KvError> {
        let sink_tokens = usize::try_from(self.sink_tokens)
            .map_err(|_| KvError::invalid("sink_tokens", format!("must be >= 0, got {}", self.sink_tokens)))?;

        if self.kernel_size <= 0 {
            return Err(KvError::invalid(
                "kernel_size",
                format!("must be > 0, got {}", self.kernel_size),
            ));
        }
        let kernel_size = self.kernel_size as usize;

        let target_size = match self.target_size {
            Some(size) if size < 0 => {
                return Err(KvError::invalid(
                    "target_size",
                    format!("must be >= 0, got {size}"),
                ));
            }
            Some(size) => Some(size as usize),
            None => None,
        };

        Ok(ValidatedParameters {
            sink_tokens,
            compression_ratio: self.compression_ratio,
            kernel_size,
            target_ratio: self.target_ratio,
            target_size,
        })
    }
}
