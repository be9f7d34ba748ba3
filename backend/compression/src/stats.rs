//! Size bookkeeping reported alongside compressed caches.

use serde::Serialize;

/// Outcome of a spectral pass, in token counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressionStats {
    pub original_size: usize,
    pub compressed_size: usize,
    /// `compressed / original`, 0 for an empty input.
    pub compression_ratio: f64,
    pub space_savings: f64,
    /// `original / compressed`; `None` when nothing was kept.
    pub reduction_factor: Option<f64>,
}

impl CompressionStats {
    pub fn new(original_size: usize, compressed_size: usize) -> Self {
        let compression_ratio = if original_size > 0 {
            compressed_size as f64 / original_size as f64
        } else {
            0.0
        };
        let reduction_factor =
            (compressed_size > 0).then(|| original_size as f64 / compressed_size as f64);
        Self {
            original_size,
            compressed_size,
            compression_ratio,
            space_savings: 1.0 - compression_ratio,
            reduction_factor,
        }
    }
}

/// Outcome of a fusion pass, in token counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionStats {
    pub original_size: usize,
    pub fused_size: usize,
    pub fusion_ratio: f64,
    pub kernel_size: usize,
    /// Average number of input tokens represented by one output token.
    pub tokens_per_fused: f64,
}

impl FusionStats {
    pub fn new(original_size: usize, fused_size: usize, kernel_size: usize) -> Self {
        let fusion_ratio = if original_size > 0 {
            fused_size as f64 / original_size as f64
        } else {
            0.0
        };
        let tokens_per_fused = if fused_size > 0 {
            original_size as f64 / fused_size as f64
        } else {
            0.0
        };
        Self {
            original_size,
            fused_size,
            fusion_ratio,
            kernel_size,
            tokens_per_fused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_stats_halving() {
        let stats = CompressionStats::new(100, 50);
        assert_eq!(stats.compression_ratio, 0.5);
        assert_eq!(stats.space_savings, 0.5);
        assert_eq!(stats.reduction_factor, Some(2.0));
    }

    #[test]
    fn compression_stats_degenerate_sizes() {
        let empty = CompressionStats::new(0, 0);
        assert_eq!(empty.compression_ratio, 0.0);
        assert_eq!(empty.reduction_factor, None);

        let json = serde_json::to_value(empty).unwrap();
        assert!(json["reduction_factor"].is_null());
    }

    #[test]
    fn fusion_stats_halving() {
        let stats = FusionStats::new(200, 100, 7);
        assert_eq!(stats.fusion_ratio, 0.5);
        assert_eq!(stats.kernel_size, 7);
        assert_eq!(stats.tokens_per_fused, 2.0);
        assert_eq!(FusionStats::new(10, 0, 3).tokens_per_fused, 0.0);
    }
}
