//! Stage 1 followed by Stage 2.

use kvforge_core::{Cache, KvError, ValidatedParameters};
use serde::Serialize;
use tracing::info;

use crate::spectral;
use crate::stats::{CompressionStats, FusionStats};
use crate::window;

/// Output of a full-pipeline run with per-stage bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub output: Cache,
    pub spectral: CompressionStats,
    pub fusion: FusionStats,
}

impl PipelineReport {
    pub fn original_size(&self) -> usize {
        self.spectral.original_size
    }

    pub fn compressed_size(&self) -> usize {
        self.output.len()
    }

    /// End-to-end `output / input` length, 0 for an empty input.
    pub fn overall_ratio(&self) -> f64 {
        CompressionStats::new(self.original_size(), self.compressed_size()).compression_ratio
    }
}

/// `fuse(compress(cache, ..), ..)` with the stage tunables taken from `params`.
pub fn run(cache: &Cache, params: &ValidatedParameters) -> Result<PipelineReport, KvError> {
    let truncated = spectral::compress(cache, params.sink_tokens, params.compression_ratio)?;
    let fused = window::fuse(
        &truncated,
        params.target_ratio,
        params.kernel_size,
        params.target_size,
    )?;

    let report = PipelineReport {
        spectral: CompressionStats::new(cache.len(), truncated.len()),
        fusion: FusionStats::new(truncated.len(), fused.len(), params.kernel_size),
        output: fused,
    };
    info!(
        original = report.original_size(),
        after_spectral = report.fusion.original_size,
        after_fusion = report.compressed_size(),
        "compression pipeline complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvforge_core::CompressionParameters;

    fn wave(rows: usize, dim: usize) -> Cache {
        (0..rows)
            .map(|r| (0..dim).map(|d| ((r as f32 * 0.1) + d as f32).sin() + 2.0).collect())
            .collect()
    }

    #[test]
    fn stages_compose_in_order() {
        let cache = wave(200, 8);
        let params = CompressionParameters {
            sink_tokens: 10,
            compression_ratio: 0.7,
            kernel_size: 7,
            target_ratio: 0.5,
            target_size: None,
        }
        .validate()
        .unwrap();

        let report = run(&cache, &params).unwrap();
        // 10 + floor(190 * 0.7) = 143, then max(1, floor(143 * 0.5)) = 71.
        assert_eq!(report.spectral.compressed_size, 143);
        assert_eq!(report.fusion.original_size, 143);
        assert_eq!(report.compressed_size(), 71);
        assert!(report.output.iter().all(|t| t.len() == 8));
        assert!((report.overall_ratio() - 71.0 / 200.0).abs() < 1e-12);
    }

    #[test]
    fn matches_manual_chaining() {
        let cache = wave(64, 3);
        let params = CompressionParameters::default().validate().unwrap();
        let report = run(&cache, &params).unwrap();

        let manual = window::fuse(
            &spectral::compress(&cache, 10, 0.7).unwrap(),
            0.5,
            7,
            None,
        )
        .unwrap();
        assert_eq!(report.output, manual);
    }

    #[test]
    fn explicit_target_size_applies_to_fusion() {
        let cache = wave(100, 2);
        let params = CompressionParameters {
            target_size: Some(12),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let report = run(&cache, &params).unwrap();
        assert_eq!(report.compressed_size(), 12);
    }

    #[test]
    fn empty_cache_passes_through() {
        let params = CompressionParameters::default().validate().unwrap();
        let report = run(&Cache::default(), &params).unwrap();
        assert!(report.output.is_empty());
        assert_eq!(report.overall_ratio(), 0.0);
    }
}
