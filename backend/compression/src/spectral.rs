//! Stage 1: frequency-domain truncation.
//!
//! The sink prefix is copied through untouched. Every feature column of the
//! remaining suffix is moved into the DCT domain, its high-frequency
//! coefficients are dropped, and it is transformed back. Only the first
//! `n_keep` rows of the reconstruction are emitted, so the stage both
//! low-passes and shortens the suffix.

use kvforge_core::{Cache, KvError, Token};
use rayon::prelude::*;
use tracing::debug;

use crate::dct::DctPlan;

/// Number of coefficients (and output rows) kept out of `n` for `ratio`.
///
/// `floor(n * ratio)` clamped to `[0, n]`; a NaN ratio keeps nothing.
pub fn keep_count(n: usize, ratio: f64) -> usize {
    let kept = (n as f64 * ratio).floor();
    if kept.is_nan() || kept <= 0.0 {
        0
    } else if kept >= n as f64 {
        n
    } else {
        kept as usize
    }
}

/// Compress `cache` by spectral truncation of everything after the sink prefix.
///
/// Returns the input unchanged when it holds no more than `sink_tokens` rows.
/// Otherwise the output has `sink_tokens + keep_count(n, compression_ratio)`
/// rows, where `n` is the suffix length. Fails with
/// [`KvError::NonFiniteOutput`] when the reconstruction overshoots `f32`.
pub fn compress(cache: &Cache, sink_tokens: usize, compression_ratio: f64) -> Result<Cache, KvError> {
    let dim = cache.validate_dimensions()?;

    if cache.len() <= sink_tokens {
        debug!(tokens = cache.len(), sink_tokens, "cache within sink prefix; unchanged");
        return Ok(cache.clone());
    }

    let (sink, suffix) = cache.tokens().split_at(sink_tokens);
    let n = suffix.len();
    let n_keep = keep_count(n, compression_ratio);
    let dim = dim.unwrap_or(0);

    let plan = DctPlan::new(n);
    let columns: Vec<Vec<f64>> = (0..dim)
        .into_par_iter()
        .map(|d| {
            let signal: Vec<f64> = suffix.iter().map(|t| f64::from(t[d])).collect();
            let coeffs = plan.forward_prefix(&signal, n_keep);
            plan.inverse_prefix(&coeffs, n_keep)
        })
        .collect();

    let mut out: Vec<Token> = Vec::with_capacity(sink_tokens + n_keep);
    out.extend(sink.iter().cloned());
    for row in 0..n_keep {
        let token = columns
            .iter()
            .enumerate()
            .map(|(feature, col)| {
                let value = col[row] as f32;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(KvError::NonFiniteOutput {
                        index: sink_tokens + row,
                        feature,
                    })
                }
            })
            .collect::<Result<Token, KvError>>()?;
        out.push(token);
    }

    debug!(
        input = cache.len(),
        output = out.len(),
        sink_tokens,
        kept_coefficients = n_keep,
        "spectral truncation complete"
    );
    Ok(Cache::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rows: usize, dim: usize) -> Cache {
        (0..rows)
            .map(|r| (0..dim).map(|d| ((r * 7 + d * 3) % 11) as f32 - 5.0 + r as f32 * 0.25).collect())
            .collect()
    }

    #[test]
    fn short_cache_is_returned_unchanged() {
        let cache = Cache::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let out = compress(&cache, 10, 0.7).unwrap();
        assert_eq!(out, cache);

        let exact = compress(&cache, 2, 0.5).unwrap();
        assert_eq!(exact, cache);
    }

    #[test]
    fn four_row_example() {
        let cache = Cache::new(vec![
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
            vec![7.0, 8.0],
        ]);
        let out = compress(&cache, 2, 0.5).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], vec![1.0, 2.0]);
        assert_eq!(out[1], vec![3.0, 4.0]);
        // DC only over [5, 7] and [6, 8] reconstructs the column means.
        assert!((out[2][0] - 6.0).abs() < 1e-5);
        assert!((out[2][1] - 7.0).abs() < 1e-5);
    }

    #[test]
    fn sink_rows_are_bit_identical() {
        let mut cache = sample(40, 5);
        let odd = vec![f32::MIN_POSITIVE, -0.0, 1.0e-30, 3.333_333_3, f32::MAX];
        cache = {
            let mut rows = cache.into_inner();
            rows[1] = odd.clone();
            Cache::new(rows)
        };
        let out = compress(&cache, 4, 0.3).unwrap();
        for i in 0..4 {
            let a: Vec<u32> = cache[i].iter().map(|x| x.to_bits()).collect();
            let b: Vec<u32> = out[i].iter().map(|x| x.to_bits()).collect();
            assert_eq!(a, b, "sink row {i} changed");
        }
    }

    #[test]
    fn output_length_follows_keep_count() {
        let cache = sample(100, 8);
        for ratio in [0.3, 0.5, 0.8] {
            let out = compress(&cache, 5, ratio).unwrap();
            assert_eq!(out.len(), 5 + (95.0 * ratio).floor() as usize);
            assert!(out.iter().all(|t| t.len() == 8));
        }
    }

    #[test]
    fn full_ratio_reconstructs_suffix() {
        let cache = sample(20, 3);
        let out = compress(&cache, 2, 1.0).unwrap();
        assert_eq!(out.len(), cache.len());
        for (a, b) in out.iter().zip(cache.iter()) {
            for (x, y) in a.iter().zip(b) {
                assert!((x - y).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn degenerate_ratios_are_clamped() {
        let cache = sample(12, 2);
        assert_eq!(compress(&cache, 2, 0.0).unwrap().len(), 2);
        assert_eq!(compress(&cache, 2, -1.0).unwrap().len(), 2);
        assert_eq!(compress(&cache, 2, f64::NAN).unwrap().len(), 2);
        assert_eq!(compress(&cache, 2, 3.0).unwrap().len(), 12);
    }

    #[test]
    fn smooth_signal_is_well_approximated() {
        // A slowly varying column concentrates its energy in the first coefficients.
        let cache: Cache = (0..64)
            .map(|i| vec![(i as f32 / 64.0 * std::f32::consts::PI).cos()])
            .collect();
        let out = compress(&cache, 0, 0.5).unwrap();
        assert_eq!(out.len(), 32);
        for (i, token) in out.iter().enumerate() {
            assert!((token[0] - cache[i][0]).abs() < 0.05, "row {i}");
        }
    }

    #[test]
    fn ragged_input_is_rejected() {
        let cache = Cache::new(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            compress(&cache, 0, 0.5),
            Err(KvError::DimensionMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn overshoot_past_f32_range_is_an_error() {
        // Two coefficients over [M, M, -M] reconstruct 4M/3 in the first row.
        let m = f32::MAX;
        let cache = Cache::new(vec![vec![m], vec![m], vec![-m]]);
        assert_eq!(
            compress(&cache, 0, 0.67),
            Err(KvError::NonFiniteOutput { index: 0, feature: 0 })
        );

        let halved = Cache::new(vec![vec![m / 2.0], vec![m / 2.0], vec![-m / 2.0]]);
        let out = compress(&halved, 0, 0.67).unwrap();
        assert!(out.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn input_is_not_mutated() {
        let cache = sample(30, 4);
        let before = cache.clone();
        let _ = compress(&cache, 3, 0.4).unwrap();
        assert_eq!(cache, before);
    }

    #[test]
    fn keep_count_edges() {
        assert_eq!(keep_count(10, 0.55), 5);
        assert_eq!(keep_count(0, 0.5), 0);
        assert_eq!(keep_count(7, f64::INFINITY), 7);
        assert_eq!(keep_count(7, f64::NEG_INFINITY), 0);
    }
}
