//! Orthonormal discrete cosine transforms along one axis.
//!
//! Forward is DCT-II and inverse is DCT-III, both with orthonormal scaling:
//!
//! ```text
//! X_k = f_k * sum_{i=0}^{n-1} x_i * cos(pi * k * (2i + 1) / (2n))
//! f_0 = sqrt(1/n),  f_k = sqrt(2/n) for k > 0
//! ```
//!
//! With this scaling the transform matrix is orthogonal, so the inverse is its
//! transpose and signal energy is preserved.

use std::f64::consts::PI;

/// Precomputed basis for transforms of one fixed length.
///
/// `k * (2i + 1)` is reduced modulo `4n` before lookup, so the cosine table
/// holds `4n` entries instead of `n * n`.
#[derive(Debug, Clone)]
pub struct DctPlan {
    len: usize,
    cos_table: Vec<f64>,
    dc_scale: f64,
    ac_scale: f64,
}

impl DctPlan {
    pub fn new(len: usize) -> Self {
        let period = 4 * len;
        let step = if len == 0 { 0.0 } else { PI / (2 * len) as f64 };
        let cos_table = (0..period).map(|m| (step * m as f64).cos()).collect();
        let (dc_scale, ac_scale) = if len == 0 {
            (0.0, 0.0)
        } else {
            ((1.0 / len as f64).sqrt(), (2.0 / len as f64).sqrt())
        };
        Self {
            len,
            cos_table,
            dc_scale,
            ac_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn basis(&self, k: usize, i: usize) -> f64 {
        self.cos_table[(k * (2 * i + 1)) % (4 * self.len)]
    }

    #[inline]
    fn scale(&self, k: usize) -> f64 {
        if k == 0 {
            self.dc_scale
        } else {
            self.ac_scale
        }
    }

    /// Full forward transform; `signal.len()` must equal the plan length.
    pub fn forward(&self, signal: &[f64]) -> Vec<f64> {
        self.forward_prefix(signal, self.len)
    }

    /// The first `count` forward coefficients (lowest frequencies first).
    pub fn forward_prefix(&self, signal: &[f64], count: usize) -> Vec<f64> {
        debug_assert_eq!(signal.len(), self.len);
        (0..count.min(self.len))
            .map(|k| {
                let sum: f64 = signal
                    .iter()
                    .enumerate()
                    .map(|(i, &x)| x * self.basis(k, i))
                    .sum();
                self.scale(k) * sum
            })
            .collect()
    }

    /// Full inverse transform. Missing trailing coefficients count as zero.
    pub fn inverse(&self, coeffs: &[f64]) -> Vec<f64> {
        self.inverse_prefix(coeffs, self.len)
    }

    /// The first `rows` samples of the inverse transform.
    ///
    /// Coefficients beyond `coeffs.len()` are treated as zero, which is how a
    /// truncated spectrum is reconstructed without materialising the zeros.
    pub fn inverse_prefix(&self, coeffs: &[f64], rows: usize) -> Vec<f64> {
        debug_assert!(coeffs.len() <= self.len);
        (0..rows.min(self.len))
            .map(|i| {
                coeffs
                    .iter()
                    .enumerate()
                    .map(|(k, &c)| self.scale(k) * c * self.basis(k, i))
                    .sum()
            })
            .collect()
    }
}
