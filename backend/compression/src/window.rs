//! Stage 2: windowed averaging down to an exact target length.
//!
//! A uniform kernel slides over the sequence with a stride derived from the
//! target length. Each full window contributes its average. If the windows run
//! out before the target is reached, raw tokens are copied from the input at
//! `emitted * stride` until it is. The result is truncated to the target.

use kvforge_core::{Cache, KvError, Token};
use tracing::debug;

/// Where the fusion loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseState {
    /// Averaging windows; `start` is the next window's first index.
    Sliding { start: usize },
    /// Out of windows; copying raw tokens to reach the target.
    Padding,
    Done,
}

/// What the loop should emit on the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseAction {
    /// Append the kernel-weighted average of `tokens[start..end]`.
    Average { start: usize, end: usize },
    /// Append `tokens[index]` unchanged.
    Copy { index: usize },
    Finish,
}

/// Stride and window geometry for one fusion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    len: usize,
    target: usize,
    kernel_size: usize,
    stride: usize,
}

impl WindowPlan {
    /// `target` must be non-zero.
    pub fn new(len: usize, target: usize, kernel_size: usize) -> Self {
        let stride = (len / target.max(1)).max(1);
        Self {
            len,
            target,
            kernel_size,
            stride,
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Advance the state machine given how many tokens have been emitted so far.
    pub fn transition(&self, state: FuseState, emitted: usize) -> (FuseAction, FuseState) {
        match state {
            FuseState::Sliding { start } => {
                let fits = start
                    .checked_add(self.kernel_size)
                    .is_some_and(|end| end <= self.len);
                if emitted >= self.target || !fits {
                    return self.transition(FuseState::Padding, emitted);
                }
                let end = start + self.kernel_size;
                (
                    FuseAction::Average { start, end },
                    FuseState::Sliding {
                        start: start.saturating_add(self.stride),
                    },
                )
            }
            FuseState::Padding => {
                if emitted >= self.target || emitted >= self.len {
                    return (FuseAction::Finish, FuseState::Done);
                }
                match emitted.checked_mul(self.stride) {
                    Some(index) if index < self.len => (FuseAction::Copy { index }, FuseState::Padding),
                    _ => (FuseAction::Finish, FuseState::Done),
                }
            }
            FuseState::Done => (FuseAction::Finish, FuseState::Done),
        }
    }
}

/// Output length for `len` input tokens.
///
/// An explicit `target_size` is clamped to `len`; otherwise
/// `max(1, floor(len * target_ratio))`.
pub fn resolve_target(len: usize, target_ratio: f64, target_size: Option<usize>) -> usize {
    match target_size {
        Some(size) => size.min(len),
        None => {
            let scaled = (len as f64 * target_ratio).floor();
            if scaled.is_nan() || scaled < 1.0 {
                1
            } else {
                scaled as usize
            }
        }
    }
}

/// Uniform averaging kernel of `kernel_size` weights summing to one.
pub fn uniform_kernel(kernel_size: usize) -> Vec<f64> {
    vec![1.0 / kernel_size as f64; kernel_size]
}

/// Weighted average of `window`, using as many kernel weights as there are rows.
fn weighted_average(window: &[Token], kernel: &[f64], dim: usize) -> Token {
    let weights = &kernel[..window.len().min(kernel.len())];
    let total: f64 = weights.iter().sum();
    let mut acc = vec![0.0f64; dim];
    for (token, &w) in window.iter().zip(weights) {
        for (a, &x) in acc.iter_mut().zip(token) {
            *a += w * f64::from(x);
        }
    }
    acc.into_iter().map(|a| (a / total) as f32).collect()
}

/// Fuse `cache` down to its target length by windowed averaging.
///
/// Never upsamples: when the cache is empty or already no longer than the
/// resolved target, it is returned unchanged.
pub fn fuse(
    cache: &Cache,
    target_ratio: f64,
    kernel_size: usize,
    target_size: Option<usize>,
) -> Result<Cache, KvError> {
    if kernel_size == 0 {
        return Err(KvError::invalid("kernel_size", "must be > 0"));
    }
    let dim = cache.validate_dimensions()?;
    if cache.is_empty() {
        return Ok(cache.clone());
    }

    let len = cache.len();
    let target = resolve_target(len, target_ratio, target_size);
    if len <= target {
        debug!(tokens = len, target, "cache already within target; unchanged");
        return Ok(cache.clone());
    }
    if target == 0 {
        return Ok(Cache::default());
    }

    let dim = dim.unwrap_or(0);
    let plan = WindowPlan::new(len, target, kernel_size);
    let kernel = uniform_kernel(kernel_size);
    let tokens = cache.tokens();

    let mut out: Vec<Token> = Vec::with_capacity(target);
    let mut averaged = 0usize;
    let mut state = FuseState::Sliding { start: 0 };
    loop {
        let (action, next) = plan.transition(state, out.len());
        match action {
            FuseAction::Average { start, end } => {
                out.push(weighted_average(&tokens[start..end], &kernel, dim));
                averaged += 1;
            }
            FuseAction::Copy { index } => out.push(tokens[index].clone()),
            FuseAction::Finish => break,
        }
        state = next;
    }
    out.truncate(target);

    debug!(
        input = len,
        output = out.len(),
        kernel_size,
        stride = plan.stride(),
        averaged,
        padded = out.len().saturating_sub(averaged),
        "window fusion complete"
    );
    Ok(Cache::new(out))
}
