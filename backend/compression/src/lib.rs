//! `kvforge-compression`: two-stage token-cache compression.
//!
//! - [`spectral::compress`]: keep a sink prefix verbatim, low-pass the rest in
//!   the DCT domain and keep the leading rows of the reconstruction.
//! - [`window::fuse`]: windowed averaging down to an exact target length.
//! - [`pipeline::run`]: both stages in series, with size statistics.
//!
//! Every function here is pure: inputs are borrowed, outputs are new caches,
//! and nothing is carried between calls.

pub mod dct;
pub mod pipeline;
pub mod spectral;
pub mod stats;
pub mod window;

pub use pipeline::{run, PipelineReport};
pub use spectral::compress;
pub use stats::{CompressionStats, FusionStats};
pub use window::fuse;
