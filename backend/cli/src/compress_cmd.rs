//! CLI Compress Command
//!
//! Reads a `[[f32]]` cache from a file or stdin, runs one or both stages and
//! writes the compressed cache as JSON.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use kvforge_compression::{self as compression, CompressionStats, FusionStats};
use kvforge_core::{Cache, CompressionParameters, ValidatedParameters};
use serde_json::{json, Value};
use tracing::info;

use crate::terminal_output::{note_info, note_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Spectral truncation only
    Spectral,
    /// Window fusion only
    Fuse,
    /// Spectral truncation, then window fusion
    Full,
}

#[derive(Debug, Args)]
pub struct CompressArgs {
    /// Cache JSON file, or `-` for stdin
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the compressed cache; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Stage::Full)]
    pub stage: Stage,

    #[arg(long, allow_negative_numbers = true)]
    pub sink_tokens: Option<i64>,

    #[arg(long)]
    pub compression_ratio: Option<f64>,

    #[arg(long)]
    pub target_ratio: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub target_size: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub kernel_size: Option<i64>,
}

impl CompressArgs {
    /// Flags layered over the configured defaults.
    pub fn parameters(&self, defaults: CompressionParameters) -> CompressionParameters {
        CompressionParameters {
            sink_tokens: self.sink_tokens.unwrap_or(defaults.sink_tokens),
            compression_ratio: self.compression_ratio.unwrap_or(defaults.compression_ratio),
            kernel_size: self.kernel_size.unwrap_or(defaults.kernel_size),
            target_ratio: self.target_ratio.unwrap_or(defaults.target_ratio),
            target_size: self.target_size.or(defaults.target_size),
        }
    }
}

/// Compressed cache plus the per-stage statistics that produced it.
#[derive(Debug)]
pub struct StageOutput {
    pub cache: Cache,
    pub stats: Value,
}

pub fn run_stage(cache: &Cache, stage: Stage, params: &ValidatedParameters) -> Result<StageOutput> {
    let output = match stage {
        Stage::Spectral => {
            let out = compression::compress(cache, params.sink_tokens, params.compression_ratio)?;
            let stats = json!({ "spectral": CompressionStats::new(cache.len(), out.len()) });
            StageOutput { cache: out, stats }
        }
        Stage::Fuse => {
            let out = compression::fuse(
                cache,
                params.target_ratio,
                params.kernel_size,
                params.target_size,
            )?;
            let stats = json!({
                "fusion": FusionStats::new(cache.len(), out.len(), params.kernel_size),
            });
            StageOutput { cache: out, stats }
        }
        Stage::Full => {
            let report = compression::run(cache, params)?;
            let stats = json!({
                "spectral": report.spectral,
                "fusion": report.fusion,
                "compression_ratio": report.overall_ratio(),
            });
            StageOutput {
                cache: report.output,
                stats,
            }
        }
    };
    Ok(output)
}

fn read_cache(input: &Path) -> Result<Cache> {
    let raw = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read cache from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read cache file: {}", input.display()))?
    };
    serde_json::from_str(&raw).context("Cache must be a JSON array of numeric arrays")
}

pub async fn run(args: CompressArgs, defaults: CompressionParameters) -> Result<()> {
    let params = args.parameters(defaults).validate()?;
    let cache = read_cache(&args.input)?;
    let original = cache.len();
    let stage = args.stage;

    let output = tokio::task::spawn_blocking(move || run_stage(&cache, stage, &params))
        .await
        .context("Compression task panicked")??;
    info!(?stage, original, compressed = output.cache.len(), "Compressed cache");

    if output.cache.len() == original {
        note_warn("Cache is already at or below the target length; returned unchanged");
    }

    let json = serde_json::to_string(&output.cache)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            note_info(&format!("Wrote {} tokens to {}", output.cache.len(), path.display()));
        }
        None => println!("{json}"),
    }
    note_info(&format!(
        "{original} → {} tokens\n{}",
        output.cache.len(),
        serde_json::to_string_pretty(&output.stats)?
    ));
    Ok(())
}
