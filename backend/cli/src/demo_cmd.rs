//! CLI Demo Command
//!
//! Runs the compression pipeline over synthetic caches and routes a few
//! sample prompts, printing what each step did.

use anyhow::Result;
use kvforge_compression::{self as compression, PipelineReport};
use kvforge_core::{Cache, CompressionParameters};
use kvforge_routing::PromptRouter;

use crate::terminal_output::{paint, BOLD, DIM};

pub const SAMPLE_PROMPTS: [&str; 3] = [
    "Fix the indentation in this function",
    "Refactor this class to use dependency injection",
    "Design a microservices architecture for this e-commerce platform",
];

const PIPELINE_PROMPT: &str = "Implement a caching layer for this API with Redis";

/// Deterministic smooth-plus-ripple cache, so runs are reproducible.
pub fn synthetic_cache(rows: usize, dim: usize) -> Cache {
    (0..rows)
        .map(|r| {
            (0..dim)
                .map(|d| {
                    let (r, d) = (r as f32, d as f32);
                    (r * 0.05 + d * 0.7).sin() + 0.25 * (r * 1.3 + d).cos()
                })
                .collect()
        })
        .collect()
}

pub fn compress_demo(defaults: CompressionParameters) -> Result<PipelineReport> {
    let cache = synthetic_cache(200, 64);
    Ok(compression::run(&cache, &defaults.validate()?)?)
}

pub fn full_pipeline_demo(defaults: CompressionParameters) -> Result<PipelineReport> {
    let cache = synthetic_cache(150, 32);
    let params = CompressionParameters {
        sink_tokens: 5,
        target_ratio: 0.6,
        ..defaults
    };
    Ok(compression::run(&cache, &params.validate()?)?)
}

pub async fn run(defaults: CompressionParameters, router: &PromptRouter) -> Result<()> {
    println!("{}\n", paint(BOLD, "=== KV Cache Compression ==="));
    let report = compress_demo(defaults)?;
    println!("Original cache:        {} tokens", report.original_size());
    println!("After spectral stage:  {} tokens", report.spectral.compressed_size);
    println!("After fusion stage:    {} tokens", report.compressed_size());
    println!("Overall ratio:         {:.2}\n", report.overall_ratio());

    println!("{}\n", paint(BOLD, "=== Prompt Routing ==="));
    for prompt in SAMPLE_PROMPTS {
        let decision = router.route(prompt, None).await;
        println!("Prompt:     {prompt}");
        println!("Complexity: {}", decision.complexity);
        println!("Endpoint:   {}", decision.model_endpoint);
        println!("{}", paint(DIM, &"-".repeat(50)));
    }

    println!("\n{}\n", paint(BOLD, "=== Full Pipeline ==="));
    let report = full_pipeline_demo(defaults)?;
    let context = format!(
        "[Using compressed KV context with {} tokens]",
        report.compressed_size()
    );
    let decision = router.route(PIPELINE_PROMPT, Some(&context)).await;
    println!("Prompt:     {PIPELINE_PROMPT}");
    println!(
        "Compressed: {} → {} tokens",
        report.original_size(),
        report.compressed_size()
    );
    println!("Complexity: {}", decision.complexity);
    println!("Endpoint:   {}", decision.model_endpoint);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_cache_is_deterministic() {
        assert_eq!(synthetic_cache(20, 4), synthetic_cache(20, 4));
        assert_eq!(synthetic_cache(20, 4).dimension(), Some(4));
    }

    #[test]
    fn demo_sizes() {
        let report = compress_demo(CompressionParameters::default()).unwrap();
        assert_eq!(report.spectral.compressed_size, 143);
        assert_eq!(report.compressed_size(), 71);

        // 5 + floor(145 * 0.7) = 106, then floor(106 * 0.6) = 63.
        let report = full_pipeline_demo(CompressionParameters::default()).unwrap();
        assert_eq!(report.spectral.compressed_size, 106);
        assert_eq!(report.compressed_size(), 63);
    }
}
