//! The tools served over `tools/call`.
//!
//! Compression work is CPU-bound and runs on the blocking pool; routing only
//! touches the registry lock and stays on the async executor.

use std::sync::Arc;

use async_trait::async_trait;
use kvforge_compression::{self as compression, CompressionStats, FusionStats, PipelineReport};
use kvforge_core::{Cache, CompressionParameters, KvError, Tool, ToolError, ToolRegistry};
use kvforge_routing::PromptRouter;
use serde_json::{json, Value};
use tracing::debug;

use crate::args;

/// Appended to the routing context when a cache was compressed alongside the prompt.
pub const COMPRESSED_CONTEXT_NOTE: &str = "\n[Compressed KV context available]";

/// Registry holding every gateway tool, sharing `defaults` and `router`.
pub fn default_tools(defaults: CompressionParameters, router: PromptRouter) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CompressKvCacheTool { defaults }));
    registry.register(Arc::new(SpectralCompressTool { defaults }));
    registry.register(Arc::new(WindowFuseTool { defaults }));
    registry.register(Arc::new(RoutePromptTool {
        router: router.clone(),
    }));
    registry.register(Arc::new(ProcessFullPipelineTool {
        defaults,
        router: router.clone(),
    }));
    registry.register(Arc::new(ListModelsTool { router }));
    registry
}

async fn run_blocking<T, F>(f: F) -> Result<T, ToolError>
where
    F: FnOnce() -> Result<T, KvError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ToolError::Other(anyhow::anyhow!("compression task failed: {e}")))?
        .map_err(ToolError::from)
}

async fn compress_full(cache: Cache, params: CompressionParameters) -> Result<Value, ToolError> {
    let params = params.validate()?;
    let report: PipelineReport = run_blocking(move || compression::run(&cache, &params)).await?;
    Ok(json!({
        "original_size": report.original_size(),
        "compressed_size": report.compressed_size(),
        "compression_ratio": report.overall_ratio(),
        "stages": {
            "spectral": report.spectral,
            "fusion": report.fusion,
        },
        "compressed_kv": report.output,
    }))
}

async fn route(
    router: &PromptRouter,
    prompt: &str,
    context: Option<&str>,
    max_tokens: Option<i64>,
) -> Value {
    let decision = router.route(prompt, context).await;
    json!({
        "complexity": decision.complexity,
        "model_used": decision.model_endpoint,
        "max_tokens": max_tokens,
        "routing_decision": {
            "reasoning": decision.reasoning,
            "model_endpoint": decision.model_endpoint,
            "scores": decision.scores,
        },
    })
}

fn cache_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "array", "items": { "type": "number" } },
        "description": description,
    })
}

// ── compress_kv_cache ──────────────────────────────────────────────────────

pub struct CompressKvCacheTool {
    defaults: CompressionParameters,
}

#[async_trait]
impl Tool for CompressKvCacheTool {
    fn name(&self) -> &str {
        "compress_kv_cache"
    }

    fn description(&self) -> &str {
        "Compress a KV cache with spectral truncation followed by window fusion"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "kv_cache": cache_schema("KV cache as nested arrays, one row per token"),
                "sink_tokens": {
                    "type": "integer",
                    "description": "Leading tokens preserved verbatim",
                    "default": self.defaults.sink_tokens,
                },
                "compression_ratio": {
                    "type": "number",
                    "description": "Fraction of the non-sink suffix kept by spectral truncation",
                    "default": self.defaults.compression_ratio,
                },
                "target_ratio": {
                    "type": "number",
                    "description": "Fusion output length as a fraction of its input",
                    "default": self.defaults.target_ratio,
                },
                "target_size": {
                    "type": "integer",
                    "description": "Exact fusion output length; overrides target_ratio",
                },
                "kernel_size": {
                    "type": "integer",
                    "description": "Fusion averaging window width",
                    "default": self.defaults.kernel_size,
                },
            },
            "required": ["kv_cache"],
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let cache = args::required_cache(&args, "kv_cache")?;
        let params = args::compression_parameters(&args, self.defaults)?;
        compress_full(cache, params).await
    }
}

// ── spectral_compress ──────────────────────────────────────────────────────

pub struct SpectralCompressTool {
    defaults: CompressionParameters,
}

#[async_trait]
impl Tool for SpectralCompressTool {
    fn name(&self) -> &str {
        "spectral_compress"
    }

    fn description(&self) -> &str {
        "Stage 1 only: keep sink tokens and low-pass the rest in the DCT domain"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "kv_cache": cache_schema("KV cache as nested arrays"),
                "sink_tokens": { "type": "integer", "default": self.defaults.sink_tokens },
                "compression_ratio": { "type": "number", "default": self.defaults.compression_ratio },
            },
            "required": ["kv_cache"],
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let cache = args::required_cache(&args, "kv_cache")?;
        let params = args::compression_parameters(&args, self.defaults)?.validate()?;
        let original_size = cache.len();

        let compressed = run_blocking(move || {
            compression::compress(&cache, params.sink_tokens, params.compression_ratio)
        })
        .await?;
        debug!(original_size, compressed_size = compressed.len(), "spectral_compress");

        Ok(json!({
            "stats": CompressionStats::new(original_size, compressed.len()),
            "compressed_kv": compressed,
        }))
    }
}

// ── window_fuse ────────────────────────────────────────────────────────────

pub struct WindowFuseTool {
    defaults: CompressionParameters,
}

#[async_trait]
impl Tool for WindowFuseTool {
    fn name(&self) -> &str {
        "window_fuse"
    }

    fn description(&self) -> &str {
        "Stage 2 only: windowed averaging down to a target length"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "kv_cache": cache_schema("KV cache as nested arrays"),
                "target_ratio": { "type": "number", "default": self.defaults.target_ratio },
                "target_size": { "type": "integer" },
                "kernel_size": { "type": "integer", "default": self.defaults.kernel_size },
            },
            "required": ["kv_cache"],
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let cache = args::required_cache(&args, "kv_cache")?;
        let params = args::compression_parameters(&args, self.defaults)?.validate()?;
        let original_size = cache.len();

        let fused = run_blocking(move || {
            compression::fuse(
                &cache,
                params.target_ratio,
                params.kernel_size,
                params.target_size,
            )
        })
        .await?;

        Ok(json!({
            "stats": FusionStats::new(original_size, fused.len(), params.kernel_size),
            "fused_kv": fused,
        }))
    }
}

// ── route_prompt ───────────────────────────────────────────────────────────

pub struct RoutePromptTool {
    router: PromptRouter,
}

#[async_trait]
impl Tool for RoutePromptTool {
    fn name(&self) -> &str {
        "route_prompt"
    }

    fn description(&self) -> &str {
        "Route a prompt to a model endpoint based on its complexity"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "The prompt to route" },
                "context": { "type": "string", "description": "Additional context" },
                "max_tokens": { "type": "integer", "description": "Maximum tokens for the response" },
            },
            "required": ["prompt"],
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let prompt = args::required_str(&args, "prompt")?;
        let context = args::optional_str(&args, "context")?;
        let max_tokens = args::optional_i64(&args, "max_tokens")?;
        Ok(route(&self.router, prompt, context, max_tokens).await)
    }
}

// ── process_full_pipeline ──────────────────────────────────────────────────

pub struct ProcessFullPipelineTool {
    defaults: CompressionParameters,
    router: PromptRouter,
}

#[async_trait]
impl Tool for ProcessFullPipelineTool {
    fn name(&self) -> &str {
        "process_full_pipeline"
    }

    fn description(&self) -> &str {
        "Compress an optional KV cache, then route the prompt"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "The prompt to process" },
                "kv_cache": cache_schema("Optional KV cache to compress"),
                "context": { "type": "string", "description": "Additional context" },
            },
            "required": ["prompt"],
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let prompt = args::required_str(&args, "prompt")?;
        let mut context = args::optional_str(&args, "context")?
            .unwrap_or_default()
            .to_string();
        let cache = args::optional_cache(&args, "kv_cache")?.filter(|c| !c.is_empty());

        let mut result = json!({ "prompt": prompt });
        if let Some(cache) = cache {
            result["compression"] = compress_full(cache, self.defaults).await?;
            context.push_str(COMPRESSED_CONTEXT_NOTE);
        }

        let context = (!context.is_empty()).then_some(context.as_str());
        result["routing"] = route(&self.router, prompt, context, None).await;
        Ok(result)
    }
}

// ── list_models ────────────────────────────────────────────────────────────

pub struct ListModelsTool {
    router: PromptRouter,
}

#[async_trait]
impl Tool for ListModelsTool {
    fn name(&self) -> &str {
        "list_models"
    }

    fn description(&self) -> &str {
        "List registered model endpoints and the complexity mapping"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _args: Value) -> Result<Value, ToolError> {
        let snapshot = self.router.registry().snapshot().await;
        serde_json::to_value(snapshot).map_err(|e| ToolError::Other(e.into()))
    }
}
