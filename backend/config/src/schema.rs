//! kvforge runtime configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults::apply_all_defaults`]
//! fills the gaps after loading.

use kvforge_core::CompressionParameters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, stored as `config.yaml` in the config directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KvForgeConfig {
    /// Gateway listen address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Stage 1 (spectral truncation) defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionConfig>,

    /// Stage 2 (window fusion) defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fusion: Option<FusionConfig>,

    /// Prompt routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionConfig {
    /// Leading tokens copied verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_tokens: Option<i64>,
    /// Fraction of the non-sink suffix kept after truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Model registry JSON; relative paths resolve against the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Level filter used when `RUST_LOG` is unset: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the rolling JSON log; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Emit console output as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl KvForgeConfig {
    /// Stage tunables to use when a request does not override them.
    pub fn compression_parameters(&self) -> CompressionParameters {
        let fallback = CompressionParameters::default();
        let compression = self.compression.clone().unwrap_or_default();
        let fusion = self.fusion.clone().unwrap_or_default();
        CompressionParameters {
            sink_tokens: compression.sink_tokens.unwrap_or(fallback.sink_tokens),
            compression_ratio: compression
                .compression_ratio
                .unwrap_or(fallback.compression_ratio),
            kernel_size: fusion.kernel_size.unwrap_or(fallback.kernel_size),
            target_ratio: fusion.target_ratio.unwrap_or(fallback.target_ratio),
            target_size: None,
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        let server = self.server.clone().unwrap_or_default();
        (
            server
                .bind
                .unwrap_or_else(|| crate::defaults::DEFAULT_BIND.to_string()),
            server.port.unwrap_or(crate::defaults::DEFAULT_PORT),
        )
    }
}
