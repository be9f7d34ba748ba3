//! `kvforge-config`: runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, compression, fusion, routing, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and `KVFORGE_*` overrides
//! - Default value application
//! - Range validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::KvForgeConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Load, apply env substitution and overrides, apply defaults, and validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors are logged, not returned; callers that must refuse a bad config
/// check [`validate`] themselves.
pub async fn load_and_prepare(path: &Path) -> Result<KvForgeConfig> {
    let raw_config = load_config(path).await?;
    let env: HashMap<String, String> = std::env::vars().collect();
    prepare(raw_config, &env)
}

/// Env substitution, overrides and defaults on an already-parsed config.
pub fn prepare(raw_config: KvForgeConfig, env: &HashMap<String, String>) -> Result<KvForgeConfig> {
    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: KvForgeConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(apply_env_overrides(config, env));

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}

/// Registry path from the config, resolved against `config_dir` when relative.
pub fn registry_path(config: &KvForgeConfig, config_dir: &Path) -> PathBuf {
    let configured = config
        .routing
        .as_ref()
        .and_then(|r| r.registry_path.clone())
        .unwrap_or_else(|| defaults::DEFAULT_REGISTRY_PATH.into());
    if configured.is_absolute() {
        configured
    } else {
        config_dir.join(configured)
    }
}
