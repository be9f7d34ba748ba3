//! Environment variable handling for config values.
//!
//! `${VAR_NAME}` in any string value is replaced at load time; only
//! uppercase `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` escapes to a
//! literal `${VAR}`. `KVFORGE_BIND` / `KVFORGE_PORT` override the server
//! section after substitution.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::schema::{KvForgeConfig, ServerConfig};

/// Optional leading `$` marks an escaped reference.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const BIND_OVERRIDE_VAR: &str = "KVFORGE_BIND";
pub const PORT_OVERRIDE_VAR: &str = "KVFORGE_PORT";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree from `env`.
///
/// Returns an error if any referenced env var is not set or is empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply `KVFORGE_BIND` / `KVFORGE_PORT` from `env` on top of the file config.
///
/// An unparsable port is ignored with a warning.
pub fn apply_env_overrides(mut config: KvForgeConfig, env: &HashMap<String, String>) -> KvForgeConfig {
    if let Some(bind) = env.get(BIND_OVERRIDE_VAR).filter(|v| !v.is_empty()) {
        debug!(bind = %bind, "Overriding server.bind from environment");
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.clone());
    }
    if let Some(raw) = env.get(PORT_OVERRIDE_VAR).filter(|v| !v.is_empty()) {
        match raw.parse::<u16>() {
            Ok(port) => {
                debug!(port, "Overriding server.port from environment");
                config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
            }
            Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid KVFORGE_PORT"),
        }
    }
    config
}
