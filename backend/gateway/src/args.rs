//! Typed access to `tools/call` arguments.

use kvforge_core::{Cache, CompressionParameters, ToolError};
use serde_json::Value;

pub fn required_str<'a>(args: &'a Value, name: &'static str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(type_error(name, "a string", other)),
    }
}

pub fn optional_str<'a>(args: &'a Value, name: &'static str) -> Result<Option<&'a str>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(type_error(name, "a string", other)),
    }
}

pub fn optional_i64(args: &Value, name: &'static str) -> Result<Option<i64>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| type_error(name, "an integer", v)),
    }
}

pub fn optional_f64(args: &Value, name: &'static str) -> Result<Option<f64>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| type_error(name, "a number", v)),
    }
}

/// `[[number]]` argument decoded into a [`Cache`]. Row lengths are not checked here.
pub fn optional_cache(args: &Value, name: &'static str) -> Result<Option<Cache>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| ToolError::InvalidArgument {
                name,
                reason: format!("expected an array of numeric arrays: {e}"),
            }),
    }
}

pub fn required_cache(args: &Value, name: &'static str) -> Result<Cache, ToolError> {
    optional_cache(args, name)?.ok_or(ToolError::MissingArgument(name))
}

/// Overlay any stage tunables present in `args` on top of `defaults`.
pub fn compression_parameters(
    args: &Value,
    defaults: CompressionParameters,
) -> Result<CompressionParameters, ToolError> {
    Ok(CompressionParameters {
        sink_tokens: optional_i64(args, "sink_tokens")?.unwrap_or(defaults.sink_tokens),
        compression_ratio: optional_f64(args, "compression_ratio")?
            .unwrap_or(defaults.compression_ratio),
        kernel_size: optional_i64(args, "kernel_size")?.unwrap_or(defaults.kernel_size),
        target_ratio: optional_f64(args, "target_ratio")?.unwrap_or(defaults.target_ratio),
        target_size: optional_i64(args, "target_size")?.or(defaults.target_size),
    })
}

fn type_error(name: &'static str, expected: &str, found: &Value) -> ToolError {
    ToolError::InvalidArgument {
        name,
        reason: format!("expected {expected}, got {found}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_strings_and_numbers() {
        let args = json!({"prompt": "hi", "max_tokens": 64, "ratio": 0.25});
        assert_eq!(required_str(&args, "prompt").unwrap(), "hi");
        assert_eq!(optional_str(&args, "context").unwrap(), None);
        assert_eq!(optional_i64(&args, "max_tokens").unwrap(), Some(64));
        assert_eq!(optional_f64(&args, "ratio").unwrap(), Some(0.25));
    }

    #[test]
    fn wrong_types_are_invalid_arguments() {
        let args = json!({"prompt": 3, "max_tokens": "many"});
        assert!(matches!(
            required_str(&args, "prompt"),
            Err(ToolError::InvalidArgument { name: "prompt", .. })
        ));
        assert!(matches!(
            optional_i64(&args, "max_tokens"),
            Err(ToolError::InvalidArgument { name: "max_tokens", .. })
        ));
        assert!(matches!(
            required_str(&json!({}), "prompt"),
            Err(ToolError::MissingArgument("prompt"))
        ));
    }

    #[test]
    fn decodes_cache() {
        let cache = required_cache(&json!({"kv_cache": [[1, 2.5], [3, 4]]}), "kv_cache").unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache[0], vec![1.0, 2.5]);

        let err = required_cache(&json!({"kv_cache": "nope"}), "kv_cache").unwrap_err();
        assert!(err.is_invalid_params());
    }

    #[test]
    fn parameters_overlay_defaults() {
        let params = compression_parameters(
            &json!({"sink_tokens": 2, "target_size": 5}),
            CompressionParameters::default(),
        )
        .unwrap();
        assert_eq!(params.sink_tokens, 2);
        assert_eq!(params.target_size, Some(5));
        assert_eq!(params.kernel_size, 7);
        assert_eq!(params.compression_ratio, 0.7);
    }
}
