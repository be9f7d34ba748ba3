//! Config defaults: fills unset fields of a parsed config.

use kvforge_core::params::{
    DEFAULT_COMPRESSION_RATIO, DEFAULT_KERNEL_SIZE, DEFAULT_SINK_TOKENS, DEFAULT_TARGET_RATIO,
};

use crate::schema::{
    CompressionConfig, FusionConfig, KvForgeConfig, LoggingConfig, RoutingConfig, ServerConfig,
};

pub const DEFAULT_BIND: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Registry file name, resolved against the config directory.
pub const DEFAULT_REGISTRY_PATH: &str = "model_registry.json";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: KvForgeConfig) -> KvForgeConfig {
    let config = apply_server_defaults(config);
    let config = apply_compression_defaults(config);
    let config = apply_routing_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: KvForgeConfig) -> KvForgeConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_compression_defaults(mut config: KvForgeConfig) -> KvForgeConfig {
    let compression = config
        .compression
        .get_or_insert_with(CompressionConfig::default);
    compression.sink_tokens.get_or_insert(DEFAULT_SINK_TOKENS);
    compression
        .compression_ratio
        .get_or_insert(DEFAULT_COMPRESSION_RATIO);

    let fusion = config.fusion.get_or_insert_with(FusionConfig::default);
    fusion.kernel_size.get_or_insert(DEFAULT_KERNEL_SIZE);
    fusion.target_ratio.get_or_insert(DEFAULT_TARGET_RATIO);
    config
}

fn apply_routing_defaults(mut config: KvForgeConfig) -> KvForgeConfig {
    let routing = config.routing.get_or_insert_with(RoutingConfig::default);
    routing
        .registry_path
        .get_or_insert_with(|| DEFAULT_REGISTRY_PATH.into());
    config
}

fn apply_logging_defaults(mut config: KvForgeConfig) -> KvForgeConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}
