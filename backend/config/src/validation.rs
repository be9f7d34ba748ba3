//! Config validation: range checks with user-friendly error messages.

use crate::schema::KvForgeConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &KvForgeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_compression(config, &mut report);
    validate_fusion(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &KvForgeConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    if let Some(port) = server.port {
        if port == 0 {
            report.error("server.port", "port must be > 0");
        } else if port < 1024 {
            report.warn(
                "server.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
    if let Some(bind) = &server.bind {
        if bind.trim().is_empty() {
            report.error("server.bind", "bind address cannot be empty");
        }
    }
}

fn check_ratio(report: &mut ValidationReport, path: &str, ratio: Option<f64>) {
    let Some(ratio) = ratio else { return };
    if !(ratio > 0.0 && ratio <= 1.0) {
        report.error(path, format!("{ratio} is outside (0, 1]"));
    }
}

fn validate_compression(config: &KvForgeConfig, report: &mut ValidationReport) {
    let Some(compression) = &config.compression else { return };
    if let Some(sink) = compression.sink_tokens {
        if sink < 0 {
            report.error("compression.sinkTokens", "sinkTokens must be >= 0");
        }
    }
    check_ratio(report, "compression.compressionRatio", compression.compression_ratio);
}

fn validate_fusion(config: &KvForgeConfig, report: &mut ValidationReport) {
    let Some(fusion) = &config.fusion else { return };
    if let Some(kernel) = fusion.kernel_size {
        if kernel <= 0 {
            report.error("fusion.kernelSize", "kernelSize must be >= 1");
        }
    }
    check_ratio(report, "fusion.targetRatio", fusion.target_ratio);
}

fn validate_logging(config: &KvForgeConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !matches!(
            level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            report.warn(
                "logging.level",
                format!("Unknown level '{level}'. Use 'trace', 'debug', 'info', 'warn' or 'error'"),
            );
        }
    }
}
