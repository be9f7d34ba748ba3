//! Structured logging setup for kvforge binaries.

pub mod logger;

pub use logger::{init_logger, LOG_FILE_PREFIX};
