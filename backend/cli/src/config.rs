use std::path::PathBuf;

use anyhow::Result;
use kvforge_config::{config_dir, config_file_path, load_and_prepare, KvForgeConfig};
use kvforge_routing::{ModelRegistry, PromptRouter};

/// Effective runtime configuration: the prepared config file plus where it lives.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `config.yaml` and relative paths it references
    pub dir: PathBuf,
    pub file: KvForgeConfig,
}

impl Config {
    /// Load `config.yaml` from the config directory, with env substitution,
    /// `KVFORGE_*` overrides and defaults applied.
    pub async fn load() -> Result<Self> {
        let dir = config_dir();
        let file = load_and_prepare(&config_file_path(&dir)).await?;
        Ok(Self { dir, file })
    }

    pub fn config_path(&self) -> PathBuf {
        config_file_path(&self.dir)
    }

    pub fn registry_path(&self) -> PathBuf {
        kvforge_config::registry_path(&self.file, &self.dir)
    }

    pub fn log_level(&self) -> String {
        self.file
            .logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| kvforge_config::defaults::DEFAULT_LOG_LEVEL.to_string())
    }

    pub fn log_json(&self) -> bool {
        self.file
            .logging
            .as_ref()
            .and_then(|l| l.json)
            .unwrap_or(false)
    }

    /// Log directory; relative paths resolve against the config directory.
    pub fn log_dir(&self) -> Option<PathBuf> {
        let dir = self.file.logging.as_ref()?.dir.clone()?;
        Some(if dir.is_absolute() { dir } else { self.dir.join(dir) })
    }

    /// Router backed by the registry file, falling back to built-in models.
    pub async fn router(&self) -> PromptRouter {
        let registry = ModelRegistry::new();
        registry.initialize(&self.registry_path()).await;
        PromptRouter::new(registry)
    }
}
