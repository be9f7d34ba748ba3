//! CLI Config Command
//!
//! `config init` writes a fully-defaulted `config.yaml`; `config show` prints
//! the effective configuration after env substitution and overrides.

use std::path::Path;

use anyhow::{bail, Result};
use kvforge_config::{apply_all_defaults, write_config, KvForgeConfig};

use crate::config::Config;
use crate::terminal_output::note_success;

pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite (the old file is kept as a backup)",
            path.display()
        );
    }
    write_config(&apply_all_defaults(KvForgeConfig::default()), path).await?;
    note_success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}

pub fn show(config: &Config) -> Result<()> {
    println!("# {}", config.config_path().display());
    print!("{}", serde_yaml::to_string(&config.file)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvforge_config::{config_file_path, load_config};

    #[tokio::test]
    async fn init_writes_defaults_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());

        init(&path, false).await.unwrap();
        let written = load_config(&path).await.unwrap();
        assert_eq!(written, apply_all_defaults(KvForgeConfig::default()));

        assert!(init(&path, false).await.is_err());
        init(&path, true).await.unwrap();
        assert!(path.with_extension("yaml.bak.1").exists());
    }
}
