//! Named model endpoints plus the tier to endpoint mapping, persisted as a
//! small JSON file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::complexity::Complexity;
use crate::error::RoutingError;

/// File name of the persisted registry inside the config directory.
pub const DEFAULT_REGISTRY_FILE: &str = "model_registry.json";

/// Endpoint used for a tier that has no explicit mapping.
pub fn default_endpoint(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Simple => "ollama://phi3",
        Complexity::Moderate => "ollama://mistral",
        Complexity::Complex => "ollama://llama3",
    }
}

/// On-disk layout of the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub models: BTreeMap<String, String>,
    #[serde(default)]
    pub complexity_mapping: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    models: BTreeMap<String, String>,
    complexity_mapping: BTreeMap<Complexity, String>,
}

/// Thread-safe model registry, cheap to clone and share between handlers.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl ModelRegistry {
    /// Empty registry; every tier resolves to its default endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in models and tier mapping.
    pub fn with_defaults() -> Self {
        Self {
            state: Arc::new(RwLock::new(default_state())),
        }
    }

    /// Load from `path` if it exists, otherwise (or on any load error) fall back to defaults.
    pub async fn initialize(&self, path: &Path) {
        if !path.exists() {
            info!(path = %path.display(), "No model registry file found, using defaults");
            *self.state.write().await = default_state();
            return;
        }
        if let Err(e) = self.load(path).await {
            warn!(path = %path.display(), error = %e, "Failed to load model registry, using defaults");
            *self.state.write().await = default_state();
        }
    }

    /// Replace the registry contents with the file at `path`.
    pub async fn load(&self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read model registry: {}", path.display()))?;
        let file: RegistryFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model registry: {}", path.display()))?;

        let mut complexity_mapping = BTreeMap::new();
        for (tier, endpoint) in file.complexity_mapping {
            match tier.parse::<Complexity>() {
                Ok(c) => {
                    complexity_mapping.insert(c, endpoint);
                }
                Err(e) => warn!(error = %e, "Ignoring complexity mapping entry"),
            }
        }

        let mut state = self.state.write().await;
        state.models = file.models;
        state.complexity_mapping = complexity_mapping;
        info!(
            path = %path.display(),
            models = ?state.models.keys().collect::<Vec<_>>(),
            "Loaded model registry"
        );
        Ok(())
    }

    /// Endpoint for `complexity`, falling back to the built-in default.
    pub async fn model_for(&self, complexity: Complexity) -> String {
        let state = self.state.read().await;
        match state.complexity_mapping.get(&complexity) {
            Some(endpoint) => {
                info!(%complexity, endpoint = %endpoint, "Routing to mapped model");
                endpoint.clone()
            }
            None => {
                let endpoint = default_endpoint(complexity);
                warn!(%complexity, endpoint, "No model configured for tier, using fallback");
                endpoint.to_string()
            }
        }
    }

    pub async fn register_model(&self, name: impl Into<String>, endpoint: impl Into<String>) {
        let (name, endpoint) = (name.into(), endpoint.into());
        info!(name = %name, endpoint = %endpoint, "Registered model");
        self.state.write().await.models.insert(name, endpoint);
    }

    /// Point `complexity` at an already-registered model.
    pub async fn set_complexity_mapping(
        &self,
        complexity: Complexity,
        model_name: &str,
    ) -> Result<(), RoutingError> {
        let mut state = self.state.write().await;
        let endpoint = state
            .models
            .get(model_name)
            .cloned()
            .ok_or_else(|| RoutingError::UnknownModel(model_name.to_string()))?;
        state.complexity_mapping.insert(complexity, endpoint);
        info!(%complexity, model = model_name, "Mapped complexity to model");
        Ok(())
    }

    pub async fn available_models(&self) -> BTreeMap<String, String> {
        self.state.read().await.models.clone()
    }

    pub async fn complexity_mappings(&self) -> BTreeMap<Complexity, String> {
        self.state.read().await.complexity_mapping.clone()
    }

    /// Snapshot in the on-disk layout.
    pub async fn snapshot(&self) -> RegistryFile {
        let state = self.state.read().await;
        RegistryFile {
            models: state.models.clone(),
            complexity_mapping: state
                .complexity_mapping
                .iter()
                .map(|(c, e)| (c.to_string(), e.clone()))
                .collect(),
        }
    }

    /// Write the registry to `path` as pretty JSON, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create registry directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot().await)
            .context("Failed to serialize model registry")?;
        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write model registry: {}", path.display()))?;
        info!(path = %path.display(), "Saved model registry");
        Ok(())
    }
}

fn default_state() -> RegistryState {
    let models = [
        ("phi3", "ollama://phi3"),
        ("mistral", "ollama://mistral"),
        ("llama3", "ollama://llama3"),
        ("mock-simple", "mock://simple"),
        ("mock-moderate", "mock://moderate"),
        ("mock-complex", "mock://complex"),
    ]
    .into_iter()
    .map(|(n, e)| (n.to_string(), e.to_string()))
    .collect();

    let complexity_mapping = Complexity::ALL
        .into_iter()
        .map(|c| (c, default_endpoint(c).to_string()))
        .collect();

    RegistryState {
        models,
        complexity_mapping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_registry_falls_back_to_defaults() {
        let registry = ModelRegistry::new();
        assert_eq!(registry.model_for(Complexity::Simple).await, "ollama://phi3");
        assert_eq!(registry.model_for(Complexity::Complex).await, "ollama://llama3");
    }

    #[tokio::test]
    async fn missing_file_initializes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::new();
        registry.initialize(&dir.path().join("absent.json")).await;

        let models = registry.available_models().await;
        assert_eq!(models.len(), 6);
        assert_eq!(models["mock-complex"], "mock://complex");
        assert_eq!(registry.complexity_mappings().await.len(), 3);
    }

    #[tokio::test]
    async fn corrupt_file_initializes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REGISTRY_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let registry = ModelRegistry::new();
        registry.initialize(&path).await;
        assert_eq!(registry.model_for(Complexity::Moderate).await, "ollama://mistral");
        assert!(registry.available_models().await.contains_key("phi3"));
    }

    #[tokio::test]
    async fn mapping_requires_registered_model() {
        let registry = ModelRegistry::new();
        let err = registry
            .set_complexity_mapping(Complexity::Simple, "gpt-local")
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::UnknownModel(ref m) if m == "gpt-local"));

        registry.register_model("gpt-local", "http://localhost:9000/generate").await;
        registry
            .set_complexity_mapping(Complexity::Simple, "gpt-local")
            .await
            .unwrap();
        assert_eq!(
            registry.model_for(Complexity::Simple).await,
            "http://localhost:9000/generate"
        );
    }

    #[tokio::test]
    async fn save_then_load_preserves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_REGISTRY_FILE);

        let registry = ModelRegistry::with_defaults();
        registry.register_model("qwen", "ollama://qwen2").await;
        registry
            .set_complexity_mapping(Complexity::Complex, "qwen")
            .await
            .unwrap();
        registry.save(&path).await.unwrap();

        let reloaded = ModelRegistry::new();
        reloaded.load(&path).await.unwrap();
        assert_eq!(reloaded.snapshot().await, registry.snapshot().await);
        assert_eq!(reloaded.model_for(Complexity::Complex).await, "ollama://qwen2");
    }

    #[tokio::test]
    async fn unknown_tiers_in_file_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REGISTRY_FILE);
        std::fs::write(
            &path,
            r#"{"models":{"a":"mock://a"},"complexity_mapping":{"simple":"mock://a","expert":"mock://b"}}"#,
        )
        .unwrap();

        let registry = ModelRegistry::new();
        registry.load(&path).await.unwrap();
        let mapping = registry.complexity_mappings().await;
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&Complexity::Simple], "mock://a");
    }
}
