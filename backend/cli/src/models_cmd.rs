//! CLI Models Command
//!
//! Lists registered model endpoints and the tier mapping.

use anyhow::Result;
use kvforge_routing::{ModelRegistry, RegistryFile};

use crate::terminal_output::{paint, render_table, BOLD};

pub fn render(snapshot: &RegistryFile) -> String {
    let models: Vec<Vec<String>> = snapshot
        .models
        .iter()
        .map(|(name, endpoint)| vec![name.clone(), endpoint.clone()])
        .collect();
    let mapping: Vec<Vec<String>> = snapshot
        .complexity_mapping
        .iter()
        .map(|(tier, endpoint)| vec![tier.clone(), endpoint.clone()])
        .collect();

    format!(
        "\n{}\n\n{}\n{}\n\n{}",
        paint(BOLD, "Registered models"),
        render_table(&["Name", "Endpoint"], &models),
        paint(BOLD, "Complexity mapping"),
        render_table(&["Tier", "Endpoint"], &mapping),
    )
}

pub async fn run(registry: &ModelRegistry) -> Result<()> {
    println!("{}", render(&registry.snapshot().await));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal_output::strip_ansi;

    #[tokio::test]
    async fn lists_defaults() {
        let out = strip_ansi(&render(&ModelRegistry::with_defaults().snapshot().await));
        assert!(out.contains("mock-moderate"));
        assert!(out.contains("moderate  ollama://mistral"));
    }
}
