//! Prompt router: classify, then resolve the tier to a model endpoint.

use serde::Serialize;
use tracing::info;

use crate::complexity::{Complexity, ComplexityClassifier, ComplexityScores};
use crate::model_registry::ModelRegistry;

/// Outcome of routing one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub complexity: Complexity,
    pub model_endpoint: String,
    pub reasoning: String,
    pub scores: ComplexityScores,
}

/// Classifier plus registry. Cloning shares the underlying registry.
#[derive(Debug, Clone, Default)]
pub struct PromptRouter {
    classifier: ComplexityClassifier,
    registry: ModelRegistry,
}

impl PromptRouter {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            classifier: ComplexityClassifier::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Route `prompt` (and optional surrounding context) to a model endpoint.
    pub async fn route(&self, prompt: &str, context: Option<&str>) -> RouteDecision {
        let classification = self.classifier.classify(prompt, context);
        let model_endpoint = self.registry.model_for(classification.complexity).await;
        info!(
            complexity = %classification.complexity,
            endpoint = %model_endpoint,
            "Routed prompt"
        );
        RouteDecision {
            complexity: classification.complexity,
            reasoning: format!("Classified as {} complexity", classification.complexity),
            model_endpoint,
            scores: classification.scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn routes_to_default_tier_endpoints() {
        let router = PromptRouter::new(ModelRegistry::with_defaults());

        let simple = router.route("Fix the indentation", None).await;
        assert_eq!(simple.complexity, Complexity::Simple);
        assert_eq!(simple.model_endpoint, "ollama://phi3");
        assert_eq!(simple.reasoning, "Classified as simple complexity");

        let complex = router
            .route("Design a migration plan for the billing database", None)
            .await;
        assert_eq!(complex.complexity, Complexity::Complex);
        assert_eq!(complex.model_endpoint, "ollama://llama3");
    }

    #[tokio::test]
    async fn custom_mapping_is_honoured() {
        let registry = ModelRegistry::with_defaults();
        registry
            .set_complexity_mapping(Complexity::Simple, "mock-simple")
            .await
            .unwrap();
        let router = PromptRouter::new(registry);

        let decision = router.route("rename this variable", None).await;
        assert_eq!(decision.model_endpoint, "mock://simple");
    }

    #[tokio::test]
    async fn decision_serializes_lowercase_tier() {
        let router = PromptRouter::default();
        let decision = router.route("format this file", None).await;
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["complexity"], "simple");
        assert!(json["scores"]["simple"].as_u64().unwrap() >= 1);
    }
}
