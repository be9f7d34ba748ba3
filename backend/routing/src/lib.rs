pub mod complexity;
pub mod error;
pub mod model_registry;
pub mod resolve_route;

pub use complexity::{Classification, Complexity, ComplexityClassifier, ComplexityScores};
pub use error::RoutingError;
pub use model_registry::{ModelRegistry, RegistryFile, DEFAULT_REGISTRY_FILE};
pub use resolve_route::{PromptRouter, RouteDecision};
