use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("model '{0}' not registered")]
    UnknownModel(String),

    #[error("unknown complexity tier '{0}'")]
    UnknownComplexity(String),
}
