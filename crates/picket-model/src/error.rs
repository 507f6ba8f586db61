use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing mandatory attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown runner kind: {0}")]
    UnknownRunnerKind(String),

    #[error("unknown protection scope: {0}")]
    UnknownProtectionScope(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
