use ferry_common::BoxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The loader raised while records were being handed to it. The
    /// loader's own error is kept as the source.
    #[error("Loader failed while consuming records")]
    LoaderFailure(#[source] BoxError),

    /// The loader had already failed when a record was pushed, so the
    /// record was never handed off.
    #[error("Loader had already failed; record was not handed off")]
    ConsumerFailed(#[source] BoxError),

    #[error("Invalid bridge state: {0}")]
    InvalidState(String),

    #[error("Loader not registered: {0}")]
    LoaderNotFound(String),

    #[error("Failed to create loader '{name}'")]
    LoaderCreation {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to spawn loader thread")]
    Spawn(#[from] std::io::Error),

    #[error("Failed to load task configuration")]
    Config(#[from] config::ConfigError),
}

impl ExecutionError {
    /// The error raised by the loader itself, if this failure came from one.
    pub fn loader_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ExecutionError::LoaderFailure(e) | ExecutionError::ConsumerFailed(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
