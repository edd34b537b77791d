use thiserror::Error;

/// Unified error type for Ferry crates.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by connector code. Kept boxed so the original error
/// survives for downcasting at the top of the task.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
