use thiserror::Error;

/// Virtualized collection error types
#[derive(Error, Debug)]
pub enum VlistError {
    #[error("Operation `{0}` is not supported on a read-only collection")]
    UnsupportedOperation(&'static str),

    #[error("Data source failure: {0}")]
    DataSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl VlistError {
    /// Wraps an arbitrary backing-store error.
    pub fn data_source<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::DataSource(err.into())
    }
}

pub type Result<T> = std::result::Result<T, VlistError>;
