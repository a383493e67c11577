use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(String),
    #[error("storage key is invalid: {0}")]
    InvalidKey(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("url is empty")]
    EmptyInput,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
    #[error("custom slug already taken: {0}")]
    SlugTaken(String),
    #[error("unable to generate a free slug after {attempts} attempts")]
    SlugExhausted { attempts: usize },
    #[error("persisted link state is corrupt: {0}")]
    CorruptState(String),
    #[error("link not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
