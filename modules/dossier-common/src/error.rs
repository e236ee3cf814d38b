use thiserror::Error;

/// Result type alias for dossier-common operations.
pub type Result<T> = std::result::Result<T, DossierError>;

#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Configuration error: {0}")]
    Config(String),
}
