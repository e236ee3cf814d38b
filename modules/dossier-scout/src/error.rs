use dossier_common::DossierError;

/// Result type alias for scout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// The shared cache is held by another batch.
    #[error("A scrape batch is already running")]
    BatchInProgress,

    #[error("Batch task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Config(#[from] DossierError),
}
