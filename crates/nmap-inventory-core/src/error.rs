use thiserror::Error;

/// Errors raised while rendering inventory documents.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
