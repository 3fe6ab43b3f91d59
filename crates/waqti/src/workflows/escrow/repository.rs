use super::domain::{EscrowItem, EscrowStatus};

/// Storage for escrow items; listing order is the repository's.
pub trait EscrowRepository: Send + Sync {
    fn list(&self) -> Result<Vec<EscrowItem>, EscrowRepositoryError>;
    fn fetch(&self, id: &str) -> Result<Option<EscrowItem>, EscrowRepositoryError>;
    fn update_status(&self, id: &str, status: EscrowStatus) -> Result<(), EscrowRepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EscrowRepositoryError {
    #[error("escrow item not found")]
    NotFound,
    #[error("escrow repository unavailable: {0}")]
    Unavailable(String),
}
