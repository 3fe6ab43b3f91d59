use super::domain::SavedSearch;

/// Per-owner storage; `list` returns the newest search first.
pub trait SavedSearchRepository: Send + Sync {
    fn list(&self, owner_id: &str) -> Result<Vec<SavedSearch>, SearchRepositoryError>;
    fn fetch(&self, id: &str) -> Result<Option<SavedSearch>, SearchRepositoryError>;
    fn insert(&self, search: SavedSearch) -> Result<SavedSearch, SearchRepositoryError>;
    fn update(&self, search: SavedSearch) -> Result<(), SearchRepositoryError>;
    fn delete(&self, id: &str) -> Result<(), SearchRepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SearchRepositoryError {
    #[error("saved search already exists")]
    Conflict,
    #[error("saved search not found")]
    NotFound,
    #[error("saved search store unavailable: {0}")]
    Unavailable(String),
}
