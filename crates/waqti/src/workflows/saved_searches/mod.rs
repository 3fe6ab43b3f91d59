//! Saved searches: named queries a member can re-run, share and subscribe to.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    NewSavedSearch, SavedSearch, SavedSearchStats, SavedSearchUpdate, SearchCategory, SearchRun,
};
pub use repository::{SavedSearchRepository, SearchRepositoryError};
pub use router::saved_search_router;
pub use service::{SavedSearchError, SavedSearchListing, SavedSearchService};
