use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::access::{AccessPolicy, CurrentUser};

use super::domain::{NewSavedSearch, SavedSearch, SavedSearchStats, SavedSearchUpdate, SearchRun};
use super::repository::{SavedSearchRepository, SearchRepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSearchListing {
    pub searches: Vec<SavedSearch>,
    pub stats: SavedSearchStats,
}

pub struct SavedSearchService<R> {
    repository: Arc<R>,
    policy: AccessPolicy,
    sequence: AtomicU64,
}

impl<R> SavedSearchService<R>
where
    R: SavedSearchRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: AccessPolicy) -> Self {
        Self {
            repository,
            policy,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn list(&self, owner: &CurrentUser) -> Result<SavedSearchListing, SavedSearchError> {
        let searches = self.repository.list(&owner.id)?;
        let stats = SavedSearchStats::from_searches(&searches);
        Ok(SavedSearchListing { searches, stats })
    }

    pub fn stats(&self, owner: &CurrentUser) -> Result<SavedSearchStats, SavedSearchError> {
        Ok(SavedSearchStats::from_searches(&self.repository.list(&owner.id)?))
    }

    /// New searches start with no filters and no results.
    pub fn create(
        &self,
        owner: &CurrentUser,
        request: NewSavedSearch,
        now: DateTime<Utc>,
    ) -> Result<SavedSearch, SavedSearchError> {
        let name = required(&request.name, "name")?;
        let query = required(&request.query, "query")?;

        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let search = SavedSearch {
            id: format!("search-{id:06}"),
            owner_id: owner.id.clone(),
            name,
            description: optional(request.description),
            query,
            filters: BTreeMap::new(),
            category: request.category,
            notifications: request.notifications,
            is_public: request.is_public,
            result_count: 0,
            last_run: None,
            created_at: now,
        };
        let stored = self.repository.insert(search)?;
        info!(search_id = %stored.id, owner_id = %owner.id, "saved search created");
        Ok(stored)
    }

    pub fn update(
        &self,
        owner: &CurrentUser,
        id: &str,
        update: SavedSearchUpdate,
    ) -> Result<SavedSearch, SavedSearchError> {
        let mut search = self.owned(owner, id)?;
        if let Some(name) = update.name {
            search.name = required(&name, "name")?;
        }
        if let Some(query) = update.query {
            search.query = required(&query, "query")?;
        }
        if let Some(description) = update.description {
            search.description = optional(Some(description));
        }
        if let Some(category) = update.category {
            search.category = category;
        }
        if let Some(notifications) = update.notifications {
            search.notifications = notifications;
        }
        if let Some(is_public) = update.is_public {
            search.is_public = is_public;
        }
        self.repository.update(search.clone())?;
        Ok(search)
    }

    pub fn delete(&self, owner: &CurrentUser, id: &str) -> Result<(), SavedSearchError> {
        self.owned(owner, id)?;
        self.repository.delete(id)?;
        info!(search_id = id, owner_id = %owner.id, "saved search deleted");
        Ok(())
    }

    pub fn toggle_notifications(
        &self,
        owner: &CurrentUser,
        id: &str,
    ) -> Result<SavedSearch, SavedSearchError> {
        let mut search = self.owned(owner, id)?;
        search.notifications = !search.notifications;
        self.repository.update(search.clone())?;
        Ok(search)
    }

    pub fn run(
        &self,
        owner: &CurrentUser,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<SearchRun, SavedSearchError> {
        let mut search = self.owned(owner, id)?;
        search.last_run = Some(now);
        self.repository.update(search.clone())?;
        let page = search.category.page();
        Ok(SearchRun { search, page })
    }

    // Searches owned by someone else look missing to the caller.
    fn owned(&self, owner: &CurrentUser, id: &str) -> Result<SavedSearch, SavedSearchError> {
        match self.repository.fetch(id)? {
            Some(search) if search.owner_id == owner.id => Ok(search),
            Some(_) => {
                warn!(search_id = id, owner_id = %owner.id, "saved search owned by another user");
                Err(SavedSearchError::NotFound(id.to_string()))
            }
            None => Err(SavedSearchError::NotFound(id.to_string())),
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, SavedSearchError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SavedSearchError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum SavedSearchError {
    #[error("saved search {0} is required")]
    MissingField(&'static str),
    #[error("saved search '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Repository(#[from] SearchRepositoryError),
}
