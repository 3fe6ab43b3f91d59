use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::access::{AccessPolicy, CurrentUser};
use crate::workflows::saved_searches::domain::{NewSavedSearch, SavedSearch, SearchCategory};
use crate::workflows::saved_searches::repository::{SavedSearchRepository, SearchRepositoryError};
use crate::workflows::saved_searches::service::SavedSearchService;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 20, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn owner() -> CurrentUser {
    CurrentUser {
        id: "user-1".to_string(),
        name: "Ahmad Hassan".to_string(),
        email: "ahmad@example.com".to_string(),
    }
}

pub(super) fn stranger() -> CurrentUser {
    CurrentUser {
        id: "user-2".to_string(),
        name: "Sara Ali".to_string(),
        email: "sara@example.com".to_string(),
    }
}

pub(super) fn new_search(name: &str, query: &str, category: SearchCategory) -> NewSavedSearch {
    NewSavedSearch {
        name: name.to_string(),
        description: None,
        query: query.to_string(),
        category,
        notifications: true,
        is_public: false,
    }
}

pub(super) fn seeded_search(id: &str, owner_id: &str, result_count: u32, notifications: bool) -> SavedSearch {
    SavedSearch {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: format!("Search {id}"),
        description: Some("Seeded search".to_string()),
        query: "react developer".to_string(),
        filters: BTreeMap::from([("location".to_string(), "Dubai".to_string())]),
        category: SearchCategory::Freelancers,
        notifications,
        is_public: true,
        result_count,
        last_run: None,
        created_at: now(),
    }
}

#[derive(Default)]
pub(super) struct MemorySearches {
    searches: Mutex<Vec<SavedSearch>>,
}

impl MemorySearches {
    pub(super) fn with(searches: Vec<SavedSearch>) -> Self {
        Self {
            searches: Mutex::new(searches),
        }
    }

    pub(super) fn get(&self, id: &str) -> Option<SavedSearch> {
        let guard = self.searches.lock().expect("searches mutex poisoned");
        guard.iter().find(|search| search.id == id).cloned()
    }
}

impl SavedSearchRepository for MemorySearches {
    fn list(&self, owner_id: &str) -> Result<Vec<SavedSearch>, SearchRepositoryError> {
        let guard = self.searches.lock().expect("searches mutex poisoned");
        Ok(guard
            .iter()
            .filter(|search| search.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn fetch(&self, id: &str) -> Result<Option<SavedSearch>, SearchRepositoryError> {
        Ok(self.get(id))
    }

    fn insert(&self, search: SavedSearch) -> Result<SavedSearch, SearchRepositoryError> {
        let mut guard = self.searches.lock().expect("searches mutex poisoned");
        if guard.iter().any(|existing| existing.id == search.id) {
            return Err(SearchRepositoryError::Conflict);
        }
        guard.insert(0, search.clone());
        Ok(search)
    }

    fn update(&self, search: SavedSearch) -> Result<(), SearchRepositoryError> {
        let mut guard = self.searches.lock().expect("searches mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == search.id)
            .ok_or(SearchRepositoryError::NotFound)?;
        *slot = search;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), SearchRepositoryError> {
        let mut guard = self.searches.lock().expect("searches mutex poisoned");
        let before = guard.len();
        guard.retain(|search| search.id != id);
        if guard.len() == before {
            return Err(SearchRepositoryError::NotFound);
        }
        Ok(())
    }
}

pub(super) fn build_service(
    searches: Vec<SavedSearch>,
) -> (SavedSearchService<MemorySearches>, Arc<MemorySearches>) {
    let repository = Arc::new(MemorySearches::with(searches));
    let service = SavedSearchService::new(repository.clone(), AccessPolicy::default());
    (service, repository)
}
