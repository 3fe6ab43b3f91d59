use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Page;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    #[default]
    Services,
    Projects,
    Freelancers,
}

impl SearchCategory {
    /// Listing page a saved search of this category opens.
    pub const fn page(self) -> Page {
        match self {
            SearchCategory::Services => Page::Services,
            SearchCategory::Projects => Page::Projects,
            SearchCategory::Freelancers => Page::Freelancers,
        }
    }

    pub const fn display_label(self) -> &'static str {
        match self {
            SearchCategory::Services => "الخدمات",
            SearchCategory::Projects => "المشاريع",
            SearchCategory::Freelancers => "المستقلون",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub query: String,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    pub category: SearchCategory,
    pub notifications: bool,
    pub is_public: bool,
    pub result_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn default_notifications() -> bool {
    true
}

/// Form payload for a new saved search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSavedSearch {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub query: String,
    #[serde(default)]
    pub category: SearchCategory,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SavedSearchUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub query: Option<String>,
    pub category: Option<SearchCategory>,
    pub notifications: Option<bool>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SavedSearchStats {
    pub total: usize,
    pub with_notifications: usize,
    pub total_results: u64,
}

impl SavedSearchStats {
    pub fn from_searches(searches: &[SavedSearch]) -> Self {
        Self {
            total: searches.len(),
            with_notifications: searches.iter().filter(|search| search.notifications).count(),
            total_results: searches
                .iter()
                .map(|search| u64::from(search.result_count))
                .sum(),
        }
    }
}

/// A run stamps the search and names the page that shows its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRun {
    pub search: SavedSearch,
    pub page: Page,
}
