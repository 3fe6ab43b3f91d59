use chrono::{DateTime, Utc};

use super::domain::{AccountStatus, ServiceRow, ServiceSummary, UserRow, UserSummary};

/// Data sets the dashboard can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Services,
    Bookings,
    PendingVerifications,
    OpenDisputes,
}

/// Head-only count request, optionally bounded by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountQuery {
    pub collection: Collection,
    pub created_since: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl CountQuery {
    pub fn all(collection: Collection) -> Self {
        Self {
            collection,
            created_since: None,
            created_before: None,
        }
    }

    pub fn between(collection: Collection, since: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        Self {
            collection,
            created_since: Some(since),
            created_before: Some(before),
        }
    }

    pub fn matches(&self, created_at: DateTime<Utc>) -> bool {
        self.created_since.map_or(true, |since| created_at >= since)
            && self.created_before.map_or(true, |before| created_at < before)
    }
}

/// Read/write access to the marketplace tables behind the admin dashboard.
pub trait DashboardSource: Send + Sync {
    fn count(&self, query: &CountQuery) -> Result<u64, DashboardError>;
    fn total_revenue(&self) -> Result<f64, DashboardError>;
    fn recent_users(&self, limit: usize) -> Result<Vec<UserSummary>, DashboardError>;
    fn recent_services(&self, limit: usize) -> Result<Vec<ServiceSummary>, DashboardError>;
    /// Newest first.
    fn users(&self) -> Result<Vec<UserRow>, DashboardError>;
    /// Newest first.
    fn services(&self) -> Result<Vec<ServiceRow>, DashboardError>;
    fn set_user_status(&self, id: &str, status: AccountStatus) -> Result<(), DashboardError>;
    fn delete_user(&self, id: &str) -> Result<(), DashboardError>;
    fn set_service_status(&self, id: &str, status: AccountStatus) -> Result<(), DashboardError>;
    fn delete_service(&self, id: &str) -> Result<(), DashboardError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("dashboard source unavailable: {0}")]
    Unavailable(String),
}
