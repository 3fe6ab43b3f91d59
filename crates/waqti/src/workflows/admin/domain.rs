use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RECENT_PER_KIND: usize = 5;
pub const RECENT_ACTIVITY_LIMIT: usize = 10;
pub const ACTIVE_WINDOW_DAYS: i64 = 30;
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard data";

/// Headline numbers on the overview tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_services: u64,
    pub total_bookings: u64,
    pub total_revenue: f64,
    pub active_users: u64,
    pub pending_verifications: u64,
    pub open_disputes: u64,
    /// Percent change of sign-ups in the last window against the window before it.
    pub monthly_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserRegistered,
    ServiceCreated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub id: String,
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: String,
    pub title: String,
    pub provider_id: String,
    pub provider_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecentActivity {
    pub fn registered(user: &UserSummary) -> Self {
        Self {
            id: format!("user_{}", user.id),
            kind: ActivityKind::UserRegistered,
            description: format!("{} registered", user.name),
            timestamp: user.created_at,
            user_id: Some(user.id.clone()),
            user_name: Some(user.name.clone()),
        }
    }

    pub fn service_created(service: &ServiceSummary) -> Self {
        Self {
            id: format!("service_{}", service.id),
            kind: ActivityKind::ServiceCreated,
            description: format!("New service \"{}\" created", service.title),
            timestamp: service.created_at,
            user_id: Some(service.provider_id.clone()),
            user_name: service.provider_name.clone(),
        }
    }
}

/// Merge both feeds newest first and keep the head.
pub fn merge_activity(users: &[UserSummary], services: &[ServiceSummary]) -> Vec<RecentActivity> {
    let mut activity: Vec<RecentActivity> = users
        .iter()
        .map(RecentActivity::registered)
        .chain(services.iter().map(RecentActivity::service_created))
        .collect();
    activity.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    activity.truncate(RECENT_ACTIVITY_LIMIT);
    activity
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Verified,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub status: AccountStatus,
    pub verification_status: IdentityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub provider_name: String,
    pub hourly_rate: f64,
    pub rating: f64,
    pub reviews_count: u32,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// Status dropdown on the listing tabs; `all` disables the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Suspended,
    Pending,
}

impl StatusFilter {
    pub fn matches(self, status: AccountStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == AccountStatus::Active,
            StatusFilter::Suspended => status == AccountStatus::Suspended,
            StatusFilter::Pending => status == AccountStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
}

impl ListingQuery {
    fn term(&self) -> String {
        self.search.trim().to_lowercase()
    }
}

fn contains_term(haystack: &str, term: &str) -> bool {
    term.is_empty() || haystack.to_lowercase().contains(term)
}

pub fn filter_users(users: &[UserRow], query: &ListingQuery) -> Vec<UserRow> {
    let term = query.term();
    users
        .iter()
        .filter(|user| contains_term(&user.name, &term) || contains_term(&user.email, &term))
        .filter(|user| query.status.matches(user.status))
        .cloned()
        .collect()
}

pub fn filter_services(services: &[ServiceRow], query: &ListingQuery) -> Vec<ServiceRow> {
    let term = query.term();
    services
        .iter()
        .filter(|service| {
            contains_term(&service.title, &term)
                || contains_term(&service.category, &term)
                || contains_term(&service.provider_name, &term)
        })
        .filter(|service| query.status.matches(service.status))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Suspend,
    Activate,
    Delete,
}

impl RowAction {
    pub const fn label(self) -> &'static str {
        match self {
            RowAction::Suspend => "suspend",
            RowAction::Activate => "activate",
            RowAction::Delete => "delete",
        }
    }
}

/// Independently loaded parts of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    Stats,
    RecentActivity,
    Users,
    Services,
}

/// Whatever loaded, plus which sections did not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub recent_activity: Vec<RecentActivity>,
    pub users: Vec<UserRow>,
    pub services: Vec<ServiceRow>,
    pub failed_sections: Vec<DashboardSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Growth in percent, rounded to one decimal. An empty previous window counts as full growth.
pub fn growth_percent(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return if current == 0 { 0.0 } else { 100.0 };
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (change * 10.0).round() / 10.0
}
