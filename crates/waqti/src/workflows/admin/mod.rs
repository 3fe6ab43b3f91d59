//! Operator dashboard: headline statistics, recent activity and moderation of users and
//! services. Only the configured admin account may load it.

pub mod domain;
pub mod router;
pub mod service;
pub mod source;

#[cfg(test)]
mod tests;

pub use domain::{
    filter_services, filter_users, AccountStatus, ActivityKind, DashboardSection,
    DashboardSnapshot, DashboardStats, IdentityStatus, ListingQuery, RecentActivity, RowAction,
    ServiceRow, ServiceSummary, StatusFilter, UserRow, UserSummary, LOAD_FAILED_MESSAGE,
};
pub use router::admin_router;
pub use service::AdminDashboardService;
pub use source::{Collection, CountQuery, DashboardError, DashboardSource};
