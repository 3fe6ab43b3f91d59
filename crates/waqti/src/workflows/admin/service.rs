use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::access::AccessPolicy;

use super::domain::{
    growth_percent, merge_activity, AccountStatus, DashboardSection, DashboardSnapshot,
    DashboardStats, RecentActivity, RowAction, ServiceRow, UserRow, ACTIVE_WINDOW_DAYS,
    LOAD_FAILED_MESSAGE, RECENT_PER_KIND,
};
use super::source::{Collection, CountQuery, DashboardError, DashboardSource};

/// Loads the admin overview and applies moderation actions.
pub struct AdminDashboardService<D> {
    source: Arc<D>,
    policy: AccessPolicy,
}

impl<D> AdminDashboardService<D>
where
    D: DashboardSource + 'static,
{
    pub fn new(source: Arc<D>, policy: AccessPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Load every section independently; failures are logged and reported, not fatal.
    pub fn load(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let mut snapshot = DashboardSnapshot::default();

        match self.stats(now) {
            Ok(stats) => snapshot.stats = stats,
            Err(err) => self.record_failure(&mut snapshot, DashboardSection::Stats, &err),
        }
        match self.recent_activity() {
            Ok(activity) => snapshot.recent_activity = activity,
            Err(err) => self.record_failure(&mut snapshot, DashboardSection::RecentActivity, &err),
        }
        match self.source.users() {
            Ok(users) => snapshot.users = users,
            Err(err) => self.record_failure(&mut snapshot, DashboardSection::Users, &err),
        }
        match self.source.services() {
            Ok(services) => snapshot.services = services,
            Err(err) => self.record_failure(&mut snapshot, DashboardSection::Services, &err),
        }

        if !snapshot.failed_sections.is_empty() {
            snapshot.error = Some(LOAD_FAILED_MESSAGE.to_string());
        }
        snapshot
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, DashboardError> {
        let window = Duration::days(ACTIVE_WINDOW_DAYS);
        let window_start = now - window;
        let previous_start = window_start - window;

        let count = |collection| self.source.count(&CountQuery::all(collection));
        let active_users =
            self.source
                .count(&CountQuery::between(Collection::Users, window_start, now))?;
        let previous_users = self.source.count(&CountQuery::between(
            Collection::Users,
            previous_start,
            window_start,
        ))?;

        Ok(DashboardStats {
            total_users: count(Collection::Users)?,
            total_services: count(Collection::Services)?,
            total_bookings: count(Collection::Bookings)?,
            total_revenue: self.source.total_revenue()?,
            active_users,
            pending_verifications: count(Collection::PendingVerifications)?,
            open_disputes: count(Collection::OpenDisputes)?,
            monthly_growth: growth_percent(active_users, previous_users),
        })
    }

    pub fn recent_activity(&self) -> Result<Vec<RecentActivity>, DashboardError> {
        let users = self.source.recent_users(RECENT_PER_KIND)?;
        let services = self.source.recent_services(RECENT_PER_KIND)?;
        Ok(merge_activity(&users, &services))
    }

    pub fn users(&self) -> Result<Vec<UserRow>, DashboardError> {
        self.source.users()
    }

    pub fn services(&self) -> Result<Vec<ServiceRow>, DashboardError> {
        self.source.services()
    }

    pub fn apply_user_action(&self, id: &str, action: RowAction) -> Result<(), DashboardError> {
        let result = match action {
            RowAction::Delete => self.source.delete_user(id),
            RowAction::Suspend => self.source.set_user_status(id, AccountStatus::Suspended),
            RowAction::Activate => self.source.set_user_status(id, AccountStatus::Active),
        };
        log_action("user", id, action, &result);
        result
    }

    pub fn apply_service_action(&self, id: &str, action: RowAction) -> Result<(), DashboardError> {
        let result = match action {
            RowAction::Delete => self.source.delete_service(id),
            RowAction::Suspend => self.source.set_service_status(id, AccountStatus::Suspended),
            RowAction::Activate => self.source.set_service_status(id, AccountStatus::Active),
        };
        log_action("service", id, action, &result);
        result
    }

    fn record_failure(
        &self,
        snapshot: &mut DashboardSnapshot,
        section: DashboardSection,
        err: &DashboardError,
    ) {
        error!(?section, error = %err, "dashboard section failed to load");
        snapshot.failed_sections.push(section);
    }
}

fn log_action(kind: &str, id: &str, action: RowAction, result: &Result<(), DashboardError>) {
    match result {
        Ok(()) => info!(kind, id, action = action.label(), "admin action applied"),
        Err(err) => error!(kind, id, action = action.label(), error = %err, "admin action failed"),
    }
}
