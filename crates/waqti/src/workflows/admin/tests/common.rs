use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::access::{AccessPolicy, CurrentUser};
use crate::workflows::admin::domain::{
    AccountStatus, IdentityStatus, ServiceRow, ServiceSummary, UserRow, UserSummary,
};
use crate::workflows::admin::service::AdminDashboardService;
use crate::workflows::admin::source::{Collection, CountQuery, DashboardError, DashboardSource};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn admin() -> CurrentUser {
    CurrentUser {
        id: "admin".to_string(),
        name: "Operator".to_string(),
        email: "ops@waqti.com".to_string(),
    }
}

pub(super) fn user_row(id: &str, name: &str, email: &str, created_days_ago: i64) -> UserRow {
    UserRow {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: String::new(),
        balance: 0.0,
        created_at: days_ago(created_days_ago),
        status: AccountStatus::Active,
        verification_status: IdentityStatus::Verified,
    }
}

pub(super) fn service_row(id: &str, title: &str, provider: &str, created_days_ago: i64) -> ServiceRow {
    ServiceRow {
        id: id.to_string(),
        title: title.to_string(),
        category: "design".to_string(),
        provider_name: provider.to_string(),
        hourly_rate: 2.0,
        rating: 4.5,
        reviews_count: 3,
        status: AccountStatus::Active,
        created_at: days_ago(created_days_ago),
    }
}

#[derive(Default)]
pub(super) struct MemoryDashboard {
    pub(super) users: Mutex<Vec<UserRow>>,
    pub(super) services: Mutex<Vec<ServiceRow>>,
    pub(super) counts: HashMap<Collection, u64>,
    pub(super) revenue: f64,
    pub(super) fail_users: bool,
    pub(super) fail_counts: bool,
}

impl MemoryDashboard {
    pub(super) fn seeded() -> Self {
        let users = vec![
            user_row("u1", "Sara Ali", "sara@example.com", 2),
            user_row("u2", "Omar Khalid", "omar@example.com", 10),
            user_row("u3", "Mona Saeed", "mona@example.com", 40),
            user_row("u4", "Yousef Adel", "yousef@example.com", 75),
            user_row("u5", "Huda Nasser", "huda@example.com", 70),
            user_row("u6", "Ali Hassan", "ali@example.com", 90),
        ];
        let services = vec![
            service_row("s1", "Logo design", "Sara Ali", 1),
            service_row("s2", "Arabic translation", "Omar Khalid", 5),
            service_row("s3", "Tutoring", "Mona Saeed", 50),
        ];
        let mut counts = HashMap::new();
        counts.insert(Collection::Bookings, 12);
        counts.insert(Collection::PendingVerifications, 3);
        counts.insert(Collection::OpenDisputes, 1);
        Self {
            users: Mutex::new(users),
            services: Mutex::new(services),
            counts,
            revenue: 4200.0,
            ..Self::default()
        }
    }

    pub(super) fn user_status(&self, id: &str) -> Option<AccountStatus> {
        self.users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|user| user.id == id)
            .map(|user| user.status)
    }
}

fn offline() -> DashboardError {
    DashboardError::Unavailable("database offline".to_string())
}

impl DashboardSource for MemoryDashboard {
    fn count(&self, query: &CountQuery) -> Result<u64, DashboardError> {
        if self.fail_counts {
            return Err(offline());
        }
        let count = match query.collection {
            Collection::Users => self
                .users
                .lock()
                .expect("users mutex poisoned")
                .iter()
                .filter(|user| query.matches(user.created_at))
                .count() as u64,
            Collection::Services => self
                .services
                .lock()
                .expect("services mutex poisoned")
                .iter()
                .filter(|service| query.matches(service.created_at))
                .count() as u64,
            other => self.counts.get(&other).copied().unwrap_or_default(),
        };
        Ok(count)
    }

    fn total_revenue(&self) -> Result<f64, DashboardError> {
        Ok(self.revenue)
    }

    fn recent_users(&self, limit: usize) -> Result<Vec<UserSummary>, DashboardError> {
        let users = self.users()?;
        Ok(users
            .into_iter()
            .take(limit)
            .map(|user| UserSummary {
                id: user.id,
                name: user.name,
                created_at: user.created_at,
            })
            .collect())
    }

    fn recent_services(&self, limit: usize) -> Result<Vec<ServiceSummary>, DashboardError> {
        let services = self.services()?;
        Ok(services
            .into_iter()
            .take(limit)
            .map(|service| ServiceSummary {
                provider_id: format!("provider-{}", service.id),
                provider_name: Some(service.provider_name),
                id: service.id,
                title: service.title,
                created_at: service.created_at,
            })
            .collect())
    }

    fn users(&self) -> Result<Vec<UserRow>, DashboardError> {
        if self.fail_users {
            return Err(offline());
        }
        let mut users = self.users.lock().expect("users mutex poisoned").clone();
        users.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(users)
    }

    fn services(&self) -> Result<Vec<ServiceRow>, DashboardError> {
        let mut services = self.services.lock().expect("services mutex poisoned").clone();
        services.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(services)
    }

    fn set_user_status(&self, id: &str, status: AccountStatus) -> Result<(), DashboardError> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| DashboardError::NotFound {
                kind: "user",
                id: id.to_string(),
            })?;
        user.status = status;
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<(), DashboardError> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        let before = users.len();
        users.retain(|user| user.id != id);
        if users.len() == before {
            return Err(DashboardError::NotFound {
                kind: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn set_service_status(&self, id: &str, status: AccountStatus) -> Result<(), DashboardError> {
        let mut services = self.services.lock().expect("services mutex poisoned");
        let service = services
            .iter_mut()
            .find(|service| service.id == id)
            .ok_or_else(|| DashboardError::NotFound {
                kind: "service",
                id: id.to_string(),
            })?;
        service.status = status;
        Ok(())
    }

    fn delete_service(&self, id: &str) -> Result<(), DashboardError> {
        let mut services = self.services.lock().expect("services mutex poisoned");
        services.retain(|service| service.id != id);
        Ok(())
    }
}

pub(super) fn build_service(
    source: MemoryDashboard,
) -> (AdminDashboardService<MemoryDashboard>, Arc<MemoryDashboard>) {
    let source = Arc::new(source);
    let service = AdminDashboardService::new(source.clone(), AccessPolicy::default());
    (service, source)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
