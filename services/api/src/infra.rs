use chrono::{DateTime, Duration, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use waqti::workflows::admin::{
    AccountStatus, Collection, CountQuery, DashboardError, DashboardSource, IdentityStatus,
    ServiceRow, ServiceSummary, UserRow, UserSummary,
};
use waqti::workflows::escrow::{
    read_csv, EscrowItem, EscrowRepository, EscrowRepositoryError, EscrowStatus, LedgerError,
};
use waqti::workflows::onboarding::{EmailProviderError, EmailVerificationProvider};
use waqti::workflows::saved_searches::{
    SavedSearch, SavedSearchRepository, SearchCategory, SearchRepositoryError,
};
use waqti::workflows::verification::{
    Attachment, FileStorage, RepositoryError, StorageError, StoredFile, SubmissionReceipt,
    VerificationSubmission, VerificationSubmitter,
};

const ESCROW_SEED: &str = include_str!("../data/escrow_seed.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemorySubmitter {
    submissions: Mutex<Vec<VerificationSubmission>>,
    sequence: AtomicU64,
}

impl InMemorySubmitter {
    pub(crate) fn submissions(&self) -> Vec<VerificationSubmission> {
        self.submissions
            .lock()
            .expect("submitter mutex poisoned")
            .clone()
    }
}

impl VerificationSubmitter for InMemorySubmitter {
    fn submit(
        &self,
        submission: &VerificationSubmission,
    ) -> Result<SubmissionReceipt, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let mut guard = self.submissions.lock().expect("submitter mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.record.user_id == submission.record.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(submission.clone());
        Ok(SubmissionReceipt {
            verification_id: format!("ver-{id:06}"),
            submitted_at: Utc::now(),
        })
    }
}

#[derive(Default)]
pub(crate) struct InMemoryFileStorage {
    files: Mutex<Vec<StoredFile>>,
}

impl InMemoryFileStorage {
    pub(crate) fn files(&self) -> Vec<StoredFile> {
        self.files.lock().expect("storage mutex poisoned").clone()
    }
}

impl FileStorage for InMemoryFileStorage {
    fn store(&self, attachment: &Attachment) -> Result<StoredFile, StorageError> {
        let extension = mime_guess::get_mime_extensions(attachment.content_type())
            .and_then(|extensions| extensions.first())
            .copied()
            .unwrap_or("bin");
        let file = StoredFile {
            attachment_id: attachment.id().clone(),
            kind: attachment.kind(),
            storage_key: format!("verification/{}.{extension}", attachment.id().0),
        };
        self.files
            .lock()
            .expect("storage mutex poisoned")
            .push(file.clone());
        Ok(file)
    }
}

/// Marketplace tables behind the admin dashboard, seeded with a small community.
pub(crate) struct InMemoryDashboard {
    users: Mutex<Vec<UserRow>>,
    services: Mutex<Vec<(String, ServiceRow)>>,
    bookings: Vec<DateTime<Utc>>,
    pending_verifications: Vec<DateTime<Utc>>,
    open_disputes: Vec<DateTime<Utc>>,
    revenue: f64,
}

fn user_row(
    id: &str,
    name: &str,
    email: &str,
    created_at: DateTime<Utc>,
    status: AccountStatus,
    verification_status: IdentityStatus,
) -> UserRow {
    UserRow {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: "+971 50 000 0000".to_string(),
        balance: 0.0,
        created_at,
        status,
        verification_status,
    }
}

fn service_row(
    id: &str,
    title: &str,
    category: &str,
    provider_name: &str,
    hourly_rate: f64,
    created_at: DateTime<Utc>,
) -> ServiceRow {
    ServiceRow {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        provider_name: provider_name.to_string(),
        hourly_rate,
        rating: 4.8,
        reviews_count: 12,
        status: AccountStatus::Active,
        created_at,
    }
}

impl InMemoryDashboard {
    pub(crate) fn seeded(now: DateTime<Utc>) -> Self {
        let days_ago = |days: i64| now - Duration::days(days);
        let users = vec![
            user_row("u1", "أحمد حسن", "ahmad@example.com", days_ago(3), AccountStatus::Active, IdentityStatus::Verified),
            user_row("u2", "سارة علي", "sara@example.com", days_ago(12), AccountStatus::Active, IdentityStatus::Pending),
            user_row("u3", "ليلى محمد", "layla@example.com", days_ago(45), AccountStatus::Suspended, IdentityStatus::Rejected),
            user_row("u4", "عمر خالد", "omar@example.com", days_ago(80), AccountStatus::Pending, IdentityStatus::Pending),
        ];
        let services = vec![
            (
                "u1".to_string(),
                service_row("s1", "تصميم شعار احترافي", "design", "أحمد حسن", 2.0, days_ago(1)),
            ),
            (
                "u2".to_string(),
                service_row("s2", "ترجمة عربي إنجليزي", "translation", "سارة علي", 1.5, days_ago(20)),
            ),
        ];
        Self {
            users: Mutex::new(users),
            services: Mutex::new(services),
            bookings: vec![days_ago(2), days_ago(9), days_ago(33)],
            pending_verifications: vec![days_ago(1), days_ago(4)],
            open_disputes: vec![days_ago(6)],
            revenue: 4_250.0,
        }
    }

    fn created_at(&self, collection: Collection) -> Vec<DateTime<Utc>> {
        match collection {
            Collection::Users => self
                .users
                .lock()
                .expect("dashboard mutex poisoned")
                .iter()
                .map(|user| user.created_at)
                .collect(),
            Collection::Services => self
                .services
                .lock()
                .expect("dashboard mutex poisoned")
                .iter()
                .map(|(_, service)| service.created_at)
                .collect(),
            Collection::Bookings => self.bookings.clone(),
            Collection::PendingVerifications => self.pending_verifications.clone(),
            Collection::OpenDisputes => self.open_disputes.clone(),
        }
    }
}

impl DashboardSource for InMemoryDashboard {
    fn count(&self, query: &CountQuery) -> Result<u64, DashboardError> {
        Ok(self
            .created_at(query.collection)
            .into_iter()
            .filter(|created_at| query.matches(*created_at))
            .count() as u64)
    }

    fn total_revenue(&self) -> Result<f64, DashboardError> {
        Ok(self.revenue)
    }

    fn recent_users(&self, limit: usize) -> Result<Vec<UserSummary>, DashboardError> {
        Ok(self
            .users()?
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
        let mut services = self.services.lock().expect("dashboard mutex poisoned").clone();
        services.sort_by(|(_, a), (_, b)| b.created_at.cmp(&a.created_at));
        Ok(services
            .into_iter()
            .take(limit)
            .map(|(provider_id, service)| ServiceSummary {
                id: service.id,
                title: service.title,
                provider_id,
                provider_name: Some(service.provider_name),
                created_at: service.created_at,
            })
            .collect())
    }

    fn users(&self) -> Result<Vec<UserRow>, DashboardError> {
        let mut users = self.users.lock().expect("dashboard mutex poisoned").clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    fn services(&self) -> Result<Vec<ServiceRow>, DashboardError> {
        let mut services: Vec<ServiceRow> = self
            .services
            .lock()
            .expect("dashboard mutex poisoned")
            .iter()
            .map(|(_, service)| service.clone())
            .collect();
        services.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(services)
    }

    fn set_user_status(&self, id: &str, status: AccountStatus) -> Result<(), DashboardError> {
        let mut guard = self.users.lock().expect("dashboard mutex poisoned");
        let user = guard
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
        let mut guard = self.users.lock().expect("dashboard mutex poisoned");
        let before = guard.len();
        guard.retain(|user| user.id != id);
        if guard.len() == before {
            return Err(DashboardError::NotFound {
                kind: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn set_service_status(&self, id: &str, status: AccountStatus) -> Result<(), DashboardError> {
        let mut guard = self.services.lock().expect("dashboard mutex poisoned");
        let (_, service) = guard
            .iter_mut()
            .find(|(_, service)| service.id == id)
            .ok_or_else(|| DashboardError::NotFound {
                kind: "service",
                id: id.to_string(),
            })?;
        service.status = status;
        Ok(())
    }

    fn delete_service(&self, id: &str) -> Result<(), DashboardError> {
        let mut guard = self.services.lock().expect("dashboard mutex poisoned");
        let before = guard.len();
        guard.retain(|(_, service)| service.id != id);
        if guard.len() == before {
            return Err(DashboardError::NotFound {
                kind: "service",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) struct InMemoryEscrow {
    items: Mutex<Vec<EscrowItem>>,
}

impl InMemoryEscrow {
    /// Items from the bundled ledger snapshot.
    pub(crate) fn seeded() -> Result<Self, LedgerError> {
        let items = read_csv(ESCROW_SEED.as_bytes())?;
        Ok(Self {
            items: Mutex::new(items),
        })
    }
}

impl EscrowRepository for InMemoryEscrow {
    fn list(&self) -> Result<Vec<EscrowItem>, EscrowRepositoryError> {
        Ok(self.items.lock().expect("escrow mutex poisoned").clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<EscrowItem>, EscrowRepositoryError> {
        let guard = self.items.lock().expect("escrow mutex poisoned");
        Ok(guard.iter().find(|item| item.id == id).cloned())
    }

    fn update_status(&self, id: &str, status: EscrowStatus) -> Result<(), EscrowRepositoryError> {
        let mut guard = self.items.lock().expect("escrow mutex poisoned");
        let item = guard
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(EscrowRepositoryError::NotFound)?;
        item.status = status;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemorySavedSearches {
    searches: Mutex<Vec<SavedSearch>>,
}

#[allow(clippy::too_many_arguments)]
fn seeded_search(
    id: &str,
    owner_id: &str,
    name: &str,
    query: &str,
    filters: &[(&str, &str)],
    category: SearchCategory,
    notifications: bool,
    is_public: bool,
    result_count: u32,
    created_at: DateTime<Utc>,
) -> SavedSearch {
    SavedSearch {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: name.to_string(),
        description: None,
        query: query.to_string(),
        filters: filters
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
        category,
        notifications,
        is_public,
        result_count,
        last_run: None,
        created_at,
    }
}

impl InMemorySavedSearches {
    pub(crate) fn seeded(owner_id: &str, now: DateTime<Utc>) -> Self {
        let searches = vec![
            seeded_search(
                "saved-react",
                owner_id,
                "مطورين React",
                "React developer",
                &[("category", "programming"), ("experience", "3+"), ("rating", "4+")],
                SearchCategory::Freelancers,
                true,
                false,
                23,
                now - Duration::days(2),
            ),
            seeded_search(
                "saved-design",
                owner_id,
                "مشاريع التصميم",
                "graphic design logo",
                &[("category", "design"), ("budget", "1000-5000"), ("urgency", "medium")],
                SearchCategory::Projects,
                true,
                true,
                15,
                now - Duration::days(5),
            ),
            seeded_search(
                "saved-translation",
                owner_id,
                "خدمات الترجمة",
                "translation arabic english",
                &[("category", "translation"), ("rating", "4.5+"), ("delivery", "fast")],
                SearchCategory::Services,
                false,
                false,
                8,
                now - Duration::days(9),
            ),
        ];
        Self {
            searches: Mutex::new(searches),
        }
    }
}

impl SavedSearchRepository for InMemorySavedSearches {
    fn list(&self, owner_id: &str) -> Result<Vec<SavedSearch>, SearchRepositoryError> {
        let guard = self.searches.lock().expect("saved search mutex poisoned");
        Ok(guard
            .iter()
            .filter(|search| search.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn fetch(&self, id: &str) -> Result<Option<SavedSearch>, SearchRepositoryError> {
        let guard = self.searches.lock().expect("saved search mutex poisoned");
        Ok(guard.iter().find(|search| search.id == id).cloned())
    }

    fn insert(&self, search: SavedSearch) -> Result<SavedSearch, SearchRepositoryError> {
        let mut guard = self.searches.lock().expect("saved search mutex poisoned");
        if guard.iter().any(|existing| existing.id == search.id) {
            return Err(SearchRepositoryError::Conflict);
        }
        guard.insert(0, search.clone());
        Ok(search)
    }

    fn update(&self, search: SavedSearch) -> Result<(), SearchRepositoryError> {
        let mut guard = self.searches.lock().expect("saved search mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == search.id) {
            Some(existing) => {
                *existing = search;
                Ok(())
            }
            None => Err(SearchRepositoryError::NotFound),
        }
    }

    fn delete(&self, id: &str) -> Result<(), SearchRepositoryError> {
        let mut guard = self.searches.lock().expect("saved search mutex poisoned");
        let before = guard.len();
        guard.retain(|search| search.id != id);
        if guard.len() == before {
            Err(SearchRepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

/// Mail provider that confirms an address after a fixed number of status checks.
pub(crate) struct ScriptedMailbox {
    checks_until_verified: AtomicU64,
    sent: AtomicU64,
}

impl ScriptedMailbox {
    pub(crate) fn new(checks_until_verified: u64) -> Self {
        Self {
            checks_until_verified: AtomicU64::new(checks_until_verified),
            sent: AtomicU64::new(0),
        }
    }

    pub(crate) fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

impl EmailVerificationProvider for ScriptedMailbox {
    fn resend(&self, _email: &str) -> Result<(), EmailProviderError> {
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_verified(&self, _email: &str) -> Result<bool, EmailProviderError> {
        let remaining = self.checks_until_verified.load(Ordering::Relaxed);
        if remaining == 0 {
            return Ok(true);
        }
        self.checks_until_verified
            .store(remaining - 1, Ordering::Relaxed);
        Ok(false)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Midnight UTC at the start of `date`.
pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}
