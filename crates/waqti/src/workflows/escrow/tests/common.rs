use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::access::AccessPolicy;
use crate::workflows::escrow::domain::{Currency, EscrowItem, EscrowStatus};
use crate::workflows::escrow::repository::{EscrowRepository, EscrowRepositoryError};
use crate::workflows::escrow::service::EscrowService;

pub(super) fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub(super) fn now() -> DateTime<Utc> {
    date(2024, 2, 12)
}

pub(super) fn item(
    id: &str,
    project_title: &str,
    freelancer_name: &str,
    amount: f64,
    currency: Currency,
    status: EscrowStatus,
    auto_release_date: DateTime<Utc>,
) -> EscrowItem {
    EscrowItem {
        id: id.to_string(),
        project_id: format!("proj-{id}"),
        project_title: project_title.to_string(),
        client_id: format!("client-{id}"),
        client_name: "Advanced Tech Co".to_string(),
        freelancer_id: format!("freelancer-{id}"),
        freelancer_name: freelancer_name.to_string(),
        amount,
        currency,
        status,
        created_at: date(2024, 1, 15),
        due_date: date(2024, 2, 10),
        auto_release_date,
        description: format!("Escrow for {project_title}"),
    }
}

pub(super) fn seeded_items() -> Vec<EscrowItem> {
    vec![
        item(
            "esc1",
            "E-commerce website",
            "Ahmad Hassan",
            50.0,
            Currency::Hours,
            EscrowStatus::Held,
            date(2024, 2, 22),
        ),
        item(
            "esc2",
            "Visual identity",
            "Sara Ali",
            2500.0,
            Currency::Aed,
            EscrowStatus::Held,
            date(2024, 2, 17),
        ),
        item(
            "esc3",
            "Technical book translation",
            "Layla Mohammed",
            30.0,
            Currency::Hours,
            EscrowStatus::Disputed,
            date(2024, 2, 8),
        ),
        item(
            "esc4",
            "Data cleanup",
            "Omar Khalid",
            12.0,
            Currency::Hours,
            EscrowStatus::Released,
            date(2024, 1, 30),
        ),
    ]
}

#[derive(Default)]
pub(super) struct MemoryEscrow {
    items: Mutex<Vec<EscrowItem>>,
}

impl MemoryEscrow {
    pub(super) fn with_items(items: Vec<EscrowItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub(super) fn status_of(&self, id: &str) -> Option<EscrowStatus> {
        self.items
            .lock()
            .expect("escrow mutex poisoned")
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.status)
    }
}

impl EscrowRepository for MemoryEscrow {
    fn list(&self) -> Result<Vec<EscrowItem>, EscrowRepositoryError> {
        Ok(self.items.lock().expect("escrow mutex poisoned").clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<EscrowItem>, EscrowRepositoryError> {
        Ok(self
            .items
            .lock()
            .expect("escrow mutex poisoned")
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    fn update_status(&self, id: &str, status: EscrowStatus) -> Result<(), EscrowRepositoryError> {
        let mut items = self.items.lock().expect("escrow mutex poisoned");
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(EscrowRepositoryError::NotFound)?;
        item.status = status;
        Ok(())
    }
}

pub(super) struct OfflineEscrow;

impl EscrowRepository for OfflineEscrow {
    fn list(&self) -> Result<Vec<EscrowItem>, EscrowRepositoryError> {
        Err(EscrowRepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn fetch(&self, _id: &str) -> Result<Option<EscrowItem>, EscrowRepositoryError> {
        Err(EscrowRepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn update_status(&self, _id: &str, _status: EscrowStatus) -> Result<(), EscrowRepositoryError> {
        Err(EscrowRepositoryError::Unavailable("ledger offline".to_string()))
    }
}

pub(super) fn build_service() -> (EscrowService<MemoryEscrow>, Arc<MemoryEscrow>) {
    let repository = Arc::new(MemoryEscrow::with_items(seeded_items()));
    let service = EscrowService::new(repository.clone(), AccessPolicy::default());
    (service, repository)
}
