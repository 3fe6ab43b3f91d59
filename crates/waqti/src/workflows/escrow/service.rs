use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::access::AccessPolicy;

use super::domain::{EscrowAction, EscrowFilter, EscrowItem, EscrowStatus, EscrowSummary};
use super::ledger::{self, LedgerError};
use super::repository::{EscrowRepository, EscrowRepositoryError};

/// Listing row with the derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscrowRow {
    #[serde(flatten)]
    pub item: EscrowItem,
    pub amount_display: String,
    pub status_label: &'static str,
    /// Only meaningful while funds are held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_auto_release: Option<i64>,
    pub actionable: bool,
}

impl EscrowRow {
    pub fn new(item: EscrowItem, now: DateTime<Utc>) -> Self {
        let days_until_auto_release =
            (item.status == EscrowStatus::Held).then(|| item.days_until_auto_release(now));
        Self {
            amount_display: item.amount_display(),
            status_label: item.status.display_label(),
            actionable: item.status.is_open(),
            days_until_auto_release,
            item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscrowListing {
    pub items: Vec<EscrowRow>,
    pub summary: EscrowSummary,
}

pub struct EscrowService<R> {
    repository: Arc<R>,
    policy: AccessPolicy,
}

impl<R> EscrowService<R>
where
    R: EscrowRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: AccessPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn listing(
        &self,
        filter: &EscrowFilter,
        now: DateTime<Utc>,
    ) -> Result<EscrowListing, EscrowError> {
        let items = self.repository.list()?;
        let summary = EscrowSummary::from_items(&items);
        let items = filter
            .apply(&items)
            .into_iter()
            .map(|item| EscrowRow::new(item, now))
            .collect();
        Ok(EscrowListing { items, summary })
    }

    pub fn release(&self, id: &str) -> Result<EscrowItem, EscrowError> {
        self.settle(id, EscrowAction::Release)
    }

    pub fn refund(&self, id: &str) -> Result<EscrowItem, EscrowError> {
        self.settle(id, EscrowAction::Refund)
    }

    pub fn settle(&self, id: &str, action: EscrowAction) -> Result<EscrowItem, EscrowError> {
        let mut item = self
            .repository
            .fetch(id)?
            .ok_or_else(|| EscrowError::NotFound(id.to_string()))?;

        if !item.status.is_open() {
            warn!(escrow_id = id, status = item.status.code(), action = action.label(), "escrow action refused");
            return Err(EscrowError::InvalidTransition {
                id: id.to_string(),
                from: item.status,
                action,
            });
        }

        let target = action.target();
        self.repository.update_status(id, target)?;
        info!(escrow_id = id, action = action.label(), amount = %item.amount_display(), "escrow settled");
        item.status = target;
        Ok(item)
    }

    pub fn export(&self, filter: &EscrowFilter) -> Result<Vec<u8>, EscrowError> {
        let items = filter.apply(&self.repository.list()?);
        Ok(ledger::export_csv(&items)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EscrowError {
    #[error("escrow item '{0}' not found")]
    NotFound(String),
    #[error("cannot {} escrow '{id}' while it is {}", .action.label(), .from.code())]
    InvalidTransition {
        id: String,
        from: EscrowStatus,
        action: EscrowAction,
    },
    #[error(transparent)]
    Repository(#[from] EscrowRepositoryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
