use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "hours")]
    Hours,
    #[serde(rename = "AED")]
    Aed,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Hours => "hours",
            Currency::Aed => "AED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Held,
    Released,
    Disputed,
    Refunded,
}

impl EscrowStatus {
    pub const fn code(self) -> &'static str {
        match self {
            EscrowStatus::Held => "held",
            EscrowStatus::Released => "released",
            EscrowStatus::Disputed => "disputed",
            EscrowStatus::Refunded => "refunded",
        }
    }

    /// Label shown in the Arabic admin console.
    pub const fn display_label(self) -> &'static str {
        match self {
            EscrowStatus::Held => "محجوز",
            EscrowStatus::Released => "مُطلق",
            EscrowStatus::Disputed => "متنازع عليه",
            EscrowStatus::Refunded => "مُسترد",
        }
    }

    /// Only held funds can be released or refunded; disputes are settled elsewhere.
    pub const fn is_open(self) -> bool {
        matches!(self, EscrowStatus::Held)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowItem {
    pub id: String,
    pub project_id: String,
    pub project_title: String,
    pub client_id: String,
    pub client_name: String,
    pub freelancer_id: String,
    pub freelancer_name: String,
    pub amount: f64,
    pub currency: Currency,
    pub status: EscrowStatus,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub auto_release_date: DateTime<Utc>,
    pub description: String,
}

impl EscrowItem {
    pub fn amount_display(&self) -> String {
        format_amount(self.amount, self.currency)
    }

    /// Whole days left before funds release themselves, rounded up. Zero or less means overdue.
    pub fn days_until_auto_release(&self, now: DateTime<Utc>) -> i64 {
        let seconds = (self.auto_release_date - now).num_seconds();
        seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
    }
}

pub fn format_amount(amount: f64, currency: Currency) -> String {
    match currency {
        Currency::Hours => format!("{amount} ساعة"),
        Currency::Aed => format!("{amount} AED"),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatusFilter {
    #[default]
    All,
    Held,
    Released,
    Disputed,
    Refunded,
}

impl EscrowStatusFilter {
    pub fn matches(self, status: EscrowStatus) -> bool {
        match self {
            EscrowStatusFilter::All => true,
            EscrowStatusFilter::Held => status == EscrowStatus::Held,
            EscrowStatusFilter::Released => status == EscrowStatus::Released,
            EscrowStatusFilter::Disputed => status == EscrowStatus::Disputed,
            EscrowStatusFilter::Refunded => status == EscrowStatus::Refunded,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EscrowFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: EscrowStatusFilter,
}

impl EscrowFilter {
    pub fn matches(&self, item: &EscrowItem) -> bool {
        let term = self.search.trim().to_lowercase();
        let matches_search = term.is_empty()
            || [&item.project_title, &item.client_name, &item.freelancer_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
        matches_search && self.status.matches(item.status)
    }

    pub fn apply(&self, items: &[EscrowItem]) -> Vec<EscrowItem> {
        items.iter().filter(|item| self.matches(item)).cloned().collect()
    }
}

/// Totals across every escrow item, independent of the active filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EscrowSummary {
    pub held_count: usize,
    pub held_hours: f64,
    pub held_aed: f64,
    pub disputed_count: usize,
}

impl EscrowSummary {
    pub fn from_items(items: &[EscrowItem]) -> Self {
        items.iter().fold(Self::default(), |mut summary, item| {
            match (item.status, item.currency) {
                (EscrowStatus::Held, Currency::Hours) => {
                    summary.held_count += 1;
                    summary.held_hours += item.amount;
                }
                (EscrowStatus::Held, Currency::Aed) => {
                    summary.held_count += 1;
                    summary.held_aed += item.amount;
                }
                (EscrowStatus::Disputed, _) => summary.disputed_count += 1,
                _ => {}
            }
            summary
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowAction {
    Release,
    Refund,
}

impl EscrowAction {
    pub const fn label(self) -> &'static str {
        match self {
            EscrowAction::Release => "release",
            EscrowAction::Refund => "refund",
        }
    }

    pub const fn target(self) -> EscrowStatus {
        match self {
            EscrowAction::Release => EscrowStatus::Released,
            EscrowAction::Refund => EscrowStatus::Refunded,
        }
    }
}
