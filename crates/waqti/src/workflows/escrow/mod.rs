//! Escrow oversight for administrators: held, released, disputed and refunded funds.

pub mod domain;
pub mod ledger;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    format_amount, Currency, EscrowAction, EscrowFilter, EscrowItem, EscrowStatus,
    EscrowStatusFilter, EscrowSummary,
};
pub use ledger::{export_csv, read_csv, write_csv, LedgerError, LEDGER_COLUMNS};
pub use repository::{EscrowRepository, EscrowRepositoryError};
pub use router::escrow_router;
pub use service::{EscrowError, EscrowListing, EscrowRow, EscrowService};
