//! CSV interchange for escrow items: export of the filtered listing and import of ledger
//! snapshots produced by the payments back office.

use std::io::{Read, Write};

use super::domain::EscrowItem;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid escrow CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write escrow export: {0}")]
    Io(#[from] std::io::Error),
    #[error("escrow row {row} is invalid: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Column order of the ledger interchange format; matches `EscrowItem` field order.
pub const LEDGER_COLUMNS: [&str; 14] = [
    "id",
    "project_id",
    "project_title",
    "client_id",
    "client_name",
    "freelancer_id",
    "freelancer_name",
    "amount",
    "currency",
    "status",
    "created_at",
    "due_date",
    "auto_release_date",
    "description",
];

/// Writes the header even when `items` is empty.
pub fn write_csv<W: Write>(items: &[EscrowItem], writer: W) -> Result<(), LedgerError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(LEDGER_COLUMNS)?;
    for item in items {
        csv_writer.serialize(item)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv(items: &[EscrowItem]) -> Result<Vec<u8>, LedgerError> {
    let mut buffer = Vec::new();
    write_csv(items, &mut buffer)?;
    Ok(buffer)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<EscrowItem>, LedgerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut items = Vec::new();
    for (index, record) in csv_reader.deserialize::<EscrowItem>().enumerate() {
        let item = record?;
        let row = index + 1;
        if item.id.is_empty() {
            return Err(LedgerError::InvalidRow {
                row,
                reason: "missing id".to_string(),
            });
        }
        if !item.amount.is_finite() || item.amount < 0.0 {
            return Err(LedgerError::InvalidRow {
                row,
                reason: format!("amount {} is not a positive number", item.amount),
            });
        }
        items.push(item);
    }
    Ok(items)
}
