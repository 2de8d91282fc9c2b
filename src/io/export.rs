use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::{BankService, Session};
use crate::domain::{Cents, Transaction};

/// Writes account statements to open formats. Borrows the service; the
/// caller keeps ownership of the connection and of authentication.
pub struct Exporter<'a> {
    service: &'a BankService,
}

/// Everything a statement export carries, tagged with the crate version
/// that produced it.
#[derive(Serialize)]
pub struct StatementSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub cpf: String,
    pub balance_cents: Cents,
    pub transactions: Vec<Transaction>,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a BankService) -> Self {
        Self { service }
    }

    /// Write the session's ledger entries as CSV, one row per entry in
    /// chronological order. Returns the number of entries written.
    pub async fn export_statement_csv<W: Write>(
        &self,
        session: &Session,
        writer: W,
    ) -> Result<usize> {
        let statement = self.service.statement(session).await?;

        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&["id", "kind", "amount_cents", "date"])?;
        for entry in &statement.transactions {
            wtr.write_record(&[
                entry.id.to_string(),
                entry.kind.as_str().to_string(),
                entry.amount_cents.to_string(),
                entry.date.format("%Y-%m-%d").to_string(),
            ])?;
        }
        wtr.flush()?;

        Ok(statement.transactions.len())
    }

    /// Write the session's full statement as a pretty-printed JSON
    /// snapshot.
    pub async fn export_statement_json<W: Write>(
        &self,
        session: &Session,
        writer: W,
    ) -> Result<()> {
        let statement = self.service.statement(session).await?;

        let snapshot = StatementSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            cpf: session.cpf().formatted(),
            balance_cents: statement.balance_cents,
            transactions: statement.transactions,
        };
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }
}
