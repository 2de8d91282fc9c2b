use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, format_cents};

/// Transaction history plus the balance it adds up to, as returned by the
/// account service. `render` produces the display-ready report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub balance_cents: Cents,
    pub transactions: Vec<Transaction>,
}

impl Statement {
    pub fn render(&self) -> String {
        render_statement(self.balance_cents, &self.transactions)
    }
}

/// Render a statement: one line per transaction in insertion order, then the
/// current balance. Display formatting only; the amounts underneath stay
/// exact integer cents.
pub fn render_statement(balance_cents: Cents, transactions: &[Transaction]) -> String {
    let mut report = String::new();

    if transactions.is_empty() {
        report.push_str("No transactions recorded.\n");
    }
    for entry in transactions {
        report.push_str(&format!(
            "{}: {} on {}\n",
            entry.kind.label(),
            format_cents(entry.amount_cents),
            entry.date.format("%d/%m/%Y"),
        ));
    }
    report.push_str(&format!("Balance: {}\n", format_cents(balance_cents)));

    report
}
