use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, Cpf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            _ => None,
        }
    }

    /// Capitalized form used on rendered statements.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger entry. Entries are immutable and append-only: a successful
/// deposit or withdrawal records exactly one, nothing ever edits or deletes
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned ledger id; insertion order doubles as display order.
    pub id: i64,
    pub cpf: Cpf,
    pub kind: TransactionKind,
    /// Always positive; the direction is implied by `kind`.
    pub amount_cents: Cents,
    /// Calendar date of execution.
    pub date: NaiveDate,
}

impl Transaction {
    /// Create a new entry. The id is assigned by the repository on append.
    pub fn new(cpf: Cpf, kind: TransactionKind, amount_cents: Cents, date: NaiveDate) -> Self {
        assert!(amount_cents > 0, "transaction amount must be positive");
        Self {
            id: 0,
            cpf,
            kind,
            amount_cents,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cpf() -> Cpf {
        Cpf::validate("529.982.247-25").unwrap()
    }

    fn sample_date() -> NaiveDate {
        "2026-01-15".parse().unwrap()
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
            let s = kind.as_str();
            let parsed = TransactionKind::from_str(s).unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(TransactionKind::Deposit.label(), "Deposit");
        assert_eq!(TransactionKind::Withdrawal.label(), "Withdrawal");
    }

    #[test]
    fn test_create_transaction() {
        let entry = Transaction::new(
            sample_cpf(),
            TransactionKind::Deposit,
            10_000,
            sample_date(),
        );
        assert_eq!(entry.id, 0, "id is only known after the store appends");
        assert_eq!(entry.amount_cents, 10_000);
        assert_eq!(entry.kind, TransactionKind::Deposit);
    }

    #[test]
    #[should_panic(expected = "transaction amount must be positive")]
    fn test_transaction_requires_positive_amount() {
        Transaction::new(sample_cpf(), TransactionKind::Withdrawal, 0, sample_date());
    }
}
