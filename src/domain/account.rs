use chrono::{DateTime, NaiveDate, Utc};

use super::{Cents, Cpf};

/// Fixed per-transaction withdrawal cap: R$ 500,00.
pub const WITHDRAWAL_CAP_CENTS: Cents = 50_000;

/// Maximum number of withdrawals allowed on a single calendar date.
pub const MAX_DAILY_WITHDRAWALS: i64 = 3;

/// A customer account at the branch. Created once at registration, mutated
/// only by deposits and withdrawals, never deleted.
#[derive(Debug, Clone)]
pub struct Account {
    pub cpf: Cpf,
    /// Salted hash in the `"<salt>$<hex digest>"` form of `domain::password`.
    pub password_hash: String,
    /// Never negative at rest; the schema enforces the same bound.
    pub balance_cents: Cents,
    /// Withdrawals counted on `last_withdrawal`.
    pub daily_withdrawals: i64,
    /// Calendar date of the most recent successful withdrawal.
    pub last_withdrawal: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Fresh account: zero balance, counters cleared.
    pub fn new(cpf: Cpf, password_hash: String) -> Self {
        Self {
            cpf,
            password_hash,
            balance_cents: 0,
            daily_withdrawals: 0,
            last_withdrawal: None,
            created_at: Utc::now(),
        }
    }

    /// Withdrawals already executed on `today`. The stored counter only
    /// counts while `last_withdrawal` is still the same date; any other
    /// date starts the day at zero.
    pub fn withdrawals_today(&self, today: NaiveDate) -> i64 {
        match self.last_withdrawal {
            Some(date) if date == today => self.daily_withdrawals,
            _ => 0,
        }
    }
}
