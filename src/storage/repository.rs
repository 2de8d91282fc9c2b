use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::{Account, Cents, Cpf, Transaction, TransactionKind};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository over the two durable stores: the accounts table (identity)
/// and the append-only transactions table (ledger). Writes that must land
/// together go through `record_transaction`.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a freshly registered account.
    pub async fn create_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (cpf, password_hash, balance_cents, daily_withdrawals, last_withdrawal, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.cpf.as_str())
        .bind(&account.password_hash)
        .bind(account.balance_cents)
        .bind(account.daily_withdrawals)
        .bind(
            account
                .last_withdrawal
                .map(|d| d.format(DATE_FORMAT).to_string()),
        )
        .bind(account.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to create account")?;
        Ok(())
    }

    /// Look up an account by its canonical identifier.
    pub async fn get_account(&self, cpf: &Cpf) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT cpf, password_hash, balance_cents, daily_withdrawals, last_withdrawal, created_at
            FROM accounts
            WHERE cpf = ?
            "#,
        )
        .bind(cpf.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// Overwrite an account's balance and withdrawal counters. Errors if no
    /// account row matched.
    pub async fn update_balance_and_counters(
        &self,
        cpf: &Cpf,
        new_balance: Cents,
        new_daily_withdrawals: i64,
        new_last_withdrawal: Option<NaiveDate>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE accounts SET balance_cents = ?, daily_withdrawals = ?, last_withdrawal = ? WHERE cpf = ?",
        )
        .bind(new_balance)
        .bind(new_daily_withdrawals)
        .bind(new_last_withdrawal.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(cpf.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to update account")?;

        if result.rows_affected() != 1 {
            anyhow::bail!("No account row for {}", cpf.as_str());
        }
        Ok(())
    }

    // ========================
    // Ledger operations
    // ========================

    /// Persist the outcome of a deposit or withdrawal as one unit of work:
    /// the account-row update and the appended ledger entry commit together
    /// or not at all. Assigns the entry's ledger id on success.
    pub async fn record_transaction(
        &self,
        new_balance: Cents,
        new_daily_withdrawals: i64,
        new_last_withdrawal: Option<NaiveDate>,
        entry: &mut Transaction,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin unit of work")?;

        let updated = sqlx::query(
            "UPDATE accounts SET balance_cents = ?, daily_withdrawals = ?, last_withdrawal = ? WHERE cpf = ?",
        )
        .bind(new_balance)
        .bind(new_daily_withdrawals)
        .bind(new_last_withdrawal.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(entry.cpf.as_str())
        .execute(&mut *tx)
        .await
        .context("Failed to update account balance")?;

        // Dropping `tx` without commit rolls the update back
        if updated.rows_affected() != 1 {
            anyhow::bail!("No account row for {}", entry.cpf.as_str());
        }

        let row = sqlx::query(
            r#"
            INSERT INTO transactions (cpf, kind, amount_cents, date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(entry.cpf.as_str())
        .bind(entry.kind.as_str())
        .bind(entry.amount_cents)
        .bind(entry.date.format(DATE_FORMAT).to_string())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to append transaction")?;

        entry.id = row.get("id");

        tx.commit().await.context("Failed to commit unit of work")?;
        Ok(())
    }

    /// List an account's transactions in insertion order.
    pub async fn list_transactions(&self, cpf: &Cpf) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, cpf, kind, amount_cents, date
            FROM transactions
            WHERE cpf = ?
            ORDER BY id
            "#,
        )
        .bind(cpf.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let cpf_str: String = row.get("cpf");
        let last_withdrawal_str: Option<String> = row.get("last_withdrawal");
        let created_at_str: String = row.get("created_at");

        Ok(Account {
            cpf: Cpf::normalize(&cpf_str).context("Invalid identifier in accounts row")?,
            password_hash: row.get("password_hash"),
            balance_cents: row.get("balance_cents"),
            daily_withdrawals: row.get("daily_withdrawals"),
            last_withdrawal: last_withdrawal_str
                .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
                .transpose()
                .context("Invalid last_withdrawal date")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let cpf_str: String = row.get("cpf");
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");

        Ok(Transaction {
            id: row.get("id"),
            cpf: Cpf::normalize(&cpf_str).context("Invalid identifier in transactions row")?,
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            amount_cents: row.get("amount_cents"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid transaction date")?,
        })
    }
}
