use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    Account, Cents, Cpf, MAX_DAILY_WITHDRAWALS, Statement, Transaction, TransactionKind,
    WITHDRAWAL_CAP_CENTS, hash_password, verify_password,
};
use crate::storage::Repository;

use super::AppError;

/// Application service exposing the account operations of the branch.
/// Every client (CLI, exports, tests) goes through this layer; nothing
/// else touches the repository.
pub struct BankService {
    repo: Repository,
    locks: AccountLocks,
}

/// Proof of a successful authentication. Money and read operations take
/// one, and only `BankService::authenticate` can mint it, so a caller
/// cannot reach an account without first presenting credentials.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    cpf: Cpf,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cpf(&self) -> &Cpf {
        &self.cpf
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// Outcome of a successful deposit or withdrawal: the ledger entry as
/// recorded, plus the balance it left behind.
pub struct Receipt {
    pub transaction: Transaction,
    pub new_balance: Cents,
}

/// One async mutex per account, created on first use. A read-modify-write
/// on an account runs under its mutex so two mutations of the same account
/// never interleave; unrelated accounts proceed in parallel.
#[derive(Default)]
struct AccountLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountLocks {
    fn for_account(&self, cpf: &Cpf) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(cpf.as_str().to_string()).or_default().clone()
    }
}

impl BankService {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            locks: AccountLocks::default(),
        }
    }

    /// Initialize a new database at the given path and connect to it.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Open an account for a new holder. The identifier must carry valid
    /// check digits, and a second registration under the same identifier
    /// is refused. The new account starts with a zero balance.
    pub async fn register(&self, cpf: &str, password: &str) -> Result<Account, AppError> {
        let cpf = Cpf::validate(cpf)?;

        let lock = self.locks.for_account(&cpf);
        let _guard = lock.lock().await;

        if self.repo.get_account(&cpf).await?.is_some() {
            return Err(AppError::DuplicateIdentifier(cpf.formatted()));
        }

        let account = Account::new(cpf, hash_password(password));
        self.repo.create_account(&account).await?;
        Ok(account)
    }

    /// Authenticate an account holder. Lookup normalizes the identifier
    /// but skips the checksum, so a well-formed identifier that was never
    /// registered reports `AccountNotFound` rather than a digit error,
    /// letting the caller suggest registration instead.
    pub async fn authenticate(&self, cpf: &str, password: &str) -> Result<Session, AppError> {
        let cpf = Cpf::normalize(cpf)?;

        let account = self
            .repo
            .get_account(&cpf)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(cpf.formatted()))?;

        if !verify_password(password, &account.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        Ok(Session {
            id: Uuid::new_v4(),
            cpf,
            opened_at: Utc::now(),
        })
    }

    /// Credit the session's account. The withdrawal counters are left
    /// untouched; the balance update and the ledger entry land in one
    /// unit of work.
    pub async fn deposit(
        &self,
        session: &Session,
        amount_cents: Cents,
    ) -> Result<Receipt, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::NonPositiveAmount);
        }

        let lock = self.locks.for_account(session.cpf());
        let _guard = lock.lock().await;

        let account = self.account_for(session).await?;
        let new_balance = account
            .balance_cents
            .checked_add(amount_cents)
            .ok_or_else(|| anyhow::anyhow!("Deposit would overflow the balance"))?;

        let mut entry = Transaction::new(
            account.cpf.clone(),
            TransactionKind::Deposit,
            amount_cents,
            today(),
        );
        self.repo
            .record_transaction(
                new_balance,
                account.daily_withdrawals,
                account.last_withdrawal,
                &mut entry,
            )
            .await?;

        Ok(Receipt {
            transaction: entry,
            new_balance,
        })
    }

    /// Debit the session's account, subject to the R$ 500,00 cap per
    /// withdrawal, the three-per-day count, and the available balance,
    /// checked in that order. The first withdrawal on a new calendar date
    /// restarts the daily count.
    pub async fn withdraw(
        &self,
        session: &Session,
        amount_cents: Cents,
    ) -> Result<Receipt, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::NonPositiveAmount);
        }
        if amount_cents > WITHDRAWAL_CAP_CENTS {
            return Err(AppError::LimitExceeded {
                requested: amount_cents,
            });
        }

        let lock = self.locks.for_account(session.cpf());
        let _guard = lock.lock().await;

        let account = self.account_for(session).await?;
        let today = today();
        let count = account.withdrawals_today(today);
        if count >= MAX_DAILY_WITHDRAWALS {
            return Err(AppError::DailyCountExceeded);
        }
        if amount_cents > account.balance_cents {
            return Err(AppError::InsufficientFunds {
                balance: account.balance_cents,
                requested: amount_cents,
            });
        }

        let new_balance = account.balance_cents - amount_cents;
        let mut entry = Transaction::new(
            account.cpf.clone(),
            TransactionKind::Withdrawal,
            amount_cents,
            today,
        );
        self.repo
            .record_transaction(new_balance, count + 1, Some(today), &mut entry)
            .await?;

        Ok(Receipt {
            transaction: entry,
            new_balance,
        })
    }

    /// Current balance of the session's account.
    pub async fn balance(&self, session: &Session) -> Result<Cents, AppError> {
        Ok(self.account_for(session).await?.balance_cents)
    }

    /// Full transaction history of the session's account in chronological
    /// order, together with the current balance.
    pub async fn statement(&self, session: &Session) -> Result<Statement, AppError> {
        let account = self.account_for(session).await?;
        let transactions = self.repo.list_transactions(session.cpf()).await?;
        Ok(Statement {
            balance_cents: account.balance_cents,
            transactions,
        })
    }

    async fn account_for(&self, session: &Session) -> Result<Account, AppError> {
        self.repo
            .get_account(session.cpf())
            .await?
            .ok_or_else(|| AppError::AccountNotFound(session.cpf().formatted()))
    }
}

/// Operations run against the UTC calendar date. The daily withdrawal
/// count resets lazily when a withdrawal lands on a new date.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}
