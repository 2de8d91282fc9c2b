// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use cofre::application::{BankService, Session};
use cofre::storage::Repository;
use tempfile::TempDir;

/// Identifiers with valid check digits, safe for registration paths.
pub const CPF_ALICE: &str = "529.982.247-25";
pub const CPF_BOB: &str = "111.444.777-35";

pub const PASSWORD: &str = "correct horse";

/// Helper to create a test service with a temporary database
pub async fn test_bank() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Register an account and hand back an authenticated session for it.
pub async fn open_account(service: &BankService, cpf: &str) -> Result<Session> {
    service.register(cpf, PASSWORD).await?;
    let session = service.authenticate(cpf, PASSWORD).await?;
    Ok(session)
}

/// Raw repository handle onto the same database file, for tests that
/// need to adjust stored rows behind the service's back.
pub async fn raw_repository(temp: &TempDir) -> Result<Repository> {
    let db_path = temp.path().join("test.db");
    let url = format!("sqlite:{}", db_path.to_str().unwrap());
    Repository::connect(&url).await
}
