mod common;

use anyhow::Result;
use cofre::application::{AppError, BankService};
use common::{CPF_ALICE, CPF_BOB, PASSWORD, open_account, test_bank};

#[tokio::test]
async fn test_register_and_authenticate() -> Result<()> {
    let (service, _temp) = test_bank().await?;

    let account = service.register(CPF_ALICE, PASSWORD).await?;
    assert_eq!(account.cpf.as_str(), "52998224725");
    assert_eq!(account.balance_cents, 0);

    let session = service.authenticate(CPF_ALICE, PASSWORD).await?;
    assert_eq!(session.cpf().as_str(), "52998224725");

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_bad_check_digits() -> Result<()> {
    let (service, _temp) = test_bank().await?;

    let result = service.register("529.982.247-26", PASSWORD).await;
    assert!(matches!(result, Err(AppError::InvalidIdentifier(_))));

    let result = service.register("111.111.111-11", PASSWORD).await;
    assert!(matches!(result, Err(AppError::InvalidIdentifier(_))));

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_duplicate() -> Result<()> {
    let (service, _temp) = test_bank().await?;

    service.register(CPF_ALICE, PASSWORD).await?;
    let result = service.register(CPF_ALICE, "another password").await;
    assert!(matches!(result, Err(AppError::DuplicateIdentifier(_))));

    // The stored credentials are still the original ones
    let session = service.authenticate(CPF_ALICE, PASSWORD).await?;
    assert_eq!(session.cpf().as_str(), "52998224725");

    Ok(())
}

#[tokio::test]
async fn test_identifier_spellings_reach_the_same_account() -> Result<()> {
    let (service, _temp) = test_bank().await?;

    // 9 digits pad to 11, so registering the short form and logging in
    // with the padded form is the same account
    service.register("123456797", PASSWORD).await?;
    let session = service.authenticate("00123456797", PASSWORD).await?;
    assert_eq!(session.cpf().as_str(), "00123456797");

    let result = service.register("001.234.567-97", PASSWORD).await;
    assert!(matches!(result, Err(AppError::DuplicateIdentifier(_))));

    Ok(())
}

#[tokio::test]
async fn test_authenticate_wrong_password() -> Result<()> {
    let (service, _temp) = test_bank().await?;

    service.register(CPF_ALICE, PASSWORD).await?;
    let result = service.authenticate(CPF_ALICE, "not it").await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn test_authenticate_unknown_account() -> Result<()> {
    let (service, _temp) = test_bank().await?;

    let result = service.authenticate(CPF_BOB, PASSWORD).await;
    assert!(matches!(result, Err(AppError::AccountNotFound(_))));

    // Lookup does not re-run the checksum: a normalizable identifier that
    // was never registered is a missing account, not a digit error
    let result = service.authenticate("111.111.111-11", PASSWORD).await;
    assert!(matches!(result, Err(AppError::AccountNotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_new_account_starts_empty() -> Result<()> {
    let (service, _temp) = test_bank().await?;
    let session = open_account(&service, CPF_ALICE).await?;

    assert_eq!(service.balance(&session).await?, 0);

    let statement = service.statement(&session).await?;
    assert!(statement.transactions.is_empty());
    assert_eq!(statement.balance_cents, 0);

    Ok(())
}

#[tokio::test]
async fn test_accounts_persist_across_reconnect() -> Result<()> {
    let (service, temp) = test_bank().await?;
    let session = open_account(&service, CPF_ALICE).await?;
    service.deposit(&session, 12_500).await?;
    drop(session);
    drop(service);

    let db_path = temp.path().join("test.db");
    let service = BankService::connect(db_path.to_str().unwrap()).await?;

    let session = service.authenticate(CPF_ALICE, PASSWORD).await?;
    assert_eq!(service.balance(&session).await?, 12_500);

    let statement = service.statement(&session).await?;
    assert_eq!(statement.transactions.len(), 1);

    Ok(())
}
