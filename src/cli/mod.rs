use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{AppError, BankService, Session};
use crate::domain::{format_cents, parse_cents};

/// Cofre - Retail Banking Ledger
#[derive(Parser)]
#[command(name = "cofre")]
#[command(about = "A single-branch retail banking ledger for the command line")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "cofre.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Open an account for a new holder
    Register {
        /// Holder CPF, with or without punctuation (e.g., "529.982.247-25")
        cpf: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Deposit into an account
    Deposit {
        /// Amount to deposit (e.g., "100", "100.00" or "1.234,56")
        amount: String,

        /// Holder CPF
        #[arg(long)]
        cpf: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Withdraw from an account
    Withdraw {
        /// Amount to withdraw (e.g., "50" or "50,00")
        amount: String,

        /// Holder CPF
        #[arg(long)]
        cpf: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Show the current balance of an account
    Balance {
        /// Holder CPF
        #[arg(long)]
        cpf: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Print or export the full account statement
    Statement {
        /// Holder CPF
        #[arg(long)]
        cpf: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Output format: text, csv, json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                BankService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Register { cpf, password } => {
                let service = BankService::connect(&self.database).await?;
                let account = service.register(&cpf, &password).await?;
                println!("Account opened for {}", account.cpf.formatted());
            }

            Commands::Deposit {
                amount,
                cpf,
                password,
            } => {
                let service = BankService::connect(&self.database).await?;
                let amount_cents = parse_cents(&amount)
                    .context("Invalid amount format. Use '100', '100.00' or '1.234,56'")?;

                let session = open_session(&service, &cpf, &password, self.verbose).await?;
                let receipt = service.deposit(&session, amount_cents).await?;

                println!(
                    "Deposited {} into {}",
                    format_cents(receipt.transaction.amount_cents),
                    session.cpf().formatted()
                );
                println!("New balance: {}", format_cents(receipt.new_balance));
            }

            Commands::Withdraw {
                amount,
                cpf,
                password,
            } => {
                let service = BankService::connect(&self.database).await?;
                let amount_cents = parse_cents(&amount)
                    .context("Invalid amount format. Use '50', '50.00' or '50,00'")?;

                let session = open_session(&service, &cpf, &password, self.verbose).await?;
                let receipt = service.withdraw(&session, amount_cents).await?;

                println!(
                    "Withdrew {} from {}",
                    format_cents(receipt.transaction.amount_cents),
                    session.cpf().formatted()
                );
                println!("New balance: {}", format_cents(receipt.new_balance));
            }

            Commands::Balance { cpf, password } => {
                let service = BankService::connect(&self.database).await?;
                let session = open_session(&service, &cpf, &password, self.verbose).await?;
                let balance = service.balance(&session).await?;
                println!("Balance: {}", format_cents(balance));
            }

            Commands::Statement {
                cpf,
                password,
                format,
                output,
            } => {
                let service = BankService::connect(&self.database).await?;
                let session = open_session(&service, &cpf, &password, self.verbose).await?;
                run_statement_command(&service, &session, &format, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

/// Authenticate and report the session when verbose. An unknown but
/// well-formed identifier gets a hint towards `register` instead of a
/// bare lookup failure.
async fn open_session(
    service: &BankService,
    cpf: &str,
    password: &str,
    verbose: bool,
) -> Result<Session> {
    let session = match service.authenticate(cpf, password).await {
        Ok(session) => session,
        Err(AppError::AccountNotFound(id)) => {
            anyhow::bail!(
                "No account found for {}. Open one with: cofre register {} --password <password>",
                id,
                id
            );
        }
        Err(err) => return Err(err.into()),
    };

    if verbose {
        eprintln!(
            "[session {}] {} authenticated at {}",
            session.id(),
            session.cpf().formatted(),
            session.opened_at().format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(session)
}

async fn run_statement_command(
    service: &BankService,
    session: &Session,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    // Determine output writer
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "text" => {
            let statement = service.statement(session).await?;
            writer.write_all(statement.render().as_bytes())?;
            if output.is_some() {
                eprintln!("Wrote statement for {}", session.cpf().formatted());
            }
        }
        "csv" => {
            let exporter = Exporter::new(service);
            let count = exporter.export_statement_csv(session, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "json" => {
            let exporter = Exporter::new(service);
            exporter.export_statement_json(session, writer).await?;
            if output.is_some() {
                eprintln!("Exported statement for {}", session.cpf().formatted());
            }
        }
        _ => {
            anyhow::bail!("Invalid format '{}'. Valid formats: text, csv, json", format);
        }
    }

    Ok(())
}
