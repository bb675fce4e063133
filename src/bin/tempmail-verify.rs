//! Command-line entry point: prints the verification code of a temporary mailbox.
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`
//! (default `tempmail_verify=info`). Values may also come from a `.env` file.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tempmail_verify::{TempMailClient, TempMailConfig};
use tracing_subscriber::EnvFilter;

/// Fetch a six-digit verification code from a tempmail.plus mailbox.
#[derive(Debug, Parser)]
#[command(name = "tempmail-verify", version)]
struct Cli {
    /// Temporary mailbox address.
    #[arg(long, env = "TEMPMAIL_ADDRESS", value_name = "EMAIL")]
    address: String,

    /// Mailbox access token (PIN); empty for unprotected mailboxes.
    #[arg(
        long,
        env = "TEMPMAIL_EPIN",
        value_name = "PIN",
        default_value = "",
        hide_env_values = true
    )]
    epin: String,

    /// Provider API root.
    #[arg(long, env = "TEMPMAIL_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Attempts before giving up on transient failures.
    #[arg(long, value_name = "N", default_value_t = 5)]
    max_attempts: u32,

    /// Seconds between failed attempts.
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    retry_interval: u64,

    /// Poll until a code arrives instead of reading the newest mail once.
    #[arg(long)]
    wait: bool,

    /// Seconds to wait for a code with `--wait`.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    max_wait: u64,

    /// Seconds between polls with `--wait`.
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    poll_interval: u64,

    /// Ignore mails already in the mailbox with `--wait`.
    #[arg(long, requires = "wait")]
    ignore_existing: bool,
}

impl Cli {
    fn to_config(&self) -> tempmail_verify::Result<TempMailConfig> {
        let mut builder = TempMailConfig::builder()
            .address(&self.address)
            .epin(&self.epin)
            .max_attempts(self.max_attempts)
            .retry_interval(Duration::from_secs(self.retry_interval))
            .max_wait(Duration::from_secs(self.max_wait))
            .poll_interval(Duration::from_secs(self.poll_interval))
            .ignore_existing(self.ignore_existing);

        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }

        builder.build()
    }
}

async fn run(cli: &Cli) -> tempmail_verify::Result<String> {
    let client = TempMailClient::new(cli.to_config()?)?;

    let code = if cli.wait {
        client.wait_for_code().await?
    } else {
        client.get_verification_code().await?
    };

    Ok(code.code)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tempmail_verify=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(code) => {
            println!("{code}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                category = %e.category(),
                "Failed to get verification code"
            );
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
