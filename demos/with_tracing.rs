//! Example: Using tracing for observability.
//!
//! This example demonstrates how to enable structured logging using
//! the `tracing` ecosystem. All provider calls in tempmail-verify emit
//! tracing spans and events.
//!
//! # Usage
//!
//! ```bash
//! export TEMPMAIL_ADDRESS="someone@mailto.plus"
//! export TEMPMAIL_EPIN="mailbox-pin"
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=tempmail_verify=debug
//!
//! cargo run --example with_tracing
//! ```

use std::env;
use std::time::Duration;
use tempmail_verify::{TempMailClient, TempMailConfig};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> tempmail_verify::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tempmail_verify=info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let address =
        env::var("TEMPMAIL_ADDRESS").expect("TEMPMAIL_ADDRESS environment variable required");
    let epin = env::var("TEMPMAIL_EPIN").unwrap_or_default();

    tracing::info!(address = %address, "Starting tempmail-verify example");

    let config = TempMailConfig::builder()
        .address(&address)
        .epin(epin)
        .max_attempts(3)
        .retry_interval(Duration::from_secs(10))
        .build()?;

    tracing::debug!(?config, "Configuration built successfully");

    let client = TempMailClient::new(config)?;

    // Emits spans for the retry loop and each list, detail and delete call
    match client.get_verification_code().await {
        Ok(code) => {
            tracing::info!(mail_id = code.mail_id, "Found verification code");
            println!("\nFound code: {}", code);
        }
        Err(e) => {
            tracing::warn!(error = %e, category = %e.category(), "No verification code");
            println!("\nNo code found: {}", e);
        }
    }

    Ok(())
}
