//! Basic example: Read the verification code from the newest mail.
//!
//! This example demonstrates the most common use case - reading the code
//! from the newest mail of a tempmail.plus mailbox and deleting that mail.
//!
//! # Usage
//!
//! ```bash
//! export TEMPMAIL_ADDRESS="someone@mailto.plus"
//! export TEMPMAIL_EPIN="mailbox-pin"
//! cargo run --example basic_code
//! ```

use std::env;
use tempmail_verify::{TempMailClient, TempMailConfig};

#[tokio::main]
async fn main() -> tempmail_verify::Result<()> {
    let address =
        env::var("TEMPMAIL_ADDRESS").expect("TEMPMAIL_ADDRESS environment variable required");
    let epin = env::var("TEMPMAIL_EPIN").unwrap_or_default();

    println!("Checking mailbox {}...", address);

    let config = TempMailConfig::builder()
        .address(&address)
        .epin(epin)
        .build()?;

    let client = TempMailClient::new(config)?;

    // Transient failures are retried every 60 seconds, up to 5 attempts
    let code = client.get_verification_code().await?;

    println!("Got code {} from \"{}\"", code, code.subject);

    Ok(())
}
