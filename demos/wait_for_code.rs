//! Example: Wait for a verification mail to arrive.
//!
//! Mails already in the mailbox are skipped, so trigger the verification
//! mail after starting this example.
//!
//! # Usage
//!
//! ```bash
//! export TEMPMAIL_ADDRESS="someone@mailto.plus"
//! export TEMPMAIL_EPIN="mailbox-pin"
//! cargo run --example wait_for_code
//! ```

use std::env;
use std::time::Duration;
use tempmail_verify::{Error, TempMailClient, TempMailConfig};

#[tokio::main]
async fn main() {
    let address =
        env::var("TEMPMAIL_ADDRESS").expect("TEMPMAIL_ADDRESS environment variable required");
    let epin = env::var("TEMPMAIL_EPIN").unwrap_or_default();

    let config = match TempMailConfig::builder()
        .address(&address)
        .epin(epin)
        .poll_interval(Duration::from_secs(3))
        .max_wait(Duration::from_secs(120))
        .ignore_existing(true)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let client = match TempMailClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    println!("Waiting up to 2 minutes for a code sent to {}...", address);

    match client.wait_for_code().await {
        Ok(code) => println!("Got code: {}", code),
        Err(Error::WaitTimeout { timeout }) => {
            println!("No verification mail within {:?}", timeout);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Category: {}", e.category());
            std::process::exit(1);
        }
    }
}
