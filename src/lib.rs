//! # tempmail-verify
//!
//! Async client for the tempmail.plus temporary mailbox API that waits for a
//! verification mail, extracts its six-digit code and deletes the mail.
//!
//! This crate provides a small async API for:
//! - Reading the code from the newest mail, retrying transient failures
//! - Polling a mailbox until a code arrives
//! - Deleting consumed mails (with an optional SOCKS5 proxy for all requests)
//!
//! ## Quick Start
//!
//! ```no_run
//! use tempmail_verify::{TempMailClient, TempMailConfig};
//!
//! # async fn example() -> tempmail_verify::Result<()> {
//! // Configure the mailbox
//! let config = TempMailConfig::builder()
//!     .address("someone@mailto.plus")
//!     .epin("mailbox-pin")
//!     .build()?;
//!
//! let client = TempMailClient::new(config)?;
//!
//! // Read the code from the newest mail; the mail is deleted afterwards
//! let code = client.get_verification_code().await?;
//! println!("Got code: {}", code);
//! # Ok(())
//! # }
//! ```
//!
//! ## Code Extraction
//!
//! Two patterns are tried on the plain-text body, in order:
//!
//! ```
//! use tempmail_verify::matcher::{Matcher, VerificationCodeMatcher};
//!
//! let matcher = VerificationCodeMatcher::new();
//!
//! // Six contiguous digits, not directly after a letter, `@` or `.`
//! assert_eq!(matcher.find_match("Your code is 482913").as_deref(), Some("482913"));
//!
//! // Otherwise six digits separated by single whitespace
//! assert_eq!(matcher.find_match("Code: 4 8 2 9 1 3").as_deref(), Some("482913"));
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use [`Error::is_retryable`]
//! to determine if an operation can be retried:
//!
//! ```
//! use tempmail_verify::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, can retry: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. All provider calls emit spans with
//! structured fields. The mailbox epin is never recorded.
//!
//! ### Span Naming Convention
//!
//! - `TempMailClient::get_verification_code` - Bounded retry loop
//! - `TempMailClient::wait_for_code` - Polling until a code arrives
//! - `TempMailClient::cleanup_mail` - Deleting a consumed mail
//! - `TempMailClient::find_latest_code`, `TempMailClient::list_mails`,
//!   `TempMailClient::fetch_mail` - Single reads without cleanup
//! - `session::list_mails`, `session::fetch_mail`, `session::delete_mail` - Provider endpoints
//!
//! ### Standard Fields
//!
//! - `address` - Mailbox address
//! - `mail_id` - Provider mail id
//! - `attempt` - Attempt number within a retry loop
//! - `matcher` - Matcher description

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod error;
pub mod matcher;
pub mod proxy;

// Internal modules
mod client;
mod connection;
mod parser;
mod session;

// Re-exports for ergonomic API
pub use client::{TempMailClient, VerificationCode};
pub use config::{
    CleanupConfig, PollingConfig, RetryConfig, TempMailConfig, TempMailConfigBuilder,
    TimeoutConfig,
};
pub use error::{Error, ErrorCategory, Result};
pub use parser::{MailDetail, MailList, MailSummary};
pub use proxy::{ProxyAuth, Socks5Proxy};
