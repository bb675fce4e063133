//! Temporary mailbox client for fetching verification codes.
//!
//! The [`TempMailClient`] is the main entry point for this crate. It provides
//! async methods to:
//!
//! - Fetch the code from the newest mail, retrying transient failures
//! - Poll the mailbox until a code arrives
//! - Delete consumed mails
//!
//! # Example
//!
//! ```no_run
//! use tempmail_verify::{TempMailClient, TempMailConfig};
//!
//! # async fn example() -> tempmail_verify::Result<()> {
//! let config = TempMailConfig::builder()
//!     .address("someone@mailto.plus")
//!     .epin("mailbox-pin")
//!     .build()?;
//!
//! let client = TempMailClient::new(config)?;
//! let code = client.get_verification_code().await?;
//! println!("Got code: {}", code);
//! # Ok(())
//! # }
//! ```

use crate::config::TempMailConfig;
use crate::connection;
use crate::error::{Error, Result};
use crate::matcher::{Matcher, VerificationCodeMatcher};
use crate::parser::{self, ExtractResult, MailDetail, MailList};
use crate::session;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A verification code together with the mail it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    /// The extracted code, without separators.
    pub code: String,
    /// Provider id of the mail holding the code.
    pub mail_id: u64,
    /// Subject of that mail.
    pub subject: String,
}

impl std::fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

/// Async client for one temporary mailbox.
///
/// All requests share a single HTTP client, so connections are reused
/// across the list, detail and delete calls.
///
/// # Example
///
/// ```no_run
/// use tempmail_verify::{TempMailClient, TempMailConfig};
///
/// # async fn example() -> tempmail_verify::Result<()> {
/// let config = TempMailConfig::builder()
///     .address("someone@mailto.plus")
///     .build()?;
///
/// let client = TempMailClient::new(config)?;
/// let code = client.wait_for_code().await?;
/// # Ok(())
/// # }
/// ```
pub struct TempMailClient {
    http: Client,
    config: TempMailConfig,
}

impl TempMailClient {
    /// Creates a client for the configured mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the HTTP client cannot be built, or
    /// [`Error::InvalidConfig`] for an unusable proxy.
    pub fn new(config: TempMailConfig) -> Result<Self> {
        let http = connection::build_http_client(&config)?;
        Ok(Self { http, config })
    }

    /// Fetches the verification code from the newest mail.
    ///
    /// Retryable failures are retried up to `retry.max_attempts` times with a
    /// fixed `retry.interval` pause. A found code's mail is deleted before
    /// returning; a failed delete is logged but does not fail the call.
    ///
    /// # Errors
    ///
    /// - [`Error::NoMatch`] if the newest mail holds no code or the mailbox is empty
    /// - [`Error::RetriesExhausted`] if every attempt failed
    /// - any non-retryable error as soon as it occurs
    #[instrument(
        name = "TempMailClient::get_verification_code",
        skip(self),
        fields(address = %self.config.address())
    )]
    pub async fn get_verification_code(&self) -> Result<VerificationCode> {
        self.get_verification_code_with(&VerificationCodeMatcher::new())
            .await
    }

    /// Like [`get_verification_code`](Self::get_verification_code), with a custom matcher.
    ///
    /// # Errors
    ///
    /// See [`get_verification_code`](Self::get_verification_code).
    #[instrument(
        name = "TempMailClient::get_verification_code_with",
        skip(self, matcher),
        fields(matcher = %matcher.description())
    )]
    pub async fn get_verification_code_with(
        &self,
        matcher: &dyn Matcher,
    ) -> Result<VerificationCode> {
        let max_attempts = self.config.retry.max_attempts;
        let interval = self.config.retry.interval;
        let mut attempt = 1;

        loop {
            info!(attempt, max_attempts, "Fetching verification code");

            match self.latest_code_after(matcher, None).await {
                Ok(Some(found)) => {
                    self.cleanup_mail(found.mail_id).await;
                    return Ok(found);
                }
                Ok(None) => return Err(Error::NoMatch),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= max_attempts => {
                    return Err(Error::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(
                        attempt,
                        error = %e,
                        category = %e.category(),
                        retry_in_secs = interval.as_secs_f64(),
                        "Failed to fetch verification code, retrying"
                    );
                    tokio::time::sleep(interval).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Polls the mailbox until a verification code arrives.
    ///
    /// Polls every `polling.interval` until `polling.max_wait` elapses.
    /// Retryable failures of a single poll are logged and polling continues.
    /// With `polling.ignore_existing`, mails present before the call are skipped;
    /// the initial read of the newest id is retried the same way.
    ///
    /// # Errors
    ///
    /// - [`Error::WaitTimeout`] if no code arrived in time
    /// - any non-retryable error as soon as it occurs
    #[instrument(
        name = "TempMailClient::wait_for_code",
        skip(self),
        fields(address = %self.config.address())
    )]
    pub async fn wait_for_code(&self) -> Result<VerificationCode> {
        self.wait_for_code_with(&VerificationCodeMatcher::new())
            .await
    }

    /// Like [`wait_for_code`](Self::wait_for_code), with a custom matcher.
    ///
    /// # Errors
    ///
    /// See [`wait_for_code`](Self::wait_for_code).
    #[instrument(
        name = "TempMailClient::wait_for_code_with",
        skip(self, matcher),
        fields(matcher = %matcher.description())
    )]
    pub async fn wait_for_code_with(&self, matcher: &dyn Matcher) -> Result<VerificationCode> {
        let timeout = self.config.polling.max_wait;
        let poll_interval = self.config.polling.interval;
        let deadline = Instant::now() + timeout;

        let baseline = if self.config.polling.ignore_existing {
            self.baseline_mail_id(deadline).await?
        } else {
            None
        };

        debug!(?baseline, "Waiting for verification code");

        loop {
            if Instant::now() > deadline {
                return Err(Error::WaitTimeout { timeout });
            }

            match self.latest_code_after(matcher, baseline).await {
                Ok(Some(found)) => {
                    self.cleanup_mail(found.mail_id).await;
                    return Ok(found);
                }
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Poll failed, continuing");
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Makes a single attempt to read a code from the newest mail.
    ///
    /// Returns `Ok(None)` if the mailbox is empty, the mail is unavailable
    /// or its text holds no code. Does not delete anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider request fails.
    #[instrument(
        name = "TempMailClient::find_latest_code",
        skip(self, matcher),
        fields(address = %self.config.address(), matcher = %matcher.description())
    )]
    pub async fn find_latest_code(&self, matcher: &dyn Matcher) -> Result<Option<VerificationCode>> {
        self.latest_code_after(matcher, None).await
    }

    /// Deletes the mail `first_id`, retrying up to `cleanup.max_attempts` times.
    ///
    /// Returns `true` once the provider confirms the delete. Failures are
    /// logged, never returned.
    #[instrument(name = "TempMailClient::cleanup_mail", skip(self))]
    pub async fn cleanup_mail(&self, first_id: u64) -> bool {
        let max_attempts = self.config.cleanup.max_attempts;

        for attempt in 1..=max_attempts {
            match session::delete_mail(&self.http, &self.config, first_id).await {
                Ok(true) => {
                    debug!(attempt, "Mail deleted");
                    return true;
                }
                Ok(false) => debug!(attempt, "Provider rejected delete"),
                Err(e) => debug!(attempt, error = %e, "Delete request failed"),
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.config.cleanup.delay).await;
            }
        }

        warn!(max_attempts, "Failed to delete mail");
        false
    }

    /// Lists the newest mails of the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(
        name = "TempMailClient::list_mails",
        skip(self),
        fields(address = %self.config.address())
    )]
    pub async fn list_mails(&self) -> Result<MailList> {
        session::list_mails(&self.http, &self.config).await
    }

    /// Fetches one mail by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(
        name = "TempMailClient::fetch_mail",
        skip(self),
        fields(address = %self.config.address())
    )]
    pub async fn fetch_mail(&self, mail_id: u64) -> Result<MailDetail> {
        session::fetch_mail(&self.http, &self.config, mail_id).await
    }

    /// Returns the mailbox address.
    #[must_use]
    pub fn address(&self) -> &str {
        self.config.address()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TempMailConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Reads a code from the newest mail, skipping mails not newer than `baseline`.
    #[instrument(name = "TempMailClient::latest_code", skip(self, matcher))]
    async fn latest_code_after(
        &self,
        matcher: &dyn Matcher,
        baseline: Option<u64>,
    ) -> Result<Option<VerificationCode>> {
        let list = session::list_mails(&self.http, &self.config).await?;
        self.pace().await;

        let Some(mail_id) = parser::latest_mail_id(&list) else {
            debug!("Mailbox is empty");
            return Ok(None);
        };

        if baseline.is_some_and(|seen| mail_id <= seen) {
            debug!(mail_id, "No new mail since waiting started");
            return Ok(None);
        }

        let detail = session::fetch_mail(&self.http, &self.config, mail_id).await?;
        self.pace().await;

        match parser::extract_code(&detail, matcher) {
            ExtractResult::Match(code) => {
                info!(mail_id, subject = %detail.subject, "Found verification code");
                Ok(Some(VerificationCode {
                    code,
                    mail_id,
                    subject: detail.subject,
                }))
            }
            ExtractResult::NoMatch => {
                info!(mail_id, subject = %detail.subject, "Newest mail holds no code");
                Ok(None)
            }
            ExtractResult::Unavailable => {
                debug!(mail_id, "Provider did not return the mail");
                Ok(None)
            }
        }
    }

    /// Reads the id of the newest mail, retrying retryable failures every
    /// `polling.interval` until `deadline`.
    async fn baseline_mail_id(&self, deadline: Instant) -> Result<Option<u64>> {
        loop {
            match session::list_mails(&self.http, &self.config).await {
                Ok(list) => {
                    self.pace().await;
                    return Ok(parser::latest_mail_id(&list));
                }
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Reading existing mails failed, retrying");
                }
                Err(e) => return Err(e),
            }

            if Instant::now() > deadline {
                return Err(Error::WaitTimeout {
                    timeout: self.config.polling.max_wait,
                });
            }
            tokio::time::sleep(self.config.polling.interval).await;
        }
    }

    /// Pauses between provider requests.
    async fn pace(&self) {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
    }
}

impl std::fmt::Debug for TempMailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempMailClient")
            .field("address", &self.config.address())
            .field("base_url", &self.config.base_url().as_str())
            .finish_non_exhaustive()
    }
}
