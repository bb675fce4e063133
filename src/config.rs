//! Configuration for the temporary mailbox client.
//!
//! Use [`TempMailConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use tempmail_verify::TempMailConfig;
//!
//! let config = TempMailConfig::builder()
//!     .address("someone@mailto.plus")
//!     .epin("mailbox-pin")
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use email_address::EmailAddress;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Default provider API root.
pub const DEFAULT_BASE_URL: &str = "https://tempmail.plus/api/";

/// Default page size of the mail list request.
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Configuration for talking to the mailbox provider.
///
/// Create using [`TempMailConfig::builder()`].
///
/// Note: The `epin` is stored as a [`SecretString`] to prevent accidental
/// logging of the mailbox access token.
#[derive(Clone)]
pub struct TempMailConfig {
    /// Temporary mailbox address.
    address: EmailAddress,
    /// Mailbox access token (protected from accidental logging).
    epin: SecretString,
    /// Provider API root, always ending in `/`.
    base_url: Url,
    /// Page size of the mail list request.
    pub list_limit: u32,
    /// Pause after each successful read request.
    pub request_delay: Duration,
    /// Optional SOCKS5 proxy for requests.
    pub proxy: Option<Socks5Proxy>,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Retry configuration for [`get_verification_code`](crate::TempMailClient::get_verification_code).
    pub retry: RetryConfig,
    /// Delete retry configuration.
    pub cleanup: CleanupConfig,
    /// Polling configuration for [`wait_for_code`](crate::TempMailClient::wait_for_code).
    pub polling: PollingConfig,
}

impl std::fmt::Debug for TempMailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempMailConfig")
            .field("address", &self.address.as_str())
            .field("epin", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("list_limit", &self.list_limit)
            .field("request_delay", &self.request_delay)
            .field("proxy", &self.proxy)
            .field("timeouts", &self.timeouts)
            .field("retry", &self.retry)
            .field("cleanup", &self.cleanup)
            .field("polling", &self.polling)
            .finish()
    }
}

impl TempMailConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TempMailConfigBuilder {
        TempMailConfigBuilder::default()
    }

    /// Returns the mailbox address as a string slice.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Returns the access token.
    ///
    /// The token is intentionally not directly accessible to prevent accidental logging.
    #[must_use]
    pub fn epin(&self) -> &str {
        self.epin.expose_secret()
    }

    /// Returns the provider API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the mail list endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] if the endpoint cannot be joined.
    pub fn mails_url(&self) -> Result<Url> {
        self.join("mails")
    }

    /// Returns the delete endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] if the endpoint cannot be joined.
    pub fn delete_url(&self) -> Result<Url> {
        self.join("mails/")
    }

    /// Returns the detail endpoint of mail `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] if the endpoint cannot be joined.
    pub fn mail_url(&self, id: u64) -> Result<Url> {
        self.join(&format!("mails/{id}"))
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source,
            })
    }
}

/// Timeout configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing the TCP/TLS connection.
    pub connect: Duration,
    /// Total timeout of a single request, including reading the body.
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Retry configuration for fetching the verification code.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Number of attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(60),
        }
    }
}

/// Retry configuration for deleting a consumed mail.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Number of delete attempts.
    pub max_attempts: u32,
    /// Pause after a failed delete attempt.
    pub delay: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// Polling configuration for wait operations.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval between polls.
    pub interval: Duration,
    /// Maximum time to wait for a code.
    pub max_wait: Duration,
    /// Skip mails that were already in the mailbox when waiting started.
    pub ignore_existing: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(300), // 5 minutes
            ignore_existing: false,
        }
    }
}

/// Validates an email address format.
fn validate_address(address: &str) -> Result<EmailAddress> {
    EmailAddress::parse_with_options(address, email_address::Options::default()).map_err(|_| {
        Error::InvalidEmailFormat {
            email: address.to_string(),
        }
    })
}

/// Parses the base URL, appending a trailing `/` so endpoints join below it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized).map_err(|source| Error::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidConfig {
            message: format!("unsupported base URL scheme: {scheme}"),
        }),
    }
}

/// Builder for [`TempMailConfig`].
#[derive(Debug, Default)]
pub struct TempMailConfigBuilder {
    address: Option<String>,
    epin: Option<String>,
    base_url: Option<String>,
    list_limit: Option<u32>,
    request_delay: Option<Duration>,
    proxy: Option<Socks5Proxy>,
    timeouts: Option<TimeoutConfig>,
    retry: Option<RetryConfig>,
    cleanup: Option<CleanupConfig>,
    polling: Option<PollingConfig>,
}

impl TempMailConfigBuilder {
    /// Sets the temporary mailbox address (required).
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the mailbox access token.
    ///
    /// Mailboxes without PIN protection use an empty token, which is the default.
    #[must_use]
    pub fn epin(mut self, epin: impl Into<String>) -> Self {
        self.epin = Some(epin.into());
        self
    }

    /// Sets the provider API root.
    ///
    /// Default is [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the page size of the mail list request.
    #[must_use]
    pub fn list_limit(mut self, limit: u32) -> Self {
        self.list_limit = Some(limit);
        self
    }

    /// Sets the pause after each successful read request.
    #[must_use]
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Sets a SOCKS5 proxy for requests.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .request = timeout;
        self
    }

    /// Sets retry configuration.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the number of attempts to fetch the code.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry
            .get_or_insert_with(RetryConfig::default)
            .max_attempts = attempts;
        self
    }

    /// Sets the pause between failed attempts.
    #[must_use]
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry.get_or_insert_with(RetryConfig::default).interval = interval;
        self
    }

    /// Sets delete retry configuration.
    #[must_use]
    pub fn cleanup(mut self, cleanup: CleanupConfig) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Sets polling configuration.
    #[must_use]
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = Some(polling);
        self
    }

    /// Sets the polling interval for wait operations.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .interval = interval;
        self
    }

    /// Sets the maximum wait time for wait operations.
    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .max_wait = max_wait;
        self
    }

    /// Skips mails already present when waiting starts.
    #[must_use]
    pub fn ignore_existing(mut self, ignore: bool) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .ignore_existing = ignore;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or invalid.
    pub fn build(self) -> Result<TempMailConfig> {
        let address_raw = self.address.ok_or_else(|| Error::InvalidConfig {
            message: "address is required".into(),
        })?;

        let address = validate_address(&address_raw)?;

        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let list_limit = self.list_limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if list_limit == 0 {
            return Err(Error::InvalidConfig {
                message: "list limit must be > 0".into(),
            });
        }

        let retry = self.retry.unwrap_or_default();
        if retry.max_attempts == 0 {
            return Err(Error::InvalidConfig {
                message: "max attempts must be > 0".into(),
            });
        }

        let cleanup = self.cleanup.unwrap_or_default();
        if cleanup.max_attempts == 0 {
            return Err(Error::InvalidConfig {
                message: "cleanup attempts must be > 0".into(),
            });
        }

        Ok(TempMailConfig {
            address,
            epin: SecretString::from(self.epin.unwrap_or_default()),
            base_url,
            list_limit,
            request_delay: self.request_delay.unwrap_or(Duration::from_millis(500)),
            proxy: self.proxy,
            timeouts: self.timeouts.unwrap_or_default(),
            retry,
            cleanup,
            polling: self.polling.unwrap_or_default(),
        })
    }
}
