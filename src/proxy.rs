//! SOCKS5 proxy configuration for provider requests.
//!
//! The proxy is handed to the HTTP client as a `socks5h://` URL, so host name
//! resolution happens on the proxy side.
//!
//! # Example
//!
//! ```
//! use tempmail_verify::Socks5Proxy;
//!
//! // Without authentication
//! let proxy = Socks5Proxy::new("proxy.example.com", 1080);
//!
//! // With authentication
//! let proxy = Socks5Proxy::with_auth("proxy.example.com", 1080, "username", "password");
//! ```

use crate::error::{Error, Result};
use url::Url;

/// SOCKS5 proxy configuration.
#[derive(Debug, Clone)]
pub struct Socks5Proxy {
    /// Proxy server hostname or IP address.
    pub host: String,
    /// Proxy server port.
    pub port: u16,
    /// Optional authentication credentials.
    pub auth: Option<ProxyAuth>,
}

/// Authentication credentials for SOCKS5 proxy.
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    /// Username for proxy authentication.
    pub username: String,
    /// Password for proxy authentication.
    pub password: String,
}

impl Socks5Proxy {
    /// Creates a new SOCKS5 proxy configuration without authentication.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
        }
    }

    /// Creates a new SOCKS5 proxy configuration with authentication.
    ///
    /// # Example
    ///
    /// ```
    /// use tempmail_verify::Socks5Proxy;
    ///
    /// let proxy = Socks5Proxy::with_auth("192.168.1.1", 1080, "user", "pass");
    /// assert!(proxy.requires_auth());
    /// ```
    #[must_use]
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            auth: Some(ProxyAuth {
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    /// Returns the proxy address as "host:port".
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `true` if this proxy requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Returns the proxy as a `socks5h://` URL with percent-encoded credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the host cannot form a valid URL.
    pub fn url(&self) -> Result<Url> {
        let invalid = || Error::InvalidConfig {
            message: format!("invalid proxy address: {}", self.address()),
        };

        let mut url = Url::parse(&format!("socks5h://{}", self.address())).map_err(|_| invalid())?;

        if let Some(auth) = &self.auth {
            url.set_username(&auth.username).map_err(|()| invalid())?;
            url.set_password(Some(&auth.password))
                .map_err(|()| invalid())?;
        }

        Ok(url)
    }
}

impl std::fmt::Display for Socks5Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.auth {
            Some(auth) => write!(
                f,
                "socks5://{}:***@{}:{}",
                auth.username, self.host, self.port
            ),
            None => write!(f, "socks5://{}:{}", self.host, self.port),
        }
    }
}
