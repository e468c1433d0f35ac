//! Fetch configuration types.

use std::path::PathBuf;
use std::time::Duration;

use http::Uri;

/// Default location of the CA certificate file, relative to the working directory.
pub const DEFAULT_CA_CERT_PATH: &str = "cert.pem";

/// Default target URL.
pub const DEFAULT_TARGET_URL: &str = "https://localhost:8080";

/// Configuration for a single fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// PEM file holding the trusted CA certificates.
    pub ca_cert_path: PathBuf,
    /// URL to GET.
    pub target_url: Uri,
    /// Deadline for the request and, separately, for reading the body.
    pub timeout: Option<Duration>,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Option<Duration>,
    /// Fail before connecting when the CA file yields no certificate.
    pub require_roots: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            ca_cert_path: PathBuf::from(DEFAULT_CA_CERT_PATH),
            target_url: Uri::from_static(DEFAULT_TARGET_URL),
            timeout: None,
            connect_timeout: None,
            require_roots: false,
        }
    }
}

impl FetchConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::default()
    }
}

/// Builder for [`FetchConfig`].
#[derive(Debug, Clone, Default)]
pub struct FetchConfigBuilder {
    ca_cert_path: Option<PathBuf>,
    target_url: Option<Uri>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    require_roots: Option<bool>,
}

impl FetchConfigBuilder {
    /// Set the CA certificate file.
    #[must_use]
    pub fn ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Set the URL to fetch.
    #[must_use]
    pub fn target_url(mut self, url: Uri) -> Self {
        self.target_url = Some(url);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set whether an empty trust store is an error.
    #[must_use]
    pub const fn require_roots(mut self, require: bool) -> Self {
        self.require_roots = Some(require);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            ca_cert_path: self.ca_cert_path.unwrap_or(defaults.ca_cert_path),
            target_url: self.target_url.unwrap_or(defaults.target_url),
            timeout: self.timeout.or(defaults.timeout),
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            require_roots: self.require_roots.unwrap_or(defaults.require_roots),
        }
    }
}
