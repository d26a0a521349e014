//! Client configuration types.

use governor::Quota;
use investigate_core::{InvestigateError, Result};
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

/// Default number of delivery attempts per request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default number of concurrent workers for batch lookups
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Credential presented to the API
#[derive(Clone)]
pub enum Credential {
    /// API key sent as `Authorization: Bearer <key>`
    ApiKey(String),
    /// PEM bundle holding a client certificate and its private key (mutual TLS)
    ClientCertificate {
        /// Certificate chain followed by the private key, PEM encoded
        pem: Vec<u8>,
    },
}

impl Credential {
    /// Bearer-token credential
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// Client-certificate credential from an in-memory PEM bundle
    #[must_use]
    pub fn client_certificate(pem: impl Into<Vec<u8>>) -> Self {
        Self::ClientCertificate { pem: pem.into() }
    }

    /// Client-certificate credential from separate certificate and key files
    pub fn from_pem_files(cert_file: impl AsRef<Path>, key_file: impl AsRef<Path>) -> Result<Self> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                InvestigateError::Credential(format!("cannot read {}: {e}", path.display()))
            })
        };

        let mut pem = read(cert_file.as_ref())?;
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend(read(key_file.as_ref())?);

        Ok(Self::ClientCertificate { pem })
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::ClientCertificate { pem } => f
                .debug_struct("ClientCertificate")
                .field("pem_len", &pem.len())
                .finish(),
        }
    }
}

impl From<String> for Credential {
    fn from(key: String) -> Self {
        Self::ApiKey(key)
    }
}

impl From<&str> for Credential {
    fn from(key: &str) -> Self {
        Self::ApiKey(key.to_string())
    }
}

impl From<&String> for Credential {
    fn from(key: &String) -> Self {
        Self::ApiKey(key.clone())
    }
}

/// Retry configuration for failed requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total delivery attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry; zero disables backoff
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }

    /// Retry immediately, without any delay between attempts
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new().initial_backoff(Duration::ZERO)
    }

    /// Set total attempts (clamped to at least one)
    #[must_use]
    pub const fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = if max == 0 { 1 } else { max };
        self
    }

    /// Set initial backoff duration
    #[must_use]
    pub const fn initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Set maximum backoff duration
    #[must_use]
    pub const fn max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Calculate backoff before retry number `retry` (0-based)
    #[must_use]
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let initial = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        let backoff = initial.saturating_mul(2u64.saturating_pow(retry));
        Duration::from_millis(backoff.min(max))
    }
}

/// Client-side rate limit applied to every delivery attempt
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,

    /// Requests allowed in a burst
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// Create a rate limit of `requests_per_second` with an equal burst
    #[must_use]
    pub const fn per_second(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            burst_size: requests_per_second,
        }
    }

    /// Set the burst size
    #[must_use]
    pub const fn burst(mut self, burst_size: u32) -> Self {
        self.burst_size = burst_size;
        self
    }

    pub(crate) fn quota(&self) -> Quota {
        Quota::per_second(NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN))
    }
}
