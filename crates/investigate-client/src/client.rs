//! Main Investigate API client implementation.

use crate::api::{DnsDbApi, DomainsApi, IpsApi};
use crate::batch::BatchApi;
use crate::config::{Credential, RateLimitConfig, RetryConfig, DEFAULT_CONCURRENCY};
use crate::decode::{decode, decode_record, decode_value};
use crate::transport::{ApiRequest, HttpTransport, RawResponse, Transport};
use governor::RateLimiter;
use investigate_core::{AttemptError, DecodeMode, InvestigateError, Record, Resource, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The Investigate API base URL
const DEFAULT_BASE_URL: &str = "https://investigate.api.opendns.com";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API key
const API_KEY_ENV: &str = "INVESTIGATE_KEY";

/// Environment variable overriding the base URL
const BASE_URL_ENV: &str = "INVESTIGATE_BASE_URL";

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Main Investigate API client
///
/// Cloning is cheap; clones share the connection pool and settings,
/// including the batch concurrency limit.
#[derive(Clone)]
pub struct InvestigateClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    base_url: String,
    retry_config: RetryConfig,
    rate_limiter: Option<DirectRateLimiter>,
    decode_mode: DecodeMode,
    concurrency: AtomicUsize,
}

impl InvestigateClient {
    /// Create a new client with the given credential using default settings
    pub fn new(credential: impl Into<Credential>) -> Result<Self> {
        InvestigateClientBuilder::new(credential).build()
    }

    /// Create a client from `INVESTIGATE_KEY` (and optionally `INVESTIGATE_BASE_URL`)
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| InvestigateError::Config(format!("{API_KEY_ENV} is not set")))?;

        let mut builder = InvestigateClientBuilder::new(key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(credential: impl Into<Credential>) -> InvestigateClientBuilder {
        InvestigateClientBuilder::new(credential)
    }

    /// Access domain endpoints (categorization, security, links, tags)
    #[must_use]
    pub fn domains(&self) -> DomainsApi<'_> {
        DomainsApi::new(self)
    }

    /// Access DNS resource-record history endpoints
    #[must_use]
    pub fn dnsdb(&self) -> DnsDbApi<'_> {
        DnsDbApi::new(self)
    }

    /// Access IP endpoints
    #[must_use]
    pub fn ips(&self) -> IpsApi<'_> {
        IpsApi::new(self)
    }

    /// Run one lookup over many domains or IPs concurrently
    #[must_use]
    pub fn batch(&self) -> BatchApi {
        BatchApi::new(self.clone())
    }

    /// Number of workers batch lookups start with
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.inner.concurrency.load(Ordering::Relaxed)
    }

    /// Change the number of workers for batches launched from now on
    ///
    /// Batches already running keep the pool size they started with.
    pub fn set_concurrency(&self, workers: usize) {
        self.inner.concurrency.store(workers.max(1), Ordering::Relaxed);
    }

    /// Decode mode used when none is given explicitly
    #[must_use]
    pub fn decode_mode(&self) -> DecodeMode {
        self.inner.decode_mode
    }

    /// GET any API path and decode it generically
    ///
    /// `path` is appended to the base URL and may carry a query string.
    pub async fn get_value(&self, path: &str) -> Result<Value> {
        let request = ApiRequest::get(self.build_url(path, &[])?);
        decode_value(self.send(&request).await?)
    }

    /// POST a JSON body to any API path and decode the answer generically
    pub async fn post_value<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let request = ApiRequest::post(self.build_url(path, &[])?, encode_body(body)?);
        decode_value(self.send(&request).await?)
    }

    /// Look up one resource for a domain or IP
    pub async fn fetch(&self, resource: &Resource, key: &str, mode: DecodeMode) -> Result<Record> {
        let request = self.resource_request(resource, key)?;
        self.fetch_request(resource, &request, mode).await
    }

    /// Deliver a request, retrying transient failures.
    ///
    /// Transport errors, 5xx and 429 statuses and empty success bodies are
    /// retried up to the configured attempt ceiling; other statuses fail
    /// immediately.
    pub async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let retry = &self.inner.retry_config;
        let attempts = retry.max_attempts.max(1);
        let mut last = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = retry.backoff_for(attempt - 2);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            if let Some(limiter) = &self.inner.rate_limiter {
                limiter.until_ready().await;
            }

            debug!(attempt, max_attempts = attempts, method = %request.method, url = %request.url, "sending request");

            let failure = match self.inner.transport.execute(request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    return Ok(response);
                }
                Ok(response) if response.is_success() => AttemptError::EmptyBody,
                Ok(response) if is_retryable_status(response.status) => AttemptError::Status {
                    code: response.status,
                    body: response.text_lossy(),
                },
                Ok(response) => return Err(status_error(request, &response)),
                Err(err) => err,
            };

            debug!(attempt, max_attempts = attempts, url = %request.url, error = %failure, "attempt failed");
            last = Some(failure);
        }

        let last = last.unwrap_or_else(|| AttemptError::Http("no attempt was made".into()));
        debug!(attempts, url = %request.url, error = %last, "giving up");
        Err(InvestigateError::TransportExhausted { attempts, last })
    }

    /// Perform a POST request with a JSON body and decode into `T`
    pub(crate) async fn post_with_query<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T> {
        let request = ApiRequest::post(self.build_url(path, query)?, encode_body(body)?);
        decode(self.send(&request).await?)
    }

    /// Look up one resource and decode it into `T`
    pub(crate) async fn get_resource<T: DeserializeOwned>(
        &self,
        resource: &Resource,
        key: &str,
    ) -> Result<T> {
        let request = self.resource_request(resource, key)?;
        decode(self.send(&request).await?)
    }

    /// POST pre-encoded JSON and decode the answer into `T`
    pub(crate) async fn post_encoded<T: DeserializeOwned>(&self, path: &str, body: Vec<u8>) -> Result<T> {
        let request = ApiRequest::post(self.build_url(path, &[])?, body);
        decode(self.send(&request).await?)
    }

    /// Build the request for one resource lookup
    ///
    /// The key is percent-encoded as a single path segment.
    pub(crate) fn resource_request(&self, resource: &Resource, key: &str) -> Result<ApiRequest> {
        let mut url = Url::parse(&self.inner.base_url)
            .map_err(|e| InvestigateError::InvalidUrl(format!("{}: {e}", self.inner.base_url)))?;

        url.path_segments_mut()
            .map_err(|()| {
                InvestigateError::InvalidUrl(format!("{} cannot take a path", self.inner.base_url))
            })?
            .pop_if_empty()
            .extend(resource.segments(key));

        let query = resource.query(key);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(ApiRequest::get(url))
    }

    /// Deliver a prepared resource request and decode its record
    pub(crate) async fn fetch_request(
        &self,
        resource: &Resource,
        request: &ApiRequest,
        mode: DecodeMode,
    ) -> Result<Record> {
        let response = self.send(request).await?;
        decode_record(resource, mode, response)
    }

    /// Build an absolute URL from a path and query parameters
    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.inner.base_url, path))
            .map_err(|e| InvestigateError::InvalidUrl(format!("{path}: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }
}

impl std::fmt::Debug for InvestigateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestigateClient")
            .field("base_url", &self.inner.base_url)
            .field("retry_config", &self.inner.retry_config)
            .field("decode_mode", &self.inner.decode_mode)
            .field("concurrency", &self.concurrency())
            .finish_non_exhaustive()
    }
}

const fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Convert a non-retryable status into an error
fn status_error(request: &ApiRequest, response: &RawResponse) -> InvestigateError {
    let body = response.text_lossy();

    // Try to pull an error message out of a JSON body
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["errorMessage", "error", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or(body);

    match response.status {
        401 | 403 => InvestigateError::Unauthorized,
        404 => InvestigateError::NotFound {
            resource: request.url.path().to_string(),
        },
        code => InvestigateError::Api { code, message },
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(InvestigateError::Encode)
}

/// Builder for configuring an [`InvestigateClient`]
pub struct InvestigateClientBuilder {
    credential: Credential,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    retry_config: RetryConfig,
    rate_limit: Option<RateLimitConfig>,
    decode_mode: DecodeMode,
    concurrency: usize,
    transport: Option<Arc<dyn Transport>>,
}

impl InvestigateClientBuilder {
    /// Create a new builder with the given credential
    #[must_use]
    pub fn new(credential: impl Into<Credential>) -> Self {
        Self {
            credential: credential.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("investigate-rust/{}", env!("CARGO_PKG_VERSION")),
            retry_config: RetryConfig::default(),
            rate_limit: None,
            decode_mode: DecodeMode::default(),
            concurrency: DEFAULT_CONCURRENCY,
            transport: None,
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set retry configuration
    #[must_use]
    pub const fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Limit the request rate across all clones of the client
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Set the decode mode batches use unless overridden per batch
    ///
    /// [`InvestigateClient::fetch`] always takes its mode explicitly;
    /// pass [`InvestigateClient::decode_mode`] to follow this setting.
    #[must_use]
    pub const fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// Set the number of workers batch lookups use (default 10)
    #[must_use]
    pub const fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// Use a custom transport instead of the built-in HTTP one
    ///
    /// The transport is then responsible for authentication; the
    /// credential, timeout and user agent are not applied.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<InvestigateClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| InvestigateError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.credential, self.timeout, &self.user_agent)?),
        };

        let rate_limiter = self
            .rate_limit
            .map(|config| RateLimiter::direct(config.quota()));

        Ok(InvestigateClient {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                retry_config: self.retry_config,
                rate_limiter,
                decode_mode: self.decode_mode,
                concurrency: AtomicUsize::new(self.concurrency.max(1)),
            }),
        })
    }
}
