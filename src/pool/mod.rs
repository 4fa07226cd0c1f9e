//! Bounded pool of retrying HTTP clients for the weather provider
//!
//! The pool holds `pool_size` clients, each wrapped in a retry middleware.
//! Callers check a client out for one request; when every client is busy,
//! checkout waits up to `checkout_timeout` before failing. Dropping a request
//! future cancels the in-flight call and any pending backoff.

pub mod retry;

pub use retry::{ProviderBackoff, ProviderRetryStrategy, RETRY_STATUSES};

use std::ops::Deref;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use thiserror::Error;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::data::RawPayload;

/// Errors that can occur when talking to the provider
#[derive(Debug, Error)]
pub enum TransportError {
    /// Building or sending the request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request failed inside the middleware stack, retries included
    #[error("HTTP request failed after retries: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// No client became available in time
    #[error("No HTTP client available after waiting {0:?}")]
    PoolExhausted(Duration),
}

/// Pool sizing, timeouts and retry policy
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSettings {
    /// Number of clients in the pool
    pub pool_size: usize,
    /// How long checkout waits for a free client
    pub checkout_timeout: Duration,
    /// Timeout for a whole request attempt
    pub request_timeout: Duration,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Retry policy applied by every client
    pub backoff: ProviderBackoff,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pool_size: 10,
            checkout_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            backoff: ProviderBackoff::default(),
        }
    }
}

/// Shared pool of provider clients
pub struct ClientPool {
    base_url: String,
    api_key: String,
    clients: Mutex<Vec<ClientWithMiddleware>>,
    permits: Semaphore,
    checkout_timeout: Duration,
}

/// A client checked out of the pool; returned on drop
pub struct PooledClient<'a> {
    client: ClientWithMiddleware,
    pool: &'a ClientPool,
    _permit: SemaphorePermit<'a>,
}

impl Deref for PooledClient<'_> {
    type Target = ClientWithMiddleware;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        // Clones share the underlying connection pool.
        self.pool.slots().push(self.client.clone());
    }
}

impl ClientPool {
    /// Builds a pool of clients for `base_url`, each sending `api_key`
    ///
    /// # Arguments
    /// * `base_url` - Provider base URL, e.g. "http://api.weatherapi.com/v1"
    /// * `api_key` - Key sent as the `key` query parameter on every request
    /// * `settings` - Pool size, timeouts and retry policy
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: &PoolSettings,
    ) -> Result<Self, TransportError> {
        let pool_size = settings.pool_size.max(1);
        let clients = (0..pool_size)
            .map(|_| build_client(settings))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url: Into::<String>::into(base_url).trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            clients: Mutex::new(clients),
            permits: Semaphore::new(pool_size),
            checkout_timeout: settings.checkout_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of clients currently idle
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, Vec<ClientWithMiddleware>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks a client out, waiting up to the checkout timeout
    pub async fn checkout(&self) -> Result<PooledClient<'_>, TransportError> {
        let permit = tokio::time::timeout(self.checkout_timeout, self.permits.acquire())
            .await
            .ok()
            .and_then(Result::ok)
            .ok_or(TransportError::PoolExhausted(self.checkout_timeout))?;

        let client = self
            .slots()
            .pop()
            .ok_or(TransportError::PoolExhausted(self.checkout_timeout))?;

        tracing::debug!(available = self.permits.available_permits(), "Checked out provider client");

        Ok(PooledClient {
            client,
            pool: self,
            _permit: permit,
        })
    }

    /// Sends a POST to `path` with the given query parameters
    ///
    /// Non-success responses are returned as a `RawPayload` once retries are
    /// exhausted; only transport failures become errors.
    #[tracing::instrument(name = "provider_post", level = "debug", skip(self, query))]
    pub async fn post(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RawPayload, TransportError> {
        let client = self.checkout().await?;
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let response = client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Provider responded");

        Ok(RawPayload::new(status.as_u16(), body))
    }
}

impl std::fmt::Debug for ClientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPool")
            .field("base_url", &self.base_url)
            .field("available", &self.available())
            .field("checkout_timeout", &self.checkout_timeout)
            .finish_non_exhaustive()
    }
}

fn build_client(settings: &PoolSettings) -> Result<ClientWithMiddleware, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .default_headers(headers)
        .pool_max_idle_per_host(1)
        .build()?;

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy_and_strategy(
            settings.backoff,
            ProviderRetryStrategy,
        ))
        .build())
}
