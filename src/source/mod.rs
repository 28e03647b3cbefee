use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::record::{self, RawEnvelope, Record};

pub const DEFAULT_SOURCE_URL: &str =
    "https://port-0-socialwelfare-mgjckxvm97f5b4e4.sel3.cloudtype.app/services";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read data file: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("response is not a valid service list: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Decode failures and client-side statuses will not change on a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::FileRead { .. } | Self::Decode { .. } => false,
        }
    }
}

#[derive(Clone, Debug)]
pub enum RecordSource {
    Url(String),
    File(String),
}

impl RecordSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => format!("file://{path}"),
        }
    }
}

/// How often and how patiently the initial load is attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, doubling from the initial backoff.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// the policy is exhausted. Returns the last error.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut attempt: F) -> Result<T, SourceError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut n = 1;
    loop {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) if n < max_attempts && e.is_retryable() => {
                let delay = policy.delay_after(n);
                let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(attempt = n, error = %e, delay_ms, "load failed, retrying");
                tokio::time::sleep(delay).await;
                n += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn build_client(
    timeout_seconds: u64,
    proxy: Option<&str>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "welfare-finder/",
            env!("CARGO_PKG_VERSION")
        )),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(timeout_seconds.max(1)));

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    builder.build()
}

/// Parses a `{ "data": [...] }` body into normalized records.
pub fn decode_records(body: &str) -> Result<Vec<Record>, SourceError> {
    let envelope: RawEnvelope =
        serde_json::from_str(body).map_err(|e| SourceError::Decode { source: e })?;
    Ok(record::from_envelope(envelope))
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::Request {
            url: url.to_string(),
            source: e,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(|e| SourceError::Request {
        url: url.to_string(),
        source: e,
    })
}

pub async fn load_records(
    client: &reqwest::Client,
    source: &RecordSource,
    policy: RetryPolicy,
) -> Result<Vec<Record>, SourceError> {
    let body = match source {
        RecordSource::Url(url) => {
            with_retry(policy, |attempt| {
                tracing::debug!(attempt, url = %url, "fetching services");
                fetch_body(client, url)
            })
            .await?
        }
        RecordSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| SourceError::FileRead {
                    path: path.clone(),
                    source: e,
                })?
        }
    };
    let records = decode_records(&body)?;
    tracing::info!(count = records.len(), source = %source.describe(), "services loaded");
    Ok(records)
}
