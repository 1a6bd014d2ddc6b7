/// Validation service client trait and `reqwest`-backed implementation.
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::errors::{ClientError, api_error};
use crate::types::{BulkResponse, EmailResult, JobDescriptor};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.validkit.com";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const API_URL_ENV: &str = "VALIDKIT_API_URL";

const VERIFY_PATH: &str = "/api/v1/verify";
const BULK_PATH: &str = "/api/v1/verify/bulk";
const BULK_ASYNC_PATH: &str = "/api/v1/verify/bulk/async";

/// Response shape requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Full field names (`valid`, `risk`, `checks`).
    #[default]
    Full,
    /// Abbreviated field names (`v`).
    Compact,
}

/// Options for a single-address verification.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub format: ResponseFormat,
    /// Ask the service to attach diagnostics.
    pub debug: bool,
    /// Caller-supplied id for tracing agent requests.
    pub trace_id: Option<String>,
}

/// Options for a bulk verification.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub format: ResponseFormat,
    pub trace_id: Option<String>,
    /// Where the service delivers async job results.
    pub webhook_url: Option<String>,
    /// Contribute results to the shared signal pool.
    pub share_signals: bool,
}

/// Communicates with the validation service.
#[async_trait]
pub trait ValidationClient: Send + Sync {
    /// Verify one address.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network, API, or parse failure.
    async fn verify_email(
        &self,
        email: &str,
        opts: &VerifyOptions,
    ) -> Result<EmailResult, ClientError>;

    /// Verify a batch and wait for every result.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network, API, or parse failure.
    async fn verify_batch(
        &self,
        emails: &[String],
        opts: &BatchOptions,
    ) -> Result<BulkResponse, ClientError>;

    /// Submit a batch as a job; results are delivered out-of-band.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network, API, or parse failure.
    async fn verify_batch_async(
        &self,
        emails: &[String],
        opts: &BatchOptions,
    ) -> Result<JobDescriptor, ClientError>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    format: ResponseFormat,
    debug: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    emails: &'a [String],
    format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<&'a str>,
    share_signals: bool,
}

impl<'a> BatchRequest<'a> {
    fn new(emails: &'a [String], opts: &'a BatchOptions, with_webhook: bool) -> Self {
        Self {
            emails,
            format: opts.format,
            trace_id: opts.trace_id.as_deref(),
            webhook_url: if with_webhook {
                opts.webhook_url.as_deref()
            } else {
                None
            },
            share_signals: opts.share_signals,
        }
    }
}

/// `reqwest`-backed implementation of [`ValidationClient`].
#[derive(Debug, Clone)]
pub struct HttpValidationClient {
    base_url: String,
    api_key: String,
    http: Arc<reqwest::Client>,
}

impl HttpValidationClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("validkit-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            http: Arc::new(http),
        })
    }

    /// Create a client for the endpoint in `VALIDKIT_API_URL`, or the default.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn from_env(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self::new(api_key, base_url)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "sending request");

        let response = self
            .http
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "response received");

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ValidationClient for HttpValidationClient {
    async fn verify_email(
        &self,
        email: &str,
        opts: &VerifyOptions,
    ) -> Result<EmailResult, ClientError> {
        let body = VerifyRequest {
            email,
            format: opts.format,
            debug: opts.debug,
            trace_id: opts.trace_id.as_deref(),
        };
        self.post(VERIFY_PATH, &body).await
    }

    async fn verify_batch(
        &self,
        emails: &[String],
        opts: &BatchOptions,
    ) -> Result<BulkResponse, ClientError> {
        debug!(count = emails.len(), "submitting synchronous batch");
        self.post(BULK_PATH, &BatchRequest::new(emails, opts, false))
            .await
    }

    async fn verify_batch_async(
        &self,
        emails: &[String],
        opts: &BatchOptions,
    ) -> Result<JobDescriptor, ClientError> {
        debug!(
            count = emails.len(),
            webhook = opts.webhook_url.is_some(),
            "submitting async batch"
        );
        self.post(BULK_ASYNC_PATH, &BatchRequest::new(emails, opts, true))
            .await
    }
}
