//! The network boundary.
//!
//! A [`Transport`] performs exactly one round trip per call and hands the raw
//! response text back to the dispatcher. [`HttpTransport`] is the stock
//! implementation on top of `reqwest`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::trace;

use crate::error::TransportError;
use crate::protocol::{TransportRequest, TransportValue};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sends a normalized request and returns the response body text.
pub trait Transport: Send + Sync {
    fn call(
        &self,
        method: &str,
        request: TransportRequest,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn call(
        &self,
        method: &str,
        request: TransportRequest,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.as_ref().call(method, request)
    }
}

/// Connection settings for [`HttpTransport`].
#[derive(Clone)]
pub struct TransportConfig {
    pub token: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl TransportConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{api_url}/bot{token}/{method}`. Contains the token; never log it.
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_url.trim_end_matches('/'),
            self.token
        )
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTPS transport: JSON bodies for plain calls, multipart when uploading.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Build a transport with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(scrub)?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// The configured timeout, stretched by the server-side wait of a
    /// `getUpdates` long poll so the poll can finish before the client gives up.
    fn request_timeout(&self, method: &str, request: &TransportRequest) -> Duration {
        let long_poll = match request.get("timeout") {
            Some(TransportValue::Json(value)) if method == "getUpdates" => {
                value.as_u64().unwrap_or(0)
            }
            _ => 0,
        };
        self.config.timeout + Duration::from_secs(long_poll)
    }
}

impl Transport for HttpTransport {
    async fn call(&self, method: &str, request: TransportRequest) -> Result<String, TransportError> {
        let builder = self
            .client
            .post(self.config.method_url(method))
            .timeout(self.request_timeout(method, &request));

        let builder = if request.has_files() {
            builder.multipart(multipart_form(request).await?)
        } else {
            let (fields, _) = request.into_parts();
            builder.json(&fields)
        };

        let response = builder.send().await.map_err(scrub)?;
        let status = response.status();
        trace!(method, %status, "response received");

        // Failures are normally reported inside the JSON envelope, so the
        // body is returned whatever the status.
        let body = response.text().await.map_err(scrub)?;
        if !status.is_success() && !is_envelope(&body) {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn is_envelope(body: &str) -> bool {
    serde_json::from_str::<Value>(body).is_ok_and(|value| value.get("ok").is_some())
}

/// reqwest errors carry the request URL, which embeds the bot token.
fn scrub(err: reqwest::Error) -> TransportError {
    TransportError::Http(err.without_url())
}

async fn multipart_form(request: TransportRequest) -> Result<Form, TransportError> {
    let (fields, files) = request.into_parts();

    let mut form = Form::new();
    for (key, value) in fields {
        form = form.text(key, form_text(&value));
    }
    for (key, part) in files {
        let file_name = part.file_name().to_string();
        let data = part.read_all().await?;
        trace!(param = %key, %file_name, bytes = data.len(), "multipart file");
        form = form.part(key, Part::bytes(data).file_name(file_name));
    }
    Ok(form)
}

/// Multipart text for a JSON value: strings verbatim, anything else as JSON.
#[must_use]
pub fn form_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
