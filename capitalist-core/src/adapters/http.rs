//! HTTP transport for the Capitalist API
//!
//! Every operation is a form-encoded POST to a single endpoint; the
//! `operation` field of the envelope selects what the server does.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Result as DomainResult, TransportFailure};
use crate::ports::{Payload, Transport};

/// Default production API URL
pub const CAPITALIST_PRODUCTION_URL: &str = "https://api.capitalist.net/";

/// Environment variable to override the API URL
pub const CAPITALIST_API_URL_ENV: &str = "CAPITALIST_API_URL";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Get the API URL, checking environment variable first
pub fn get_api_url() -> String {
    std::env::var(CAPITALIST_API_URL_ENV).unwrap_or_else(|_| CAPITALIST_PRODUCTION_URL.to_string())
}

/// Blocking HTTP transport
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    api_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport against the production API (or `CAPITALIST_API_URL`)
    pub fn new() -> Result<Self> {
        Self::with_options(&get_api_url(), Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with a custom API URL and timeout
    pub fn with_options(api_url: &str, timeout: Duration) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .with_context(|| format!("Invalid Capitalist API URL: {}", api_url))?;

        if !matches!(api_url.scheme(), "http" | "https") {
            anyhow::bail!("Capitalist API URL must use HTTP or HTTPS");
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("capitalist-rs/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url,
            timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn send(&self, payload: &Payload) -> std::result::Result<JsonValue, reqwest::Error> {
        self.client
            .post(self.api_url.clone())
            .header("X-Response-Format", "json")
            .form(&form_fields(payload))
            .send()?
            .json()
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn request(&self, payload: &Payload) -> DomainResult<JsonValue> {
        self.send(payload).map_err(|e| {
            let operation = payload
                .get("operation")
                .and_then(JsonValue::as_str)
                .unwrap_or("<none>");
            if e.is_timeout() {
                tracing::debug!(operation, timeout = ?self.timeout, "request timed out");
            } else {
                tracing::debug!(operation, error = %e, "request failed");
            }
            TransportFailure::new(e, payload.clone()).into()
        })
    }
}

/// Flatten the envelope into form fields
///
/// Strings go as-is; numbers and booleans use their JSON text; nulls are
/// omitted.
fn form_fields(payload: &Payload) -> Vec<(&str, String)> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                JsonValue::Null => return None,
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.as_str(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::{Error, ErrorKind};
    use serde_json::json;

    fn payload(value: JsonValue) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_reject_invalid_url() {
        let result = HttpTransport::with_options("not a url", Duration::from_secs(1));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid Capitalist API URL"));
    }

    #[test]
    fn test_reject_non_http_scheme() {
        let result =
            HttpTransport::with_options("ftp://api.capitalist.net/", Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_api_url() {
        std::env::remove_var(CAPITALIST_API_URL_ENV);
        assert_eq!(get_api_url(), "https://api.capitalist.net/");
    }

    #[test]
    fn test_form_fields_flatten_values() {
        let request = payload(json!({
            "operation": "get_batch_info",
            "page_size": 1,
            "missing": null
        }));
        let fields = form_fields(&request);
        assert!(fields.contains(&("operation", "get_batch_info".to_string())));
        assert!(fields.contains(&("page_size", "1".to_string())));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_unreachable_host_is_transport_failure() {
        // Port 9 (discard) on localhost is reliably closed in test environments
        let transport =
            HttpTransport::with_options("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        let request = payload(json!({"operation": "get_token", "login": "demo"}));

        let err = transport.request(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        match err {
            Error::Transport(failure) => {
                assert_eq!(failure.operation(), Some("get_token"));
                assert_eq!(failure.request(), &request);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
