//! HTTP utilities for Alibaba Cloud RPC API calls

use crate::error::{Error, RemoteError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Error body returned by the RPC API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

/// Turn a non-2xx response into a server-side [`RemoteError`]
pub fn decode_error(status: u16, body: &str) -> RemoteError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            code: Some(code),
            message,
            request_id,
        }) => RemoteError::server(code, message.unwrap_or_default())
            .with_request_id(request_id)
            .with_http_status(status),
        _ => RemoteError::server(
            "SDK.UnknownServerError",
            format!("ServerResponseBody: {}", sanitize_for_log(body)),
        )
        .with_http_status(status),
    }
}

/// HTTP client wrapper for RPC API calls
#[derive(Clone)]
pub struct AcsHttpClient {
    client: Client,
}

impl AcsHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("alicloud-resource/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send a signed GET request and decode the JSON body
    ///
    /// `action` is only used for logging; the URL carries credentials and a
    /// signature and is never logged.
    pub async fn get(&self, action: &str, url: &str) -> Result<Value> {
        tracing::debug!("GET {}", action);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::client("SDK.HttpError", e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::client("SDK.HttpError", e.to_string()))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("{} failed: {} - {}", action, status, sanitize_for_log(&body));
            return Err(decode_error(status.as_u16(), &body).into());
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            RemoteError::client(
                "SDK.InvalidResponse",
                format!("Failed to parse response JSON: {}", e),
            )
            .into()
        })
    }
}
