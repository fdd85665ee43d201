//! Portal API client error types, and their translation into the
//! [`RemoteError`] the coordinator understands.

use placement_sync::RemoteError;

/// Errors from portal API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The request did not complete within the configured timeout.
    #[error("{endpoint} timed out after {elapsed_ms}ms")]
    Timeout { endpoint: String, elapsed_ms: u64 },
    /// The portal API returned a non-2xx status.
    #[error("portal API {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body was not an organization record.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http { source, .. } => RemoteError::Unavailable {
                reason: source.to_string(),
            },
            ClientError::Timeout { elapsed_ms, .. } => RemoteError::Timeout { elapsed_ms },
            ClientError::ApiError { status, body, .. } if (400..500).contains(&status) => {
                RemoteError::Rejected {
                    status,
                    message: error_message(&body, status),
                }
            }
            ClientError::ApiError { status, body, .. } => RemoteError::Unavailable {
                reason: format!("HTTP {status}: {}", error_message(&body, status)),
            },
            ClientError::Deserialization { source, .. } => RemoteError::InvalidResponse {
                reason: source.to_string(),
            },
            ClientError::Config(e) => RemoteError::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Pull an operator-facing message out of an error body.
///
/// Understands `{"message": ..}` and `{"error": ..}` JSON bodies; falls back
/// to the raw text, then to the status code.
fn error_message(body: &str, status: u16) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = map.get(key).and_then(|v| v.as_str()) {
                if !msg.trim().is_empty() {
                    return msg.trim().to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("no details (HTTP {status})")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, body: &str) -> ClientError {
        ClientError::ApiError {
            endpoint: "PUT /organizations/o1/status".into(),
            status,
            body: body.into(),
        }
    }

    #[test]
    fn client_errors_map_to_rejected() {
        let remote: RemoteError =
            api_error(422, r#"{"message": "agreement expiry required"}"#).into();
        assert_eq!(
            remote,
            RemoteError::Rejected {
                status: 422,
                message: "agreement expiry required".into()
            }
        );
    }

    #[test]
    fn server_errors_map_to_unavailable() {
        let remote: RemoteError = api_error(503, "maintenance").into();
        assert_eq!(
            remote,
            RemoteError::Unavailable {
                reason: "HTTP 503: maintenance".into()
            }
        );
    }

    #[test]
    fn timeout_keeps_elapsed() {
        let remote: RemoteError = ClientError::Timeout {
            endpoint: "PUT".into(),
            elapsed_ms: 1500,
        }
        .into();
        assert_eq!(remote, RemoteError::Timeout { elapsed_ms: 1500 });
    }

    #[test]
    fn message_extraction_falls_back() {
        assert_eq!(error_message(r#"{"error":"forbidden"}"#, 403), "forbidden");
        assert_eq!(error_message("plain text\n", 400), "plain text");
        assert_eq!(error_message("", 409), "no details (HTTP 409)");
        assert_eq!(error_message(r#"{"message":""}"#, 400), r#"{"message":""}"#);
    }
}
