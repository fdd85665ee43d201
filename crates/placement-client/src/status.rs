//! Typed client for the portal's organization status endpoint.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | PUT    | `/api/v1/organizations/{organizationId}/status` | Change status |
//!
//! Request body:
//!
//! ```json
//! { "status": "ACTIVE", "agreementExpiry": "2099-01-01" }
//! ```
//!
//! `agreementExpiry` is a date for a dated activation, `null` for an
//! activation without expiry, and absent for every other transition. The
//! response is the complete organization record.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use placement_core::{CalendarDate, OrganizationId};
use placement_state::{ExpiryInput, Organization, OrganizationStatus};
use placement_sync::{RemoteError, RemoteStatusService};

use crate::config::{ConfigError, PortalApiConfig};
use crate::error::ClientError;
use crate::retry::{send_with_retry, RetryPolicy};

/// Body of a status change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    /// Status the organization should move to.
    pub status: OrganizationStatus,
    /// Outer `None`: field omitted. `Some(None)`: explicit `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_expiry: Option<Option<CalendarDate>>,
}

impl StatusChangeRequest {
    /// Body for a change to `status`. Without an expiry decision the field
    /// is omitted; [`ExpiryInput::NoExpiry`] sends `null`.
    pub fn new(status: OrganizationStatus, agreement_expiry: Option<ExpiryInput>) -> Self {
        Self {
            status,
            agreement_expiry: agreement_expiry.map(|e| e.date()),
        }
    }
}

/// [`RemoteStatusService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStatusService {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpStatusService {
    /// Build a client from configuration. The bearer token is installed as
    /// a default header.
    pub fn new(config: &PortalApiConfig) -> Result<Self, ClientError> {
        let mut auth = reqwest::header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_token.as_str()
        ))
        .map_err(|_| ClientError::Config(ConfigError::MissingToken))?;
        auth.set_sensitive(true);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            retry: config.retry,
        })
    }

    /// Change an organization's status.
    ///
    /// Calls `PUT {base_url}/api/v1/organizations/{id}/status`.
    pub async fn put_status(
        &self,
        id: &OrganizationId,
        request: &StatusChangeRequest,
    ) -> Result<Organization, ClientError> {
        let endpoint = format!("PUT /organizations/{id}/status");
        let url = self.status_url(id)?;

        let started = Instant::now();
        let resp = send_with_retry(self.retry, &endpoint, || {
            self.http.put(url.clone()).json(request).send()
        })
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    endpoint: endpoint.clone(),
                    elapsed_ms: millis(started.elapsed()),
                }
            } else {
                ClientError::Http {
                    endpoint: endpoint.clone(),
                    source: e,
                }
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let body = resp.text().await.map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialization {
            endpoint,
            source: e,
        })
    }

    fn status_url(&self, id: &OrganizationId) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::Config(ConfigError::InvalidUrl(
                    self.base_url.to_string(),
                    "URL cannot carry a path".into(),
                ))
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "v1", "organizations", id.as_str(), "status"]);
        }
        Ok(url)
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl RemoteStatusService for HttpStatusService {
    async fn change_status(
        &self,
        id: &OrganizationId,
        target: OrganizationStatus,
        agreement_expiry: Option<ExpiryInput>,
    ) -> Result<Organization, RemoteError> {
        let request = StatusChangeRequest::new(target, agreement_expiry);
        self.put_status(id, &request).await.map_err(|e| {
            tracing::warn!(
                organization = %id,
                to = %target,
                error = %e,
                "status change request failed"
            );
            RemoteError::from(e)
        })
    }
}
