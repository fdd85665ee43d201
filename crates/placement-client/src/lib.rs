//! # placement-client — HTTP client for the portal API
//!
//! Implements [`placement_sync::RemoteStatusService`] against the portal's
//! REST API so the mutation coordinator can run against a real backend.
//!
//! ## Endpoint
//!
//! `PUT {base_url}/api/v1/organizations/{id}/status`, bearer-authenticated.
//! See [`status`] for the request and response shapes.
//!
//! ## Failure Mapping
//!
//! | Outcome | [`RemoteError`](placement_sync::RemoteError) |
//! |---------|------------------|
//! | 4xx | `Rejected { status, message }` |
//! | 5xx, connection failure | `Unavailable { reason }` |
//! | client timeout | `Timeout { elapsed_ms }` |
//! | body is not an organization | `InvalidResponse { reason }` |
//!
//! Transport failures are retried with exponential backoff before being
//! reported; HTTP error statuses are never retried.

pub mod config;
pub mod error;
pub mod retry;
pub mod status;

pub use config::{ConfigError, PortalApiConfig};
pub use error::ClientError;
pub use retry::RetryPolicy;
pub use status::{HttpStatusService, StatusChangeRequest};
