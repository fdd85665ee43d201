//! # Remote Status Service
//!
//! The contract for the backend that owns the authoritative organization
//! record. The coordinator sees one call with exactly one outcome: whatever
//! retry, backoff or timeout policy an implementation applies internally is
//! invisible to it.

use async_trait::async_trait;
use thiserror::Error;

use placement_core::OrganizationId;
use placement_state::{ExpiryInput, Organization, OrganizationStatus};

/// Failure of an authoritative status change.
///
/// The `Display` output is suitable for showing to an operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The backend refused the change (validation, conflict, permissions).
    #[error("the server rejected the status change (HTTP {status}): {message}")]
    Rejected {
        /// HTTP-like status code reported by the backend.
        status: u16,
        /// Message returned by the backend.
        message: String,
    },

    /// The backend could not be reached or failed internally.
    #[error("the server is unavailable: {reason}")]
    Unavailable {
        /// Transport or server diagnostic.
        reason: String,
    },

    /// The request did not complete in time.
    #[error("the status change timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed time before giving up.
        elapsed_ms: u64,
    },

    /// The backend answered with something that is not a usable record.
    #[error("the server returned an invalid organization record: {reason}")]
    InvalidResponse {
        /// What was wrong with the response.
        reason: String,
    },
}

/// Performs the authoritative status change.
///
/// Implementations must return the complete organization record on success
/// and must never report success with a partial record.
#[async_trait]
pub trait RemoteStatusService: Send + Sync {
    /// Move organization `id` to `target`.
    ///
    /// `agreement_expiry` is `Some` only for transitions landing in `Active`,
    /// where `Some(ExpiryInput::NoExpiry)` asks the backend to clear any
    /// previous expiry.
    async fn change_status(
        &self,
        id: &OrganizationId,
        target: OrganizationStatus,
        agreement_expiry: Option<ExpiryInput>,
    ) -> Result<Organization, RemoteError>;
}
