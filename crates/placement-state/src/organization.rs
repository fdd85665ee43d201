//! # Organization Model
//!
//! The entity whose account lifecycle this engine governs.
//!
//! Only three fields carry lifecycle meaning: `status`, `agreement_expiry`
//! and `status_changed_at`. Everything else the backend returns (name,
//! contact person, address, sector, …) is kept in [`Organization::attributes`]
//! and passes through every transition untouched.

use serde::{Deserialize, Serialize};

use placement_core::{CalendarDate, OrganizationId, Timestamp};

// ─── Status ──────────────────────────────────────────────────────────

/// Account status of an organization.
///
/// There is no terminal status: every status stays reachable, including a
/// return from `Rejected` back to `Pending` for a fresh review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationStatus {
    /// Registered, awaiting an administrator's review.
    Pending,
    /// Approved and (subject to agreement expiry) allowed to operate.
    Active,
    /// Application refused.
    Rejected,
    /// Temporarily barred from operating.
    Suspended,
}

impl OrganizationStatus {
    /// All statuses, in display order.
    pub const ALL: [OrganizationStatus; 4] = [
        Self::Pending,
        Self::Active,
        Self::Rejected,
        Self::Suspended,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for OrganizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for OrganizationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A status name that does not match any [`OrganizationStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown organization status: {0:?}")]
pub struct UnknownStatus(pub String);

// ─── Organization ────────────────────────────────────────────────────

/// An organization as held by the entity store and returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Stable identifier.
    pub id: OrganizationId,
    /// Current account status.
    pub status: OrganizationStatus,
    /// Last day of the collaboration agreement. Only consulted while `Active`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_expiry: Option<CalendarDate>,
    /// When the status last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<Timestamp>,
    /// Descriptive attributes opaque to the lifecycle engine.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Organization {
    /// A freshly registered organization in `Pending` status.
    pub fn pending(id: OrganizationId) -> Self {
        Self::with_status(id, OrganizationStatus::Pending)
    }

    /// An organization in an arbitrary status with no expiry and no attributes.
    pub fn with_status(id: OrganizationId, status: OrganizationStatus) -> Self {
        Self {
            id,
            status,
            agreement_expiry: None,
            status_changed_at: None,
            attributes: serde_json::Map::new(),
        }
    }

    /// Builder: set the agreement expiry.
    pub fn expiring_on(mut self, expiry: CalendarDate) -> Self {
        self.agreement_expiry = Some(expiry);
        self
    }

    /// Builder: attach a descriptive attribute.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The `name` attribute, if the backend supplied one.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|v| v.as_str())
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    /// The organization that changed.
    pub organization_id: OrganizationId,
    /// Status before the transition.
    pub from_status: OrganizationStatus,
    /// Status confirmed by the backend.
    pub to_status: OrganizationStatus,
    /// The action that was requested.
    pub action: crate::transition::TransitionAction,
    /// When the commit was observed.
    pub timestamp: Timestamp,
}
