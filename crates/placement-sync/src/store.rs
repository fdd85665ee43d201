//! # Entity Store
//!
//! The shared organization collection that list and table renderers read
//! and the coordinator writes. The store is a passive data holder: it knows
//! nothing about transition legality.
//!
//! ## Status Counters
//!
//! Dashboards show totals per status. The coordinator bumps the counter of
//! the new status after each confirmed transition and never decrements the
//! old one, so counters drift upward until the next full refresh
//! ([`InMemoryEntityStore::recount`] or [`InMemoryEntityStore::set_status_counts`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use placement_core::OrganizationId;
use placement_state::{Organization, OrganizationStatus};

// ─── Status Counts ───────────────────────────────────────────────────

/// Totals by status, as shown on dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Organizations awaiting a decision.
    pub pending: u64,
    /// Organizations allowed to operate (subject to their agreement).
    pub active: u64,
    /// Organizations whose application was refused.
    pub rejected: u64,
    /// Organizations temporarily barred from operating.
    pub suspended: u64,
}

impl StatusCounts {
    /// Count the organizations in `orgs` by status.
    pub fn tally<'a>(orgs: impl IntoIterator<Item = &'a Organization>) -> Self {
        let mut counts = Self::default();
        for org in orgs {
            counts.increment(org.status);
        }
        counts
    }

    /// The counter for `status`.
    pub fn get(&self, status: OrganizationStatus) -> u64 {
        match status {
            OrganizationStatus::Pending => self.pending,
            OrganizationStatus::Active => self.active,
            OrganizationStatus::Rejected => self.rejected,
            OrganizationStatus::Suspended => self.suspended,
        }
    }

    /// Add one to the counter for `status`.
    pub fn increment(&mut self, status: OrganizationStatus) {
        let slot = match status {
            OrganizationStatus::Pending => &mut self.pending,
            OrganizationStatus::Active => &mut self.active,
            OrganizationStatus::Rejected => &mut self.rejected,
            OrganizationStatus::Suspended => &mut self.suspended,
        };
        *slot = slot.saturating_add(1);
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.pending + self.active + self.rejected + self.suspended
    }
}

// ─── Store Contract ──────────────────────────────────────────────────

/// The collection the coordinator reads from and writes back to.
///
/// All methods are synchronous; implementations must not block on I/O.
pub trait EntityStore: Send + Sync {
    /// Current value of an organization.
    fn get(&self, id: &OrganizationId) -> Option<Organization>;

    /// All organizations.
    fn list(&self) -> Vec<Organization>;

    /// Replace the organization with the same id.
    ///
    /// Returns `false` (and stores nothing) if no such organization exists,
    /// e.g. because it was deleted while a transition was in flight.
    fn replace(&self, org: Organization) -> bool;

    /// Add one to the dashboard counter for `status`.
    fn increment_status_count(&self, status: OrganizationStatus);

    /// Current dashboard counters.
    fn status_counts(&self) -> StatusCounts;
}

// ─── In-Memory Store ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Inner {
    organizations: BTreeMap<OrganizationId, Organization>,
    counts: StatusCounts,
}

/// Thread-safe, cloneable in-memory [`EntityStore`].
///
/// The lock is `parking_lot` and never held across `.await`, so a panicking
/// writer cannot poison the collection for every renderer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEntityStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `orgs`, with counters tallied from them.
    pub fn from_organizations(orgs: impl IntoIterator<Item = Organization>) -> Self {
        let organizations: BTreeMap<_, _> =
            orgs.into_iter().map(|org| (org.id.clone(), org)).collect();
        let counts = StatusCounts::tally(organizations.values());
        Self {
            inner: Arc::new(RwLock::new(Inner {
                organizations,
                counts,
            })),
        }
    }

    /// Insert or overwrite an organization, returning the previous value.
    ///
    /// Counters are left alone; call [`Self::recount`] to resynchronise.
    pub fn insert(&self, org: Organization) -> Option<Organization> {
        self.inner.write().organizations.insert(org.id.clone(), org)
    }

    /// Delete an organization. Not gated by the lifecycle rules.
    pub fn remove(&self, id: &OrganizationId) -> Option<Organization> {
        self.inner.write().organizations.remove(id)
    }

    /// Whether an organization exists.
    pub fn contains(&self, id: &OrganizationId) -> bool {
        self.inner.read().organizations.contains_key(id)
    }

    /// Number of organizations.
    pub fn len(&self) -> usize {
        self.inner.read().organizations.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Organizations currently in `status`.
    pub fn with_status(&self, status: OrganizationStatus) -> Vec<Organization> {
        self.inner
            .read()
            .organizations
            .values()
            .filter(|org| org.status == status)
            .cloned()
            .collect()
    }

    /// Overwrite the counters with authoritative totals fetched elsewhere.
    pub fn set_status_counts(&self, counts: StatusCounts) {
        self.inner.write().counts = counts;
    }

    /// Recompute the counters from the collection.
    pub fn recount(&self) -> StatusCounts {
        let mut guard = self.inner.write();
        let counts = StatusCounts::tally(guard.organizations.values());
        guard.counts = counts;
        counts
    }
}

impl EntityStore for InMemoryEntityStore {
    fn get(&self, id: &OrganizationId) -> Option<Organization> {
        self.inner.read().organizations.get(id).cloned()
    }

    fn list(&self) -> Vec<Organization> {
        self.inner.read().organizations.values().cloned().collect()
    }

    fn replace(&self, org: Organization) -> bool {
        let mut guard = self.inner.write();
        match guard.organizations.get_mut(&org.id) {
            Some(slot) => {
                *slot = org;
                true
            }
            None => false,
        }
    }

    fn increment_status_count(&self, status: OrganizationStatus) {
        self.inner.write().counts.increment(status);
    }

    fn status_counts(&self) -> StatusCounts {
        self.inner.read().counts
    }
}
