//! # Mutation Coordinator
//!
//! Runs one lifecycle transition against the remote authority while keeping
//! the shared entity collection responsive and consistent.
//!
//! ## Sequence
//!
//! ```text
//! execute(request)
//!   │
//!   ├─ busy?                      ──▶ Err(AlreadyInProgress)
//!   ├─ plan_transition(..)
//!   │    ├─ refused               ──▶ Err(Transition(..))
//!   │    └─ needs input           ──▶ Ok(NeedsInput)
//!   ├─ mark busy, snapshot entity
//!   ├─ optimistic write (status, expiry, status_changed_at)
//!   ├─ remote.change_status(..)   ◀── only suspension point
//!   │    ├─ Ok(record)  ─▶ store record, bump counter ──▶ Ok(Committed)
//!   │    └─ Err(e)      ─▶ restore snapshot           ──▶ Err(RemoteFailure)
//!   └─ release busy (always)
//! ```
//!
//! ## Guarantees
//!
//! - At most one in-flight transition per organization. A second request is
//!   rejected, never queued.
//! - Different organizations proceed independently, resolving in any order.
//! - The remote record always wins over the optimistic one.
//! - After a failed remote call the entity is byte-for-byte its
//!   pre-transition snapshot.
//!
//! The remote call and its commit/rollback run on a spawned task owned by a
//! [`PendingMutation`]. If the caller stops awaiting `execute`, the task
//! still settles the entity. If the task panics or is torn down, the
//! guard's `Drop` restores the snapshot and releases the busy marker.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use placement_core::OrganizationId;
use placement_state::{
    available_actions, plan_transition, MissingInput, OperationalValidity, Organization,
    OrganizationStatus, TransitionDecision, TransitionError, TransitionPlan, TransitionRecord,
    TransitionRequest, TransitionRule, DEFAULT_EXPIRING_SOON_DAYS,
};

use crate::clock::{Clock, SystemClock};
use crate::remote::{RemoteError, RemoteStatusService};
use crate::store::EntityStore;

// ─── Configuration ───────────────────────────────────────────────────

/// Coordinator tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Look-ahead window for "expiring soon" in [`MutationCoordinator::validity`].
    pub expiring_soon_threshold_days: i64,
    /// Number of committed transitions kept by [`MutationCoordinator::recent_transitions`].
    pub history_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            expiring_soon_threshold_days: DEFAULT_EXPIRING_SOON_DAYS,
            history_capacity: 256,
        }
    }
}

// ─── Outcomes & Errors ───────────────────────────────────────────────

/// Non-error result of [`MutationCoordinator::execute`].
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    /// The backend confirmed the change; this is the authoritative record.
    Committed(Organization),
    /// Nothing ran: the caller must collect `missing` and resubmit.
    NeedsInput {
        /// Status the transition would land in.
        to: OrganizationStatus,
        /// Input to collect.
        missing: MissingInput,
    },
}

/// Why a transition did not commit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Another transition on the same organization has not settled yet.
    #[error("a status change for organization {organization_id} is already in progress")]
    AlreadyInProgress {
        /// The busy organization.
        organization_id: OrganizationId,
    },

    /// The organization is not in the entity store.
    #[error("organization {organization_id} not found")]
    UnknownOrganization {
        /// The missing organization.
        organization_id: OrganizationId,
    },

    /// The lifecycle rules refused the request.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The backend failed; the entity has been restored.
    #[error("status change for organization {organization_id} failed: {source}")]
    RemoteFailure {
        /// The organization that was rolled back.
        organization_id: OrganizationId,
        /// What the backend reported.
        #[source]
        source: RemoteError,
    },
}

impl CoordinatorError {
    /// Whether retrying the same request later could succeed.
    ///
    /// A backend rejection is final; only transport failures are retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AlreadyInProgress { .. } => true,
            Self::RemoteFailure { source, .. } => matches!(
                source,
                RemoteError::Unavailable { .. } | RemoteError::Timeout { .. }
            ),
            Self::UnknownOrganization { .. } | Self::Transition(_) => false,
        }
    }
}

// ─── Coordinator ─────────────────────────────────────────────────────

struct Inner {
    store: Arc<dyn EntityStore>,
    remote: Arc<dyn RemoteStatusService>,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
    busy: Mutex<HashSet<OrganizationId>>,
    history: Mutex<VecDeque<TransitionRecord>>,
}

impl Inner {
    fn record(&self, entry: TransitionRecord) {
        let mut history = self.history.lock();
        if self.config.history_capacity == 0 {
            return;
        }
        while history.len() >= self.config.history_capacity {
            history.pop_front();
        }
        history.push_back(entry);
    }
}

/// Sole authority on in-flight transitions. Cheap to clone; clones share
/// the busy set, store and remote.
#[derive(Clone)]
pub struct MutationCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("config", &self.inner.config)
            .field("busy", &self.inner.busy.lock().len())
            .finish_non_exhaustive()
    }
}

impl MutationCoordinator {
    /// A coordinator on the system clock with default configuration.
    pub fn new(store: Arc<dyn EntityStore>, remote: Arc<dyn RemoteStatusService>) -> Self {
        Self::with_clock(
            store,
            remote,
            Arc::new(SystemClock),
            CoordinatorConfig::default(),
        )
    }

    /// A coordinator with an explicit clock and configuration.
    pub fn with_clock(
        store: Arc<dyn EntityStore>,
        remote: Arc<dyn RemoteStatusService>,
        clock: Arc<dyn Clock>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                remote,
                clock,
                config,
                busy: Mutex::new(HashSet::new()),
                history: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Run one transition to completion.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::AlreadyInProgress`]: the organization is busy.
    /// - [`CoordinatorError::UnknownOrganization`]: not in the store.
    /// - [`CoordinatorError::Transition`]: refused by the lifecycle rules.
    /// - [`CoordinatorError::RemoteFailure`]: the backend failed; the entity
    ///   has been rolled back.
    pub async fn execute(
        &self,
        request: TransitionRequest,
    ) -> Result<ExecuteOutcome, CoordinatorError> {
        let id = request.organization_id.clone();

        if self.is_busy(&id) {
            tracing::warn!(
                organization = %id,
                action = %request.action,
                "transition rejected: another change is in flight"
            );
            return Err(CoordinatorError::AlreadyInProgress { organization_id: id });
        }

        let current = self
            .inner
            .store
            .get(&id)
            .ok_or_else(|| CoordinatorError::UnknownOrganization {
                organization_id: id.clone(),
            })?;

        let plan = match plan_transition(current.status, &request, self.inner.clock.today())? {
            TransitionDecision::Ready(plan) => plan,
            TransitionDecision::NeedsInput { to, missing } => {
                tracing::debug!(
                    organization = %id,
                    action = %request.action,
                    %missing,
                    "transition waiting for input"
                );
                return Ok(ExecuteOutcome::NeedsInput { to, missing });
            }
        };

        let busy = BusyGuard::acquire(&self.inner, &id).ok_or_else(|| {
            CoordinatorError::AlreadyInProgress {
                organization_id: id.clone(),
            }
        })?;

        // Re-read under the busy marker so the snapshot matches the plan.
        let snapshot = self
            .inner
            .store
            .get(&id)
            .ok_or_else(|| CoordinatorError::UnknownOrganization {
                organization_id: id.clone(),
            })?;
        if snapshot.status != plan.from {
            return Err(TransitionError::IllegalTransition {
                status: snapshot.status,
                action: plan.action,
            }
            .into());
        }

        let mutation = PendingMutation::begin(Arc::clone(&self.inner), busy, snapshot, plan);

        match tokio::spawn(mutation.run()).await {
            Ok(result) => result,
            Err(join_error) => {
                tracing::error!(
                    organization = %id,
                    error = %join_error,
                    "transition task did not complete; snapshot restored"
                );
                Err(CoordinatorError::RemoteFailure {
                    organization_id: id,
                    source: RemoteError::Unavailable {
                        reason: format!("status change task failed: {join_error}"),
                    },
                })
            }
        }
    }

    /// Whether a transition on `id` is in flight.
    pub fn is_busy(&self, id: &OrganizationId) -> bool {
        self.inner.busy.lock().contains(id)
    }

    /// Organizations with a transition in flight.
    pub fn busy_ids(&self) -> Vec<OrganizationId> {
        let mut ids: Vec<_> = self.inner.busy.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Actions an operator may be offered for `id` right now.
    ///
    /// Empty while a transition is in flight; `None` if the organization is
    /// unknown.
    pub fn available_actions(&self, id: &OrganizationId) -> Option<Vec<TransitionRule>> {
        let org = self.inner.store.get(id)?;
        if self.is_busy(id) {
            return Some(Vec::new());
        }
        Some(available_actions(org.status))
    }

    /// Operability of `id` as of the coordinator's clock.
    pub fn validity(&self, id: &OrganizationId) -> Option<OperationalValidity> {
        let org = self.inner.store.get(id)?;
        Some(OperationalValidity::evaluate(
            &org,
            self.inner.clock.today(),
            self.inner.config.expiring_soon_threshold_days,
        ))
    }

    /// Recently committed transitions, oldest first.
    pub fn recent_transitions(&self) -> Vec<TransitionRecord> {
        self.inner.history.lock().iter().cloned().collect()
    }

    /// The entity store this coordinator writes to.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.inner.store
    }
}

// ─── Busy Marker ─────────────────────────────────────────────────────

/// Membership of one organization in the busy set, released on drop.
struct BusyGuard {
    inner: Arc<Inner>,
    id: OrganizationId,
}

impl BusyGuard {
    fn acquire(inner: &Arc<Inner>, id: &OrganizationId) -> Option<Self> {
        if !inner.busy.lock().insert(id.clone()) {
            return None;
        }
        Some(Self {
            inner: Arc::clone(inner),
            id: id.clone(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.busy.lock().remove(&self.id);
    }
}

// ─── Pending Mutation ────────────────────────────────────────────────

/// An optimistic write awaiting the backend's verdict.
///
/// Unless [`PendingMutation::commit`] or [`PendingMutation::rollback`] ran,
/// dropping it restores the snapshot. The busy marker is a field, so it is
/// released only after the snapshot is back in place.
struct PendingMutation {
    inner: Arc<Inner>,
    snapshot: Organization,
    plan: TransitionPlan,
    settled: bool,
    _busy: BusyGuard,
}

impl PendingMutation {
    fn begin(
        inner: Arc<Inner>,
        busy: BusyGuard,
        snapshot: Organization,
        plan: TransitionPlan,
    ) -> Self {
        let mut optimistic = snapshot.clone();
        optimistic.status = plan.to;
        if let Some(expiry) = plan.agreement_expiry {
            optimistic.agreement_expiry = expiry.date();
        }
        optimistic.status_changed_at = Some(inner.clock.now());
        inner.store.replace(optimistic);

        tracing::debug!(
            organization = %snapshot.id,
            from = %plan.from,
            to = %plan.to,
            "optimistic status applied"
        );

        Self {
            inner,
            snapshot,
            plan,
            settled: false,
            _busy: busy,
        }
    }

    async fn run(mut self) -> Result<ExecuteOutcome, CoordinatorError> {
        let id = self.snapshot.id.clone();
        let result = self
            .inner
            .remote
            .change_status(&id, self.plan.to, self.plan.agreement_expiry)
            .await;

        let source = match result {
            Ok(record) if record.id == id => {
                self.commit(record.clone());
                return Ok(ExecuteOutcome::Committed(record));
            }
            Ok(record) => RemoteError::InvalidResponse {
                reason: format!("expected organization {id}, got {}", record.id),
            },
            Err(e) => e,
        };

        self.rollback(&source);
        Err(CoordinatorError::RemoteFailure {
            organization_id: id,
            source,
        })
    }

    fn commit(&mut self, record: Organization) {
        self.settled = true;
        let id = record.id.clone();
        let confirmed = record.status;

        if !self.inner.store.replace(record) {
            tracing::warn!(
                organization = %id,
                "organization removed during transition; confirmed record not stored"
            );
            return;
        }
        self.inner.store.increment_status_count(confirmed);

        if confirmed != self.plan.to {
            tracing::warn!(
                organization = %id,
                requested = %self.plan.to,
                confirmed = %confirmed,
                "backend confirmed a different status than requested"
            );
        }

        self.inner.record(TransitionRecord {
            organization_id: id.clone(),
            from_status: self.plan.from,
            to_status: confirmed,
            action: self.plan.action,
            timestamp: self.inner.clock.now(),
        });

        tracing::info!(
            organization = %id,
            action = %self.plan.action,
            from = %self.plan.from,
            to = %confirmed,
            "transition committed"
        );
    }

    fn rollback(&mut self, reason: &RemoteError) {
        self.settled = true;
        self.restore();
        tracing::warn!(
            organization = %self.snapshot.id,
            action = %self.plan.action,
            restored = %self.snapshot.status,
            error = %reason,
            "transition rolled back"
        );
    }

    fn restore(&self) {
        if !self.inner.store.replace(self.snapshot.clone()) {
            tracing::debug!(
                organization = %self.snapshot.id,
                "organization removed during transition; nothing to restore"
            );
        }
    }
}

impl Drop for PendingMutation {
    fn drop(&mut self) {
        if !self.settled {
            self.restore();
            tracing::warn!(
                organization = %self.snapshot.id,
                action = %self.plan.action,
                "transition abandoned before settling; snapshot restored"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use placement_core::CalendarDate;
    use placement_state::TransitionAction;

    use crate::clock::FixedClock;
    use crate::store::InMemoryEntityStore;

    struct Echo;

    #[async_trait]
    impl RemoteStatusService for Echo {
        async fn change_status(
            &self,
            id: &OrganizationId,
            target: OrganizationStatus,
            _agreement_expiry: Option<placement_state::ExpiryInput>,
        ) -> Result<Organization, RemoteError> {
            Ok(Organization::with_status(id.clone(), target))
        }
    }

    fn coordinator(store: &InMemoryEntityStore, capacity: usize) -> MutationCoordinator {
        MutationCoordinator::with_clock(
            Arc::new(store.clone()),
            Arc::new(Echo),
            Arc::new(FixedClock::on(CalendarDate::from_ymd(2026, 3, 1).unwrap())),
            CoordinatorConfig {
                history_capacity: capacity,
                ..CoordinatorConfig::default()
            },
        )
    }

    fn id(s: &str) -> OrganizationId {
        OrganizationId::new(s).unwrap()
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let store = InMemoryEntityStore::from_organizations([Organization::with_status(
            id("o1"),
            OrganizationStatus::Active,
        )]);
        let coord = coordinator(&store, 2);

        for action in [
            TransitionAction::Suspend,
            TransitionAction::Reactivate,
            TransitionAction::Suspend,
        ] {
            let current = store.get(&id("o1")).unwrap().status;
            let req = TransitionRequest::resolve(id("o1"), current, action)
                .unwrap()
                .with_expiry(placement_state::ExpiryInput::NoExpiry);
            let _ = coord.execute(req).await.unwrap();
        }

        let history = coord.recent_transitions();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, TransitionAction::Reactivate);
        assert_eq!(history[1].action, TransitionAction::Suspend);
    }

    #[tokio::test]
    async fn zero_capacity_keeps_no_history() {
        let store = InMemoryEntityStore::from_organizations([Organization::with_status(
            id("o1"),
            OrganizationStatus::Active,
        )]);
        let coord = coordinator(&store, 0);
        let req =
            TransitionRequest::resolve(id("o1"), OrganizationStatus::Active, TransitionAction::Suspend)
                .unwrap();
        let _ = coord.execute(req).await.unwrap();
        assert!(coord.recent_transitions().is_empty());
    }

    #[test]
    fn retryable_errors() {
        assert!(CoordinatorError::AlreadyInProgress {
            organization_id: id("o1")
        }
        .is_retryable());
        assert!(!CoordinatorError::Transition(TransitionError::IllegalTransition {
            status: OrganizationStatus::Pending,
            action: TransitionAction::Suspend,
        })
        .is_retryable());

        let remote = |source| CoordinatorError::RemoteFailure {
            organization_id: id("o1"),
            source,
        };
        assert!(remote(RemoteError::Timeout { elapsed_ms: 1_000 }).is_retryable());
        assert!(remote(RemoteError::Unavailable {
            reason: "connection refused".into()
        })
        .is_retryable());
        assert!(!remote(RemoteError::Rejected {
            status: 409,
            message: "conflict".into()
        })
        .is_retryable());
        assert!(!remote(RemoteError::InvalidResponse {
            reason: "missing id".into()
        })
        .is_retryable());
        assert!(!CoordinatorError::UnknownOrganization {
            organization_id: id("o1")
        }
        .is_retryable());
    }

    #[tokio::test]
    async fn default_coordinator_shares_the_given_store() {
        let store = InMemoryEntityStore::from_organizations([Organization::pending(id("o1"))]);
        let coord = MutationCoordinator::new(Arc::new(store.clone()), Arc::new(Echo));

        let req =
            TransitionRequest::resolve(id("o1"), OrganizationStatus::Pending, TransitionAction::Reject)
                .unwrap();
        let _ = coord.execute(req).await.unwrap();

        assert_eq!(
            coord.store().get(&id("o1")).map(|o| o.status),
            Some(OrganizationStatus::Rejected)
        );
        assert_eq!(store.get(&id("o1")), coord.store().get(&id("o1")));
        assert!(coord.recent_transitions()[0].timestamp <= SystemClock.now());
    }

    #[test]
    fn unknown_organization_has_no_actions() {
        let store = InMemoryEntityStore::new();
        let coord = coordinator(&store, 4);
        assert!(coord.available_actions(&id("nope")).is_none());
        assert!(coord.validity(&id("nope")).is_none());
    }
}
