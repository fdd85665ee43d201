//! # Organization Lifecycle State Machine
//!
//! Defines which status changes an organization may undergo and what input
//! each change requires.
//!
//! ## Transitions
//!
//! ```text
//!            APPROVE*             SUSPEND
//! PENDING ───────────▶ ACTIVE ───────────▶ SUSPENDED
//!    │ ▲                  ▲                    │
//!    │ │                  └────────────────────┘
//!    │ │                       REACTIVATE*
//!    │ │ REACTIVATE
//!    ▼ │
//! REJECTED
//!
//! * requires an explicit agreement-expiry decision
//! ```
//!
//! ## Design Decision
//!
//! The machine is a lookup table rather than typestate types: the status of
//! an organization arrives at runtime from the backend, the same action
//! (`REACTIVATE`) lands in different statuses depending on where it starts,
//! and callers need to enumerate the legal actions for a status to decide
//! what to offer. [`plan_transition`] is the single place legality is
//! decided; nothing else in the workspace re-derives it.
//!
//! ## Outcomes
//!
//! [`plan_transition`] separates three cases:
//!
//! - `Ok(TransitionDecision::Ready(plan))`: the transition may run.
//! - `Ok(TransitionDecision::NeedsInput(..))`: legal, but the caller must
//!   collect more data (an expiry decision) and resubmit.
//! - `Err(TransitionError)`: the request can never succeed as submitted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use placement_core::{CalendarDate, OrganizationId};

use crate::organization::OrganizationStatus;

// ─── Actions ─────────────────────────────────────────────────────────

/// An administrator action on an organization's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionAction {
    /// Accept a pending registration.
    Approve,
    /// Refuse a pending registration.
    Reject,
    /// Bar an active organization from operating.
    Suspend,
    /// Reopen a suspended (back to active) or rejected (back to review) account.
    Reactivate,
}

impl TransitionAction {
    /// All actions, in display order.
    pub const ALL: [TransitionAction; 4] = [
        Self::Approve,
        Self::Reject,
        Self::Suspend,
        Self::Reactivate,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Suspend => "SUSPEND",
            Self::Reactivate => "REACTIVATE",
        }
    }

    /// The status this action leads to from `from`, if it is legal there.
    pub fn target_from(&self, from: OrganizationStatus) -> Option<OrganizationStatus> {
        rule_for(from, *self).map(|rule| rule.to)
    }
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for TransitionAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// An action name that does not match any [`TransitionAction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transition action: {0:?}")]
pub struct UnknownAction(pub String);

// ─── Transition Table ────────────────────────────────────────────────

/// One row of the legal transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Status the organization must currently be in.
    pub from: OrganizationStatus,
    /// Requested action.
    pub action: TransitionAction,
    /// Resulting status.
    pub to: OrganizationStatus,
}

impl TransitionRule {
    /// Whether this transition requires an explicit agreement-expiry decision.
    ///
    /// Every transition landing in `Active` does, so that an expiry from a
    /// previous activation is never silently carried over.
    pub fn requires_expiry(&self) -> bool {
        self.to == OrganizationStatus::Active
    }
}

/// The complete set of legal transitions.
pub const TRANSITIONS: [TransitionRule; 5] = [
    TransitionRule {
        from: OrganizationStatus::Pending,
        action: TransitionAction::Approve,
        to: OrganizationStatus::Active,
    },
    TransitionRule {
        from: OrganizationStatus::Pending,
        action: TransitionAction::Reject,
        to: OrganizationStatus::Rejected,
    },
    TransitionRule {
        from: OrganizationStatus::Active,
        action: TransitionAction::Suspend,
        to: OrganizationStatus::Suspended,
    },
    TransitionRule {
        from: OrganizationStatus::Suspended,
        action: TransitionAction::Reactivate,
        to: OrganizationStatus::Active,
    },
    TransitionRule {
        from: OrganizationStatus::Rejected,
        action: TransitionAction::Reactivate,
        to: OrganizationStatus::Pending,
    },
];

/// Look up the rule for a `(status, action)` pair.
pub fn rule_for(from: OrganizationStatus, action: TransitionAction) -> Option<TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.action == action)
        .copied()
}

/// The rules applicable to an organization currently in `status`.
///
/// Callers offering actions to an operator must offer exactly these.
pub fn available_actions(status: OrganizationStatus) -> Vec<TransitionRule> {
    TRANSITIONS
        .iter()
        .filter(|rule| rule.from == status)
        .copied()
        .collect()
}

// ─── Requests ────────────────────────────────────────────────────────

/// The operator's decision on the agreement expiry of an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum ExpiryInput {
    /// Activate without an enforced expiry.
    NoExpiry,
    /// The agreement ends on this date.
    On(CalendarDate),
}

impl ExpiryInput {
    /// The chosen date, if any.
    pub fn date(&self) -> Option<CalendarDate> {
        match self {
            Self::NoExpiry => None,
            Self::On(date) => Some(*date),
        }
    }
}

impl From<Option<CalendarDate>> for ExpiryInput {
    fn from(date: Option<CalendarDate>) -> Self {
        date.map_or(Self::NoExpiry, Self::On)
    }
}

/// A request to move one organization through one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    /// The organization to transition.
    pub organization_id: OrganizationId,
    /// Requested action.
    pub action: TransitionAction,
    /// The status the caller expects to land in.
    pub target_status: OrganizationStatus,
    /// Expiry decision; `None` means the caller has not decided yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_expiry: Option<ExpiryInput>,
}

impl TransitionRequest {
    /// A request with no expiry decision attached.
    pub fn new(
        organization_id: OrganizationId,
        action: TransitionAction,
        target_status: OrganizationStatus,
    ) -> Self {
        Self {
            organization_id,
            action,
            target_status,
            agreement_expiry: None,
        }
    }

    /// Build a request for `action` on an organization currently in
    /// `current`, resolving the target status from the transition table.
    ///
    /// # Errors
    ///
    /// [`TransitionError::IllegalTransition`] if `action` is not legal from
    /// `current`.
    pub fn resolve(
        organization_id: OrganizationId,
        current: OrganizationStatus,
        action: TransitionAction,
    ) -> Result<Self, TransitionError> {
        let rule = rule_for(current, action).ok_or(TransitionError::IllegalTransition {
            status: current,
            action,
        })?;
        Ok(Self::new(organization_id, action, rule.to))
    }

    /// Attach (or replace) the expiry decision.
    pub fn with_expiry(mut self, expiry: ExpiryInput) -> Self {
        self.agreement_expiry = Some(expiry);
        self
    }
}

// ─── Decisions ───────────────────────────────────────────────────────

/// Input the caller must collect before a transition may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingInput {
    /// An explicit agreement-expiry decision (a date, or "no expiry").
    AgreementExpiry,
}

impl std::fmt::Display for MissingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AgreementExpiry => f.write_str("agreement expiry decision"),
        }
    }
}

/// A validated transition, ready for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Status at validation time.
    pub from: OrganizationStatus,
    /// Requested action.
    pub action: TransitionAction,
    /// Resulting status.
    pub to: OrganizationStatus,
    /// Expiry to write. Only `Some` for transitions landing in `Active`.
    pub agreement_expiry: Option<ExpiryInput>,
}

/// The outcome of consulting the state machine.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// The transition may run as planned.
    Ready(TransitionPlan),
    /// The transition is legal but blocked on caller input.
    NeedsInput {
        /// Resulting status once the input is supplied.
        to: OrganizationStatus,
        /// What must be supplied.
        missing: MissingInput,
    },
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Requests the state machine refuses outright.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The action is not legal from the current status, or the declared
    /// target does not match where the action leads.
    #[error("illegal transition: {action} is not allowed from {status}")]
    IllegalTransition {
        /// Current status.
        status: OrganizationStatus,
        /// Refused action.
        action: TransitionAction,
    },

    /// The chosen expiry date had already passed when submitted.
    #[error("agreement expiry {expiry} is in the past (today is {today})")]
    ExpiryInPast {
        /// The rejected date.
        expiry: CalendarDate,
        /// The evaluation date.
        today: CalendarDate,
    },
}

/// Validate `request` against an organization currently in `current`.
///
/// `today` is the submission date used to bound the expiry input: dates
/// before today are refused, today itself is accepted.
///
/// An expiry decision attached to a transition that does not land in
/// `Active` is ignored and does not appear in the plan.
pub fn plan_transition(
    current: OrganizationStatus,
    request: &TransitionRequest,
    today: CalendarDate,
) -> Result<TransitionDecision, TransitionError> {
    let rule = rule_for(current, request.action)
        .filter(|rule| rule.to == request.target_status)
        .ok_or(TransitionError::IllegalTransition {
            status: current,
            action: request.action,
        })?;

    if !rule.requires_expiry() {
        return Ok(TransitionDecision::Ready(TransitionPlan {
            from: rule.from,
            action: rule.action,
            to: rule.to,
            agreement_expiry: None,
        }));
    }

    let Some(expiry) = request.agreement_expiry else {
        return Ok(TransitionDecision::NeedsInput {
            to: rule.to,
            missing: MissingInput::AgreementExpiry,
        });
    };

    if let ExpiryInput::On(date) = expiry {
        if date < today {
            return Err(TransitionError::ExpiryInPast {
                expiry: date,
                today,
            });
        }
    }

    Ok(TransitionDecision::Ready(TransitionPlan {
        from: rule.from,
        action: rule.action,
        to: rule.to,
        agreement_expiry: Some(expiry),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> OrganizationId {
        OrganizationId::new("o1").unwrap()
    }

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2026, 3, 1).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn request(
        current: OrganizationStatus,
        action: TransitionAction,
    ) -> TransitionRequest {
        TransitionRequest::resolve(id(), current, action).unwrap()
    }

    // ── Table ────────────────────────────────────────────────────────

    #[test]
    fn test_table_targets() {
        use OrganizationStatus::*;
        use TransitionAction::*;
        assert_eq!(Approve.target_from(Pending), Some(Active));
        assert_eq!(Reject.target_from(Pending), Some(Rejected));
        assert_eq!(Suspend.target_from(Active), Some(Suspended));
        assert_eq!(Reactivate.target_from(Suspended), Some(Active));
        assert_eq!(Reactivate.target_from(Rejected), Some(Pending));
    }

    #[test]
    fn test_every_unlisted_pair_is_illegal() {
        let mut legal = 0;
        for status in OrganizationStatus::ALL {
            for action in TransitionAction::ALL {
                if rule_for(status, action).is_some() {
                    legal += 1;
                } else {
                    assert!(action.target_from(status).is_none());
                }
            }
        }
        assert_eq!(legal, TRANSITIONS.len());
    }

    #[test]
    fn test_no_terminal_status() {
        for status in OrganizationStatus::ALL {
            assert!(
                !available_actions(status).is_empty(),
                "{status} has no outgoing transition"
            );
        }
    }

    #[test]
    fn test_available_actions() {
        let pending: Vec<_> = available_actions(OrganizationStatus::Pending)
            .into_iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(pending, vec![TransitionAction::Approve, TransitionAction::Reject]);

        let active: Vec<_> = available_actions(OrganizationStatus::Active)
            .into_iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(active, vec![TransitionAction::Suspend]);
    }

    #[test]
    fn test_only_active_bound_rules_require_expiry() {
        for rule in TRANSITIONS {
            assert_eq!(rule.requires_expiry(), rule.to == OrganizationStatus::Active);
        }
    }

    // ── plan_transition ──────────────────────────────────────────────

    #[test]
    fn test_suspend_on_pending_is_illegal() {
        let req = TransitionRequest::new(
            id(),
            TransitionAction::Suspend,
            OrganizationStatus::Suspended,
        );
        let err = plan_transition(OrganizationStatus::Pending, &req, today()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                status: OrganizationStatus::Pending,
                action: TransitionAction::Suspend,
            }
        );
        assert!(err.to_string().contains("SUSPEND"));
        assert!(err.to_string().contains("PENDING"));
    }

    #[test]
    fn test_resolve_rejects_illegal_action() {
        assert!(TransitionRequest::resolve(
            id(),
            OrganizationStatus::Rejected,
            TransitionAction::Suspend
        )
        .is_err());
    }

    #[test]
    fn test_target_mismatch_is_illegal() {
        // REACTIVATE from REJECTED leads to PENDING, not ACTIVE.
        let req = TransitionRequest::new(
            id(),
            TransitionAction::Reactivate,
            OrganizationStatus::Active,
        )
        .with_expiry(ExpiryInput::NoExpiry);
        assert!(matches!(
            plan_transition(OrganizationStatus::Rejected, &req, today()),
            Err(TransitionError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_approve_without_expiry_needs_input() {
        let req = request(OrganizationStatus::Pending, TransitionAction::Approve);
        assert_eq!(
            plan_transition(OrganizationStatus::Pending, &req, today()).unwrap(),
            TransitionDecision::NeedsInput {
                to: OrganizationStatus::Active,
                missing: MissingInput::AgreementExpiry,
            }
        );
    }

    #[test]
    fn test_reactivate_suspended_needs_input() {
        let req = request(OrganizationStatus::Suspended, TransitionAction::Reactivate);
        assert!(matches!(
            plan_transition(OrganizationStatus::Suspended, &req, today()).unwrap(),
            TransitionDecision::NeedsInput { .. }
        ));
    }

    #[test]
    fn test_approve_with_future_expiry_is_ready() {
        let req = request(OrganizationStatus::Pending, TransitionAction::Approve)
            .with_expiry(ExpiryInput::On(date(2099, 1, 1)));
        let decision = plan_transition(OrganizationStatus::Pending, &req, today()).unwrap();
        assert_eq!(
            decision,
            TransitionDecision::Ready(TransitionPlan {
                from: OrganizationStatus::Pending,
                action: TransitionAction::Approve,
                to: OrganizationStatus::Active,
                agreement_expiry: Some(ExpiryInput::On(date(2099, 1, 1))),
            })
        );
    }

    #[test]
    fn test_explicit_no_expiry_is_ready() {
        let req = request(OrganizationStatus::Suspended, TransitionAction::Reactivate)
            .with_expiry(ExpiryInput::NoExpiry);
        match plan_transition(OrganizationStatus::Suspended, &req, today()).unwrap() {
            TransitionDecision::Ready(plan) => {
                assert_eq!(plan.agreement_expiry, Some(ExpiryInput::NoExpiry));
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_expiry_today_accepted_yesterday_refused() {
        let ok = request(OrganizationStatus::Pending, TransitionAction::Approve)
            .with_expiry(ExpiryInput::On(today()));
        assert!(plan_transition(OrganizationStatus::Pending, &ok, today()).is_ok());

        let yesterday = date(2026, 2, 28);
        let late = request(OrganizationStatus::Pending, TransitionAction::Approve)
            .with_expiry(ExpiryInput::On(yesterday));
        assert_eq!(
            plan_transition(OrganizationStatus::Pending, &late, today()).unwrap_err(),
            TransitionError::ExpiryInPast {
                expiry: yesterday,
                today: today(),
            }
        );
    }

    #[test]
    fn test_unconditional_transitions_ignore_expiry() {
        for (from, action) in [
            (OrganizationStatus::Pending, TransitionAction::Reject),
            (OrganizationStatus::Active, TransitionAction::Suspend),
            (OrganizationStatus::Rejected, TransitionAction::Reactivate),
        ] {
            let req = request(from, action).with_expiry(ExpiryInput::On(date(2099, 1, 1)));
            match plan_transition(from, &req, today()).unwrap() {
                TransitionDecision::Ready(plan) => assert!(plan.agreement_expiry.is_none()),
                other => panic!("{action} from {from}: expected Ready, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_past_expiry_on_unconditional_transition_is_ignored() {
        let req = request(OrganizationStatus::Active, TransitionAction::Suspend)
            .with_expiry(ExpiryInput::On(date(2000, 1, 1)));
        assert!(plan_transition(OrganizationStatus::Active, &req, today()).is_ok());
    }

    // ── Parsing / serde ──────────────────────────────────────────────

    #[test]
    fn test_action_parse_case_insensitive() {
        assert_eq!(
            "reactivate".parse::<TransitionAction>().unwrap(),
            TransitionAction::Reactivate
        );
        assert!("delete".parse::<TransitionAction>().is_err());
    }

    #[test]
    fn test_request_wire_format() {
        let req = request(OrganizationStatus::Pending, TransitionAction::Approve)
            .with_expiry(ExpiryInput::On(date(2099, 1, 1)));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "organizationId": "o1",
                "action": "APPROVE",
                "targetStatus": "ACTIVE",
                "agreementExpiry": { "kind": "on", "date": "2099-01-01" }
            })
        );
    }

    #[test]
    fn test_expiry_input_from_option() {
        assert_eq!(ExpiryInput::from(None), ExpiryInput::NoExpiry);
        assert_eq!(
            ExpiryInput::from(Some(date(2099, 1, 1))).date(),
            Some(date(2099, 1, 1))
        );
    }
}
