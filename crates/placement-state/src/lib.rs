//! # placement-state — Organization Lifecycle Rules
//!
//! The synchronous, side-effect-free half of the lifecycle engine.
//!
//! - **Organization** (`organization.rs`): the entity, its four statuses,
//!   and the record of a committed transition.
//!
//! - **Transitions** (`transition.rs`): the legal transition table, the
//!   requests callers submit, and [`plan_transition`], the single authority
//!   on whether a request may run now, needs more input, or is refused.
//!
//! - **Validity** (`validity.rs`): operability derived from status plus the
//!   optional agreement expiry, at calendar-day granularity.
//!
//! Nothing here performs I/O or reads the clock; "today" is always passed in.

pub mod organization;
pub mod transition;
pub mod validity;

// ─── Organization re-exports ────────────────────────────────────────

pub use organization::{Organization, OrganizationStatus, TransitionRecord, UnknownStatus};

// ─── Transition re-exports ──────────────────────────────────────────

pub use transition::{
    available_actions, plan_transition, rule_for, ExpiryInput, MissingInput, TransitionAction,
    TransitionDecision, TransitionError, TransitionPlan, TransitionRequest, TransitionRule,
    UnknownAction, TRANSITIONS,
};

// ─── Validity re-exports ────────────────────────────────────────────

pub use validity::{
    agreement_status, can_operate, days_until_expiry, describe, is_expiring_soon, AgreementStatus,
    OperationalValidity, DEFAULT_EXPIRING_SOON_DAYS,
};
