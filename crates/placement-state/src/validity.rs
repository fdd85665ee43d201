//! # Agreement Validity
//!
//! Pure derivations of whether an organization may currently operate.
//!
//! Two questions are kept apart:
//!
//! - **Is the agreement itself in force?** ([`agreement_status`]) Depends
//!   only on the expiry date. A suspended organization can hold a valid
//!   agreement.
//! - **May the organization operate?** ([`can_operate`]) Requires `Active`
//!   status *and* an agreement in force.
//!
//! Every function takes the evaluation date explicitly. An agreement is in
//! force only while its expiry date is strictly after `today`; on the expiry
//! day itself it is already over.

use serde::{Deserialize, Serialize};

use placement_core::CalendarDate;

use crate::organization::{Organization, OrganizationStatus};

/// Default look-ahead, in days, for [`is_expiring_soon`].
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

/// State of the agreement, independent of account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementStatus {
    /// Expiry is strictly after today.
    Valid,
    /// Expiry is today or earlier.
    Expired,
    /// No expiry is enforced.
    NoExpiry,
}

impl AgreementStatus {
    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Expired => "Expired",
            Self::NoExpiry => "No expiry",
        }
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Whether `org` may operate on `today`.
pub fn can_operate(org: &Organization, today: CalendarDate) -> bool {
    if org.status != OrganizationStatus::Active {
        return false;
    }
    agreement_status(org, today) != AgreementStatus::Expired
}

/// The state of `org`'s agreement on `today`, ignoring its account status.
pub fn agreement_status(org: &Organization, today: CalendarDate) -> AgreementStatus {
    match org.agreement_expiry {
        None => AgreementStatus::NoExpiry,
        Some(expiry) if expiry > today => AgreementStatus::Valid,
        Some(_) => AgreementStatus::Expired,
    }
}

/// Signed calendar days from `today` to the expiry; `None` without expiry.
pub fn days_until_expiry(org: &Organization, today: CalendarDate) -> Option<i64> {
    org.agreement_expiry.map(|expiry| today.days_until(expiry))
}

/// Whether the agreement is still in force but ends within `threshold_days`.
pub fn is_expiring_soon(org: &Organization, today: CalendarDate, threshold_days: i64) -> bool {
    matches!(days_until_expiry(org, today), Some(days) if days > 0 && days <= threshold_days)
}

/// One-line human-readable summary of `org`'s operability on `today`.
pub fn describe(org: &Organization, today: CalendarDate) -> String {
    if org.status != OrganizationStatus::Active {
        return format!("Not operable: organization is {}", org.status);
    }
    match (org.agreement_expiry, days_until_expiry(org, today)) {
        (Some(expiry), Some(days)) if days > 0 => format!(
            "Operable: agreement valid until {expiry} ({days} {} left)",
            plural_days(days)
        ),
        (Some(expiry), Some(0)) => format!("Not operable: agreement ends today ({expiry})"),
        (Some(expiry), Some(days)) => format!(
            "Not operable: agreement expired on {expiry} ({} {} ago)",
            -days,
            plural_days(-days)
        ),
        _ => "Operable: no agreement expiry".to_string(),
    }
}

fn plural_days(n: i64) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

/// Everything a dashboard shows about an organization's operability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalValidity {
    /// Agreement state, independent of status.
    pub agreement: AgreementStatus,
    /// Signed days to expiry, when one is set.
    pub days_until_expiry: Option<i64>,
    /// Whether the organization may operate.
    pub can_operate: bool,
    /// Whether the agreement ends within the look-ahead window.
    pub expiring_soon: bool,
    /// Human-readable summary.
    pub description: String,
}

impl OperationalValidity {
    /// Evaluate `org` on `today` with the given expiring-soon window.
    pub fn evaluate(org: &Organization, today: CalendarDate, threshold_days: i64) -> Self {
        Self {
            agreement: agreement_status(org, today),
            days_until_expiry: days_until_expiry(org, today),
            can_operate: can_operate(org, today),
            expiring_soon: is_expiring_soon(org, today, threshold_days),
            description: describe(org, today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::OrganizationId;
    use proptest::prelude::*;

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2026, 3, 1).unwrap()
    }

    fn in_days(n: i64) -> CalendarDate {
        today().offset_days(n).unwrap()
    }

    fn org(status: OrganizationStatus, expiry: Option<CalendarDate>) -> Organization {
        let mut org = Organization::with_status(OrganizationId::new("o1").unwrap(), status);
        org.agreement_expiry = expiry;
        org
    }

    fn status_strategy() -> impl Strategy<Value = OrganizationStatus> {
        prop::sample::select(OrganizationStatus::ALL.to_vec())
    }

    // ── can_operate ──────────────────────────────────────────────────

    #[test]
    fn active_without_expiry_can_operate() {
        assert!(can_operate(&org(OrganizationStatus::Active, None), today()));
    }

    #[test]
    fn active_expiring_today_cannot_operate() {
        let o = org(OrganizationStatus::Active, Some(today()));
        assert!(!can_operate(&o, today()));
        assert_eq!(days_until_expiry(&o, today()), Some(0));
        assert_eq!(agreement_status(&o, today()), AgreementStatus::Expired);
    }

    #[test]
    fn active_expiring_tomorrow_can_operate() {
        let o = org(OrganizationStatus::Active, Some(in_days(1)));
        assert!(can_operate(&o, today()));
        assert_eq!(days_until_expiry(&o, today()), Some(1));
    }

    #[test]
    fn active_past_expiry_cannot_operate() {
        let o = org(OrganizationStatus::Active, Some(in_days(-10)));
        assert!(!can_operate(&o, today()));
        assert_eq!(days_until_expiry(&o, today()), Some(-10));
    }

    // ── agreement_status ─────────────────────────────────────────────

    #[test]
    fn agreement_status_ignores_account_status() {
        let o = org(OrganizationStatus::Suspended, Some(in_days(100)));
        assert_eq!(agreement_status(&o, today()), AgreementStatus::Valid);
        assert!(!can_operate(&o, today()));
    }

    #[test]
    fn no_expiry_reported() {
        let o = org(OrganizationStatus::Pending, None);
        assert_eq!(agreement_status(&o, today()), AgreementStatus::NoExpiry);
        assert_eq!(days_until_expiry(&o, today()), None);
    }

    // ── is_expiring_soon ─────────────────────────────────────────────

    #[test]
    fn expiring_soon_window_is_open_closed() {
        let check = |days| {
            is_expiring_soon(
                &org(OrganizationStatus::Active, Some(in_days(days))),
                today(),
                DEFAULT_EXPIRING_SOON_DAYS,
            )
        };
        assert!(!check(0));
        assert!(check(1));
        assert!(check(30));
        assert!(!check(31));
        assert!(!check(-1));
    }

    #[test]
    fn expiring_soon_false_without_expiry() {
        assert!(!is_expiring_soon(
            &org(OrganizationStatus::Active, None),
            today(),
            DEFAULT_EXPIRING_SOON_DAYS
        ));
    }

    #[test]
    fn expiring_soon_custom_threshold() {
        let o = org(OrganizationStatus::Active, Some(in_days(7)));
        assert!(is_expiring_soon(&o, today(), 7));
        assert!(!is_expiring_soon(&o, today(), 6));
    }

    // ── describe ─────────────────────────────────────────────────────

    #[test]
    fn describe_covers_each_case() {
        assert_eq!(
            describe(&org(OrganizationStatus::Rejected, None), today()),
            "Not operable: organization is REJECTED"
        );
        assert_eq!(
            describe(&org(OrganizationStatus::Active, None), today()),
            "Operable: no agreement expiry"
        );
        assert_eq!(
            describe(&org(OrganizationStatus::Active, Some(in_days(1))), today()),
            "Operable: agreement valid until 2026-03-02 (1 day left)"
        );
        assert_eq!(
            describe(&org(OrganizationStatus::Active, Some(today())), today()),
            "Not operable: agreement ends today (2026-03-01)"
        );
        assert_eq!(
            describe(&org(OrganizationStatus::Active, Some(in_days(-3))), today()),
            "Not operable: agreement expired on 2026-02-26 (3 days ago)"
        );
    }

    #[test]
    fn evaluate_bundles_everything() {
        let v = OperationalValidity::evaluate(
            &org(OrganizationStatus::Active, Some(in_days(12))),
            today(),
            DEFAULT_EXPIRING_SOON_DAYS,
        );
        assert_eq!(v.agreement, AgreementStatus::Valid);
        assert_eq!(v.days_until_expiry, Some(12));
        assert!(v.can_operate);
        assert!(v.expiring_soon);
        assert!(v.description.starts_with("Operable"));
    }

    // ── invariants ───────────────────────────────────────────────────

    proptest! {
        #[test]
        fn only_active_can_operate(
            status in status_strategy(),
            offset in proptest::option::of(-400i64..400),
        ) {
            let o = org(status, offset.map(in_days));
            if status != OrganizationStatus::Active {
                prop_assert!(!can_operate(&o, today()));
            }
        }

        #[test]
        fn active_operability_matches_agreement(offset in proptest::option::of(-400i64..400)) {
            let o = org(OrganizationStatus::Active, offset.map(in_days));
            let in_force = agreement_status(&o, today()) != AgreementStatus::Expired;
            prop_assert_eq!(can_operate(&o, today()), in_force);
        }

        #[test]
        fn expiring_soon_implies_operable_agreement(
            status in status_strategy(),
            offset in -400i64..400,
        ) {
            let o = org(status, Some(in_days(offset)));
            if is_expiring_soon(&o, today(), DEFAULT_EXPIRING_SOON_DAYS) {
                prop_assert_eq!(agreement_status(&o, today()), AgreementStatus::Valid);
            }
        }
    }
}
