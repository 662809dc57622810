//! Account-level premium summary.
//!
//! A materialized view over a user's active subscription records. Always
//! recomputed from the full active set, never patched in place, so it can
//! not drift from the records that justify it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::SubscriptionRecord;

/// Effective premium status for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumSummary {
    /// Whether any entitlement currently grants access.
    pub is_premium: bool,

    /// Expiry of the dominating entitlement; None when premium is
    /// open-ended or absent.
    pub premium_expires_at: Option<Timestamp>,

    /// Renewal intent of the dominating entitlement; None when no
    /// entitlement is active.
    pub premium_will_renew: Option<bool>,
}

impl PremiumSummary {
    /// Summary for a user with no active entitlements.
    pub fn none() -> Self {
        Self {
            is_premium: false,
            premium_expires_at: None,
            premium_will_renew: None,
        }
    }

    /// Derives the summary from a user's subscription records.
    ///
    /// Only records with `is_active = true` contribute. The dominating
    /// record is the one expiring last, with open-ended records (no
    /// expiry) ranked above any dated one. Ties on expiry keep the input
    /// order, which callers should not rely on beyond determinism.
    pub fn from_records(records: &[SubscriptionRecord]) -> Self {
        let mut active: Vec<&SubscriptionRecord> =
            records.iter().filter(|r| r.is_active).collect();

        active.sort_by(|a, b| compare_dominance(a.expires_at, b.expires_at));

        match active.first() {
            None => Self::none(),
            Some(best) => Self {
                is_premium: true,
                premium_expires_at: best.expires_at,
                premium_will_renew: best.will_renew,
            },
        }
    }
}

/// Orders expiries so the dominating one sorts first: open-ended before
/// dated, later dates before earlier ones.
fn compare_dominance(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EntitlementId, SubscriptionId, UserId};
    use serde_json::json;

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_700_000_000_000).unwrap()
    }

    fn record(
        entitlement: &str,
        is_active: bool,
        expires_at: Option<Timestamp>,
        will_renew: Option<bool>,
    ) -> SubscriptionRecord {
        SubscriptionRecord {
            id: SubscriptionId::new(),
            user_id: UserId::new("user-123").unwrap(),
            entitlement_id: EntitlementId::new(entitlement).unwrap(),
            product_id: "premium_monthly".to_string(),
            is_active,
            will_renew,
            store: Some("app_store".to_string()),
            period_type: Some("normal".to_string()),
            original_purchase_at: Some(now().add_days(-30)),
            latest_purchase_at: Some(now().add_days(-30)),
            expires_at,
            cancelled_at: None,
            last_event_type: "RENEWAL".to_string(),
            last_event_at: now(),
            last_event_id: None,
            raw_last_event: json!({}),
            created_at: now().add_days(-30),
            updated_at: now(),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Empty and Inactive Sets
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn no_records_yields_no_premium() {
        let summary = PremiumSummary::from_records(&[]);

        assert_eq!(summary, PremiumSummary::none());
        assert!(!summary.is_premium);
        assert_eq!(summary.premium_expires_at, None);
        assert_eq!(summary.premium_will_renew, None);
    }

    #[test]
    fn inactive_records_do_not_contribute() {
        let records = vec![
            record("pro", false, Some(now().add_days(30)), Some(true)),
            record("extras", false, None, Some(true)),
        ];

        let summary = PremiumSummary::from_records(&records);

        assert!(!summary.is_premium);
    }

    // ══════════════════════════════════════════════════════════════
    // Dominance Selection
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn single_active_record_defines_the_summary() {
        let records = vec![record("pro", true, Some(now().add_days(30)), Some(true))];

        let summary = PremiumSummary::from_records(&records);

        assert!(summary.is_premium);
        assert_eq!(summary.premium_expires_at, Some(now().add_days(30)));
        assert_eq!(summary.premium_will_renew, Some(true));
    }

    #[test]
    fn latest_expiry_dominates() {
        let records = vec![
            record("pro", true, Some(now().add_days(10)), Some(false)),
            record("extras", true, Some(now().add_days(90)), Some(true)),
            record("addon", true, Some(now().add_days(40)), Some(false)),
        ];

        let summary = PremiumSummary::from_records(&records);

        assert_eq!(summary.premium_expires_at, Some(now().add_days(90)));
        assert_eq!(summary.premium_will_renew, Some(true));
    }

    #[test]
    fn open_ended_record_dominates_dated_ones() {
        let records = vec![
            record("pro", true, Some(now().add_days(365)), Some(true)),
            record("lifetime", true, None, Some(false)),
        ];

        let summary = PremiumSummary::from_records(&records);

        assert!(summary.is_premium);
        assert_eq!(summary.premium_expires_at, None);
        assert_eq!(summary.premium_will_renew, Some(false));
    }

    #[test]
    fn mixed_active_and_inactive_records_use_only_active() {
        let records = vec![
            record("expired", false, Some(now().add_days(999)), Some(true)),
            record("pro", true, Some(now().add_days(5)), Some(false)),
        ];

        let summary = PremiumSummary::from_records(&records);

        assert!(summary.is_premium);
        assert_eq!(summary.premium_expires_at, Some(now().add_days(5)));
    }

    #[test]
    fn result_is_order_independent() {
        let a = record("pro", true, Some(now().add_days(10)), Some(false));
        let b = record("extras", true, Some(now().add_days(90)), Some(true));
        let c = record("lapsed", false, None, None);

        let forward = PremiumSummary::from_records(&[a.clone(), b.clone(), c.clone()]);
        let reversed = PremiumSummary::from_records(&[c, b, a]);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn recomputing_without_writes_is_stable() {
        let records = vec![
            record("pro", true, Some(now().add_days(10)), Some(true)),
            record("extras", true, None, Some(false)),
        ];

        let first = PremiumSummary::from_records(&records);
        let second = PremiumSummary::from_records(&records);

        assert_eq!(first, second);
    }

    #[test]
    fn tie_on_expiry_keeps_input_order() {
        let same_expiry = Some(now().add_days(30));
        let first = record("pro", true, same_expiry, Some(true));
        let second = record("extras", true, same_expiry, Some(false));

        let summary = PremiumSummary::from_records(&[first, second]);

        // Stable sort: the earlier input wins the tie.
        assert_eq!(summary.premium_will_renew, Some(true));
    }

    // ══════════════════════════════════════════════════════════════
    // Properties
    // ══════════════════════════════════════════════════════════════

    mod properties {
        use super::*;
        use proptest::prelude::*;

        prop_compose! {
            fn arb_record()(
                entitlement in "[a-z]{3,8}",
                is_active in any::<bool>(),
                expires_offset in proptest::option::of(-400_i64..400),
                will_renew in proptest::option::of(any::<bool>()),
            ) -> SubscriptionRecord {
                record(
                    &entitlement,
                    is_active,
                    expires_offset.map(|d| now().add_days(d)),
                    will_renew,
                )
            }
        }

        proptest! {
            #[test]
            fn premium_iff_some_record_is_active(
                records in proptest::collection::vec(arb_record(), 0..8),
            ) {
                let summary = PremiumSummary::from_records(&records);
                let any_active = records.iter().any(|r| r.is_active);
                prop_assert_eq!(summary.is_premium, any_active);
            }

            #[test]
            fn summary_expiry_is_maximal_among_active(
                records in proptest::collection::vec(arb_record(), 1..8),
            ) {
                let summary = PremiumSummary::from_records(&records);
                if summary.is_premium {
                    match summary.premium_expires_at {
                        // Open-ended summaries require an open-ended active record.
                        None => prop_assert!(records
                            .iter()
                            .any(|r| r.is_active && r.expires_at.is_none())),
                        Some(chosen) => {
                            for r in records.iter().filter(|r| r.is_active) {
                                prop_assert!(r.expires_at.is_some());
                                prop_assert!(r.expires_at.unwrap() <= chosen);
                            }
                        }
                    }
                }
            }

            #[test]
            fn reversal_does_not_change_premium_flag_or_expiry(
                records in proptest::collection::vec(arb_record(), 0..8),
            ) {
                let forward = PremiumSummary::from_records(&records);
                let mut backwards = records.clone();
                backwards.reverse();
                let reversed = PremiumSummary::from_records(&backwards);

                prop_assert_eq!(forward.is_premium, reversed.is_premium);
                prop_assert_eq!(forward.premium_expires_at, reversed.premium_expires_at);
            }
        }
    }
}
