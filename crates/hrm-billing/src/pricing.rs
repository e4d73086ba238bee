//! Headcount Pricing
//!
//! Pure quoting over a plan's tier table. Money stays in integer
//! smallest-currency-unit space; nothing here touches floating point.

use serde::{Deserialize, Serialize};

use hrm_common::{Money, PlanId};

use crate::catalog::Plan;
use crate::{BillingError, BillingResult};

/// A fully computed price for a plan/headcount/period triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted plan
    pub plan_id: PlanId,
    /// Monthly per-user rate applied
    pub unit_rate: Money,
    /// Headcount after flooring to the plan's included-user minimum
    pub billable_users: u32,
    /// Billing period in months (12 for annual)
    pub period_months: u32,
    /// `unit_rate * billable_users * period_months`
    pub total: Money,
    /// Label of the tier that supplied the rate
    pub tier_label: String,
}

/// Outcome of a quote: a price, or a signal to route to manual sales
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteOutcome {
    /// Self-serve price
    Priced(Quote),
    /// Headcount is at or above the plan's self-serve ceiling
    ContactSales {
        /// Billable headcount that crossed the threshold
        billable_users: u32,
    },
}

impl QuoteOutcome {
    /// The quote, if the outcome is priced
    pub fn priced(self) -> Option<Quote> {
        match self {
            Self::Priced(q) => Some(q),
            Self::ContactSales { .. } => None,
        }
    }
}

/// Quote a plan for a headcount over a billing period.
///
/// Headcount is floored to the plan's included-user minimum: a tenant
/// requesting fewer seats is still billed at the floor. A request below the
/// minimum prices at the plan's flat base rate rather than the first tier;
/// this mirrors the observed product behavior and is preserved as-is.
pub fn quote(plan: &Plan, headcount: u32, period_months: u32) -> BillingResult<QuoteOutcome> {
    if headcount < 1 {
        return Err(BillingError::InvalidHeadcount(headcount));
    }
    if period_months < 1 {
        return Err(BillingError::InvalidPeriod(period_months));
    }

    let billable = headcount.max(plan.included_users);
    if billable >= plan.contact_sales_from {
        return Ok(QuoteOutcome::ContactSales {
            billable_users: billable,
        });
    }

    let (unit_rate, tier_label) = if headcount < plan.included_users {
        (plan.base_rate, "base".to_string())
    } else {
        match plan.tiers.iter().find(|t| t.covers(billable)) {
            Some(tier) => (tier.unit_rate, tier.label.clone()),
            // Billable below the first tier's lower bound; tiers are
            // invariant-checked contiguous up to contact_sales_from.
            None => (plan.base_rate, "base".to_string()),
        }
    };

    let total = unit_rate
        .checked_mul(Money::from(billable))
        .and_then(|t| t.checked_mul(Money::from(period_months)))
        .ok_or_else(|| {
            BillingError::InvalidPlan(format!("quote for plan {} overflows", plan.id))
        })?;
    Ok(QuoteOutcome::Priced(Quote {
        plan_id: plan.id.clone(),
        unit_rate,
        billable_users: billable,
        period_months,
        total,
        tier_label,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlanCatalog;
    use proptest::prelude::*;

    fn basic() -> Plan {
        PlanCatalog::new().get("basic").unwrap()
    }

    #[test]
    fn test_under_minimum_floors_and_uses_base_rate() {
        // 5 requested -> billed as 10 at the flat 275 base rate.
        let q = quote(&basic(), 5, 12).unwrap().priced().unwrap();
        assert_eq!(q.billable_users, 10);
        assert_eq!(q.unit_rate, 275);
        assert_eq!(q.tier_label, "base");
        assert_eq!(q.total, 33_000);
    }

    #[test]
    fn test_mid_tier_quote() {
        let q = quote(&basic(), 30, 12).unwrap().priced().unwrap();
        assert_eq!(q.unit_rate, 200);
        assert_eq!(q.tier_label, "25-50");
        assert_eq!(q.total, 72_000);
    }

    #[test]
    fn test_contact_sales_above_threshold() {
        assert_eq!(
            quote(&basic(), 120, 12).unwrap(),
            QuoteOutcome::ContactSales { billable_users: 120 }
        );
        // Exactly at the threshold also routes to sales.
        assert_eq!(
            quote(&basic(), 100, 12).unwrap(),
            QuoteOutcome::ContactSales { billable_users: 100 }
        );
    }

    #[test]
    fn test_tier_lower_bound_is_inclusive() {
        let q = quote(&basic(), 25, 1).unwrap().priced().unwrap();
        assert_eq!(q.unit_rate, 200);
        let q = quote(&basic(), 24, 1).unwrap().priced().unwrap();
        assert_eq!(q.unit_rate, 225);
    }

    #[test]
    fn test_monthly_period() {
        let q = quote(&basic(), 30, 1).unwrap().priced().unwrap();
        assert_eq!(q.total, 6_000);
    }

    #[test]
    fn test_zero_headcount_rejected() {
        assert_eq!(
            quote(&basic(), 0, 12),
            Err(BillingError::InvalidHeadcount(0))
        );
    }

    #[test]
    fn test_zero_period_rejected() {
        assert_eq!(quote(&basic(), 10, 0), Err(BillingError::InvalidPeriod(0)));
    }

    #[test]
    fn test_overflowing_rate_surfaces_as_error() {
        let mut plan = basic();
        plan.base_rate = Money::MAX;
        // Under-minimum path multiplies the base rate by the floored seats.
        assert!(matches!(
            quote(&plan, 5, 12),
            Err(BillingError::InvalidPlan(_))
        ));
    }

    proptest! {
        // Unit rate never increases as headcount grows across tier
        // boundaries, for every default plan.
        #[test]
        fn prop_unit_rate_non_increasing(h in 1u32..600) {
            for plan in PlanCatalog::new().list_active() {
                let at = |n: u32| quote(&plan, n, 1).unwrap().priced().map(|q| q.unit_rate);
                if let (Some(now), Some(next)) = (at(h), at(h + 1)) {
                    prop_assert!(next <= now);
                }
            }
        }

        // At or above the contact-sales threshold there is never a price.
        #[test]
        fn prop_contact_sales_never_priced(extra in 0u32..500) {
            for plan in PlanCatalog::new().list_active() {
                let h = plan.contact_sales_from + extra;
                prop_assert!(quote(&plan, h, 1).unwrap().priced().is_none());
            }
        }
    }
}
