//! Plan Catalog

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use hrm_common::{Feature, Money, PlanId};

use crate::{BillingError, BillingResult};

/// One headcount pricing band. `lower` is inclusive, `upper` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Inclusive lower headcount bound
    pub lower: u32,
    /// Exclusive upper headcount bound
    pub upper: u32,
    /// Monthly per-user rate in the smallest currency unit
    pub unit_rate: Money,
    /// Display label, e.g. "10-25"
    pub label: String,
}

impl PriceTier {
    /// Build a tier with a "lower-upper" label
    pub fn new(lower: u32, upper: u32, unit_rate: Money) -> Self {
        Self {
            lower,
            upper,
            unit_rate,
            label: format!("{}-{}", lower, upper),
        }
    }

    /// Whether a billable headcount falls in this band
    pub fn covers(&self, billable: u32) -> bool {
        self.lower <= billable && billable < self.upper
    }
}

/// A priced bundle of feature entitlements with a tiered cost table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Catalog identifier
    pub id: PlanId,
    /// Display name
    pub name: String,
    /// Flat per-user monthly rate applied below the included-user minimum
    pub base_rate: Money,
    /// Minimum billable headcount; smaller requests are floored to this
    pub included_users: u32,
    /// Ascending, contiguous per-user rate bands
    pub tiers: Vec<PriceTier>,
    /// Headcount at or above which self-serve quoting stops
    pub contact_sales_from: u32,
    /// Capabilities granted by this plan
    pub features: HashSet<Feature>,
    /// Whether the plan is currently offered
    pub active: bool,
}

impl Plan {
    /// Check the catalog invariants: non-empty feature set, ascending
    /// contiguous non-overlapping tiers, strictly decreasing rates, and a
    /// contact-sales threshold that starts where the last tier ends.
    pub fn validate(&self) -> BillingResult<()> {
        if self.features.is_empty() {
            return Err(BillingError::InvalidPlan(format!(
                "plan {} grants no features",
                self.id
            )));
        }
        if self.tiers.is_empty() {
            return Err(BillingError::InvalidPlan(format!(
                "plan {} has no price tiers",
                self.id
            )));
        }
        let mut prev_rate = self.base_rate;
        let mut cursor = self.tiers[0].lower;
        for tier in &self.tiers {
            if tier.lower >= tier.upper {
                return Err(BillingError::InvalidPlan(format!(
                    "tier {} is empty",
                    tier.label
                )));
            }
            if tier.lower != cursor {
                return Err(BillingError::InvalidPlan(format!(
                    "tier {} is not contiguous with the previous tier",
                    tier.label
                )));
            }
            if tier.unit_rate >= prev_rate {
                return Err(BillingError::InvalidPlan(format!(
                    "tier {} rate does not decrease",
                    tier.label
                )));
            }
            prev_rate = tier.unit_rate;
            cursor = tier.upper;
        }
        if self.contact_sales_from != cursor {
            return Err(BillingError::InvalidPlan(format!(
                "contact-sales threshold {} does not follow the last tier",
                self.contact_sales_from
            )));
        }
        Ok(())
    }
}

/// Plan catalog. Read-mostly; operator writes go through `create`/`update`/
/// `deactivate`. A plan referenced by an approved request has its pricing
/// frozen so historical quotes stay reproducible.
pub struct PlanCatalog {
    plans: Arc<RwLock<HashMap<PlanId, Plan>>>,
    frozen: Arc<RwLock<HashSet<PlanId>>>,
}

impl PlanCatalog {
    /// Create a catalog preloaded with the default plans
    pub fn new() -> Self {
        let catalog = Self::empty();
        for plan in default_plans() {
            catalog
                .create(plan)
                .expect("default plans satisfy catalog invariants");
        }
        catalog
    }

    /// Create an empty catalog
    pub fn empty() -> Self {
        Self {
            plans: Arc::new(RwLock::new(HashMap::new())),
            frozen: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Get a plan by id
    pub fn get(&self, plan_id: &str) -> Option<Plan> {
        self.plans.read().get(plan_id).cloned()
    }

    /// All plans currently offered
    pub fn list_active(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self
            .plans
            .read()
            .values()
            .filter(|p| p.active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.id.cmp(&b.id));
        plans
    }

    /// Feature set granted by a plan
    pub fn features_of(&self, plan_id: &str) -> Option<HashSet<Feature>> {
        self.plans.read().get(plan_id).map(|p| p.features.clone())
    }

    /// Add a new plan (operator only, enforced by the caller's gate)
    pub fn create(&self, plan: Plan) -> BillingResult<()> {
        plan.validate()?;
        let mut plans = self.plans.write();
        if plans.contains_key(&plan.id) {
            return Err(BillingError::InvalidPlan(format!(
                "plan {} already exists",
                plan.id
            )));
        }
        plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    /// Replace a plan definition. Pricing fields of a frozen plan are
    /// immutable; only name, feature set, and the active flag may change.
    pub fn update(&self, plan: Plan) -> BillingResult<()> {
        plan.validate()?;
        let mut plans = self.plans.write();
        let current = plans
            .get(&plan.id)
            .ok_or_else(|| BillingError::PlanNotFound(plan.id.clone()))?;
        if self.frozen.read().contains(&plan.id) {
            let pricing_changed = current.base_rate != plan.base_rate
                || current.included_users != plan.included_users
                || current.tiers != plan.tiers
                || current.contact_sales_from != plan.contact_sales_from;
            if pricing_changed {
                return Err(BillingError::PlanFrozen(plan.id));
            }
        }
        plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    /// Withdraw a plan from the offering. Tenants already on it are
    /// grandfathered rather than force-migrated.
    pub fn deactivate(&self, plan_id: &str) -> BillingResult<()> {
        let mut plans = self.plans.write();
        let plan = plans
            .get_mut(plan_id)
            .ok_or_else(|| BillingError::PlanNotFound(plan_id.into()))?;
        plan.active = false;
        Ok(())
    }

    /// Mark a plan as referenced by an approved request
    pub fn freeze(&self, plan_id: &str) {
        self.frozen.write().insert(plan_id.into());
    }

    /// Whether a plan's pricing is frozen
    pub fn is_frozen(&self, plan_id: &str) -> bool {
        self.frozen.read().contains(plan_id)
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn default_plans() -> Vec<Plan> {
    vec![
        Plan {
            id: "basic".into(),
            name: "Basic".into(),
            base_rate: 275,
            included_users: 10,
            tiers: vec![
                PriceTier::new(10, 25, 225),
                PriceTier::new(25, 50, 200),
                PriceTier::new(50, 100, 150),
            ],
            contact_sales_from: 100,
            features: [
                Feature::EmployeeDirectory,
                Feature::Attendance,
                Feature::LeaveManagement,
                Feature::HolidayCalendar,
                Feature::NoticeBoard,
                Feature::PayrollView,
            ]
            .into_iter()
            .collect(),
            active: true,
        },
        Plan {
            id: "team".into(),
            name: "Team".into(),
            base_rate: 350,
            included_users: 10,
            tiers: vec![
                PriceTier::new(10, 50, 300),
                PriceTier::new(50, 150, 250),
                PriceTier::new(150, 300, 200),
            ],
            contact_sales_from: 300,
            features: [
                Feature::EmployeeDirectory,
                Feature::Attendance,
                Feature::LeaveManagement,
                Feature::ShiftScheduling,
                Feature::HolidayCalendar,
                Feature::NoticeBoard,
                Feature::PayrollView,
                Feature::PayrollRun,
                Feature::DepartmentManagement,
                Feature::UserAdministration,
            ]
            .into_iter()
            .collect(),
            active: true,
        },
        Plan {
            id: "enterprise".into(),
            name: "Enterprise".into(),
            base_rate: 500,
            included_users: 25,
            tiers: vec![
                PriceTier::new(25, 100, 400),
                PriceTier::new(100, 250, 325),
                PriceTier::new(250, 500, 250),
            ],
            contact_sales_from: 500,
            features: Feature::all(),
            active: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(catalog: &PlanCatalog) -> Plan {
        catalog.get("basic").unwrap()
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PlanCatalog::new();
        assert_eq!(catalog.list_active().len(), 3);
        for plan in catalog.list_active() {
            plan.validate().unwrap();
        }
    }

    #[test]
    fn test_non_contiguous_tiers_rejected() {
        let mut plan = basic(&PlanCatalog::new());
        plan.id = "broken".into();
        plan.tiers[1].lower = 30;
        assert!(matches!(
            plan.validate(),
            Err(BillingError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_non_decreasing_rates_rejected() {
        let mut plan = basic(&PlanCatalog::new());
        plan.id = "broken".into();
        plan.tiers[2].unit_rate = plan.tiers[1].unit_rate;
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_empty_feature_set_rejected() {
        let mut plan = basic(&PlanCatalog::new());
        plan.id = "broken".into();
        plan.features.clear();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_deactivate_keeps_plan_resolvable() {
        let catalog = PlanCatalog::new();
        catalog.deactivate("basic").unwrap();

        // Grandfathered tenants still resolve features on the retired plan.
        assert!(catalog.get("basic").is_some());
        assert!(!catalog.get("basic").unwrap().active);
        assert!(catalog.features_of("basic").is_some());
        assert!(!catalog.list_active().iter().any(|p| p.id == "basic"));
    }

    #[test]
    fn test_frozen_plan_pricing_immutable() {
        let catalog = PlanCatalog::new();
        catalog.freeze("basic");

        let mut repriced = basic(&catalog);
        repriced.base_rate = 300;
        assert_eq!(
            catalog.update(repriced),
            Err(BillingError::PlanFrozen("basic".into()))
        );

        // Non-pricing edits stay allowed.
        let mut renamed = basic(&catalog);
        renamed.name = "Basic (legacy)".into();
        catalog.update(renamed).unwrap();
        assert_eq!(catalog.get("basic").unwrap().name, "Basic (legacy)");
    }
}
