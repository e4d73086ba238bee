//! Entitlement Resolution
//!
//! The plan grants features, the role caps them; a capability exists only
//! when both agree. Resolution is recomputed on every check and never cached
//! across a plan change.

use std::collections::HashSet;
use std::sync::Arc;

use hrm_billing::PlanCatalog;
use hrm_common::{Feature, PlanId, Role};

/// Static ceiling of features a role may ever exercise, independent of
/// what any plan grants.
pub fn role_ceiling(role: Role) -> HashSet<Feature> {
    match role {
        // Platform operators are not tenant-scoped and bypass plan gating.
        Role::SuperAdmin => Feature::all(),
        Role::CompanyAdmin => Feature::all(),
        Role::Employee => [
            Feature::EmployeeDirectory,
            Feature::Attendance,
            Feature::LeaveManagement,
            Feature::ShiftScheduling,
            Feature::HolidayCalendar,
            Feature::NoticeBoard,
            Feature::PayrollView,
        ]
        .into_iter()
        .collect(),
    }
}

/// Resolves the capability set for a (role, active plan) pair
pub struct EntitlementResolver {
    catalog: Arc<PlanCatalog>,
}

impl EntitlementResolver {
    /// Create a resolver over a plan catalog
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        Self { catalog }
    }

    /// Capability set for a role under the tenant's active plan.
    ///
    /// Without an active plan, tenant-scoped roles get the empty set: every
    /// gated capability is denied until a subscription request is approved.
    pub fn resolve(&self, role: Role, active_plan: Option<&PlanId>) -> HashSet<Feature> {
        if role == Role::SuperAdmin {
            return Feature::all();
        }
        let Some(plan_id) = active_plan else {
            return HashSet::new();
        };
        let Some(granted) = self.catalog.features_of(plan_id) else {
            return HashSet::new();
        };
        granted
            .intersection(&role_ceiling(role))
            .copied()
            .collect()
    }
}
