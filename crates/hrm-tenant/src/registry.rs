//! Tenant Registry

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use hrm_billing::PlanActivation;
use hrm_common::{PlanId, TenantId};

use crate::model::{Tenant, TenantStatus};

/// Tenant registry. Holds the tenant records and is the single mutation
/// point for the active-plan reference.
pub struct TenantRegistry {
    tenants: Arc<RwLock<HashMap<TenantId, Tenant>>>,
}

impl TenantRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tenant
    pub fn create(&self, name: &str, headcount: u32) -> Tenant {
        let tenant = Tenant::new(name, headcount);
        self.tenants.write().insert(tenant.tenant_id, tenant.clone());
        tenant
    }

    /// Get a tenant
    pub fn get(&self, tenant_id: &TenantId) -> Option<Tenant> {
        self.tenants.read().get(tenant_id).cloned()
    }

    /// All tenants
    pub fn list(&self) -> Vec<Tenant> {
        self.tenants.read().values().cloned().collect()
    }

    /// Update the employee count
    pub fn set_headcount(&self, tenant_id: &TenantId, headcount: u32) -> Result<(), TenantError> {
        let mut tenants = self.tenants.write();
        let tenant = tenants.get_mut(tenant_id).ok_or(TenantError::NotFound)?;
        tenant.headcount = headcount;
        Ok(())
    }

    /// Set the active plan. Reached through subscription approval or an
    /// operator-initiated plan change; nothing else writes this field.
    pub fn set_active_plan(
        &self,
        tenant_id: &TenantId,
        plan_id: &PlanId,
    ) -> Result<(), TenantError> {
        let mut tenants = self.tenants.write();
        let tenant = tenants.get_mut(tenant_id).ok_or(TenantError::NotFound)?;
        if tenant.status == TenantStatus::Suspended {
            return Err(TenantError::Suspended);
        }
        tenant.active_plan = Some(plan_id.clone());
        tracing::info!(tenant = %tenant_id, plan = %plan_id, "active plan updated");
        Ok(())
    }

    /// Suspend a tenant
    pub fn suspend(&self, tenant_id: &TenantId) -> Result<(), TenantError> {
        let mut tenants = self.tenants.write();
        let tenant = tenants.get_mut(tenant_id).ok_or(TenantError::NotFound)?;
        tenant.status = TenantStatus::Suspended;
        Ok(())
    }

    /// Tenants whose active plan references the given plan id
    pub fn tenants_on_plan(&self, plan_id: &str) -> Vec<TenantId> {
        self.tenants
            .read()
            .values()
            .filter(|t| t.active_plan.as_deref() == Some(plan_id))
            .map(|t| t.tenant_id)
            .collect()
    }
}

impl Default for TenantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanActivation for TenantRegistry {
    fn activate(&self, tenant_id: TenantId, plan_id: &PlanId) -> Result<(), String> {
        self.set_active_plan(&tenant_id, plan_id)
            .map_err(|e| e.to_string())
    }
}

/// Tenant registry error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TenantError {
    /// No tenant with this id
    #[error("tenant not found")]
    NotFound,
    /// Suspended tenants cannot change plans
    #[error("tenant is suspended")]
    Suspended,
}
