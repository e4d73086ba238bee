//! Tenant Data Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chrono::{DateTime, Utc};
use hrm_common::{PlanId, Role, TenantId, UserId};

/// A company account subscribing to the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique tenant id
    pub tenant_id: TenantId,
    /// Display name
    pub name: String,
    /// Active plan, `None` until a subscription request is approved. The
    /// single source of truth for entitlement; mutated only through the
    /// registry.
    pub active_plan: Option<PlanId>,
    /// Current employee count
    pub headcount: u32,
    /// Account status
    pub status: TenantStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a tenant with no active plan
    pub fn new(name: &str, headcount: u32) -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            name: name.to_string(),
            active_plan: None,
            headcount,
            status: TenantStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// Tenant status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantStatus {
    /// In good standing
    Active,
    /// Voluntarily closed
    Inactive,
    /// Suspended by a platform operator
    Suspended,
}

/// Platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user id
    pub user_id: UserId,
    /// Home tenant, `None` for platform-level roles
    pub tenant_id: Option<TenantId>,
    /// Login email
    pub email: String,
    /// Role
    pub role: Role,
}
