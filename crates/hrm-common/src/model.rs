//! Core identifiers and enums

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Tenant (company) ID
pub type TenantId = Uuid;

/// User ID
pub type UserId = Uuid;

/// Subscription request ID
pub type RequestId = Uuid;

/// Plan ID ("basic", "team", ...)
pub type PlanId = String;

/// Money in the smallest currency unit. All pricing arithmetic stays in
/// integer space; formatting is a presentation concern.
pub type Money = i64;

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Platform operator, not tenant-scoped
    SuperAdmin,
    /// Administrator of a single tenant
    CompanyAdmin,
    /// Regular tenant member
    Employee,
}

/// Product capability that a plan may grant and a role may exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Employee directory browsing
    EmployeeDirectory,
    /// Attendance tracking
    Attendance,
    /// Leave requests and balances
    LeaveManagement,
    /// Shift scheduling
    ShiftScheduling,
    /// Holiday calendar
    HolidayCalendar,
    /// Company notice board
    NoticeBoard,
    /// View own payroll line items
    PayrollView,
    /// Run payroll for the tenant
    PayrollRun,
    /// Reporting and exports
    Reports,
    /// Department and designation management
    DepartmentManagement,
    /// Tenant user administration
    UserAdministration,
    /// Subscription plan management
    PlanManagement,
}

impl Feature {
    /// Every known capability
    pub fn all() -> HashSet<Feature> {
        [
            Self::EmployeeDirectory,
            Self::Attendance,
            Self::LeaveManagement,
            Self::ShiftScheduling,
            Self::HolidayCalendar,
            Self::NoticeBoard,
            Self::PayrollView,
            Self::PayrollRun,
            Self::Reports,
            Self::DepartmentManagement,
            Self::UserAdministration,
            Self::PlanManagement,
        ]
        .into_iter()
        .collect()
    }

    /// Stable dotted identifier used in logs and route tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployeeDirectory => "employees.directory",
            Self::Attendance => "attendance.track",
            Self::LeaveManagement => "leave.manage",
            Self::ShiftScheduling => "shifts.schedule",
            Self::HolidayCalendar => "holidays.view",
            Self::NoticeBoard => "notices.view",
            Self::PayrollView => "payroll.view",
            Self::PayrollRun => "payroll.run",
            Self::Reports => "reports.view",
            Self::DepartmentManagement => "departments.manage",
            Self::UserAdministration => "users.manage",
            Self::PlanManagement => "plans.manage",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved caller context. Every mutating operation takes one explicitly;
/// there is no ambient "current user".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Acting user
    pub user_id: UserId,
    /// Tenant scope, `None` for platform-level roles
    pub tenant_id: Option<TenantId>,
    /// Role of the acting user
    pub role: Role,
}

impl Actor {
    /// Platform operator actor
    pub fn platform(user_id: UserId) -> Self {
        Self {
            user_id,
            tenant_id: None,
            role: Role::SuperAdmin,
        }
    }

    /// Tenant-scoped actor
    pub fn tenant(user_id: UserId, tenant_id: TenantId, role: Role) -> Self {
        Self {
            user_id,
            tenant_id: Some(tenant_id),
            role,
        }
    }
}
