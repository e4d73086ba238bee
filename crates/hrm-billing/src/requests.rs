//! Subscription Request Lifecycle
//!
//! State machine for plan purchase/upgrade requests. A request is created
//! `Pending` with its quote frozen, and leaves `Pending` through exactly one
//! of approve, reject, or cancel. Requests are never deleted; terminal
//! records are the audit trail.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use hrm_common::{Actor, PlanId, RequestId, Role, TenantId, UserId};

use crate::catalog::PlanCatalog;
use crate::pricing::{self, Quote, QuoteOutcome};
use crate::{BillingError, BillingResult};

/// Request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting a decision
    Pending,
    /// Settled; the tenant's active plan was updated
    Approved,
    /// Declined with a reason; the tenant's plan is untouched
    Rejected,
    /// Withdrawn by the tenant before a decision
    Cancelled,
}

/// How the tenant intends to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentChannel {
    /// Settled by the external payment collaborator, which reports back
    /// through approve/reject
    Online,
    /// Bank transfer or similar; always requires a human decision
    Offline,
}

/// A tenant's intent to adopt a plan, with the quote frozen at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Request id
    pub id: RequestId,
    /// Requesting tenant
    pub tenant_id: TenantId,
    /// Requested plan
    pub plan_id: PlanId,
    /// Headcount snapshot at request time
    pub headcount: u32,
    /// Price frozen at creation; later plan edits never change it
    pub quote: Quote,
    /// Payment channel
    pub channel: PaymentChannel,
    /// Current state
    pub status: RequestStatus,
    /// User who opened the request
    pub requested_by: UserId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Decision or cancellation time
    pub decided_at: Option<DateTime<Utc>>,
    /// Operator (or canceller) who closed the request
    pub decided_by: Option<UserId>,
    /// Reason, set on rejection only
    pub rejection_reason: Option<String>,
}

impl SubscriptionRequest {
    /// Whether an operator has settled this request
    pub fn is_decided(&self) -> bool {
        matches!(self.status, RequestStatus::Approved | RequestStatus::Rejected)
    }
}

/// Sink that makes a plan active on a tenant. Implemented by the tenant
/// registry; kept behind a trait so the lifecycle never depends on tenant
/// storage directly.
pub trait PlanActivation: Send + Sync {
    /// Set the tenant's active plan. An error leaves the request pending.
    fn activate(&self, tenant_id: TenantId, plan_id: &PlanId) -> Result<(), String>;
}

/// Request lifecycle engine
pub struct RequestLifecycle {
    requests: Arc<RwLock<HashMap<RequestId, SubscriptionRequest>>>,
    catalog: Arc<PlanCatalog>,
    activation: Arc<dyn PlanActivation>,
}

impl RequestLifecycle {
    /// Create a lifecycle over a catalog and an activation sink
    pub fn new(catalog: Arc<PlanCatalog>, activation: Arc<dyn PlanActivation>) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            catalog,
            activation,
        }
    }

    /// Open a request. Only a company admin of the requesting tenant may
    /// open one. The quote is computed and frozen here.
    pub fn create(
        &self,
        actor: &Actor,
        tenant_id: TenantId,
        plan_id: &str,
        headcount: u32,
        channel: PaymentChannel,
        period_months: u32,
    ) -> BillingResult<SubscriptionRequest> {
        if actor.role != Role::CompanyAdmin || actor.tenant_id != Some(tenant_id) {
            return Err(BillingError::Forbidden(
                "only a company admin of the tenant may open a request",
            ));
        }

        let plan = self
            .catalog
            .get(plan_id)
            .ok_or_else(|| BillingError::PlanNotFound(plan_id.into()))?;
        if !plan.active {
            return Err(BillingError::PlanUnavailable(plan_id.into()));
        }

        let quote = match pricing::quote(&plan, headcount, period_months)? {
            QuoteOutcome::Priced(q) => q,
            QuoteOutcome::ContactSales { billable_users } => {
                return Err(BillingError::ContactSalesRequired(billable_users))
            }
        };

        let request = SubscriptionRequest {
            id: Uuid::new_v4(),
            tenant_id,
            plan_id: plan_id.into(),
            headcount,
            quote,
            channel,
            status: RequestStatus::Pending,
            requested_by: actor.user_id,
            created_at: Utc::now(),
            decided_at: None,
            decided_by: None,
            rejection_reason: None,
        };

        tracing::info!(
            request = %request.id,
            tenant = %tenant_id,
            plan = plan_id,
            headcount,
            total = request.quote.total,
            channel = ?channel,
            "subscription request opened"
        );

        self.requests.write().insert(request.id, request.clone());
        Ok(request)
    }

    /// Withdraw a pending request. Allowed for the original requester or a
    /// company admin of the same tenant.
    pub fn cancel(&self, id: RequestId, actor: &Actor) -> BillingResult<SubscriptionRequest> {
        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&id)
            .ok_or(BillingError::RequestNotFound(id))?;

        let same_tenant_admin =
            actor.role == Role::CompanyAdmin && actor.tenant_id == Some(request.tenant_id);
        if actor.user_id != request.requested_by && !same_tenant_admin {
            return Err(BillingError::Forbidden(
                "only the requester or a company admin of the tenant may cancel",
            ));
        }

        if request.status != RequestStatus::Pending {
            return Err(BillingError::InvalidTransition(request.status));
        }

        request.status = RequestStatus::Cancelled;
        request.decided_at = Some(Utc::now());
        request.decided_by = Some(actor.user_id);
        tracing::info!(request = %id, "subscription request cancelled");
        Ok(request.clone())
    }

    /// Approve a pending request: activate the plan on the tenant, freeze
    /// the plan's pricing, and stamp the decision. Repeating the call on an
    /// already-decided request returns the decided record unchanged, so
    /// duplicate operator clicks and payment callbacks are safe.
    pub fn approve(&self, id: RequestId, actor: &Actor) -> BillingResult<SubscriptionRequest> {
        if actor.role != Role::SuperAdmin {
            return Err(BillingError::Forbidden("only a platform operator may approve"));
        }

        // Write guard held across the check and both updates; concurrent
        // deciders serialize here and the loser sees the decided state.
        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&id)
            .ok_or(BillingError::RequestNotFound(id))?;

        match request.status {
            RequestStatus::Pending => {}
            RequestStatus::Approved | RequestStatus::Rejected => return Ok(request.clone()),
            RequestStatus::Cancelled => {
                return Err(BillingError::InvalidTransition(request.status))
            }
        }

        // Activation failure leaves the request pending: the two writes are
        // all-or-nothing from the caller's perspective.
        self.activation
            .activate(request.tenant_id, &request.plan_id)
            .map_err(BillingError::Activation)?;
        self.catalog.freeze(&request.plan_id);

        request.status = RequestStatus::Approved;
        request.decided_at = Some(Utc::now());
        request.decided_by = Some(actor.user_id);
        tracing::info!(
            request = %id,
            tenant = %request.tenant_id,
            plan = %request.plan_id,
            "subscription request approved"
        );
        Ok(request.clone())
    }

    /// Reject a pending request with a non-empty reason. Same idempotency
    /// rule as `approve`.
    pub fn reject(
        &self,
        id: RequestId,
        actor: &Actor,
        reason: &str,
    ) -> BillingResult<SubscriptionRequest> {
        if actor.role != Role::SuperAdmin {
            return Err(BillingError::Forbidden("only a platform operator may reject"));
        }
        if reason.trim().is_empty() {
            return Err(BillingError::MissingReason);
        }

        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&id)
            .ok_or(BillingError::RequestNotFound(id))?;

        match request.status {
            RequestStatus::Pending => {}
            RequestStatus::Approved | RequestStatus::Rejected => return Ok(request.clone()),
            RequestStatus::Cancelled => {
                return Err(BillingError::InvalidTransition(request.status))
            }
        }

        request.status = RequestStatus::Rejected;
        request.decided_at = Some(Utc::now());
        request.decided_by = Some(actor.user_id);
        request.rejection_reason = Some(reason.trim().to_string());
        tracing::info!(request = %id, reason, "subscription request rejected");
        Ok(request.clone())
    }

    /// Get a request by id
    pub fn get(&self, id: RequestId) -> Option<SubscriptionRequest> {
        self.requests.read().get(&id).cloned()
    }

    /// Request history for a tenant, newest first
    pub fn list_for_tenant(&self, tenant_id: TenantId) -> Vec<SubscriptionRequest> {
        let mut requests: Vec<SubscriptionRequest> = self
            .requests
            .read()
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// Every request in the store
    pub fn all(&self) -> Vec<SubscriptionRequest> {
        self.requests.read().values().cloned().collect()
    }
}
