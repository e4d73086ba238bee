//! OpenHRM Subscription Platform
//!
//! Plan catalog, tiered headcount pricing, and the subscription request
//! lifecycle that turns an approved request into a tenant's active plan.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   SUBSCRIPTION PLATFORM                      │
//! │                                                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │ Plan Catalog │──►│   Pricing    │──►│ Request Lifecycle│  │
//! │  │ (tiers/feat) │   │ (quote/floor)│   │ pending→decided  │  │
//! │  └──────────────┘   └──────────────┘   └────────┬─────────┘  │
//! │                                                 │            │
//! │                            approve ─► tenant active plan     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod pricing;
pub mod requests;

use std::sync::Arc;
use thiserror::Error;

use hrm_common::{Actor, PlanId, RequestId, TenantId};

pub use catalog::{Plan, PlanCatalog, PriceTier};
pub use pricing::{quote, Quote, QuoteOutcome};
pub use requests::{
    PaymentChannel, PlanActivation, RequestLifecycle, RequestStatus, SubscriptionRequest,
};

/// Billing error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Headcount below the minimum of one billable employee
    #[error("invalid headcount: {0}")]
    InvalidHeadcount(u32),
    /// Billing period must cover at least one month
    #[error("invalid billing period: {0} months")]
    InvalidPeriod(u32),
    /// No plan with this id
    #[error("plan not found: {0}")]
    PlanNotFound(PlanId),
    /// Plan exists but is no longer offered
    #[error("plan unavailable: {0}")]
    PlanUnavailable(PlanId),
    /// Pricing of a plan referenced by an approved request is immutable
    #[error("plan pricing is frozen: {0}")]
    PlanFrozen(PlanId),
    /// Plan definition violates a catalog invariant
    #[error("invalid plan definition: {0}")]
    InvalidPlan(String),
    /// No request with this id
    #[error("request not found: {0}")]
    RequestNotFound(RequestId),
    /// State machine rule violated; surfaced as a conflict, never retried
    #[error("invalid transition from {0:?}")]
    InvalidTransition(RequestStatus),
    /// Rejection requires a non-empty reason
    #[error("rejection reason required")]
    MissingReason,
    /// Actor role or tenant scope does not permit this operation
    #[error("operation not permitted: {0}")]
    Forbidden(&'static str),
    /// Headcount is above the self-serve ceiling
    #[error("headcount {0} requires a sales-assisted quote")]
    ContactSalesRequired(u32),
    /// Activating the plan on the tenant failed; the request stays pending
    #[error("plan activation failed: {0}")]
    Activation(String),
}

/// Result type for the subscription platform
pub type BillingResult<T> = Result<T, BillingError>;

/// Subscription Platform facade
///
/// Wires the catalog and the request lifecycle together and exposes the
/// operations consumed by the API layer.
pub struct SubscriptionService {
    /// Plan catalog
    pub catalog: Arc<PlanCatalog>,
    /// Request lifecycle
    pub requests: Arc<RequestLifecycle>,
}

impl SubscriptionService {
    /// Create a service over the default catalog and the given activation sink
    pub fn new(activation: Arc<dyn PlanActivation>) -> Self {
        let catalog = Arc::new(PlanCatalog::new());
        Self {
            requests: Arc::new(RequestLifecycle::new(catalog.clone(), activation)),
            catalog,
        }
    }

    /// Quote a price for a plan at a given headcount and billing period
    pub fn quote_price(
        &self,
        plan_id: &str,
        headcount: u32,
        period_months: u32,
    ) -> BillingResult<QuoteOutcome> {
        let plan = self
            .catalog
            .get(plan_id)
            .ok_or_else(|| BillingError::PlanNotFound(plan_id.into()))?;
        pricing::quote(&plan, headcount, period_months)
    }

    /// Open a subscription request for a tenant
    pub fn create_request(
        &self,
        actor: &Actor,
        tenant_id: TenantId,
        plan_id: &str,
        headcount: u32,
        channel: PaymentChannel,
        period_months: u32,
    ) -> BillingResult<SubscriptionRequest> {
        self.requests
            .create(actor, tenant_id, plan_id, headcount, channel, period_months)
    }

    /// Cancel a pending request
    pub fn cancel_request(&self, id: RequestId, actor: &Actor) -> BillingResult<SubscriptionRequest> {
        self.requests.cancel(id, actor)
    }

    /// Approve a pending request, activating its plan on the tenant
    pub fn approve_request(
        &self,
        id: RequestId,
        actor: &Actor,
    ) -> BillingResult<SubscriptionRequest> {
        self.requests.approve(id, actor)
    }

    /// Reject a pending request with a reason
    pub fn reject_request(
        &self,
        id: RequestId,
        actor: &Actor,
        reason: &str,
    ) -> BillingResult<SubscriptionRequest> {
        self.requests.reject(id, actor, reason)
    }
}
