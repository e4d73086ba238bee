//! End-to-end subscription flow: quote, request, decision, entitlement.

use std::sync::Arc;

use hrm_billing::{
    BillingError, PaymentChannel, QuoteOutcome, RequestStatus, SubscriptionService,
};
use hrm_common::{Actor, Feature, Role};
use hrm_tenant::{
    AccessGate, Decision, DenyReason, EntitlementResolver, Session, StaticAuthenticator,
    TenantRegistry,
};
use uuid::Uuid;

struct Platform {
    service: SubscriptionService,
    registry: Arc<TenantRegistry>,
    gate: AccessGate,
    auth: Arc<StaticAuthenticator>,
}

fn platform() -> Platform {
    let registry = Arc::new(TenantRegistry::new());
    let service = SubscriptionService::new(registry.clone());
    let auth = Arc::new(StaticAuthenticator::new());
    let gate = AccessGate::new(
        auth.clone(),
        registry.clone(),
        EntitlementResolver::new(service.catalog.clone()),
    );
    Platform {
        service,
        registry,
        gate,
        auth,
    }
}

#[test]
fn quote_scenarios_match_published_pricing() {
    let p = platform();

    // Under-minimum headcount floors to 10 seats at the flat base rate.
    match p.service.quote_price("basic", 5, 12).unwrap() {
        QuoteOutcome::Priced(q) => {
            assert_eq!(q.billable_users, 10);
            assert_eq!(q.unit_rate, 275);
            assert_eq!(q.total, 33_000);
        }
        other => panic!("expected a price, got {:?}", other),
    }

    // Mid-tier headcount.
    match p.service.quote_price("basic", 30, 12).unwrap() {
        QuoteOutcome::Priced(q) => assert_eq!(q.total, 72_000),
        other => panic!("expected a price, got {:?}", other),
    }

    // Above the self-serve ceiling.
    assert!(matches!(
        p.service.quote_price("basic", 120, 12).unwrap(),
        QuoteOutcome::ContactSales { .. }
    ));
}

#[test]
fn tenant_without_approved_request_is_denied() {
    let p = platform();
    let tenant = p.registry.create("Acme Corp", 30);
    p.auth.insert(
        "admin-token",
        Session {
            user_id: Uuid::new_v4(),
            tenant_id: Some(tenant.tenant_id),
            role: Role::CompanyAdmin,
        },
    );

    assert_eq!(
        p.gate.authorize("admin-token", Feature::PayrollView),
        Decision::Deny(DenyReason::NotEntitled)
    );
}

#[test]
fn offline_request_approval_unlocks_entitlements() {
    let p = platform();
    let tenant = p.registry.create("Acme Corp", 30);
    let admin_id = Uuid::new_v4();
    let admin = Actor::tenant(admin_id, tenant.tenant_id, Role::CompanyAdmin);
    let operator = Actor::platform(Uuid::new_v4());

    let request = p
        .service
        .create_request(
            &admin,
            tenant.tenant_id,
            "basic",
            30,
            PaymentChannel::Offline,
            12,
        )
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    // Offline requests sit pending until a human operator decides.
    assert!(p
        .registry
        .get(&tenant.tenant_id)
        .unwrap()
        .active_plan
        .is_none());

    let approved = p.service.approve_request(request.id, &operator).unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(
        p.registry.get(&tenant.tenant_id).unwrap().active_plan.as_deref(),
        Some("basic")
    );

    // Approval is idempotent: same terminal state, same active plan.
    let again = p.service.approve_request(request.id, &operator).unwrap();
    assert_eq!(again.status, RequestStatus::Approved);
    assert_eq!(again.decided_at, approved.decided_at);
    assert_eq!(
        p.registry.get(&tenant.tenant_id).unwrap().active_plan.as_deref(),
        Some("basic")
    );

    // And the tenant is now entitled to a feature granted by the plan.
    p.auth.insert(
        "admin-token",
        Session {
            user_id: admin_id,
            tenant_id: Some(tenant.tenant_id),
            role: Role::CompanyAdmin,
        },
    );
    assert_eq!(
        p.gate.authorize("admin-token", Feature::PayrollView),
        Decision::Allow
    );
}

#[test]
fn cancel_after_approval_is_a_conflict() {
    let p = platform();
    let tenant = p.registry.create("Acme Corp", 30);
    let admin = Actor::tenant(Uuid::new_v4(), tenant.tenant_id, Role::CompanyAdmin);
    let operator = Actor::platform(Uuid::new_v4());

    let request = p
        .service
        .create_request(
            &admin,
            tenant.tenant_id,
            "basic",
            30,
            PaymentChannel::Online,
            12,
        )
        .unwrap();
    p.service.approve_request(request.id, &operator).unwrap();

    assert_eq!(
        p.service.cancel_request(request.id, &admin),
        Err(BillingError::InvalidTransition(RequestStatus::Approved))
    );
}

#[test]
fn pending_request_leaves_through_exactly_one_exit() {
    let p = platform();
    let tenant = p.registry.create("Acme Corp", 30);
    let admin = Actor::tenant(Uuid::new_v4(), tenant.tenant_id, Role::CompanyAdmin);
    let operator = Actor::platform(Uuid::new_v4());

    let request = p
        .service
        .create_request(
            &admin,
            tenant.tenant_id,
            "basic",
            30,
            PaymentChannel::Offline,
            12,
        )
        .unwrap();

    let rejected = p
        .service
        .reject_request(request.id, &operator, "funds not received")
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert!(p
        .registry
        .get(&tenant.tenant_id)
        .unwrap()
        .active_plan
        .is_none());

    // A rejected request never becomes approved or cancelled.
    let after_approve = p.service.approve_request(request.id, &operator).unwrap();
    assert_eq!(after_approve.status, RequestStatus::Rejected);
    assert_eq!(
        p.service.cancel_request(request.id, &admin),
        Err(BillingError::InvalidTransition(RequestStatus::Rejected))
    );
}
