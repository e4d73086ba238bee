//! Access Gate
//!
//! Enforcement point wrapping protected operations. Resolves the caller
//! from the external authenticator, derives the capability set, and allows
//! or denies. Fails closed on any resolution failure.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use hrm_common::{Feature, Role, TenantId, UserId};

use crate::entitlements::EntitlementResolver;
use crate::registry::TenantRegistry;

/// Resolved session: who is calling and under which tenant
#[derive(Debug, Clone)]
pub struct Session {
    /// Authenticated user
    pub user_id: UserId,
    /// Tenant scope, `None` for platform operators
    pub tenant_id: Option<TenantId>,
    /// Role
    pub role: Role,
}

/// External authenticator collaborator. Token issuance and validation
/// mechanics live outside this core.
pub trait Authenticator: Send + Sync {
    /// Resolve a session credential, or `None` if it does not verify
    fn resolve_session(&self, token: &str) -> Option<Session>;
}

/// Access decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Capability granted
    Allow,
    /// Capability denied
    Deny(DenyReason),
}

/// Why access was denied. Authentication failure and entitlement failure
/// are surfaced distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The session credential did not resolve
    Unauthenticated,
    /// The session is valid but the capability is not in the resolved set
    NotEntitled,
}

impl DenyReason {
    /// Stable reason string for API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotEntitled => "not_entitled",
        }
    }
}

/// Access gate over the authenticator, tenant registry, and resolver
pub struct AccessGate {
    authenticator: Arc<dyn Authenticator>,
    registry: Arc<TenantRegistry>,
    resolver: EntitlementResolver,
    /// Capabilities open to unauthenticated callers; checked before the
    /// authenticator is consulted
    public: HashSet<Feature>,
}

impl AccessGate {
    /// Create a gate with no public capabilities
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        registry: Arc<TenantRegistry>,
        resolver: EntitlementResolver,
    ) -> Self {
        Self {
            authenticator,
            registry,
            resolver,
            public: HashSet::new(),
        }
    }

    /// Mark a capability as public
    pub fn allow_public(&mut self, feature: Feature) {
        self.public.insert(feature);
    }

    /// Authorize a session token for a capability
    pub fn authorize(&self, token: &str, feature: Feature) -> Decision {
        if self.public.contains(&feature) {
            return Decision::Allow;
        }

        let Some(session) = self.authenticator.resolve_session(token) else {
            return Decision::Deny(DenyReason::Unauthenticated);
        };

        let active_plan = session
            .tenant_id
            .and_then(|id| self.registry.get(&id))
            .and_then(|tenant| tenant.active_plan);

        let capabilities = self.resolver.resolve(session.role, active_plan.as_ref());
        if capabilities.contains(&feature) {
            Decision::Allow
        } else {
            tracing::debug!(
                user = %session.user_id,
                capability = %feature,
                "access denied: not entitled"
            );
            Decision::Deny(DenyReason::NotEntitled)
        }
    }
}

/// In-memory token table, useful for tests and single-node deployments
#[derive(Default)]
pub struct StaticAuthenticator {
    sessions: RwLock<HashMap<String, Session>>,
}

impl StaticAuthenticator {
    /// Create an empty token table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a session
    pub fn insert(&self, token: &str, session: Session) {
        self.sessions.write().insert(token.to_string(), session);
    }
}

impl Authenticator for StaticAuthenticator {
    fn resolve_session(&self, token: &str) -> Option<Session> {
        self.sessions.read().get(token).cloned()
    }
}
