//! OpenHRM Tenant Platform
//!
//! Tenant registry, entitlement resolution, and the access gate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      TENANT PLATFORM                         │
//! │                                                              │
//! │  session token ─► Authenticator ─► (role, tenant)            │
//! │                        │                                     │
//! │                        ▼                                     │
//! │  ┌────────────┐   ┌──────────────────┐   ┌───────────────┐   │
//! │  │ AccessGate │──►│ EntitlementResolv│──►│ Plan Catalog  │   │
//! │  │ allow/deny │   │ plan ∩ role cap  │   │ (hrm-billing) │   │
//! │  └────────────┘   └──────────────────┘   └───────────────┘   │
//! │        │                                                     │
//! │        └─► TenantRegistry (active plan via approval only)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod entitlements;
pub mod gate;
pub mod model;
pub mod registry;

pub use entitlements::{role_ceiling, EntitlementResolver};
pub use gate::{AccessGate, Authenticator, Decision, DenyReason, Session, StaticAuthenticator};
pub use model::{Tenant, TenantStatus, User};
pub use registry::{TenantError, TenantRegistry};
