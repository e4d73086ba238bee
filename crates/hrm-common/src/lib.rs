//! OpenHRM shared domain vocabulary
//!
//! Identifier aliases, integer money semantics, roles, and the feature
//! catalog shared by the billing and tenant crates.

#![warn(missing_docs)]

pub mod model;

pub use model::{Actor, Feature, Money, PlanId, RequestId, Role, TenantId, UserId};
