// ── Access guard ──
//
// One decision function for every mutating operation on campaigns,
// tournaments, coupons, and admin resources. Transport agnostic.

use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Principal, PrincipalId, Role};

/// Which rule granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AllowReason {
    SuperAdmin,
    Owner,
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DenyReason {
    Forbidden,
}

/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allow(AllowReason),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// Turn a denial into [`CoreError::Forbidden`] for `?` propagation.
    pub fn into_result(self, action: &str) -> Result<AllowReason, CoreError> {
        match self {
            Self::Allow(reason) => Ok(reason),
            Self::Deny(DenyReason::Forbidden) => {
                debug!(action, "access denied");
                Err(CoreError::Forbidden {
                    reason: format!("not permitted to {action}"),
                })
            }
        }
    }
}

/// Decide whether `principal` may act on a resource.
///
/// Rules, first match wins:
/// 1. the super-admin flag allows everything,
/// 2. the owner of the resource is allowed,
/// 3. a role listed in `required_roles` is allowed.
///
/// Resources without an owner (admin endpoints) pass `None`.
pub fn authorize(
    principal: &Principal,
    resource_owner: Option<&PrincipalId>,
    required_roles: &[Role],
) -> Decision {
    if principal.is_super_admin {
        return Decision::Allow(AllowReason::SuperAdmin);
    }
    if resource_owner.is_some_and(|owner| *owner == principal.id) {
        return Decision::Allow(AllowReason::Owner);
    }
    if required_roles.contains(&principal.role) {
        return Decision::Allow(AllowReason::Role);
    }
    Decision::Deny(DenyReason::Forbidden)
}
