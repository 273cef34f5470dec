//! Role allow-list checks and branch scoping.

use crate::{
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
    types::BranchId,
};

/// Reject unless the user's role is in the allow-list.
pub fn require_roles(user: &CurrentUser, allowed: &[Role], resource: &str) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            action: "access".to_string(),
            resource: resource.to_string(),
        })
    }
}

/// Admins and superadmins only.
pub fn require_admin(user: &CurrentUser, resource: &str) -> Result<()> {
    require_roles(user, &[Role::Superadmin, Role::Admin], resource)
}

/// Superadmins only.
pub fn require_superadmin(user: &CurrentUser, resource: &str) -> Result<()> {
    require_roles(user, &[Role::Superadmin], resource)
}

/// The branch filter to apply to list reads for this user.
///
/// Staff see only their own branch; admins and superadmins see all branches.
/// Staff without a branch assignment cannot read operational records.
pub fn branch_scope(user: &CurrentUser) -> Result<Option<BranchId>> {
    match user.role {
        Role::Superadmin | Role::Admin => Ok(None),
        Role::Staff => user.branch_id.map(Some).ok_or_else(|| Error::BadRequest {
            message: "No branch assigned to this account".to_string(),
        }),
    }
}

/// The branch new operational records are attributed to.
///
/// Staff records always land in the creator's branch. Admins may supply an
/// explicit branch; without one their own branch (if any) is used.
pub fn attribution_branch(user: &CurrentUser, requested: Option<BranchId>) -> Result<BranchId> {
    match user.role {
        Role::Staff => user.branch_id.ok_or_else(|| Error::BadRequest {
            message: "No branch assigned to this account".to_string(),
        }),
        Role::Superadmin | Role::Admin => requested.or(user.branch_id).ok_or_else(|| Error::BadRequest {
            message: "A branch must be specified".to_string(),
        }),
    }
}
