//! Authorization and invariant errors.

use thiserror::Error;

use crewdeck_storage::{ErrorBody, MatrixError, StoreError, WorkspaceAction, WorkspaceRole};

/// Errors from effective-access resolution and membership mutations.
///
/// Invariant violations (last-owner rules, owner-less matrices) are conflict
/// errors with a specific code, never silently coerced to a closest valid
/// state.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Missing, soft-deleted, or cross-tenant workspace. Cross-tenant access
    /// is always denied and never confirms the resource exists.
    #[error("workspace not found")]
    WorkspaceNotFound,

    /// No membership row for the principal in this workspace.
    #[error("no membership in this workspace")]
    MembershipNotFound,

    /// Membership exists but is suspended. Checked before the permission
    /// matrix and not overridable by role.
    #[error("membership is suspended")]
    Suspended,

    /// The effective role does not grant the requested action.
    #[error("role {role} is not authorized for {action}")]
    ActionForbidden {
        action: WorkspaceAction,
        role: WorkspaceRole,
    },

    /// Operation restricted to the organization-admin tier.
    #[error("organization admin role required")]
    AdminRequired,

    /// The target user is not an active member of this organization; they
    /// must join the organization first via the org-invite flow.
    #[error("user is not an active member of the organization")]
    OrganizationMemberRequired,

    /// Owner role cannot be granted or removed through role updates; use the
    /// owner-change operation.
    #[error("owner role changes must go through the owner-change operation")]
    OwnerRoleChangeForbidden,

    /// Members holding the owner role cannot be removed; reassign ownership
    /// first.
    #[error("cannot remove a workspace owner, reassign ownership first")]
    CannotRemoveOwner,

    /// Suspending this member would leave the workspace without an active
    /// owner.
    #[error("cannot suspend the last active owner of a workspace")]
    CannotSuspendOwner,

    /// Ownership cannot move to a member whose workspace membership is
    /// suspended; reinstate them first.
    #[error("cannot transfer ownership to a suspended member")]
    CannotPromoteSuspended,

    #[error(transparent)]
    InvalidMatrix(#[from] MatrixError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AccessError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::WorkspaceNotFound => "WORKSPACE_NOT_FOUND",
            AccessError::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            AccessError::Suspended => "MEMBERSHIP_SUSPENDED",
            AccessError::ActionForbidden { .. } => "ACTION_FORBIDDEN",
            AccessError::AdminRequired => "ADMIN_REQUIRED",
            AccessError::OrganizationMemberRequired => "ORGANIZATION_MEMBER_REQUIRED",
            AccessError::OwnerRoleChangeForbidden => "OWNER_ROLE_CHANGE_FORBIDDEN",
            AccessError::CannotRemoveOwner => "CANNOT_REMOVE_OWNER",
            AccessError::CannotSuspendOwner => "CANNOT_SUSPEND_OWNER",
            AccessError::CannotPromoteSuspended => "CANNOT_PROMOTE_SUSPENDED",
            AccessError::InvalidMatrix(_) => "MATRIX_INVALID",
            AccessError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Structured payload for API callers.
    pub fn to_body(&self) -> ErrorBody {
        let body = ErrorBody::new(self.code(), self.to_string());
        match self {
            AccessError::ActionForbidden { action, role } => body
                .with("action", action.as_str())
                .with("role", role.as_str()),
            _ => body,
        }
    }
}
