//! Workspace and workspace-membership types.

use chrono::{DateTime, Utc};

use super::{OrganizationId, PermissionMatrix, UserId, WorkspaceId, WorkspaceRole};

/// Workspace record.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub organization_id: OrganizationId,
    pub name: String,
    /// Current owner reference. `None` only for rows awaiting ownership
    /// reconciliation; live workspaces always carry exactly one owner.
    pub owner_user_id: Option<UserId>,
    /// Per-workspace permission-matrix override; `None` = default matrix.
    pub permission_matrix: Option<PermissionMatrix>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Membership status inside a workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MembershipStatus {
    Active,
    Suspended,
}

/// Workspace membership row: (workspace, user) unique pair.
#[derive(Clone, Debug)]
pub struct WorkspaceMembership {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub role: WorkspaceRole,
    pub status: MembershipStatus,
    pub suspended_at: Option<DateTime<Utc>>,
    pub suspended_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceMembership {
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

/// Parameters for creating a workspace membership row.
#[derive(Clone, Debug)]
pub struct CreateMembershipParams {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub role: WorkspaceRole,
}

/// Parameters for suspending or reinstating a member. On `Suspended` the
/// store records actor and timestamp; on `Active` it clears both.
#[derive(Clone, Debug)]
pub struct UpdateMembershipStatusParams {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub status: MembershipStatus,
    pub actor: Option<UserId>,
}

/// Parameters for the atomic ownership transfer: owner reference update,
/// previous-owner demotion, and new-owner membership upsert as one unit.
#[derive(Clone, Debug)]
pub struct TransferOwnershipParams {
    pub workspace_id: WorkspaceId,
    pub new_owner_user_id: UserId,
    /// Previous owner to demote to member, when different from the new owner.
    pub previous_owner_user_id: Option<UserId>,
}

/// Parameters for one backfill unit of work, applied atomically per
/// workspace: optionally repoint the owner reference, then make sure the
/// owner has a membership row with the owner role.
#[derive(Clone, Debug)]
pub struct OwnershipRepairParams {
    pub workspace_id: WorkspaceId,
    /// `Some(user)` repoints the workspace owner reference; `None` keeps it.
    pub set_owner_user_id: Option<UserId>,
    /// User whose membership row must exist with the owner role (created if
    /// absent, promoted if present with a different role).
    pub ensure_owner_membership: UserId,
}
