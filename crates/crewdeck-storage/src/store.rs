//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait the authorization and entitlement services depend on.
///
/// Every method is a short, indexed read or write. The two `*_ownership`
/// methods span multiple rows and are contractually **atomic**: a backend
/// must apply all of their writes in a single transaction or none of them.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────── Organizations ──────────────────────────────

    /// Get organization by ID.
    async fn get_organization(&self, org_id: &OrganizationId) -> Result<Organization, StoreError>;

    /// List all organizations (used by the global backfill run).
    async fn list_organizations(&self) -> Result<Vec<Organization>, StoreError>;

    /// Get a user's membership in an organization.
    async fn get_organization_member(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<OrganizationMember, StoreError>;

    /// List all members of an organization.
    async fn list_organization_members(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Vec<OrganizationMember>, StoreError>;

    // ─────────────────────────────── Workspaces ───────────────────────────────

    /// Get workspace by ID.
    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, StoreError>;

    /// List workspaces belonging to an organization (soft-deleted included;
    /// callers filter).
    async fn list_organization_workspaces(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Vec<Workspace>, StoreError>;

    /// Replace a workspace's permission-matrix override (`None` clears it
    /// back to the default matrix).
    async fn set_workspace_permission_matrix(
        &self,
        workspace_id: &WorkspaceId,
        matrix: Option<PermissionMatrix>,
    ) -> Result<(), StoreError>;

    // ──────────────────────── Workspace memberships ───────────────────────────

    /// Get the membership row for (workspace, user).
    async fn get_workspace_membership(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<WorkspaceMembership, StoreError>;

    /// List all membership rows of a workspace.
    async fn list_workspace_memberships(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<WorkspaceMembership>, StoreError>;

    /// Create a membership row. Fails with `AlreadyExists` when the
    /// (workspace, user) pair is taken.
    async fn create_workspace_membership(
        &self,
        params: &CreateMembershipParams,
    ) -> Result<WorkspaceMembership, StoreError>;

    /// Update the role on an existing membership row.
    async fn update_workspace_membership_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> Result<(), StoreError>;

    /// Suspend or reinstate a member. The store records actor/timestamp on
    /// suspension and clears them on reinstatement.
    async fn update_workspace_membership_status(
        &self,
        params: &UpdateMembershipStatusParams,
    ) -> Result<(), StoreError>;

    /// Remove a membership row.
    async fn remove_workspace_membership(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<(), StoreError>;

    // ──────────────────────────── Ownership (atomic) ──────────────────────────

    /// Atomically: point the workspace owner reference at the new owner,
    /// demote the previous owner's membership to member (when present and
    /// different), and create-or-promote the new owner's membership row.
    async fn transfer_workspace_ownership(
        &self,
        params: &TransferOwnershipParams,
    ) -> Result<(), StoreError>;

    /// Atomically apply one backfill unit of work for a single workspace.
    async fn apply_ownership_repair(
        &self,
        params: &OwnershipRepairParams,
    ) -> Result<(), StoreError>;

    // ─────────────────────────────── Invite links ─────────────────────────────

    /// Create an invite link (hash only; the raw token never reaches the store).
    async fn create_invite_link(
        &self,
        params: &CreateInviteLinkParams,
    ) -> Result<InviteLink, StoreError>;

    /// Get invite link by ID.
    async fn get_invite_link(&self, id: &InviteLinkId) -> Result<InviteLink, StoreError>;

    /// Get invite link by token hash.
    async fn get_invite_link_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<InviteLink, StoreError>;

    /// List a workspace's invite links, newest first.
    async fn list_workspace_invite_links(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<InviteLink>, StoreError>;

    /// Mark a link revoked with actor/timestamp audit fields.
    async fn revoke_invite_link(&self, params: &RevokeInviteLinkParams) -> Result<(), StoreError>;
}
