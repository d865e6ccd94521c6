//! Effective-access resolution, action authorization, and membership
//! mutations.

use std::sync::Arc;

use crewdeck_storage::{
    CreateMembershipParams, MembershipStatus, PermissionMatrix, Store, StoreError,
    TransferOwnershipParams, UpdateMembershipStatusParams, UserId, Workspace, WorkspaceAction,
    WorkspaceId, WorkspaceMembership, WorkspaceRole,
};

use crate::context::{AuthContext, EffectiveAccess};
use crate::error::AccessError;

/// Workspace authorization service.
///
/// Every public method takes the verified [`AuthContext`] and resolves the
/// workspace within the principal's organization first, so cross-tenant and
/// soft-deleted lookups fail identically to missing ones.
pub struct AccessService<S> {
    store: Arc<S>,
}

impl<S> Clone for AccessService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store> AccessService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load a workspace visible to this principal. Missing, soft-deleted,
    /// and cross-tenant rows are indistinguishable to the caller.
    async fn workspace_in_org(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
    ) -> Result<Workspace, AccessError> {
        match self.store.get_workspace(workspace_id).await {
            Ok(ws) if !ws.is_deleted() && ws.organization_id == ctx.organization_id => Ok(ws),
            Ok(_) => Err(AccessError::WorkspaceNotFound),
            Err(StoreError::NotFound) => Err(AccessError::WorkspaceNotFound),
            Err(err) => Err(err.into()),
        }
    }

    async fn access_for(
        &self,
        ctx: &AuthContext,
        workspace: &Workspace,
    ) -> Result<EffectiveAccess, AccessError> {
        if ctx.platform_role.is_admin_tier() {
            return Ok(EffectiveAccess::AdminOverride);
        }
        match self
            .store
            .get_workspace_membership(&workspace.id, &ctx.user_id)
            .await
        {
            Ok(m) if m.is_active() => Ok(EffectiveAccess::Member(m.role)),
            Ok(_) => Err(AccessError::Suspended),
            Err(StoreError::NotFound) => Ok(EffectiveAccess::NoAccess),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve the principal's effective access inside a workspace.
    pub async fn effective_access(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
    ) -> Result<EffectiveAccess, AccessError> {
        let workspace = self.workspace_in_org(ctx, workspace_id).await?;
        self.access_for(ctx, &workspace).await
    }

    /// Authorize one action. Returns the effective access on success so
    /// handlers can branch on it without a second resolution.
    pub async fn authorize(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        action: WorkspaceAction,
    ) -> Result<EffectiveAccess, AccessError> {
        let workspace = self.workspace_in_org(ctx, workspace_id).await?;
        let access = self.access_for(ctx, &workspace).await?;
        // AdminOverride evaluates as owner and therefore always passes.
        let Some(role) = access.role() else {
            return Err(AccessError::MembershipNotFound);
        };
        let matrix = workspace
            .permission_matrix
            .clone()
            .unwrap_or_else(PermissionMatrix::default_matrix);
        if matrix.allows(role, action) {
            Ok(access)
        } else {
            tracing::info!(
                workspace_id = %workspace_id.0,
                user_id = %ctx.user_id.0,
                action = action.as_str(),
                role = role.as_str(),
                "action denied"
            );
            Err(AccessError::ActionForbidden { action, role })
        }
    }

    /// List a workspace's membership rows (requires view access).
    pub async fn list_members(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<WorkspaceMembership>, AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::View)
            .await?;
        Ok(self.store.list_workspace_memberships(workspace_id).await?)
    }

    /// Add an organization member to a workspace with a non-owner role.
    ///
    /// Idempotent on the same (user, role) pair; a differing non-owner role
    /// is updated in place. Owner rows can only come from the owner-change
    /// operation.
    pub async fn add_member(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        target: &UserId,
        role: WorkspaceRole,
    ) -> Result<WorkspaceMembership, AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        if role == WorkspaceRole::Owner {
            return Err(AccessError::OwnerRoleChangeForbidden);
        }
        self.require_active_org_member(ctx, target).await?;

        match self
            .store
            .get_workspace_membership(workspace_id, target)
            .await
        {
            Ok(existing) if existing.role == WorkspaceRole::Owner => {
                Err(AccessError::OwnerRoleChangeForbidden)
            }
            Ok(existing) if existing.role == role => Ok(existing),
            Ok(_) => {
                self.store
                    .update_workspace_membership_role(workspace_id, target, role)
                    .await?;
                Ok(self
                    .store
                    .get_workspace_membership(workspace_id, target)
                    .await?)
            }
            Err(StoreError::NotFound) => {
                let created = self
                    .store
                    .create_workspace_membership(&CreateMembershipParams {
                        workspace_id: workspace_id.clone(),
                        user_id: target.clone(),
                        role,
                    })
                    .await?;
                tracing::info!(
                    workspace_id = %workspace_id.0,
                    user_id = %target.0,
                    role = role.as_str(),
                    "member added"
                );
                Ok(created)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Change a member's role between the non-owner roles. The owner role is
    /// never granted or removed here.
    pub async fn change_role(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        target: &UserId,
        new_role: WorkspaceRole,
    ) -> Result<(), AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        if new_role == WorkspaceRole::Owner {
            return Err(AccessError::OwnerRoleChangeForbidden);
        }
        let existing = self.membership(workspace_id, target).await?;
        if existing.role == WorkspaceRole::Owner {
            return Err(AccessError::OwnerRoleChangeForbidden);
        }
        self.store
            .update_workspace_membership_role(workspace_id, target, new_role)
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            user_id = %target.0,
            role = new_role.as_str(),
            "member role changed"
        );
        Ok(())
    }

    /// Remove a member. Owner rows are protected; ownership must be
    /// reassigned first.
    pub async fn remove_member(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        target: &UserId,
    ) -> Result<(), AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        let existing = self.membership(workspace_id, target).await?;
        if existing.role == WorkspaceRole::Owner {
            return Err(AccessError::CannotRemoveOwner);
        }
        self.store
            .remove_workspace_membership(workspace_id, target)
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            user_id = %target.0,
            "member removed"
        );
        Ok(())
    }

    /// Suspend a member, recording the acting principal. Refused when it
    /// would leave the workspace without an active owner-role member.
    pub async fn suspend_member(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        target: &UserId,
    ) -> Result<(), AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        let existing = self.membership(workspace_id, target).await?;
        if existing.role == WorkspaceRole::Owner {
            let rows = self.store.list_workspace_memberships(workspace_id).await?;
            let other_active_owner = rows.iter().any(|m| {
                m.user_id != *target && m.role == WorkspaceRole::Owner && m.is_active()
            });
            if !other_active_owner {
                return Err(AccessError::CannotSuspendOwner);
            }
        }
        self.store
            .update_workspace_membership_status(&UpdateMembershipStatusParams {
                workspace_id: workspace_id.clone(),
                user_id: target.clone(),
                status: MembershipStatus::Suspended,
                actor: Some(ctx.user_id.clone()),
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            user_id = %target.0,
            actor = %ctx.user_id.0,
            "member suspended"
        );
        Ok(())
    }

    /// Reinstate a suspended member and clear the suspension audit fields.
    pub async fn reinstate_member(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        target: &UserId,
    ) -> Result<(), AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        self.membership(workspace_id, target).await?;
        self.store
            .update_workspace_membership_status(&UpdateMembershipStatusParams {
                workspace_id: workspace_id.clone(),
                user_id: target.clone(),
                status: MembershipStatus::Active,
                actor: None,
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            user_id = %target.0,
            "member reinstated"
        );
        Ok(())
    }

    /// Reassign workspace ownership as one atomic unit. Restricted to the
    /// organization-admin tier; the new owner must be an active organization
    /// member.
    pub async fn change_owner(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        new_owner: &UserId,
    ) -> Result<(), AccessError> {
        let workspace = self.workspace_in_org(ctx, workspace_id).await?;
        if !ctx.platform_role.is_admin_tier() {
            return Err(AccessError::AdminRequired);
        }
        self.require_active_org_member(ctx, new_owner).await?;

        // A suspended row would be promoted to an inactive owner, leaving
        // the workspace with no active owner-role membership.
        match self
            .store
            .get_workspace_membership(workspace_id, new_owner)
            .await
        {
            Ok(row) if !row.is_active() => return Err(AccessError::CannotPromoteSuspended),
            Ok(_) | Err(StoreError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let previous = workspace
            .owner_user_id
            .filter(|prev| prev != new_owner);
        self.store
            .transfer_workspace_ownership(&TransferOwnershipParams {
                workspace_id: workspace_id.clone(),
                new_owner_user_id: new_owner.clone(),
                previous_owner_user_id: previous,
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            new_owner = %new_owner.0,
            actor = %ctx.user_id.0,
            "workspace ownership transferred"
        );
        Ok(())
    }

    /// Replace or clear the workspace's permission-matrix override.
    /// A supplied matrix is validated before it is persisted.
    pub async fn set_permission_matrix(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        matrix: Option<PermissionMatrix>,
    ) -> Result<(), AccessError> {
        self.authorize(ctx, workspace_id, WorkspaceAction::EditSettings)
            .await?;
        if let Some(m) = &matrix {
            m.validate()?;
        }
        self.store
            .set_workspace_permission_matrix(workspace_id, matrix)
            .await?;
        Ok(())
    }

    async fn membership(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<WorkspaceMembership, AccessError> {
        match self
            .store
            .get_workspace_membership(workspace_id, user_id)
            .await
        {
            Ok(m) => Ok(m),
            Err(StoreError::NotFound) => Err(AccessError::MembershipNotFound),
            Err(err) => Err(err.into()),
        }
    }

    async fn require_active_org_member(
        &self,
        ctx: &AuthContext,
        user_id: &UserId,
    ) -> Result<(), AccessError> {
        match self
            .store
            .get_organization_member(&ctx.organization_id, user_id)
            .await
        {
            Ok(m) if m.is_active() => Ok(()),
            Ok(_) => Err(AccessError::OrganizationMemberRequired),
            Err(StoreError::NotFound) => Err(AccessError::OrganizationMemberRequired),
            Err(err) => Err(err.into()),
        }
    }
}
