//! In-memory [`Store`] implementation.
//!
//! Suitable for:
//! - Development and testing
//! - Single-process deployments
//!
//! All tables live behind one `tokio::sync::RwLock`, so every trait method —
//! including the multi-row ownership methods — executes atomically with
//! respect to every other call. A SQL backend would use one transaction per
//! method instead.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crewdeck_storage::*;

pub mod fixtures;

#[derive(Default)]
struct Inner {
    organizations: HashMap<OrganizationId, Organization>,
    org_members: HashMap<(OrganizationId, UserId), OrganizationMember>,
    workspaces: HashMap<WorkspaceId, Workspace>,
    memberships: HashMap<(WorkspaceId, UserId), WorkspaceMembership>,
    invite_links: HashMap<InviteLinkId, InviteLink>,
}

/// In-memory store over plain maps.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding surface. Organization and workspace records are owned by
    // subsystems outside this core, so tests and embedders insert them
    // directly instead of going through the Store trait.

    pub async fn insert_organization(&self, org: Organization) {
        self.inner.write().await.organizations.insert(org.id.clone(), org);
    }

    pub async fn insert_organization_member(&self, member: OrganizationMember) {
        self.inner
            .write()
            .await
            .org_members
            .insert((member.organization_id.clone(), member.user_id.clone()), member);
    }

    pub async fn insert_workspace(&self, workspace: Workspace) {
        self.inner
            .write()
            .await
            .workspaces
            .insert(workspace.id.clone(), workspace);
    }

    pub async fn insert_workspace_membership(&self, membership: WorkspaceMembership) {
        self.inner.write().await.memberships.insert(
            (membership.workspace_id.clone(), membership.user_id.clone()),
            membership,
        );
    }

    /// Overwrite a stored invite link (test hook for expiry scenarios).
    pub async fn insert_invite_link(&self, link: InviteLink) {
        self.inner.write().await.invite_links.insert(link.id.clone(), link);
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn get_organization(&self, org_id: &OrganizationId) -> Result<Organization, StoreError> {
        self.inner
            .read()
            .await
            .organizations
            .get(org_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, StoreError> {
        let inner = self.inner.read().await;
        let mut orgs: Vec<_> = inner.organizations.values().cloned().collect();
        orgs.sort_by_key(|o| o.created_at);
        Ok(orgs)
    }

    async fn get_organization_member(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<OrganizationMember, StoreError> {
        self.inner
            .read()
            .await
            .org_members
            .get(&(org_id.clone(), user_id.clone()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_organization_members(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Vec<OrganizationMember>, StoreError> {
        let inner = self.inner.read().await;
        let mut members: Vec<_> = inner
            .org_members
            .values()
            .filter(|m| &m.organization_id == org_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, StoreError> {
        self.inner
            .read()
            .await
            .workspaces
            .get(workspace_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_organization_workspaces(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Vec<Workspace>, StoreError> {
        let inner = self.inner.read().await;
        let mut workspaces: Vec<_> = inner
            .workspaces
            .values()
            .filter(|w| &w.organization_id == org_id)
            .cloned()
            .collect();
        workspaces.sort_by_key(|w| w.created_at);
        Ok(workspaces)
    }

    async fn set_workspace_permission_matrix(
        &self,
        workspace_id: &WorkspaceId,
        matrix: Option<PermissionMatrix>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let workspace = inner
            .workspaces
            .get_mut(workspace_id)
            .ok_or(StoreError::NotFound)?;
        workspace.permission_matrix = matrix;
        workspace.updated_at = Utc::now();
        Ok(())
    }

    async fn get_workspace_membership(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<WorkspaceMembership, StoreError> {
        self.inner
            .read()
            .await
            .memberships
            .get(&(workspace_id.clone(), user_id.clone()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_workspace_memberships(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<WorkspaceMembership>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<_> = inner
            .memberships
            .values()
            .filter(|m| &m.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn create_workspace_membership(
        &self,
        params: &CreateMembershipParams,
    ) -> Result<WorkspaceMembership, StoreError> {
        let mut inner = self.inner.write().await;
        let key = (params.workspace_id.clone(), params.user_id.clone());
        if inner.memberships.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        let membership = WorkspaceMembership {
            workspace_id: params.workspace_id.clone(),
            user_id: params.user_id.clone(),
            role: params.role,
            status: MembershipStatus::Active,
            suspended_at: None,
            suspended_by: None,
            created_at: now,
            updated_at: now,
        };
        inner.memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn update_workspace_membership_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let membership = inner
            .memberships
            .get_mut(&(workspace_id.clone(), user_id.clone()))
            .ok_or(StoreError::NotFound)?;
        membership.role = role;
        membership.updated_at = Utc::now();
        Ok(())
    }

    async fn update_workspace_membership_status(
        &self,
        params: &UpdateMembershipStatusParams,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let membership = inner
            .memberships
            .get_mut(&(params.workspace_id.clone(), params.user_id.clone()))
            .ok_or(StoreError::NotFound)?;
        let now = Utc::now();
        membership.status = params.status;
        match params.status {
            MembershipStatus::Suspended => {
                membership.suspended_at = Some(now);
                membership.suspended_by = params.actor.clone();
            }
            MembershipStatus::Active => {
                membership.suspended_at = None;
                membership.suspended_by = None;
            }
        }
        membership.updated_at = now;
        Ok(())
    }

    async fn remove_workspace_membership(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .memberships
            .remove(&(workspace_id.clone(), user_id.clone()))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn transfer_workspace_ownership(
        &self,
        params: &TransferOwnershipParams,
    ) -> Result<(), StoreError> {
        // Single write lock held for the whole unit: this is the atomicity
        // contract of the trait.
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let workspace = inner
            .workspaces
            .get_mut(&params.workspace_id)
            .ok_or(StoreError::NotFound)?;
        workspace.owner_user_id = Some(params.new_owner_user_id.clone());
        workspace.updated_at = now;

        if let Some(previous) = &params.previous_owner_user_id {
            if previous != &params.new_owner_user_id {
                if let Some(row) = inner
                    .memberships
                    .get_mut(&(params.workspace_id.clone(), previous.clone()))
                {
                    row.role = WorkspaceRole::Member;
                    row.updated_at = now;
                }
            }
        }

        let key = (params.workspace_id.clone(), params.new_owner_user_id.clone());
        match inner.memberships.get_mut(&key) {
            Some(row) => {
                row.role = WorkspaceRole::Owner;
                row.updated_at = now;
            }
            None => {
                inner.memberships.insert(
                    key,
                    WorkspaceMembership {
                        workspace_id: params.workspace_id.clone(),
                        user_id: params.new_owner_user_id.clone(),
                        role: WorkspaceRole::Owner,
                        status: MembershipStatus::Active,
                        suspended_at: None,
                        suspended_by: None,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn apply_ownership_repair(
        &self,
        params: &OwnershipRepairParams,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let workspace = inner
            .workspaces
            .get_mut(&params.workspace_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(owner) = &params.set_owner_user_id {
            workspace.owner_user_id = Some(owner.clone());
            workspace.updated_at = now;
        }

        let key = (
            params.workspace_id.clone(),
            params.ensure_owner_membership.clone(),
        );
        match inner.memberships.get_mut(&key) {
            Some(row) => {
                if row.role != WorkspaceRole::Owner {
                    row.role = WorkspaceRole::Owner;
                    row.updated_at = now;
                }
            }
            None => {
                inner.memberships.insert(
                    key,
                    WorkspaceMembership {
                        workspace_id: params.workspace_id.clone(),
                        user_id: params.ensure_owner_membership.clone(),
                        role: WorkspaceRole::Owner,
                        status: MembershipStatus::Active,
                        suspended_at: None,
                        suspended_by: None,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn create_invite_link(
        &self,
        params: &CreateInviteLinkParams,
    ) -> Result<InviteLink, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .invite_links
            .values()
            .any(|l| l.token_hash == params.token_hash)
        {
            return Err(StoreError::AlreadyExists);
        }
        let link = InviteLink {
            id: InviteLinkId(Uuid::new_v4()),
            workspace_id: params.workspace_id.clone(),
            created_by: params.created_by.clone(),
            token_hash: params.token_hash.clone(),
            status: InviteLinkStatus::Active,
            expires_at: params.expires_at,
            revoked_at: None,
            revoked_by: None,
            created_at: Utc::now(),
        };
        inner.invite_links.insert(link.id.clone(), link.clone());
        Ok(link)
    }

    async fn get_invite_link(&self, id: &InviteLinkId) -> Result<InviteLink, StoreError> {
        self.inner
            .read()
            .await
            .invite_links
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_invite_link_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<InviteLink, StoreError> {
        self.inner
            .read()
            .await
            .invite_links
            .values()
            .find(|l| l.token_hash == token_hash)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_workspace_invite_links(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<InviteLink>, StoreError> {
        let inner = self.inner.read().await;
        let mut links: Vec<_> = inner
            .invite_links
            .values()
            .filter(|l| &l.workspace_id == workspace_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn revoke_invite_link(&self, params: &RevokeInviteLinkParams) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let link = inner
            .invite_links
            .get_mut(&params.invite_link_id)
            .ok_or(StoreError::NotFound)?;
        link.status = InviteLinkStatus::Revoked;
        link.revoked_at = Some(Utc::now());
        link.revoked_by = Some(params.revoked_by.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;

    #[tokio::test]
    async fn membership_crud_roundtrip() {
        let store = MemoryStore::new();
        let ws_id = WorkspaceId(Uuid::new_v4());
        let user_id = UserId(Uuid::new_v4());

        let created = store
            .create_workspace_membership(&CreateMembershipParams {
                workspace_id: ws_id.clone(),
                user_id: user_id.clone(),
                role: WorkspaceRole::Member,
            })
            .await
            .unwrap();
        assert_eq!(created.role, WorkspaceRole::Member);
        assert!(created.is_active());

        // Unique (workspace, user) pair.
        let dup = store
            .create_workspace_membership(&CreateMembershipParams {
                workspace_id: ws_id.clone(),
                user_id: user_id.clone(),
                role: WorkspaceRole::Viewer,
            })
            .await;
        assert!(matches!(dup, Err(StoreError::AlreadyExists)));

        store
            .update_workspace_membership_status(&UpdateMembershipStatusParams {
                workspace_id: ws_id.clone(),
                user_id: user_id.clone(),
                status: MembershipStatus::Suspended,
                actor: Some(UserId(Uuid::new_v4())),
            })
            .await
            .unwrap();
        let row = store
            .get_workspace_membership(&ws_id, &user_id)
            .await
            .unwrap();
        assert_eq!(row.status, MembershipStatus::Suspended);
        assert!(row.suspended_at.is_some());
        assert!(row.suspended_by.is_some());

        store
            .update_workspace_membership_status(&UpdateMembershipStatusParams {
                workspace_id: ws_id.clone(),
                user_id: user_id.clone(),
                status: MembershipStatus::Active,
                actor: None,
            })
            .await
            .unwrap();
        let row = store
            .get_workspace_membership(&ws_id, &user_id)
            .await
            .unwrap();
        assert!(row.is_active());
        assert!(row.suspended_at.is_none());

        store
            .remove_workspace_membership(&ws_id, &user_id)
            .await
            .unwrap();
        assert!(matches!(
            store.get_workspace_membership(&ws_id, &user_id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn ownership_transfer_demotes_and_promotes_in_one_unit() {
        let store = MemoryStore::new();
        let org = fixtures::organization("team", PlanStatus::Active);
        let old_owner = UserId(Uuid::new_v4());
        let new_owner = UserId(Uuid::new_v4());
        let ws = fixtures::workspace(&org.id, Some(&old_owner));
        store.insert_organization(org).await;
        store.insert_workspace(ws.clone()).await;
        store
            .create_workspace_membership(&CreateMembershipParams {
                workspace_id: ws.id.clone(),
                user_id: old_owner.clone(),
                role: WorkspaceRole::Owner,
            })
            .await
            .unwrap();

        store
            .transfer_workspace_ownership(&TransferOwnershipParams {
                workspace_id: ws.id.clone(),
                new_owner_user_id: new_owner.clone(),
                previous_owner_user_id: Some(old_owner.clone()),
            })
            .await
            .unwrap();

        let workspace = store.get_workspace(&ws.id).await.unwrap();
        assert_eq!(workspace.owner_user_id, Some(new_owner.clone()));
        let old_row = store
            .get_workspace_membership(&ws.id, &old_owner)
            .await
            .unwrap();
        assert_eq!(old_row.role, WorkspaceRole::Member);
        let new_row = store
            .get_workspace_membership(&ws.id, &new_owner)
            .await
            .unwrap();
        assert_eq!(new_row.role, WorkspaceRole::Owner);
    }

    #[tokio::test]
    async fn invite_links_sorted_newest_first_and_unique_by_hash() {
        let store = MemoryStore::new();
        let ws_id = WorkspaceId(Uuid::new_v4());
        let creator = UserId(Uuid::new_v4());

        let first = store
            .create_invite_link(&CreateInviteLinkParams {
                workspace_id: ws_id.clone(),
                created_by: creator.clone(),
                token_hash: "hash-one".into(),
                expires_at: None,
            })
            .await
            .unwrap();
        let second = store
            .create_invite_link(&CreateInviteLinkParams {
                workspace_id: ws_id.clone(),
                created_by: creator.clone(),
                token_hash: "hash-two".into(),
                expires_at: None,
            })
            .await
            .unwrap();

        let dup = store
            .create_invite_link(&CreateInviteLinkParams {
                workspace_id: ws_id.clone(),
                created_by: creator.clone(),
                token_hash: "hash-one".into(),
                expires_at: None,
            })
            .await;
        assert!(matches!(dup, Err(StoreError::AlreadyExists)));

        let links = store.list_workspace_invite_links(&ws_id).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].id, second.id);
        assert_eq!(links[1].id, first.id);
    }
}
