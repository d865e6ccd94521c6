//! Invite-link lifecycle: issue, validate, consume, revoke.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crewdeck_storage::{
    CreateInviteLinkParams, CreateMembershipParams, ErrorBody, InviteLink, InviteLinkId,
    InviteLinkState, RevokeInviteLinkParams, Store, StoreError, UserId, WorkspaceAction,
    WorkspaceId, WorkspaceMembership, default_workspace_role,
};

use crate::config::InviteConfig;
use crate::context::AuthContext;
use crate::error::AccessError;
use crate::rbac::AccessService;

#[derive(Debug, Error)]
pub enum InviteError {
    /// Token matches no link. Deliberately indistinguishable from a
    /// never-issued token in responses that must not leak link existence.
    #[error("invite link is invalid")]
    Invalid,

    #[error("invite link has been revoked")]
    Revoked,

    #[error("invite link has expired")]
    Expired,

    /// The joining user is not an active member of the workspace's
    /// organization.
    #[error("user is not an active member of the organization")]
    NotOrganizationMember,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl InviteError {
    pub fn code(&self) -> &'static str {
        match self {
            InviteError::Invalid => "INVITE_LINK_INVALID",
            InviteError::Revoked => "INVITE_LINK_REVOKED",
            InviteError::Expired => "INVITE_LINK_EXPIRED",
            InviteError::NotOrganizationMember => "ORGANIZATION_MEMBER_REQUIRED",
            InviteError::Access(err) => err.code(),
            InviteError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        match self {
            InviteError::Access(err) => err.to_body(),
            _ => ErrorBody::new(self.code(), self.to_string()),
        }
    }
}

/// Expiry request for a new invite link.
///
/// `Never` is explicit and wins over any configured default lifetime, so a
/// caller can always issue a link that stays valid until revoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InviteExpiry {
    /// Apply the configured default lifetime (which may itself be "never").
    #[default]
    Default,
    /// The link never expires.
    Never,
    /// Expire after this many days.
    After(i64),
}

/// A freshly issued invite link. The raw token appears here and nowhere
/// else; only its hash is stored.
#[derive(Clone, Debug)]
pub struct CreatedInviteLink {
    pub link: InviteLink,
    pub token: String,
    pub join_url: String,
}

/// What an unauthenticated token check may reveal about a valid link.
#[derive(Clone, Debug)]
pub struct InvitePreview {
    pub workspace_id: WorkspaceId,
    pub workspace_name: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Invite-link service.
pub struct InviteService<S> {
    store: Arc<S>,
    access: AccessService<S>,
    config: InviteConfig,
}

impl<S> Clone for InviteService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            access: self.access.clone(),
            config: self.config.clone(),
        }
    }
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

impl<S: Store> InviteService<S> {
    pub fn new(store: Arc<S>, config: InviteConfig) -> Self {
        Self {
            access: AccessService::new(store.clone()),
            store,
            config,
        }
    }

    /// Issue a new invite link for a workspace. Requires member-management
    /// access.
    pub async fn create_invite_link(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        expiry: InviteExpiry,
    ) -> Result<CreatedInviteLink, InviteError> {
        self.access
            .authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;

        let token = generate_token();
        let expires_at = match expiry {
            InviteExpiry::Default => self
                .config
                .default_expires_days
                .map(|days| Utc::now() + Duration::days(days)),
            InviteExpiry::Never => None,
            InviteExpiry::After(days) => Some(Utc::now() + Duration::days(days)),
        };

        let link = self
            .store
            .create_invite_link(&CreateInviteLinkParams {
                workspace_id: workspace_id.clone(),
                created_by: ctx.user_id.clone(),
                token_hash: hash_token(&token),
                expires_at,
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            invite_link_id = %link.id.0,
            created_by = %ctx.user_id.0,
            "invite link created"
        );

        let join_url = format!("{}/{}", self.config.join_url_base.trim_end_matches('/'), token);
        Ok(CreatedInviteLink {
            link,
            token,
            join_url,
        })
    }

    /// The workspace's currently active link, if any. Revoked and expired
    /// links are filtered by derived state.
    pub async fn get_active_invite_link(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<InviteLink>, InviteError> {
        self.access
            .authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        let now = Utc::now();
        let links = self.store.list_workspace_invite_links(workspace_id).await?;
        Ok(links
            .into_iter()
            .find(|l| l.effective_state(now) == InviteLinkState::Active))
    }

    /// Revoke a specific link, recording the acting principal. Revoking an
    /// already revoked or expired link is a no-op.
    pub async fn revoke_invite_link(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
        invite_link_id: &InviteLinkId,
    ) -> Result<(), InviteError> {
        self.access
            .authorize(ctx, workspace_id, WorkspaceAction::ManageMembers)
            .await?;
        let link = match self.store.get_invite_link(invite_link_id).await {
            Ok(link) if link.workspace_id == *workspace_id => link,
            Ok(_) | Err(StoreError::NotFound) => return Err(InviteError::Invalid),
            Err(err) => return Err(err.into()),
        };
        if link.effective_state(Utc::now()) != InviteLinkState::Active {
            return Ok(());
        }
        self.store
            .revoke_invite_link(&RevokeInviteLinkParams {
                invite_link_id: invite_link_id.clone(),
                revoked_by: ctx.user_id.clone(),
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            invite_link_id = %invite_link_id.0,
            revoked_by = %ctx.user_id.0,
            "invite link revoked"
        );
        Ok(())
    }

    /// Revoke whichever link is currently active, returning it. `Ok(None)`
    /// when no active link exists; never an error for that case.
    pub async fn revoke_active_invite_link(
        &self,
        ctx: &AuthContext,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<InviteLink>, InviteError> {
        let Some(link) = self.get_active_invite_link(ctx, workspace_id).await? else {
            return Ok(None);
        };
        self.store
            .revoke_invite_link(&RevokeInviteLinkParams {
                invite_link_id: link.id.clone(),
                revoked_by: ctx.user_id.clone(),
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace_id.0,
            invite_link_id = %link.id.0,
            revoked_by = %ctx.user_id.0,
            "invite link revoked"
        );
        Ok(Some(link))
    }

    /// Unauthenticated token check for the join page. Valid tokens reveal
    /// the workspace name and expiry; everything else is `Ok(None)` so the
    /// response never distinguishes unknown, revoked, and expired tokens.
    pub async fn validate_token(&self, token: &str) -> Result<Option<InvitePreview>, InviteError> {
        let link = match self
            .store
            .get_invite_link_by_token_hash(&hash_token(token))
            .await
        {
            Ok(link) => link,
            Err(StoreError::NotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if link.effective_state(Utc::now()) != InviteLinkState::Active {
            return Ok(None);
        }
        let workspace = match self.store.get_workspace(&link.workspace_id).await {
            Ok(ws) if !ws.is_deleted() => ws,
            Ok(_) | Err(StoreError::NotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(InvitePreview {
            workspace_id: workspace.id,
            workspace_name: workspace.name,
            expires_at: link.expires_at,
        }))
    }

    /// Consume an invite token: join the authenticated user to the link's
    /// workspace with the role derived from their platform role.
    ///
    /// Idempotent for existing members; their row is returned unchanged,
    /// whatever its role or status. Error codes distinguish revoked and
    /// expired links for authenticated joiners.
    pub async fn join_workspace(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<WorkspaceMembership, InviteError> {
        let link = match self
            .store
            .get_invite_link_by_token_hash(&hash_token(token))
            .await
        {
            Ok(link) => link,
            Err(StoreError::NotFound) => return Err(InviteError::Invalid),
            Err(err) => return Err(err.into()),
        };
        match link.effective_state(Utc::now()) {
            InviteLinkState::Active => {}
            InviteLinkState::Revoked => return Err(InviteError::Revoked),
            InviteLinkState::Expired => return Err(InviteError::Expired),
        }

        let workspace = match self.store.get_workspace(&link.workspace_id).await {
            Ok(ws) if !ws.is_deleted() => ws,
            Ok(_) | Err(StoreError::NotFound) => return Err(InviteError::Invalid),
            Err(err) => return Err(err.into()),
        };

        let org_member = match self
            .store
            .get_organization_member(&workspace.organization_id, user_id)
            .await
        {
            Ok(m) if m.is_active() => m,
            Ok(_) | Err(StoreError::NotFound) => return Err(InviteError::NotOrganizationMember),
            Err(err) => return Err(err.into()),
        };

        if let Ok(existing) = self
            .store
            .get_workspace_membership(&workspace.id, user_id)
            .await
        {
            return Ok(existing);
        }

        let role = default_workspace_role(org_member.role);
        let membership = self
            .store
            .create_workspace_membership(&CreateMembershipParams {
                workspace_id: workspace.id.clone(),
                user_id: user_id.clone(),
                role,
            })
            .await?;
        tracing::info!(
            workspace_id = %workspace.id.0,
            user_id = %user_id.0,
            role = role.as_str(),
            "user joined via invite link"
        );
        Ok(membership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewdeck_storage::{MembershipStatus, OrgRole, PlanStatus, WorkspaceRole};
    use crewdeck_store_memory::{fixtures, MemoryStore};
    use uuid::Uuid;

    struct Env {
        store: Arc<MemoryStore>,
        service: InviteService<MemoryStore>,
        owner_ctx: AuthContext,
        workspace_id: WorkspaceId,
    }

    async fn env() -> Env {
        let store = Arc::new(MemoryStore::new());
        let org = fixtures::organization("team", PlanStatus::Active);
        let owner = UserId(Uuid::new_v4());
        store.insert_organization(org.clone()).await;
        store
            .insert_organization_member(fixtures::org_member(&org.id, &owner, OrgRole::Member, 30))
            .await;
        let ws = fixtures::workspace(&org.id, Some(&owner));
        let workspace_id = ws.id.clone();
        store.insert_workspace(ws).await;
        store
            .insert_workspace_membership(fixtures::membership(
                &workspace_id,
                &owner,
                WorkspaceRole::Owner,
            ))
            .await;
        Env {
            service: InviteService::new(store.clone(), InviteConfig::test()),
            owner_ctx: AuthContext {
                user_id: owner,
                organization_id: org.id,
                platform_role: OrgRole::Member,
            },
            store,
            workspace_id,
        }
    }

    async fn seed_org_member(env: &Env, role: OrgRole) -> UserId {
        let user = UserId(Uuid::new_v4());
        env.store
            .insert_organization_member(fixtures::org_member(
                &env.owner_ctx.organization_id,
                &user,
                role,
                5,
            ))
            .await;
        user
    }

    #[tokio::test]
    async fn created_link_stores_hash_only_and_builds_join_url() {
        let env = env().await;
        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();

        assert_eq!(created.token.len(), 32);
        assert_ne!(created.link.token_hash, created.token);
        assert_eq!(created.link.token_hash, hash_token(&created.token));
        assert_eq!(
            created.join_url,
            format!("http://localhost:3000/join/{}", created.token)
        );
        // Default expiry from config.
        assert!(created.link.expires_at.is_some());
    }

    #[tokio::test]
    async fn explicit_never_overrides_the_configured_default() {
        let env = env().await;
        // The test config carries a seven-day default lifetime.
        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Never)
            .await
            .unwrap();
        assert!(created.link.expires_at.is_none());
        assert_eq!(
            created.link.effective_state(Utc::now() + Duration::days(365)),
            InviteLinkState::Active
        );

        // Still joinable through the service, with no implicit expiry.
        let member = seed_org_member(&env, OrgRole::Member).await;
        let row = env
            .service
            .join_workspace(&created.token, &member)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Member);
    }

    #[tokio::test]
    async fn creation_requires_member_management_access() {
        let env = env().await;
        let viewer = seed_org_member(&env, OrgRole::Viewer).await;
        env.store
            .insert_workspace_membership(fixtures::membership(
                &env.workspace_id,
                &viewer,
                WorkspaceRole::Viewer,
            ))
            .await;
        let ctx = AuthContext {
            user_id: viewer,
            organization_id: env.owner_ctx.organization_id.clone(),
            platform_role: OrgRole::Viewer,
        };
        let err = env
            .service
            .create_invite_link(&ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ACTION_FORBIDDEN");
    }

    #[tokio::test]
    async fn validate_token_hides_unknown_revoked_and_expired() {
        let env = env().await;

        assert!(env.service.validate_token("no-such-token").await.unwrap().is_none());

        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();
        let preview = env
            .service
            .validate_token(&created.token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(preview.workspace_id, env.workspace_id);
        assert_eq!(preview.workspace_name, "delivery");

        env.service
            .revoke_invite_link(&env.owner_ctx, &env.workspace_id, &created.link.id)
            .await
            .unwrap();
        assert!(env.service.validate_token(&created.token).await.unwrap().is_none());

        let expired = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::After(-1))
            .await
            .unwrap();
        assert!(env.service.validate_token(&expired.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn join_grants_role_derived_from_platform_role() {
        let env = env().await;
        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();

        let member = seed_org_member(&env, OrgRole::Member).await;
        let row = env
            .service
            .join_workspace(&created.token, &member)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Member);

        let viewer = seed_org_member(&env, OrgRole::Viewer).await;
        let row = env
            .service
            .join_workspace(&created.token, &viewer)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Viewer);

        // Admins join as plain members, not owners.
        let admin = seed_org_member(&env, OrgRole::Admin).await;
        let row = env
            .service
            .join_workspace(&created.token, &admin)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Member);
    }

    #[tokio::test]
    async fn join_is_idempotent_for_existing_members() {
        let env = env().await;
        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();

        // The owner already has a row; joining again does not demote it.
        let row = env
            .service
            .join_workspace(&created.token, &env.owner_ctx.user_id)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Owner);

        // Suspended members stay suspended rather than getting a fresh row.
        let member = seed_org_member(&env, OrgRole::Member).await;
        env.service.join_workspace(&created.token, &member).await.unwrap();
        env.store
            .update_workspace_membership_status(&crewdeck_storage::UpdateMembershipStatusParams {
                workspace_id: env.workspace_id.clone(),
                user_id: member.clone(),
                status: MembershipStatus::Suspended,
                actor: Some(env.owner_ctx.user_id.clone()),
            })
            .await
            .unwrap();
        let row = env
            .service
            .join_workspace(&created.token, &member)
            .await
            .unwrap();
        assert_eq!(row.status, MembershipStatus::Suspended);
    }

    #[tokio::test]
    async fn join_distinguishes_invalid_revoked_and_expired() {
        let env = env().await;
        let member = seed_org_member(&env, OrgRole::Member).await;

        let err = env
            .service
            .join_workspace("bogus", &member)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVITE_LINK_INVALID");

        let revoked = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();
        env.service
            .revoke_invite_link(&env.owner_ctx, &env.workspace_id, &revoked.link.id)
            .await
            .unwrap();
        let err = env
            .service
            .join_workspace(&revoked.token, &member)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVITE_LINK_REVOKED");

        let expired = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::After(-1))
            .await
            .unwrap();
        let err = env
            .service
            .join_workspace(&expired.token, &member)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVITE_LINK_EXPIRED");
    }

    #[tokio::test]
    async fn join_requires_active_org_membership() {
        let env = env().await;
        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();
        let outsider = UserId(Uuid::new_v4());
        let err = env
            .service
            .join_workspace(&created.token, &outsider)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ORGANIZATION_MEMBER_REQUIRED");
    }

    #[tokio::test]
    async fn active_link_lookup_and_idempotent_rotation() {
        let env = env().await;
        assert!(env
            .service
            .get_active_invite_link(&env.owner_ctx, &env.workspace_id)
            .await
            .unwrap()
            .is_none());
        assert!(env
            .service
            .revoke_active_invite_link(&env.owner_ctx, &env.workspace_id)
            .await
            .unwrap()
            .is_none());

        let created = env
            .service
            .create_invite_link(&env.owner_ctx, &env.workspace_id, InviteExpiry::Default)
            .await
            .unwrap();
        let active = env
            .service
            .get_active_invite_link(&env.owner_ctx, &env.workspace_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id, created.link.id);

        let revoked = env
            .service
            .revoke_active_invite_link(&env.owner_ctx, &env.workspace_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(revoked.id, created.link.id);
        assert!(env
            .service
            .get_active_invite_link(&env.owner_ctx, &env.workspace_id)
            .await
            .unwrap()
            .is_none());

        // Revoking an already revoked link by ID is a no-op.
        env.service
            .revoke_invite_link(&env.owner_ctx, &env.workspace_id, &created.link.id)
            .await
            .unwrap();
    }
}
