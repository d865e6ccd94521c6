//! Invite link types.
//!
//! Only the SHA-256 hash of an invite token is ever stored; the raw token is
//! returned exactly once at creation and cannot be recovered afterward.

use chrono::{DateTime, Utc};

use super::{InviteLinkId, UserId, WorkspaceId};

/// Stored link status. "Expired" is never stored; it is derived from the
/// expiry timestamp at read time, see [`InviteLink::effective_state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InviteLinkStatus {
    Active,
    Revoked,
}

/// Logical link state derived from stored status plus `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InviteLinkState {
    Active,
    Expired,
    Revoked,
}

/// Invite link record.
#[derive(Clone, Debug)]
pub struct InviteLink {
    pub id: InviteLinkId,
    pub workspace_id: WorkspaceId,
    pub created_by: UserId,
    /// Hex SHA-256 of the single-use-per-link random token.
    pub token_hash: String,
    pub status: InviteLinkStatus,
    /// Absolute expiry; `None` = never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl InviteLink {
    /// Pure derivation of the 3-way logical state. Revocation wins over
    /// expiry; expiry is strict (`expires_at > now` keeps the link active).
    pub fn effective_state(&self, now: DateTime<Utc>) -> InviteLinkState {
        match self.status {
            InviteLinkStatus::Revoked => InviteLinkState::Revoked,
            InviteLinkStatus::Active => match self.expires_at {
                Some(expires_at) if expires_at <= now => InviteLinkState::Expired,
                _ => InviteLinkState::Active,
            },
        }
    }
}

/// Parameters for creating an invite link.
#[derive(Clone, Debug)]
pub struct CreateInviteLinkParams {
    pub workspace_id: WorkspaceId,
    pub created_by: UserId,
    pub token_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Parameters for revoking an invite link with audit fields.
#[derive(Clone, Debug)]
pub struct RevokeInviteLinkParams {
    pub invite_link_id: InviteLinkId,
    pub revoked_by: UserId,
}
