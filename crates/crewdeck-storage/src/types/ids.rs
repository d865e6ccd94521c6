//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Organization (tenant) identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrganizationId(pub Uuid);

/// Workspace identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkspaceId(pub Uuid);

/// Invite link identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InviteLinkId(pub Uuid);
