//! Principal context and effective workspace access.

use crewdeck_storage::{OrgRole, OrganizationId, UserId, WorkspaceRole};

/// The verified principal handed to the core by the authentication layer.
/// Trusted as-is; never re-derived here.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub platform_role: OrgRole,
}

/// A principal's effective access inside one workspace.
///
/// The admin bypass is a visible variant rather than an implicit early
/// return: admin-tier principals hold `AdminOverride` on every workspace in
/// their organization, which skips the permission matrix entirely.
/// Suspension is not a variant — a suspended membership fails resolution
/// with [`AccessError::Suspended`](crate::AccessError::Suspended) before any
/// matrix evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectiveAccess {
    /// Organization-admin tier: implicit owner on every workspace, passes
    /// every action.
    AdminOverride,
    /// Access through a membership row with this workspace role.
    Member(WorkspaceRole),
    /// No membership row. Callers that must not reveal resource existence
    /// map this to a generic not-found response.
    NoAccess,
}

impl EffectiveAccess {
    /// The workspace role the permission matrix is evaluated against, when
    /// one applies.
    pub fn role(&self) -> Option<WorkspaceRole> {
        match self {
            EffectiveAccess::AdminOverride => Some(WorkspaceRole::Owner),
            EffectiveAccess::Member(role) => Some(*role),
            EffectiveAccess::NoAccess => None,
        }
    }
}
