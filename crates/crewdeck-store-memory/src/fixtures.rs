//! Record builders for tests and local development seeding.
//!
//! Organization and workspace records are owned by subsystems outside the
//! authorization core, so there is no service-level way to create them;
//! these builders produce plausible rows to insert directly.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crewdeck_storage::*;

/// Organization on the given plan with empty overrides.
pub fn organization(plan_code: &str, plan_status: PlanStatus) -> Organization {
    let now = Utc::now();
    Organization {
        id: OrganizationId(Uuid::new_v4()),
        name: "acme".into(),
        plan_code: plan_code.to_string(),
        plan_status,
        plan_overrides: EntitlementOverrides::default(),
        created_at: now,
        updated_at: now,
    }
}

/// Active organization member with the given role, joined `joined_days_ago`
/// days in the past so ranking-by-join-time scenarios are expressible.
pub fn org_member(
    org_id: &OrganizationId,
    user_id: &UserId,
    role: OrgRole,
    joined_days_ago: i64,
) -> OrganizationMember {
    OrganizationMember {
        organization_id: org_id.clone(),
        user_id: user_id.clone(),
        role,
        status: OrgMemberStatus::Active,
        joined_at: Utc::now() - Duration::days(joined_days_ago),
    }
}

/// Workspace in the given organization, optionally with an owner reference.
pub fn workspace(org_id: &OrganizationId, owner: Option<&UserId>) -> Workspace {
    let now = Utc::now();
    Workspace {
        id: WorkspaceId(Uuid::new_v4()),
        organization_id: org_id.clone(),
        name: "delivery".into(),
        owner_user_id: owner.cloned(),
        permission_matrix: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Active membership row.
pub fn membership(
    workspace_id: &WorkspaceId,
    user_id: &UserId,
    role: WorkspaceRole,
) -> WorkspaceMembership {
    let now = Utc::now();
    WorkspaceMembership {
        workspace_id: workspace_id.clone(),
        user_id: user_id.clone(),
        role,
        status: MembershipStatus::Active,
        suspended_at: None,
        suspended_by: None,
        created_at: now,
        updated_at: now,
    }
}
