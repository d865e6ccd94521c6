//! Organization types.
//!
//! The organization record is owned by the org-management subsystem; this
//! core only reads the plan fields and the member roster.

use chrono::{DateTime, Utc};

use super::{EntitlementOverrides, OrgRole, OrganizationId, PlanStatus, UserId};

/// Organization record (the tenant and billing unit).
#[derive(Clone, Debug)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    /// Plan code as stored. Parsed leniently (case-insensitive, unknown →
    /// free) at resolve time, so a bad value degrades instead of erroring.
    pub plan_code: String,
    pub plan_status: PlanStatus,
    /// Custom-plan override patch. Validated at write time; empty for
    /// non-custom plans.
    pub plan_overrides: EntitlementOverrides,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether an organization member currently counts as active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrgMemberStatus {
    Active,
    Suspended,
}

/// Organization member record.
#[derive(Clone, Debug)]
pub struct OrganizationMember {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: OrgRole,
    pub status: OrgMemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl OrganizationMember {
    pub fn is_active(&self) -> bool {
        self.status == OrgMemberStatus::Active
    }
}
