//! Role vocabularies.
//!
//! Organization (platform) roles and workspace roles are deliberately two
//! disjoint enums. The only bridge between them is
//! [`default_workspace_role`], the total mapping applied when a user joins a
//! workspace through an invite link.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role within an organization (the platform role carried by the verified
/// principal).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Owner => "owner",
            OrgRole::Admin => "admin",
            OrgRole::Member => "member",
            OrgRole::Viewer => "viewer",
        }
    }

    /// The organization-admin tier: owners and admins. These principals hold
    /// implicit owner access on every workspace in their organization.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, OrgRole::Owner | OrgRole::Admin)
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(OrgRole::Owner),
            "admin" => Ok(OrgRole::Admin),
            "member" => Ok(OrgRole::Member),
            "viewer" => Ok(OrgRole::Viewer),
            _ => Err(format!("invalid organization role: {}", s)),
        }
    }
}

/// Role within a single workspace. Distinct from [`OrgRole`]: a workspace
/// owner is not an organization owner and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    Owner,
    Member,
    Viewer,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Owner => "owner",
            WorkspaceRole::Member => "member",
            WorkspaceRole::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(WorkspaceRole::Owner),
            "member" => Ok(WorkspaceRole::Member),
            "viewer" => Ok(WorkspaceRole::Viewer),
            _ => Err(format!("invalid workspace role: {}", s)),
        }
    }
}

/// The workspace role granted when a user joins a workspace via invite link.
///
/// The lowest platform tier maps to viewer; every other tier maps to member.
/// Admins are not auto-promoted to owner by joining a link.
pub fn default_workspace_role(org_role: OrgRole) -> WorkspaceRole {
    match org_role {
        OrgRole::Viewer => WorkspaceRole::Viewer,
        OrgRole::Owner | OrgRole::Admin | OrgRole::Member => WorkspaceRole::Member,
    }
}
