//! Workspace actions and the per-workspace permission matrix.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::WorkspaceRole;

/// Named actions authorization is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceAction {
    View,
    CreateProject,
    CreateBoard,
    CreateDocument,
    EditSettings,
    ManageMembers,
    ChangeOwner,
    Archive,
    Delete,
}

impl WorkspaceAction {
    pub const ALL: [WorkspaceAction; 9] = [
        WorkspaceAction::View,
        WorkspaceAction::CreateProject,
        WorkspaceAction::CreateBoard,
        WorkspaceAction::CreateDocument,
        WorkspaceAction::EditSettings,
        WorkspaceAction::ManageMembers,
        WorkspaceAction::ChangeOwner,
        WorkspaceAction::Archive,
        WorkspaceAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceAction::View => "view",
            WorkspaceAction::CreateProject => "create_project",
            WorkspaceAction::CreateBoard => "create_board",
            WorkspaceAction::CreateDocument => "create_document",
            WorkspaceAction::EditSettings => "edit_settings",
            WorkspaceAction::ManageMembers => "manage_workspace_members",
            WorkspaceAction::ChangeOwner => "change_owner",
            WorkspaceAction::Archive => "archive",
            WorkspaceAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for WorkspaceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkspaceAction::ALL
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| format!("invalid workspace action: {}", s))
    }
}

/// Validation failure for a caller-supplied permission matrix.
#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    /// An owner-less action is always a validation error, never silently fixed.
    #[error("action {action} does not grant the owner role")]
    OwnerlessAction { action: String },
}

/// Action → allowed roles. Workspaces without an override use
/// [`PermissionMatrix::default_matrix`].
///
/// Owners are authorized for every action unconditionally, whether or not the
/// matrix lists them; validation still requires owner on every action so a
/// stored matrix never *looks* owner-less.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix(pub BTreeMap<WorkspaceAction, Vec<WorkspaceRole>>);

impl PermissionMatrix {
    /// The default matrix: view for all three roles, project/board creation
    /// for owner+member, document creation for everyone, everything else
    /// owner-only.
    pub fn default_matrix() -> Self {
        use WorkspaceAction as A;
        use WorkspaceRole as R;

        let mut m = BTreeMap::new();
        m.insert(A::View, vec![R::Owner, R::Member, R::Viewer]);
        m.insert(A::CreateProject, vec![R::Owner, R::Member]);
        m.insert(A::CreateBoard, vec![R::Owner, R::Member]);
        m.insert(A::CreateDocument, vec![R::Owner, R::Member, R::Viewer]);
        m.insert(A::EditSettings, vec![R::Owner]);
        m.insert(A::ManageMembers, vec![R::Owner]);
        m.insert(A::ChangeOwner, vec![R::Owner]);
        m.insert(A::Archive, vec![R::Owner]);
        m.insert(A::Delete, vec![R::Owner]);
        PermissionMatrix(m)
    }

    /// Whether `role` may perform `action` under this matrix. Owner passes
    /// unconditionally; an action absent from the matrix is denied to
    /// everyone else.
    pub fn allows(&self, role: WorkspaceRole, action: WorkspaceAction) -> bool {
        if role == WorkspaceRole::Owner {
            return true;
        }
        self.0
            .get(&action)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Validate a caller-supplied matrix. Every listed action must grant the
    /// owner role; unknown actions and roles are already unrepresentable
    /// (rejected at deserialization).
    pub fn validate(&self) -> Result<(), MatrixError> {
        for (action, roles) in &self.0 {
            if !roles.contains(&WorkspaceRole::Owner) {
                return Err(MatrixError::OwnerlessAction {
                    action: action.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}
