//! Ownership backfill: reconcile workspace owner references with the
//! membership table.
//!
//! Older data can hold workspaces whose owner reference is empty or points
//! at a user who left the organization, or owners without an owner-role
//! membership row. The backfill walks an organization's live workspaces and
//! repairs each one as a single atomic unit, idempotently, so it can be
//! re-run at any time and after partial failures.

use std::sync::Arc;

use crewdeck_storage::{
    OrgRole, OrganizationId, OrganizationMember, OwnershipRepairParams, Store, StoreError, UserId,
    Workspace, WorkspaceId, WorkspaceRole,
};

/// Per-workspace result of a backfill run.
#[derive(Clone, Debug, PartialEq)]
pub enum BackfillOutcome {
    /// Owner reference and membership row already consistent.
    Unchanged,
    Repaired {
        owner_changed: bool,
        member_created: bool,
        member_updated: bool,
    },
    Skipped {
        reason: &'static str,
    },
    /// Storage failure for this workspace; the run continues past it.
    Error {
        detail: String,
    },
}

#[derive(Clone, Debug)]
pub struct BackfillItem {
    pub workspace_id: WorkspaceId,
    pub outcome: BackfillOutcome,
}

/// Summary of one organization's backfill run. `items` carries the
/// per-workspace detail; the counters aggregate it.
#[derive(Clone, Debug)]
pub struct BackfillReport {
    pub organization_id: OrganizationId,
    pub dry_run: bool,
    pub scanned: usize,
    pub owner_changes: usize,
    pub members_created: usize,
    pub members_updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub items: Vec<BackfillItem>,
}

impl BackfillReport {
    fn new(organization_id: OrganizationId, dry_run: bool) -> Self {
        Self {
            organization_id,
            dry_run,
            scanned: 0,
            owner_changes: 0,
            members_created: 0,
            members_updated: 0,
            skipped: 0,
            errors: 0,
            items: Vec::new(),
        }
    }

    fn record(&mut self, workspace_id: WorkspaceId, outcome: BackfillOutcome) {
        match &outcome {
            BackfillOutcome::Unchanged => {}
            BackfillOutcome::Repaired {
                owner_changed,
                member_created,
                member_updated,
            } => {
                self.owner_changes += *owner_changed as usize;
                self.members_created += *member_created as usize;
                self.members_updated += *member_updated as usize;
            }
            BackfillOutcome::Skipped { .. } => self.skipped += 1,
            BackfillOutcome::Error { .. } => self.errors += 1,
        }
        self.items.push(BackfillItem {
            workspace_id,
            outcome,
        });
    }
}

/// Ownership reconciliation service.
pub struct BackfillService<S> {
    store: Arc<S>,
}

impl<S> Clone for BackfillService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Replacement-owner ranking over the active roster: organization owners by
/// join time, then admins by join time, then any active member by join time.
fn pick_candidate(members: &[OrganizationMember]) -> Option<&OrganizationMember> {
    let active: Vec<&OrganizationMember> = members.iter().filter(|m| m.is_active()).collect();
    for tier in [Some(OrgRole::Owner), Some(OrgRole::Admin), None] {
        let pick = active
            .iter()
            .filter(|m| tier.is_none_or(|role| m.role == role))
            .min_by_key(|m| m.joined_at)
            .copied();
        if pick.is_some() {
            return pick;
        }
    }
    None
}

impl<S: Store> BackfillService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Backfill every organization. Per-organization store failures are
    /// logged and skipped; the run always completes.
    pub async fn run_all(&self, dry_run: bool) -> Result<Vec<BackfillReport>, StoreError> {
        let orgs = self.store.list_organizations().await?;
        let mut reports = Vec::with_capacity(orgs.len());
        for org in orgs {
            match self.run_organization(&org.id, dry_run).await {
                Ok(report) => reports.push(report),
                Err(err) => {
                    tracing::warn!(org_id = %org.id.0, error = %err, "backfill failed for organization");
                }
            }
        }
        Ok(reports)
    }

    /// Backfill one organization's live workspaces.
    pub async fn run_organization(
        &self,
        org_id: &OrganizationId,
        dry_run: bool,
    ) -> Result<BackfillReport, StoreError> {
        let members = self.store.list_organization_members(org_id).await?;
        let workspaces = self.store.list_organization_workspaces(org_id).await?;

        let mut report = BackfillReport::new(org_id.clone(), dry_run);
        for workspace in workspaces.iter().filter(|ws| !ws.is_deleted()) {
            report.scanned += 1;
            let outcome = self.repair_workspace(workspace, &members, dry_run).await;
            report.record(workspace.id.clone(), outcome);
        }
        tracing::info!(
            org_id = %org_id.0,
            dry_run,
            scanned = report.scanned,
            owner_changes = report.owner_changes,
            members_created = report.members_created,
            members_updated = report.members_updated,
            skipped = report.skipped,
            errors = report.errors,
            "ownership backfill finished"
        );
        Ok(report)
    }

    async fn repair_workspace(
        &self,
        workspace: &Workspace,
        members: &[OrganizationMember],
        dry_run: bool,
    ) -> BackfillOutcome {
        let is_active_member = |user: &UserId| {
            members
                .iter()
                .any(|m| m.user_id == *user && m.is_active())
        };

        // Keep the current owner when they are still on the active roster;
        // otherwise fall back to the ranked replacement candidate.
        let desired = match &workspace.owner_user_id {
            Some(current) if is_active_member(current) => current.clone(),
            _ => match pick_candidate(members) {
                Some(m) => m.user_id.clone(),
                None => {
                    tracing::warn!(
                        workspace_id = %workspace.id.0,
                        "no eligible owner, workspace left untouched"
                    );
                    return BackfillOutcome::Skipped {
                        reason: "no_eligible_owner",
                    };
                }
            },
        };

        let owner_changed = workspace.owner_user_id.as_ref() != Some(&desired);
        let (member_created, member_updated) = match self
            .store
            .get_workspace_membership(&workspace.id, &desired)
            .await
        {
            Ok(row) => (false, row.role != WorkspaceRole::Owner),
            Err(StoreError::NotFound) => (true, false),
            Err(err) => {
                return BackfillOutcome::Error {
                    detail: err.to_string(),
                }
            }
        };

        if !owner_changed && !member_created && !member_updated {
            return BackfillOutcome::Unchanged;
        }

        if !dry_run {
            let params = OwnershipRepairParams {
                workspace_id: workspace.id.clone(),
                set_owner_user_id: owner_changed.then(|| desired.clone()),
                ensure_owner_membership: desired.clone(),
            };
            if let Err(err) = self.store.apply_ownership_repair(&params).await {
                tracing::warn!(
                    workspace_id = %workspace.id.0,
                    error = %err,
                    "ownership repair failed"
                );
                return BackfillOutcome::Error {
                    detail: err.to_string(),
                };
            }
            tracing::info!(
                workspace_id = %workspace.id.0,
                owner = %desired.0,
                owner_changed,
                member_created,
                member_updated,
                "workspace ownership repaired"
            );
        }

        BackfillOutcome::Repaired {
            owner_changed,
            member_created,
            member_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crewdeck_storage::PlanStatus;
    use crewdeck_store_memory::{fixtures, MemoryStore};
    use uuid::Uuid;

    struct Env {
        store: Arc<MemoryStore>,
        service: BackfillService<MemoryStore>,
        org_id: OrganizationId,
    }

    async fn env() -> Env {
        let store = Arc::new(MemoryStore::new());
        let org = fixtures::organization("team", PlanStatus::Active);
        let org_id = org.id.clone();
        store.insert_organization(org).await;
        Env {
            service: BackfillService::new(store.clone()),
            store,
            org_id,
        }
    }

    async fn seed_user(env: &Env, role: OrgRole, joined_days_ago: i64) -> UserId {
        let user = UserId(Uuid::new_v4());
        env.store
            .insert_organization_member(fixtures::org_member(
                &env.org_id,
                &user,
                role,
                joined_days_ago,
            ))
            .await;
        user
    }

    fn outcome_for<'a>(report: &'a BackfillReport, ws: &WorkspaceId) -> &'a BackfillOutcome {
        &report
            .items
            .iter()
            .find(|i| i.workspace_id == *ws)
            .unwrap()
            .outcome
    }

    #[tokio::test]
    async fn consistent_workspace_is_untouched() {
        let env = env().await;
        let owner = seed_user(&env, OrgRole::Member, 10).await;
        let ws = fixtures::workspace(&env.org_id, Some(&owner));
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;
        env.store
            .insert_workspace_membership(fixtures::membership(&ws_id, &owner, WorkspaceRole::Owner))
            .await;

        let report = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(*outcome_for(&report, &ws_id), BackfillOutcome::Unchanged);
        assert_eq!(report.owner_changes, 0);
    }

    #[tokio::test]
    async fn missing_owner_reference_is_filled_by_ranked_candidate() {
        let env = env().await;
        // Ranking: org owners first by join time, then admins, then members.
        let _member = seed_user(&env, OrgRole::Member, 100).await;
        let late_org_owner = seed_user(&env, OrgRole::Owner, 5).await;
        let early_org_owner = seed_user(&env, OrgRole::Owner, 50).await;
        let _admin = seed_user(&env, OrgRole::Admin, 80).await;

        let ws = fixtures::workspace(&env.org_id, None);
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;

        let report = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(
            *outcome_for(&report, &ws_id),
            BackfillOutcome::Repaired {
                owner_changed: true,
                member_created: true,
                member_updated: false,
            }
        );

        let ws = env.store.get_workspace(&ws_id).await.unwrap();
        assert_eq!(ws.owner_user_id, Some(early_org_owner.clone()));
        assert_ne!(ws.owner_user_id, Some(late_org_owner));
        let row = env
            .store
            .get_workspace_membership(&ws_id, &early_org_owner)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Owner);
    }

    #[tokio::test]
    async fn departed_owner_is_replaced() {
        let env = env().await;
        let admin = seed_user(&env, OrgRole::Admin, 20).await;
        // Owner reference points at a user with no org membership row at all.
        let departed = UserId(Uuid::new_v4());
        let ws = fixtures::workspace(&env.org_id, Some(&departed));
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;

        let report = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(report.owner_changes, 1);
        let ws = env.store.get_workspace(&ws_id).await.unwrap();
        assert_eq!(ws.owner_user_id, Some(admin));
    }

    #[tokio::test]
    async fn owner_with_wrong_membership_row_is_promoted() {
        let env = env().await;
        let owner = seed_user(&env, OrgRole::Member, 10).await;
        let ws = fixtures::workspace(&env.org_id, Some(&owner));
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;
        env.store
            .insert_workspace_membership(fixtures::membership(&ws_id, &owner, WorkspaceRole::Member))
            .await;

        let report = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(
            *outcome_for(&report, &ws_id),
            BackfillOutcome::Repaired {
                owner_changed: false,
                member_created: false,
                member_updated: true,
            }
        );
        let row = env
            .store
            .get_workspace_membership(&ws_id, &owner)
            .await
            .unwrap();
        assert_eq!(row.role, WorkspaceRole::Owner);
    }

    #[tokio::test]
    async fn org_without_eligible_owner_skips_the_workspace() {
        let env = env().await;
        let ws = fixtures::workspace(&env.org_id, None);
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;

        let report = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(
            *outcome_for(&report, &ws_id),
            BackfillOutcome::Skipped {
                reason: "no_eligible_owner"
            }
        );
        let ws = env.store.get_workspace(&ws_id).await.unwrap();
        assert!(ws.owner_user_id.is_none());
    }

    #[tokio::test]
    async fn soft_deleted_workspaces_are_not_scanned() {
        let env = env().await;
        seed_user(&env, OrgRole::Admin, 10).await;
        let mut ws = fixtures::workspace(&env.org_id, None);
        ws.deleted_at = Some(Utc::now());
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;

        let report = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(report.scanned, 0);
        assert!(report.items.is_empty());
        let ws = env.store.get_workspace(&ws_id).await.unwrap();
        assert!(ws.owner_user_id.is_none());
    }

    #[tokio::test]
    async fn dry_run_reports_without_writing() {
        let env = env().await;
        seed_user(&env, OrgRole::Admin, 10).await;
        let ws = fixtures::workspace(&env.org_id, None);
        let ws_id = ws.id.clone();
        env.store.insert_workspace(ws).await;

        let report = env.service.run_organization(&env.org_id, true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.owner_changes, 1);
        assert_eq!(report.members_created, 1);

        let ws = env.store.get_workspace(&ws_id).await.unwrap();
        assert!(ws.owner_user_id.is_none());
    }

    #[tokio::test]
    async fn store_failure_is_recorded_per_item_and_the_run_continues() {
        let org = fixtures::organization("team", PlanStatus::Active);
        let admin = fixtures::org_member(&org.id, &UserId(Uuid::new_v4()), OrgRole::Admin, 10);
        let broken = fixtures::workspace(&org.id, None);
        let healthy = fixtures::workspace(&org.id, None);
        let broken_id = broken.id.clone();
        let healthy_id = healthy.id.clone();

        let mut mock = crewdeck_storage::MockStore::new();
        let members = vec![admin];
        mock.expect_list_organization_members()
            .returning(move |_| Ok(members.clone()));
        let workspaces = vec![broken, healthy];
        mock.expect_list_organization_workspaces()
            .returning(move |_| Ok(workspaces.clone()));
        mock.expect_get_workspace_membership()
            .returning(|_, _| Err(StoreError::NotFound));
        let failing = broken_id.clone();
        mock.expect_apply_ownership_repair().returning(move |params| {
            if params.workspace_id == failing {
                Err(StoreError::Backend("disk full".into()))
            } else {
                Ok(())
            }
        });

        let service = BackfillService::new(Arc::new(mock));
        let report = service.run_organization(&org.id, false).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.errors, 1);
        assert!(matches!(
            outcome_for(&report, &broken_id),
            BackfillOutcome::Error { .. }
        ));
        // The failure did not stop the other workspace's repair.
        assert_eq!(report.owner_changes, 1);
        assert_eq!(
            *outcome_for(&report, &healthy_id),
            BackfillOutcome::Repaired {
                owner_changed: true,
                member_created: true,
                member_updated: false,
            }
        );
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let env = env().await;
        seed_user(&env, OrgRole::Owner, 40).await;
        seed_user(&env, OrgRole::Member, 90).await;
        let orphan = fixtures::workspace(&env.org_id, None);
        let stale = fixtures::workspace(&env.org_id, Some(&UserId(Uuid::new_v4())));
        env.store.insert_workspace(orphan).await;
        env.store.insert_workspace(stale).await;

        let first = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(first.owner_changes, 2);

        let second = env.service.run_organization(&env.org_id, false).await.unwrap();
        assert_eq!(second.owner_changes, 0);
        assert_eq!(second.members_created, 0);
        assert_eq!(second.members_updated, 0);
        assert!(second
            .items
            .iter()
            .all(|i| i.outcome == BackfillOutcome::Unchanged));
    }

    #[tokio::test]
    async fn run_all_covers_every_organization() {
        let env = env().await;
        seed_user(&env, OrgRole::Admin, 10).await;
        env.store
            .insert_workspace(fixtures::workspace(&env.org_id, None))
            .await;

        let other = fixtures::organization("free", PlanStatus::Active);
        let other_id = other.id.clone();
        env.store.insert_organization(other).await;

        let reports = env.service.run_all(false).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().any(|r| r.organization_id == env.org_id));
        assert!(reports.iter().any(|r| r.organization_id == other_id));
    }
}
