//! Entitlement resolution service.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crewdeck_storage::{
    EntitlementDefinition, ErrorBody, FeatureKey, LimitKey, OrganizationId, PlanCode, PlanStatus,
    Store, StoreError,
};

use crate::catalog::definition_for_plan;

/// Entitlement errors, all surfaced as access-denied with a stable code and
/// enough context for the caller to render an upgrade prompt.
#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("plan does not include entitlement {key}")]
    Required { key: FeatureKey },

    #[error("{key} limit reached: {current} of {limit}")]
    LimitExceeded {
        key: LimitKey,
        limit: u32,
        current: u64,
    },

    #[error("organization plan is {status}, writes require an active plan")]
    PlanInactive { status: PlanStatus },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl EntitlementError {
    /// Stable machine-readable code.
    pub fn code(&self) -> String {
        match self {
            EntitlementError::Required { .. } => "ENTITLEMENT_REQUIRED".into(),
            EntitlementError::LimitExceeded { key, .. } => key.exceeded_code(),
            EntitlementError::PlanInactive { .. } => "PLAN_INACTIVE".into(),
            EntitlementError::Storage(_) => "STORAGE_ERROR".into(),
        }
    }

    /// Structured payload for API callers.
    pub fn to_body(&self) -> ErrorBody {
        let body = ErrorBody::new(self.code(), self.to_string());
        match self {
            EntitlementError::Required { key } => body.with("entitlement", key.as_str()),
            EntitlementError::LimitExceeded { limit, current, .. } => {
                body.with("limit", *limit).with("current", *current)
            }
            EntitlementError::PlanInactive { status } => body.with("status", status.as_str()),
            EntitlementError::Storage(_) => body,
        }
    }
}

/// Resolves an organization's effective entitlements from its plan record.
///
/// Holds only an `Arc` to the store: cheap to clone into guards. No caching;
/// every call re-reads current plan state.
pub struct EntitlementService<S> {
    store: Arc<S>,
}

impl<S> Clone for EntitlementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> EntitlementService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Catalog definition for a plan, with no organization lookup. Useful
    /// for plan-comparison surfaces.
    pub fn definition_for_plan(&self, plan: PlanCode) -> EntitlementDefinition {
        definition_for_plan(plan)
    }

    /// Effective entitlements for the organization.
    ///
    /// A missing organization resolves to the free definition (fail
    /// safe-closed), logged as a not-found event, never an error. Unknown or
    /// badly-cased plan codes also resolve to free. Custom plans start from
    /// the enterprise baseline and merge the stored override patch verbatim.
    pub async fn resolve(
        &self,
        org_id: &OrganizationId,
    ) -> Result<EntitlementDefinition, EntitlementError> {
        let org = match self.store.get_organization(org_id).await {
            Ok(org) => org,
            Err(StoreError::NotFound) => {
                tracing::warn!(org_id = %org_id.0, "organization not found, resolving free entitlements");
                return Ok(definition_for_plan(PlanCode::Free));
            }
            Err(e) => return Err(e.into()),
        };

        let plan = PlanCode::parse_lenient(&org.plan_code).unwrap_or(PlanCode::Free);
        let mut definition = definition_for_plan(plan);
        if plan == PlanCode::Custom {
            org.plan_overrides.apply(&mut definition);
        }
        Ok(definition)
    }

    /// Normalized plan code; free for missing organizations and unknown codes.
    pub async fn plan_code(&self, org_id: &OrganizationId) -> Result<PlanCode, EntitlementError> {
        match self.store.get_organization(org_id).await {
            Ok(org) => Ok(PlanCode::parse_lenient(&org.plan_code).unwrap_or(PlanCode::Free)),
            Err(StoreError::NotFound) => Ok(PlanCode::Free),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored plan status. Defaults to active when the organization cannot
    /// be found: fail-open for status, fail-closed for features, so a
    /// dangling reference never silently blocks reads.
    pub async fn plan_status(&self, org_id: &OrganizationId) -> Result<PlanStatus, EntitlementError> {
        match self.store.get_organization(org_id).await {
            Ok(org) => Ok(org.plan_status),
            Err(StoreError::NotFound) => Ok(PlanStatus::Active),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the resolved plan includes a boolean feature.
    pub async fn has_feature(
        &self,
        org_id: &OrganizationId,
        key: FeatureKey,
    ) -> Result<bool, EntitlementError> {
        Ok(self.resolve(org_id).await?.feature(key))
    }

    /// String-keyed feature check. Anything that is not one of the five
    /// feature keys — numeric limit keys included — evaluates to `false`:
    /// this is a feature check, not a truthiness check.
    pub async fn has_feature_named(
        &self,
        org_id: &OrganizationId,
        key: &str,
    ) -> Result<bool, EntitlementError> {
        match FeatureKey::from_str(key) {
            Ok(key) => self.has_feature(org_id, key).await,
            Err(_) => Ok(false),
        }
    }

    /// Resolved numeric limit; `None` means unlimited.
    pub async fn get_limit(
        &self,
        org_id: &OrganizationId,
        key: LimitKey,
    ) -> Result<Option<u32>, EntitlementError> {
        Ok(self.resolve(org_id).await?.limit(key))
    }

    /// Fail unless the plan includes `key`.
    pub async fn assert_feature(
        &self,
        org_id: &OrganizationId,
        key: FeatureKey,
    ) -> Result<(), EntitlementError> {
        if self.has_feature(org_id, key).await? {
            Ok(())
        } else {
            Err(EntitlementError::Required { key })
        }
    }

    /// Fail when creating one more item would exceed the plan limit.
    ///
    /// `current` is the count *before* the new item is created, so a limit of
    /// N is the maximum steady-state count: creation is allowed while
    /// `current < N` and rejected once `current >= N`. A `None` limit is
    /// unlimited and never fails.
    pub async fn assert_within_limit(
        &self,
        org_id: &OrganizationId,
        key: LimitKey,
        current: u64,
    ) -> Result<(), EntitlementError> {
        match self.get_limit(org_id, key).await? {
            None => Ok(()),
            Some(limit) if current < u64::from(limit) => Ok(()),
            Some(limit) => Err(EntitlementError::LimitExceeded {
                key,
                limit,
                current,
            }),
        }
    }
}
