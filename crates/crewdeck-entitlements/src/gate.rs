//! Request-level plan-status gate.
//!
//! Route-independent: read verbs always pass, and requests without a tenant
//! context (system or unauthenticated routes) pass through — plan status is
//! a tenant concern, not an authentication concern. Every other request
//! requires the organization's plan status to be active.

use std::sync::Arc;

use crewdeck_storage::{OrganizationId, PlanStatus, Store};

use crate::service::{EntitlementError, EntitlementService};

/// HTTP-equivalent request verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestVerb {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestVerb {
    pub fn is_read_only(&self) -> bool {
        matches!(self, RequestVerb::Get | RequestVerb::Head | RequestVerb::Options)
    }
}

/// Gate applied before any tenant-scoped mutating handler runs.
pub struct PlanStatusGate<S> {
    entitlements: EntitlementService<S>,
}

impl<S> Clone for PlanStatusGate<S> {
    fn clone(&self) -> Self {
        Self {
            entitlements: self.entitlements.clone(),
        }
    }
}

impl<S: Store> PlanStatusGate<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            entitlements: EntitlementService::new(store),
        }
    }

    /// Pass read verbs and tenant-less requests; reject every other verb
    /// unless the organization's plan status is active.
    pub async fn check(
        &self,
        verb: RequestVerb,
        org_id: Option<&OrganizationId>,
    ) -> Result<(), EntitlementError> {
        if verb.is_read_only() {
            return Ok(());
        }
        let Some(org_id) = org_id else {
            return Ok(());
        };
        match self.entitlements.plan_status(org_id).await? {
            PlanStatus::Active => Ok(()),
            status => {
                tracing::info!(org_id = %org_id.0, status = status.as_str(), "write rejected, plan inactive");
                Err(EntitlementError::PlanInactive { status })
            }
        }
    }
}
