//! Static plan catalog.

use crewdeck_storage::{EntitlementDefinition, PlanCode};

/// Catalog definition for a plan.
///
/// `Custom` returns the enterprise-equivalent baseline; per-organization
/// overrides are merged on top of it by the resolver, never here.
pub fn definition_for_plan(plan: PlanCode) -> EntitlementDefinition {
    match plan {
        PlanCode::Free => EntitlementDefinition {
            capacity_engine: false,
            timeline_view: false,
            guest_sharing: false,
            custom_branding: false,
            audit_log: false,
            max_projects: Some(3),
            max_seats: Some(5),
            max_dashboards: Some(3),
            max_attachment_mb: Some(25),
            api_rate_multiplier: 1.0,
            activity_retention_days: Some(90),
        },
        PlanCode::Team => EntitlementDefinition {
            capacity_engine: true,
            timeline_view: true,
            guest_sharing: true,
            custom_branding: false,
            audit_log: false,
            max_projects: Some(50),
            max_seats: Some(50),
            max_dashboards: Some(100),
            max_attachment_mb: Some(250),
            api_rate_multiplier: 2.0,
            activity_retention_days: Some(365),
        },
        PlanCode::Enterprise | PlanCode::Custom => EntitlementDefinition {
            capacity_engine: true,
            timeline_view: true,
            guest_sharing: true,
            custom_branding: true,
            audit_log: true,
            max_projects: None,
            max_seats: None,
            max_dashboards: None,
            max_attachment_mb: None,
            api_rate_multiplier: 10.0,
            activity_retention_days: None,
        },
    }
}
