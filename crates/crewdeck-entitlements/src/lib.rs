//! Plan catalog, entitlement resolution, and request gating.
//!
//! The catalog is a static mapping from plan code to an
//! [`EntitlementDefinition`](crewdeck_storage::EntitlementDefinition). The
//! [`EntitlementService`] resolves an organization's effective definition
//! (merging custom-plan overrides) and exposes the feature/limit predicates
//! the guard chain is built from. Resolution is deliberately uncached: a
//! plan change is visible on the very next call, at the cost of one
//! single-row indexed read per resolution.

mod catalog;
mod gate;
mod service;

pub use catalog::definition_for_plan;
pub use gate::{PlanStatusGate, RequestVerb};
pub use service::{EntitlementError, EntitlementService};
