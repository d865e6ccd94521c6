//! Workspace authorization for crewdeck.
//!
//! Three services share one membership data model:
//! - [`AccessService`] computes a principal's effective access inside a
//!   workspace and runs every membership mutation through the invariants
//!   that keep ownership consistent (last-owner protection, owner changes
//!   as one atomic unit, matrix validation).
//! - [`InviteService`] issues, validates, consumes, and revokes workspace
//!   invite links. Raw tokens are returned once and never stored or logged.
//! - [`BackfillService`] repairs workspace owner references and membership
//!   rows, idempotently and one transaction per workspace.

mod backfill;
mod config;
mod context;
mod error;
mod invite;
mod rbac;

pub use backfill::{BackfillItem, BackfillOutcome, BackfillReport, BackfillService};
pub use config::{ConfigError, InviteConfig};
pub use context::{AuthContext, EffectiveAccess};
pub use error::AccessError;
pub use invite::{CreatedInviteLink, InviteError, InviteExpiry, InvitePreview, InviteService};
pub use rbac::AccessService;
