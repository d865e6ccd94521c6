//! Domain types shared by the authorization and entitlement services.

mod entitlements;
mod ids;
mod invite_links;
mod organizations;
mod permissions;
mod plans;
mod roles;
mod workspaces;

pub use entitlements::*;
pub use ids::*;
pub use invite_links::*;
pub use organizations::*;
pub use permissions::*;
pub use plans::*;
pub use roles::*;
pub use workspaces::*;
