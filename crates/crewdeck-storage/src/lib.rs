//! Storage abstraction for crewdeck.
//!
//! Backend crates (e.g., crewdeck-store-memory, or a SQL-backed store) implement
//! the [`Store`] trait so the authorization and entitlement services don't depend
//! on any specific database engine or schema details.

mod error;
mod store;
pub mod types;

pub use error::{ErrorBody, StoreError};
pub use store::Store;
pub use types::*;

#[cfg(feature = "test-support")]
pub use store::MockStore;
