//! Session state for the VetAnemia client.
//!
//! - [`SessionManager`]: the per-session user cache with at-most-once
//!   validation against the backend's identity endpoint.
//! - [`KeyValueStore`]: the persistence seam for token, user snapshot and the
//!   last prediction.
//! - [`route`]: token-presence route guards.

pub mod error;
pub mod identity;
pub mod manager;
pub mod route;
pub mod store;

pub use error::{IdentityError, Result, SessionError, StoreError};
pub use identity::IdentityProvider;
pub use manager::{Mount, MountedSession, SessionManager, Validation, ValidationHandle};
pub use route::{Access, NAVIGATION, Route, guard, resolve};
pub use store::{
    FileStore, KeyValueStore, LAST_PREDICTION_KEY, MemoryStore, TOKEN_KEY, USER_KEY,
};
