use async_trait::async_trait;
use vetanemia_core::SessionUser;

use crate::error::IdentityError;

/// The backend's "who am I" call, as seen by the session cache.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves `token` to the user it was issued for.
    async fn current_user(&self, token: &str) -> Result<SessionUser, IdentityError>;
}
