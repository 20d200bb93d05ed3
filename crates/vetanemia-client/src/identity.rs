use async_trait::async_trait;
use vetanemia_core::SessionUser;
use vetanemia_session::{IdentityError, IdentityProvider};

use crate::client::VetClient;
use crate::error::ClientError;

impl From<ClientError> for IdentityError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http { status, .. } => Self::Rejected(status),
            ClientError::Decode(e) => Self::Malformed(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl IdentityProvider for VetClient {
    async fn current_user(&self, token: &str) -> Result<SessionUser, IdentityError> {
        Ok(self.fetch_current_user(token).await?)
    }
}
