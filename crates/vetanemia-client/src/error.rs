use thiserror::Error;

/// Errors returned by [`VetClient`](crate::VetClient)
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to connect to server: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status. `detail` is the backend's own message, if it sent one.
    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http { status: u16, detail: Option<String> },

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not signed in")]
    Unauthenticated,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's message, falling back to `"<action> failed (<status>)"`.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            Self::Http {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Http { status, .. } => format!("{action} failed ({status})"),
            other => format!("{action} failed: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ClientError::Http {
            status: 400,
            detail: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 400: Invalid credentials");
        assert_eq!(err.user_message("Login"), "Invalid credentials");

        let err = ClientError::Http {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(err.user_message("Login"), "Login failed (502)");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_other_errors_have_no_status() {
        assert_eq!(ClientError::Unauthenticated.status(), None);
        assert_eq!(
            ClientError::Unauthenticated.user_message("Save"),
            "Save failed: Not signed in"
        );
    }
}
