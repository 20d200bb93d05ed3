//! The authenticated principal of a client session.

use serde::{Deserialize, Serialize};

/// User record returned by the backend's identity endpoint.
///
/// This is also the shape of the snapshot persisted between runs, so the
/// field names follow the backend's camelCase wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Free-form role label such as "Veterinarian".
    pub role: String,
    pub clinic_id: String,
}

impl SessionUser {
    /// "First Last", as shown in the dashboard chrome.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Avatar initials built from the first letter of each name.
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }

    /// Profile fields the user is allowed to edit.
    pub fn to_profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            clinic_id: self.clinic_id.clone(),
        }
    }
}

/// Display name with the chrome's fallback for a missing user.
pub fn display_name_or_default(user: Option<&SessionUser>) -> String {
    user.map(SessionUser::display_name)
        .unwrap_or_else(|| "User".to_string())
}

/// Initials with the chrome's fallback for a missing user.
pub fn initials_or_default(user: Option<&SessionUser>) -> String {
    match user.map(SessionUser::initials) {
        Some(initials) if !initials.is_empty() => initials,
        _ => "U".to_string(),
    }
}

/// Role label with the chrome's fallback for a missing user or empty role.
pub fn role_or_default(user: Option<&SessionUser>) -> &str {
    match user {
        Some(u) if !u.role.is_empty() => &u.role,
        _ => "User",
    }
}

/// Body of `PUT /auth/profile/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub clinic_id: String,
}

/// Response of `PUT /auth/profile/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateResponse {
    pub user: SessionUser,
}

/// Body of `POST /auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
