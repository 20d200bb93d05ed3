//! Client-side route guards.
//!
//! Guards look only at whether a token is present. Whether the token is still
//! valid is the session cache's business.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    Register,
    Dashboard,
    Prediction,
    Cases,
    AiSuggestions,
    Profile,
}

/// Dashboard pages in sidebar order.
pub const NAVIGATION: [Route; 5] = [
    Route::Dashboard,
    Route::Prediction,
    Route::Cases,
    Route::AiSuggestions,
    Route::Profile,
];

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::SignIn => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Prediction => "/dashboard/prediction",
            Self::Cases => "/dashboard/cases",
            Self::AiSuggestions => "/dashboard/ai-suggestions",
            Self::Profile => "/dashboard/profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::Register => "Register",
            Self::Dashboard => "Dashboard",
            Self::Prediction => "New Prediction",
            Self::Cases => "Case History",
            Self::AiSuggestions => "AI Suggestions",
            Self::Profile => "Profile",
        }
    }

    /// Pages that need a signed-in user.
    pub fn requires_auth(&self) -> bool {
        !self.guest_only()
    }

    /// Pages only shown to signed-out visitors.
    pub fn guest_only(&self) -> bool {
        matches!(self, Self::SignIn | Self::Register)
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        [Self::SignIn, Self::Register]
            .into_iter()
            .chain(NAVIGATION)
            .find(|r| r.path() == trimmed)
    }

    /// Whether this sidebar entry is highlighted while `current` is shown.
    /// The dashboard entry only matches exactly so that it is not lit on
    /// every sub-page.
    pub fn is_active(&self, current: &str) -> bool {
        let path = self.path();
        if *self == Self::Dashboard {
            return current == path;
        }
        current == path
            || current
                .strip_prefix(path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

/// Decides whether `route` may be shown.
pub fn guard(route: Route, has_token: bool) -> Access {
    match (route.guest_only(), has_token) {
        (false, false) => Access::Redirect(Route::SignIn),
        (true, true) => Access::Redirect(Route::Dashboard),
        _ => Access::Allow,
    }
}

/// Resolves a raw path, sending the root and unknown paths to sign-in first.
pub fn resolve(path: &str, has_token: bool) -> Access {
    match Route::from_path(path) {
        Some(route) => guard(route, has_token),
        None => guard(Route::SignIn, has_token),
    }
}
