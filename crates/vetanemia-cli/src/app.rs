use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use vetanemia_client::VetClient;
use vetanemia_core::{RawCase, SessionUser};
use vetanemia_session::{
    Access, FileStore, KeyValueStore, LAST_PREDICTION_KEY, Mount, Route, SessionManager,
    Validation, guard,
};

use crate::cli::OutputFormat;
use crate::config;

/// Everything a command needs: the backend, the profile's session and the
/// chosen output format.
pub struct App {
    pub server: String,
    pub profile: String,
    pub format: OutputFormat,
    pub session: SessionManager,
    store: Arc<dyn KeyValueStore>,
    client: VetClient,
}

/// A page that passed the session check.
pub struct Page {
    pub user: SessionUser,
    /// Client carrying the session's bearer token.
    pub client: VetClient,
}

impl App {
    pub fn new(server: String, profile: String, format: OutputFormat) -> Result<Self> {
        let store = Arc::new(FileStore::new(config::session_path(&profile)?));
        Self::with_store(server, profile, format, store)
    }

    pub fn with_store(
        server: String,
        profile: String,
        format: OutputFormat,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let client =
            VetClient::new(&server).with_context(|| format!("Invalid server URL: {server}"))?;
        let session = SessionManager::new(store.clone(), Arc::new(client.clone()));
        Ok(Self {
            server,
            profile,
            format,
            session,
            store,
            client,
        })
    }

    /// Client without credentials, for the guest pages.
    pub fn guest_client(&self) -> &VetClient {
        &self.client
    }

    /// Route guard for `route` based on whether a token is stored.
    pub fn access(&self, route: Route) -> Result<Access> {
        Ok(guard(route, self.session.has_token()?))
    }

    /// Mounts an authenticated page.
    ///
    /// Passes the route guard, then waits for this session's validation so
    /// that a revoked token is reported before any data is fetched.
    pub async fn mount(&self, route: Route) -> Result<Page> {
        if let Access::Redirect(target) = self.access(route)? {
            return Err(redirect_error(target));
        }

        let mounted = match self.session.ensure_user()? {
            Mount::Redirect(target) => return Err(redirect_error(target)),
            Mount::Mounted(mounted) => mounted,
        };
        if let Some(cached) = &mounted.user {
            tracing::debug!(user = %cached.display_name(), page = route.title(), "mounting with cached user");
        }

        let user = match mounted.validation {
            Some(validation) => match validation.wait().await {
                Validation::Valid(user) => user,
                Validation::Terminated(err) => {
                    return Err(anyhow!(
                        "{err}. Your session has ended; sign in again with `vetanemia login`"
                    ));
                }
                Validation::Superseded => return Err(redirect_error(Route::SignIn)),
            },
            None => mounted
                .user
                .ok_or_else(|| redirect_error(Route::SignIn))?,
        };

        let token = self
            .session
            .token()?
            .ok_or_else(|| redirect_error(Route::SignIn))?;
        Ok(Page {
            user,
            client: self.client.clone().with_token(token),
        })
    }

    pub fn save_last_prediction(&self, case: &RawCase) -> Result<()> {
        let json = serde_json::to_string(case)?;
        self.store
            .set(LAST_PREDICTION_KEY, &json)
            .context("Failed to store the last prediction")?;
        Ok(())
    }

    /// The last prediction made with this profile. An unreadable entry is
    /// treated as absent.
    pub fn last_prediction(&self) -> Result<Option<RawCase>> {
        let Some(raw) = self.store.get(LAST_PREDICTION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(case) => Ok(Some(case)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable last prediction");
                Ok(None)
            }
        }
    }
}

fn redirect_error(target: Route) -> anyhow::Error {
    match target {
        Route::Dashboard => anyhow!("Already signed in. Run `vetanemia logout` to switch accounts"),
        _ => anyhow!("Not signed in. Run `vetanemia login --email <email>` first"),
    }
}

/// Result of a data page fetch, falling back to an empty value the way the
/// dashboard pages render nothing on failure.
pub fn or_empty<T: Default>(result: vetanemia_client::Result<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load {what}");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetanemia_session::{MemoryStore, TOKEN_KEY};

    fn app(store: Arc<MemoryStore>) -> App {
        App::with_store(
            "http://127.0.0.1:9".to_string(),
            "test".to_string(),
            OutputFormat::Json,
            store,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_mount_without_token_asks_for_login() {
        let app = app(Arc::new(MemoryStore::new()));
        let err = app.mount(Route::Dashboard).await.err().unwrap();
        assert!(err.to_string().contains("vetanemia login"));
    }

    #[tokio::test]
    async fn test_mount_returns_validated_user_and_token_client() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me/"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3, "email": "ada@clinic.test", "firstName": "Ada",
                "lastName": "Moss", "role": "", "clinicId": "CL-1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cases/"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .expect(2)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "tok").unwrap();
        let app = App::with_store(server.uri(), "test".to_string(), OutputFormat::Json, store)
            .unwrap();

        for _ in 0..2 {
            let page = app.mount(Route::Cases).await.unwrap();
            assert_eq!(page.user.display_name(), "Ada Moss");
            assert!(page.client.cases().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_mount_reports_revoked_session() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "tok").unwrap();
        let app = App::with_store(server.uri(), "test".to_string(), OutputFormat::Json, store.clone())
            .unwrap();

        let err = app.mount(Route::Dashboard).await.err().unwrap();
        assert!(err.to_string().contains("session has ended"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_login_page_is_guest_only() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "tok").unwrap();
        let app = app(store);
        assert_eq!(
            app.access(Route::SignIn).unwrap(),
            Access::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_last_prediction_roundtrip_and_corruption() {
        let store = Arc::new(MemoryStore::new());
        let app = app(store.clone());
        assert!(app.last_prediction().unwrap().is_none());

        let case = RawCase {
            patient_name: Some("Rex".to_string()),
            probability: Some(0.4),
            ..RawCase::default()
        };
        app.save_last_prediction(&case).unwrap();
        assert_eq!(app.last_prediction().unwrap(), Some(case));

        store.set(LAST_PREDICTION_KEY, "{not json").unwrap();
        assert!(app.last_prediction().unwrap().is_none());
    }

    #[test]
    fn test_invalid_server_url() {
        let result = App::with_store(
            "localhost without scheme".to_string(),
            "test".to_string(),
            OutputFormat::Json,
            Arc::new(MemoryStore::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_or_empty_falls_back() {
        let failed: vetanemia_client::Result<Vec<u8>> =
            Err(vetanemia_client::ClientError::Unauthenticated);
        assert!(or_empty(failed, "cases").is_empty());
        assert_eq!(or_empty(Ok(vec![1u8]), "cases"), vec![1]);
    }
}
