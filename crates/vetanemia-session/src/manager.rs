//! Session user cache.
//!
//! [`SessionManager`] answers "who is signed in" for every page mount without
//! asking the backend more than once per session:
//!
//! 1. The cached user, or failing that the persisted snapshot, is handed back
//!    synchronously so the page can render user chrome immediately.
//! 2. The first mount of a session starts a single validation against the
//!    identity endpoint. Later mounts trust the cached value.
//!
//! A failed validation ends the session: token, snapshot and cache are all
//! cleared and callers are sent back to sign-in. [`SessionManager::invalidate`]
//! (logout) resets everything so the next login validates afresh.
//!
//! # Concurrency
//!
//! The "already validated" check-and-set and the in-flight slot share one
//! mutex, so concurrent mounts on a multi-threaded runtime still issue at
//! most one request. The validation runs as a spawned task whose result is
//! shared between every caller that holds a [`ValidationHandle`]. Each
//! session carries a generation number; a validation that finishes after
//! logout does not touch the new session's state.
//!
//! # Example
//!
//! ```ignore
//! let session = SessionManager::new(store, client);
//! match session.ensure_user()? {
//!     Mount::Redirect(route) => println!("please sign in ({route})"),
//!     Mount::Mounted(mounted) => {
//!         render_header(mounted.user.as_ref());
//!         if let Some(validation) = mounted.validation {
//!             validation.wait().await;
//!         }
//!     }
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use vetanemia_core::SessionUser;

use crate::error::{IdentityError, Result};
use crate::identity::IdentityProvider;
use crate::route::Route;
use crate::store::{KeyValueStore, TOKEN_KEY, USER_KEY};

/// How a validation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The token is good; the cache now holds this user.
    Valid(SessionUser),
    /// The session was ended and must restart at sign-in.
    Terminated(IdentityError),
    /// The session was invalidated while the request was in flight; the
    /// result was discarded.
    Superseded,
}

impl Validation {
    /// Where the caller must go next, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::Valid(_) => None,
            Self::Terminated(_) | Self::Superseded => Some(Route::SignIn),
        }
    }
}

/// Shared handle on the session's single validation.
///
/// Awaiting is optional: the validation runs to completion on its own.
#[derive(Clone)]
pub struct ValidationHandle(Shared<BoxFuture<'static, Validation>>);

impl ValidationHandle {
    pub async fn wait(self) -> Validation {
        self.0.await
    }
}

impl std::fmt::Debug for ValidationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationHandle")
            .field("done", &self.0.peek().is_some())
            .finish()
    }
}

/// A page mount that may proceed.
#[derive(Debug, Clone)]
pub struct MountedSession {
    /// User available without waiting on the network, if any.
    pub user: Option<SessionUser>,
    /// The session's validation while it is still pending.
    pub validation: Option<ValidationHandle>,
}

#[derive(Debug, Clone)]
pub enum Mount {
    Redirect(Route),
    Mounted(MountedSession),
}

#[derive(Default)]
struct SessionState {
    cached_user: Option<SessionUser>,
    in_flight: Option<ValidationHandle>,
    validated_once: bool,
    generation: u64,
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityProvider>,
    state: Mutex<SessionState>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_snapshot(&self) -> Option<SessionUser> {
        let raw = match self.store.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "could not read user snapshot");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unparseable user snapshot");
                None
            }
        }
    }

    fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear session entry");
            }
        }
    }

    fn finish_validation(
        &self,
        generation: u64,
        result: std::result::Result<SessionUser, IdentityError>,
    ) -> Validation {
        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!("discarding validation result from an ended session");
            return Validation::Superseded;
        }
        state.in_flight = None;

        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, email = %user.email, "session validated");
                match serde_json::to_string(&user) {
                    Ok(snapshot) => {
                        if let Err(e) = self.store.set(USER_KEY, &snapshot) {
                            tracing::warn!(error = %e, "failed to persist user snapshot");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to encode user snapshot"),
                }
                state.cached_user = Some(user.clone());
                Validation::Valid(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session validation failed; signing out");
                state.cached_user = None;
                self.clear_persisted();
                Validation::Terminated(err)
            }
        }
    }
}

/// Owner of the session's user cache. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                identity,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// The persisted bearer token, if any.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .inner
            .store
            .get(TOKEN_KEY)?
            .filter(|t| !t.is_empty()))
    }

    pub fn has_token(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    /// The cached user, without any I/O.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.inner.state().cached_user.clone()
    }

    /// Replaces the cached user after the backend accepted a profile change,
    /// and persists the new snapshot.
    pub fn replace_user(&self, user: SessionUser) -> Result<()> {
        let snapshot = serde_json::to_string(&user)?;
        self.inner.store.set(USER_KEY, &snapshot)?;
        self.inner.state().cached_user = Some(user);
        Ok(())
    }

    /// Mounts a page that needs a signed-in user.
    ///
    /// Returns [`Mount::Redirect`] without touching the network when no token
    /// is stored. Otherwise hydrates the cache and, on the first mount of the
    /// session, spawns the validation request. Must be called within a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Fails only if the token cannot be read from the store.
    pub fn ensure_user(&self) -> Result<Mount> {
        // The token is read under the state lock so that a mount cannot pair
        // a token from before `invalidate` with the generation after it.
        let mut state = self.inner.state();
        let Some(token) = self.token()? else {
            tracing::debug!("no session token; redirecting to sign-in");
            return Ok(Mount::Redirect(Route::SignIn));
        };

        if state.cached_user.is_some() {
            tracing::trace!("user served from session cache");
        } else if let Some(user) = self.inner.read_snapshot() {
            tracing::debug!(user_id = user.id, "hydrated user from snapshot");
            state.cached_user = Some(user);
        }
        let user = state.cached_user.clone();

        if !state.validated_once {
            state.validated_once = true;
            if state.in_flight.is_none() {
                tracing::debug!("validating session token");
                let handle = self.spawn_validation(token, state.generation);
                state.in_flight = Some(handle);
            }
        }

        Ok(Mount::Mounted(MountedSession {
            user,
            validation: state.in_flight.clone(),
        }))
    }

    fn spawn_validation(&self, token: String, generation: u64) -> ValidationHandle {
        let inner = Arc::clone(&self.inner);
        let validation = async move {
            let result = inner.identity.current_user(&token).await;
            inner.finish_validation(generation, result)
        }
        .boxed()
        .shared();

        tokio::spawn(validation.clone());
        ValidationHandle(validation)
    }

    /// Starts a session for a freshly issued token.
    ///
    /// Any previous session is invalidated first, so the next
    /// [`ensure_user`](Self::ensure_user) validates the new token.
    pub fn begin_session(&self, token: &str) -> Result<()> {
        self.invalidate()?;
        self.inner.store.set(TOKEN_KEY, token)?;
        Ok(())
    }

    /// Ends the session (logout).
    ///
    /// Clears token, snapshot and cache, forgets that the session was
    /// validated and drops any pending validation.
    pub fn invalidate(&self) -> Result<()> {
        let mut state = self.inner.state();
        state.cached_user = None;
        state.in_flight = None;
        state.validated_once = false;
        state.generation += 1;
        self.inner.store.remove(TOKEN_KEY)?;
        self.inner.store.remove(USER_KEY)?;
        drop(state);
        tracing::info!("session invalidated");
        Ok(())
    }
}
