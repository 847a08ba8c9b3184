use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use super::store::{SessionStore, StoreError, StoredSession};
use crate::api::{AuthApi, UserProfile};

const GENERIC_LOGIN_ERROR: &str = "Login failed. Please try again.";

/// An active session. `verified` is false when the profile came from the
/// local snapshot because the server could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Validating,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Still working out whether a session exists.
    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Uninitialized | SessionState::Validating)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Login refused or failed; the message is meant for the user.
    #[error("{0}")]
    Login(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the persisted session. Every read-modify-write of the store happens
/// under `store`'s lock; observers follow the state through [`subscribe`].
///
/// [`subscribe`]: SessionManager::subscribe
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Mutex<Arc<dyn SessionStore>>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            api,
            store: Mutex::new(store),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn publish(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Reconcile the persisted session with the server.
    ///
    /// A stored token is checked against `/auth/me`. An explicit rejection
    /// clears the store. Any other failure falls back to the cached profile
    /// when one is readable, and clears the store otherwise.
    pub async fn bootstrap(&self) -> Result<SessionState, SessionError> {
        let store = self.store.lock().await;
        self.publish(SessionState::Validating);

        match self.reconcile(store.as_ref()).await {
            Ok(state) => {
                self.publish(state.clone());
                Ok(state)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session bootstrap failed");
                self.publish(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    async fn reconcile(&self, store: &dyn SessionStore) -> Result<SessionState, SessionError> {
        let stored = match store.load().await {
            Ok(stored) => stored,
            Err(StoreError::Format(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable session document");
                store.clear().await?;
                return Ok(SessionState::Unauthenticated);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(token) = stored.token.clone() else {
            if stored.user.is_some() {
                tracing::info!("Discarding user snapshot without a token");
                store.clear().await?;
            }
            return Ok(SessionState::Unauthenticated);
        };

        match self.api.me(&token).await {
            Ok(user) => {
                store.save(&StoredSession::new(&token, &user)?).await?;
                tracing::info!(user_id = %user.id, "Session verified");
                Ok(SessionState::Authenticated(Session {
                    token,
                    user,
                    verified: true,
                }))
            }
            Err(e) if e.is_rejection() => {
                tracing::info!(error = %e, "Stored session rejected by server");
                store.clear().await?;
                Ok(SessionState::Unauthenticated)
            }
            Err(e) => match stored.cached_user() {
                Some(user) => {
                    tracing::warn!(
                        error = %e,
                        user_id = %user.id,
                        "Session verification unavailable, using cached profile"
                    );
                    Ok(SessionState::Authenticated(Session {
                        token,
                        user,
                        verified: false,
                    }))
                }
                None => {
                    tracing::warn!(
                        error = %e,
                        "Session verification unavailable and no cached profile"
                    );
                    store.clear().await?;
                    Ok(SessionState::Unauthenticated)
                }
            },
        }
    }

    /// Exchange credentials for a session. On failure nothing is written and
    /// the state is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let store = self.store.lock().await;

        let response = self.api.login(email, password).await.map_err(|e| {
            tracing::info!(error = %e, "Login failed");
            SessionError::Login(
                e.server_message()
                    .unwrap_or(GENERIC_LOGIN_ERROR)
                    .to_string(),
            )
        })?;

        store
            .save(&StoredSession::new(&response.token, &response.user)?)
            .await?;

        let session = Session {
            token: response.token,
            user: response.user,
            verified: true,
        };
        tracing::info!(user_id = %session.user.id, "Logged in");
        self.publish(SessionState::Authenticated(session.clone()));

        Ok(session)
    }

    /// Drop the session locally. Idempotent; the server is not contacted.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let store = self.store.lock().await;
        self.publish(SessionState::Unauthenticated);
        store.clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }
}
