use secrecy::Secret;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

use crate::api::{self, ApiClient};
use crate::core::{AppError, Notifier, QueryCache};
use crate::models::users::{
    ChangePasswordPayload, LoginPayload, RegisterPayload, UpdateProfilePayload, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// A held credential is being re-verified against the backend.
    Restoring,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub phase: SessionPhase,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.user.is_some()
    }

    pub fn loading(&self) -> bool {
        self.phase == SessionPhase::Restoring
    }
}

/// The one owner of session state. The bearer credential lives in
/// process memory only, inside the shared [`ApiClient`]; user identity
/// is published through a watch channel so dependent views re-render
/// on every change without polling. All writes go through the methods
/// below.
pub struct SessionStore {
    client: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    notifier: Notifier,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(SessionSnapshot {
            user: None,
            phase: SessionPhase::Anonymous,
        });
        Self {
            client,
            cache,
            notifier,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Logs in and publishes the new identity before returning, so a
    /// caller that re-renders on the answer already sees it.
    #[instrument(name = "Session Login", skip(self, payload))]
    pub async fn login(&self, payload: &LoginPayload) -> Result<User, AppError> {
        let auth = api::auth::login(&self.client, payload).await?;
        self.client.set_bearer(Some(Secret::new(auth.token)));
        self.publish(Some(auth.user.clone()), SessionPhase::Authenticated);
        tracing::info!(user_id = %auth.user.id, "session established");
        Ok(auth.user)
    }

    #[instrument(name = "Session Register", skip(self, payload))]
    pub async fn register(&self, payload: &RegisterPayload) -> Result<User, AppError> {
        let auth = api::auth::register(&self.client, payload).await?;
        self.client.set_bearer(Some(Secret::new(auth.token)));
        self.publish(Some(auth.user.clone()), SessionPhase::Authenticated);
        tracing::info!(user_id = %auth.user.id, "account created, session established");
        Ok(auth.user)
    }

    /// Tells the backend goodbye (best effort) and always resets local
    /// state, wiping every cached user-scoped view with it.
    #[instrument(name = "Session Logout", skip(self))]
    pub async fn logout(&self) {
        if self.client.has_bearer() {
            if let Err(error) = api::auth::logout(&self.client).await {
                tracing::warn!(error = %error, "logout request failed, resetting locally anyway");
            }
        }
        self.force_logout();
    }

    /// Re-verifies a credential already held in memory. An invalid or
    /// expired credential deterministically lands on Anonymous; stale
    /// user data never survives the attempt.
    #[instrument(name = "Session Restore", skip(self))]
    pub async fn restore(&self) {
        if !self.client.has_bearer() {
            self.publish(None, SessionPhase::Anonymous);
            return;
        }

        self.publish(self.current_user(), SessionPhase::Restoring);
        match api::auth::verify_session(&self.client).await {
            Ok(user) => self.publish(Some(user), SessionPhase::Authenticated),
            Err(error) => {
                tracing::info!(error = %error, "session restore failed, resetting");
                self.force_logout();
            }
        }
    }

    /// Fetches the profile from the backend and refreshes the cached
    /// identity with it.
    #[instrument(name = "Session Profile", skip(self))]
    pub async fn profile(&self) -> Result<User, AppError> {
        let user = api::auth::get_profile(&self.client)
            .await
            .map_err(|error| self.absorb_unauthorized(error))?;
        self.publish(Some(user.clone()), SessionPhase::Authenticated);
        Ok(user)
    }

    #[instrument(name = "Session Update Profile", skip(self, payload))]
    pub async fn update_profile(&self, payload: &UpdateProfilePayload) -> Result<User, AppError> {
        let user = api::auth::update_profile(&self.client, payload)
            .await
            .map_err(|error| self.absorb_unauthorized(error))?;
        // refresh the cached identity before anyone is told it worked
        self.publish(Some(user.clone()), SessionPhase::Authenticated);
        self.notifier.success("Perfil atualizado com sucesso");
        Ok(user)
    }

    #[instrument(name = "Session Change Password", skip(self, payload))]
    pub async fn change_password(&self, payload: &ChangePasswordPayload) -> Result<(), AppError> {
        api::auth::change_password(&self.client, payload)
            .await
            .map_err(|error| self.absorb_unauthorized(error))?;
        self.notifier.success("Senha alterada com sucesso");
        Ok(())
    }

    /// Drops the credential, the user and every cached user-scoped
    /// view. This is the landing point of every observed 401.
    pub fn force_logout(&self) {
        self.client.set_bearer(None);
        self.cache.clear();
        self.publish(None, SessionPhase::Anonymous);
    }

    /// Funnels a 401 from any authenticated operation into a full
    /// session reset, then hands the error back for the caller to
    /// surface. Never retries.
    pub(crate) fn absorb_unauthorized(&self, error: AppError) -> AppError {
        if error.is_unauthorized() {
            tracing::info!("credential rejected by the backend, resetting session");
            self.force_logout();
        }
        error
    }

    fn publish(&self, user: Option<User>, phase: SessionPhase) {
        self.state.send_replace(SessionSnapshot { user, phase });
    }
}
