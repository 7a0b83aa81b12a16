//! Identity resolution
//!
//! Turns a bearer token or a session cookie into a [`CurrentAuth`].

use uuid::Uuid;

use crate::application::session_cookie;
use crate::application::session_manager::{AuthMethod, AuthSessionManager, CurrentAuth};
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::error::AuthResult;

impl<C, K, S, N> AuthSessionManager<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    /// Resolve the identity behind a request
    ///
    /// A valid bearer token wins over the session cookie. Store failures
    /// are logged and treated as "not authenticated".
    pub async fn authenticate(
        &self,
        bearer: Option<&str>,
        cookie: Option<&str>,
    ) -> Option<CurrentAuth> {
        if let Some(token) = bearer {
            match self.authenticate_token(token).await {
                Ok(Some(auth)) => return Some(auth),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Bearer token lookup failed"),
            }
        }

        let session_id = session_cookie::verify(&self.config.session_secret, cookie?)?;
        match self.authenticate_session(session_id).await {
            Ok(auth) => auth,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Session lookup failed");
                None
            }
        }
    }

    async fn authenticate_token(&self, token: &str) -> AuthResult<Option<CurrentAuth>> {
        let Ok(claims) = self.tokens.verify(token) else {
            return Ok(None);
        };
        let Ok(user_id) = claims.user_id() else {
            return Ok(None);
        };

        if claims.generation != self.token_generation(user_id).await? {
            tracing::debug!(user_id = %user_id, "Rejected token of a previous generation");
            return Ok(None);
        }

        Ok(Some(CurrentAuth {
            user_id,
            role_ids: claims.role_ids,
            method: AuthMethod::BearerToken,
        }))
    }

    async fn authenticate_session(&self, session_id: Uuid) -> AuthResult<Option<CurrentAuth>> {
        let Some(session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(None);
        };
        if session.is_expired() {
            return Ok(None);
        }

        let Some(user) = self.credentials.find_user_auth_by_id(session.user_id).await? else {
            return Ok(None);
        };
        let role_ids = self.credentials.find_role_ids_by_user_id(user.id).await?;

        Ok(Some(CurrentAuth {
            user_id: user.id,
            role_ids,
            method: AuthMethod::Session(session_id),
        }))
    }
}
