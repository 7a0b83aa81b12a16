//! Logout Use Case

use crate::application::cache_keys;
use crate::application::session_manager::{AuthSessionManager, CurrentAuth};
use crate::domain::entity::PresenceKind;
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
    /// Log the current identity out everywhere
    ///
    /// Deletes every browser session of the user and bumps the token
    /// generation, which retires all tokens issued so far. Succeeds without
    /// effect when nobody is authenticated, so repeating it is harmless.
    pub async fn logout(&self, current: Option<&CurrentAuth>) -> AuthResult<()> {
        let Some(current) = current else {
            return Ok(());
        };
        let user_id = current.user_id;

        let sessions = self.sessions.delete_all_for_user(user_id).await?;
        let generation = self
            .cache
            .incr(&cache_keys::token_generation(user_id))
            .await?;

        self.presence
            .clear_best_effort(PresenceKind::Online, user_id)
            .await;

        tracing::info!(
            user_id = %user_id,
            sessions_removed = sessions,
            token_generation = generation,
            "User logged out"
        );
        Ok(())
    }
}
