//! Login Use Case
//!
//! Verifies credentials, issues a bearer token and opens a browser session.

use std::fmt;

use chrono::{DateTime, Utc};
use platform::client::coarse_location;

use crate::application::cache_keys;
use crate::application::session_cookie;
use crate::application::session_manager::{AuthSessionManager, ClientContext};
use crate::domain::entity::{AuthSession, LoginMetadata, PresenceKind};
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::domain::value_object::{
    ids::{RoleId, UserAuthId},
    user_name::UserName,
    user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// What a freshly logged-in user sees of themself
#[derive(Clone)]
pub struct AuthenticatedView {
    pub user_id: UserAuthId,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
    pub email: String,
    pub website: String,
    pub login_type: i16,
    pub ip_address: Option<String>,
    pub ip_source: String,
    pub last_login_at: DateTime<Utc>,
    pub role_ids: Vec<RoleId>,
    pub article_like_set: Vec<String>,
    pub comment_like_set: Vec<String>,
    pub token: String,
}

/// Login output
pub struct LoginOutput {
    pub view: AuthenticatedView,
    /// Signed browser-session cookie value
    pub session_cookie: String,
}

// Bearer token and session cookie are credentials
impl fmt::Debug for AuthenticatedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedView")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("role_ids", &self.role_ids)
            .field("last_login_at", &self.last_login_at)
            .field("token", &"******")
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginOutput")
            .field("view", &self.view)
            .field("session_cookie", &"******")
            .finish()
    }
}

impl<C, K, S, N> AuthSessionManager<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    /// Log a user in
    ///
    /// Steps run in order and the first failure aborts the rest. Nothing is
    /// written before the password has been verified.
    pub async fn login(&self, input: LoginInput, client: ClientContext) -> AuthResult<LoginOutput> {
        let username = UserName::new(&input.username)
            .map_err(|e| AuthError::InvalidRequest(e.to_string()))?;
        if input.password.is_empty() {
            return Err(AuthError::InvalidRequest("Password is required".to_string()));
        }

        let user = self
            .credentials
            .find_user_auth_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotExist)?;

        let password = RawPassword::for_login(input.password);
        if !user.password.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let ip_address = client.ip.map(|ip| ip.to_string());
        let ip_source = coarse_location(client.ip);

        let profile = self
            .credentials
            .find_user_profile_by_id(user.profile_id)
            .await?
            .ok_or(AuthError::UserNotExist)?;

        let role_ids = self.credentials.find_role_ids_by_user_id(user.id).await?;

        let article_like_set = self
            .cache
            .smembers(&cache_keys::article_like_set(user.id))
            .await?;
        let comment_like_set = self
            .cache
            .smembers(&cache_keys::comment_like_set(user.id))
            .await?;

        let generation = self.token_generation(user.id).await?;
        let token = self.tokens.issue(user.id, &role_ids, generation)?;

        let metadata = LoginMetadata {
            ip_address: ip_address.clone(),
            ip_source: ip_source.clone(),
            at: Utc::now(),
        };
        self.credentials
            .update_login_metadata(user.id, &metadata)
            .await?;

        let session_ttl = chrono::Duration::from_std(self.config.session_ttl)
            .map_err(|e| AuthError::Internal(format!("session ttl out of range: {e}")))?;
        let session = AuthSession::new(user.id, ip_address.clone(), client.user_agent, session_ttl);
        self.sessions.create(&session).await?;
        let session_cookie = session_cookie::sign(&self.config.session_secret, session.session_id)?;

        self.presence
            .clear_best_effort(PresenceKind::Offline, user.id)
            .await;

        tracing::info!(
            user_id = %user.id,
            username = %username,
            session_id = %session.session_id,
            "User logged in"
        );

        Ok(LoginOutput {
            view: AuthenticatedView {
                user_id: user.id,
                username: user.username.original().to_string(),
                nickname: profile.nickname,
                avatar: profile.avatar,
                intro: profile.intro,
                email: profile.email,
                website: profile.website,
                login_type: user.login_type,
                ip_address,
                ip_source,
                last_login_at: metadata.at,
                role_ids,
                article_like_set,
                comment_like_set,
                token,
            },
            session_cookie,
        })
    }
}
