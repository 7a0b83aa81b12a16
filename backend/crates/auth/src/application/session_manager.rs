//! Auth Session Manager
//!
//! Orchestrates login, registration, logout and identity resolution across
//! the credential store, the cache, the browser-session store and the
//! verification code service.
//!
//! A logged-in user has two independent representations, both revocable by
//! user id:
//! - browser sessions (rows in the session store, referenced by a signed cookie)
//! - bearer tokens (valid while their `gen` claim equals the user's token
//!   generation counter in the cache)
//!
//! Logout clears both. They are otherwise eventually consistent: a token may
//! outlive a session that expired on its own and vice versa.

use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use crate::application::cache_keys;
use crate::application::config::AuthConfig;
use crate::application::presence::PresenceTracker;
use crate::application::token::TokenIssuer;
use crate::application::verification::VerificationCodeService;
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::domain::value_object::ids::{RoleId, UserAuthId};
use crate::error::{AuthError, AuthResult};

/// Network origin of a request
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

/// How the current identity was established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    BearerToken,
    Session(Uuid),
}

/// Authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAuth {
    pub user_id: UserAuthId,
    pub role_ids: Vec<RoleId>,
    pub method: AuthMethod,
}

/// Auth session manager
pub struct AuthSessionManager<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    pub(crate) credentials: Arc<C>,
    pub(crate) cache: Arc<K>,
    pub(crate) sessions: Arc<S>,
    pub(crate) codes: VerificationCodeService<K, N>,
    pub(crate) tokens: TokenIssuer,
    pub(crate) presence: PresenceTracker<K>,
    pub(crate) config: Arc<AuthConfig>,
}

impl<C, K, S, N> AuthSessionManager<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    pub fn new(
        credentials: Arc<C>,
        cache: Arc<K>,
        sessions: Arc<S>,
        channel: Arc<N>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            codes: VerificationCodeService::new(cache.clone(), channel, config.clone()),
            tokens: TokenIssuer::new(&config.token),
            presence: PresenceTracker::new(cache.clone(), &config),
            credentials,
            cache,
            sessions,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn codes(&self) -> &VerificationCodeService<K, N> {
        &self.codes
    }

    pub fn presence(&self) -> &PresenceTracker<K> {
        &self.presence
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Current token generation of a user (absent counter = 0)
    pub(crate) async fn token_generation(&self, user_id: UserAuthId) -> AuthResult<i64> {
        match self.cache.get(&cache_keys::token_generation(user_id)).await? {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|_| {
                AuthError::Storage(format!("corrupt token generation for user {user_id}"))
            }),
        }
    }
}
