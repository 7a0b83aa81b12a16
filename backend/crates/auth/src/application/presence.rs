//! Presence Tracker
//!
//! Two independent markers per user, `online_user:<id>` and
//! `offline_user:<id>`. Existence of a marker means the state holds; no
//! invariant links the two.

use std::sync::Arc;
use std::time::Duration;

use crate::application::cache_keys;
use crate::application::config::AuthConfig;
use crate::domain::entity::PresenceKind;
use crate::domain::repository::CacheStore;
use crate::domain::value_object::ids::UserAuthId;
use crate::error::AuthResult;

/// Presence tracker
pub struct PresenceTracker<K>
where
    K: CacheStore,
{
    cache: Arc<K>,
    online_ttl: Duration,
    offline_ttl: Duration,
}

impl<K> PresenceTracker<K>
where
    K: CacheStore,
{
    pub fn new(cache: Arc<K>, config: &AuthConfig) -> Self {
        Self {
            cache,
            online_ttl: config.online_ttl,
            offline_ttl: config.offline_ttl,
        }
    }

    fn ttl(&self, kind: PresenceKind) -> Duration {
        match kind {
            PresenceKind::Online => self.online_ttl,
            PresenceKind::Offline => self.offline_ttl,
        }
    }

    /// Set (or refresh) a marker
    pub async fn set(&self, kind: PresenceKind, user_id: UserAuthId) -> AuthResult<()> {
        self.cache
            .set(
                &cache_keys::presence(kind, user_id),
                "1",
                Some(self.ttl(kind)),
            )
            .await
    }

    /// Clear a marker; returns whether it was set
    pub async fn clear(&self, kind: PresenceKind, user_id: UserAuthId) -> AuthResult<bool> {
        self.cache.del(&cache_keys::presence(kind, user_id)).await
    }

    pub async fn is_set(&self, kind: PresenceKind, user_id: UserAuthId) -> AuthResult<bool> {
        self.cache.exists(&cache_keys::presence(kind, user_id)).await
    }

    /// Clear a marker, logging instead of failing
    pub(crate) async fn clear_best_effort(&self, kind: PresenceKind, user_id: UserAuthId) {
        if let Err(e) = self.clear(kind, user_id).await {
            tracing::warn!(
                user_id = %user_id,
                marker = %kind,
                error = %e,
                "Failed to clear presence marker"
            );
        }
    }
}
