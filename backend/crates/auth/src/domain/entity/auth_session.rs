//! Auth Session Entity
//!
//! Server-side browser session. The cookie carries a signed reference to
//! `session_id`; the row maps it to the user.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::ids::UserAuthId;

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    /// Owning user
    pub user_id: UserAuthId,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Client IP (optional, for logging)
    pub client_ip: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a new auth session
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(
        user_id: UserAuthId,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id,
            expires_at_ms: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp_millis(),
            client_ip,
            user_agent,
            created_at: now,
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}
