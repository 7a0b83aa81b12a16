//! Repository Traits
//!
//! Interfaces of the external collaborators. Implementations live in the
//! infrastructure layer.

use std::time::Duration;

use uuid::Uuid;

use crate::domain::entity::{
    AuthSession, LoginMetadata, NewUserAuth, Role, UserAuth, UserProfile,
};
use crate::domain::value_object::{
    ids::{RoleId, UserAuthId, UserProfileId},
    user_name::UserName,
};
use crate::error::AuthResult;

/// Credential store: identity records, profiles and roles
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Find identity record by login name
    async fn find_user_auth_by_username(&self, username: &UserName)
    -> AuthResult<Option<UserAuth>>;

    /// Find identity record by ID
    async fn find_user_auth_by_id(&self, id: UserAuthId) -> AuthResult<Option<UserAuth>>;

    /// Find profile by ID
    async fn find_user_profile_by_id(&self, id: UserProfileId)
    -> AuthResult<Option<UserProfile>>;

    /// IDs of the roles linked to a user
    async fn find_role_ids_by_user_id(&self, id: UserAuthId) -> AuthResult<Vec<RoleId>>;

    /// Find role by its unique name
    async fn find_role_by_name(&self, name: &str) -> AuthResult<Option<Role>>;

    /// Create identity record, profile and role link atomically
    ///
    /// Either all three exist afterwards or none does. A taken login name
    /// yields `AuthError::RegistrationFailed`.
    async fn create_user_auth(&self, new_user: &NewUserAuth) -> AuthResult<UserAuthId>;

    /// Record IP, location and time of a successful login
    async fn update_login_metadata(
        &self,
        id: UserAuthId,
        metadata: &LoginMetadata,
    ) -> AuthResult<()>;
}

/// Outcome of [`CacheStore::compare_and_delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareAndDelete {
    /// No live value under the key
    Missing,
    /// A live value exists but differs; it was left in place
    Mismatch,
    /// The value matched and was removed
    Deleted,
}

/// Key-value cache with expiry and string sets
///
/// Expired entries behave exactly like absent ones.
#[trait_variant::make(CacheStore: Send)]
pub trait LocalCacheStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Store `value`, replacing any previous one; `None` never expires
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AuthResult<()>;

    /// Remove a key; returns whether a live value existed
    async fn del(&self, key: &str) -> AuthResult<bool>;

    async fn exists(&self, key: &str) -> AuthResult<bool>;

    /// Atomically delete `key` if its live value equals `expected`
    async fn compare_and_delete(&self, key: &str, expected: &str) -> AuthResult<CompareAndDelete>;

    /// Atomically increment an integer counter (absent = 0); returns the new value
    async fn incr(&self, key: &str) -> AuthResult<i64>;

    /// Add a member to a set; returns whether it was newly added
    async fn sadd(&self, key: &str, member: &str) -> AuthResult<bool>;

    /// All members of a set (empty when absent)
    async fn smembers(&self, key: &str) -> AuthResult<Vec<String>>;
}

/// Browser session store
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find an unexpired session by ID
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>>;

    /// Delete a session
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete every session of a user
    async fn delete_all_for_user(&self, user_id: UserAuthId) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Outbound notification transport
#[trait_variant::make(NotificationChannel: Send)]
pub trait LocalNotificationChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()>;
}
