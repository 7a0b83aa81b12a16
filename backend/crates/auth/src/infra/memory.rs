//! In-memory backends
//!
//! Used when no database is configured and by the tests. Cache expiry runs
//! on the tokio clock, so a paused test runtime controls it.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::entity::{
    AuthSession, LoginMetadata, NewUserAuth, Role, UserAuth, UserProfile,
};
use crate::domain::repository::{
    CacheStore, CompareAndDelete, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::domain::value_object::{
    ids::{RoleId, UserAuthId, UserProfileId},
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Credential Store
// ============================================================================

#[derive(Default)]
struct Credentials {
    next_id: i64,
    users: HashMap<UserAuthId, UserAuth>,
    profiles: HashMap<UserProfileId, UserProfile>,
    roles: Vec<Role>,
    role_links: Vec<(UserAuthId, RoleId)>,
}

impl Credentials {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory credential store
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Credentials>,
}

impl MemoryCredentialStore {
    /// Empty store without any role
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the `admin` and `user` roles
    pub fn seeded() -> Self {
        Self::new()
            .with_role("admin", "Administrator")
            .with_role("user", "Ordinary user")
    }

    pub fn with_role(mut self, name: &str, label: &str) -> Self {
        let inner = self.inner.get_mut();
        let id = RoleId::from_raw(inner.roles.len() as i64 + 1);
        inner.roles.push(Role {
            id,
            name: name.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub async fn user_count(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    pub async fn profile_count(&self) -> usize {
        self.inner.lock().await.profiles.len()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_user_auth_by_username(
        &self,
        username: &UserName,
    ) -> AuthResult<Option<UserAuth>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username.canonical() == username.canonical())
            .cloned())
    }

    async fn find_user_auth_by_id(&self, id: UserAuthId) -> AuthResult<Option<UserAuth>> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn find_user_profile_by_id(
        &self,
        id: UserProfileId,
    ) -> AuthResult<Option<UserProfile>> {
        Ok(self.inner.lock().await.profiles.get(&id).cloned())
    }

    async fn find_role_ids_by_user_id(&self, id: UserAuthId) -> AuthResult<Vec<RoleId>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .role_links
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .map(|(_, role_id)| *role_id)
            .collect())
    }

    async fn find_role_by_name(&self, name: &str) -> AuthResult<Option<Role>> {
        let inner = self.inner.lock().await;
        Ok(inner.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn create_user_auth(&self, new_user: &NewUserAuth) -> AuthResult<UserAuthId> {
        let mut inner = self.inner.lock().await;

        if inner
            .users
            .values()
            .any(|u| u.username.canonical() == new_user.username.canonical())
        {
            return Err(AuthError::RegistrationFailed(
                "username is already taken".to_string(),
            ));
        }
        if !inner.roles.iter().any(|r| r.id == new_user.role_id) {
            return Err(AuthError::Storage(format!(
                "role {} does not exist",
                new_user.role_id
            )));
        }

        let now = Utc::now();
        let profile_id = UserProfileId::from_raw(inner.next_id());
        let user_id = UserAuthId::from_raw(inner.next_id());

        inner.profiles.insert(
            profile_id,
            UserProfile {
                id: profile_id,
                nickname: new_user.profile.nickname.clone(),
                avatar: new_user.profile.avatar.clone(),
                intro: new_user.profile.intro.clone(),
                email: new_user.profile.email.clone(),
                website: new_user.profile.website.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        inner.users.insert(
            user_id,
            UserAuth {
                id: user_id,
                username: new_user.username.clone(),
                password: new_user.password.clone(),
                login_type: new_user.login_type,
                ip_address: new_user.ip_address.clone(),
                ip_source: new_user.ip_source.clone(),
                last_login_at: None,
                profile_id,
                created_at: now,
                updated_at: now,
            },
        );
        inner.role_links.push((user_id, new_user.role_id));

        Ok(user_id)
    }

    async fn update_login_metadata(
        &self,
        id: UserAuthId,
        metadata: &LoginMetadata,
    ) -> AuthResult<()> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AuthError::Storage(format!("user {id} does not exist")))?;

        user.ip_address = metadata.ip_address.clone();
        user.ip_source = Some(metadata.ip_source.clone());
        user.last_login_at = Some(metadata.at);
        user.updated_at = Utc::now();
        Ok(())
    }
}

// ============================================================================
// Cache Store
// ============================================================================

enum CacheValue {
    Text(String),
    Set(BTreeSet<String>),
}

struct CacheEntry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

fn wrong_type(key: &str) -> AuthError {
    AuthError::Storage(format!("cache key {key} holds a value of another type"))
}

/// In-memory cache store
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn entry_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Drop expired entries; returns how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}

/// Live entry under `key`, evicting it first when expired
fn live_entry<'a>(
    entries: &'a mut HashMap<String, CacheEntry>,
    key: &str,
) -> Option<&'a mut CacheEntry> {
    let now = Instant::now();
    if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(None),
            Some(CacheEntry {
                value: CacheValue::Text(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AuthResult<()> {
        // A TTL past the clock's range never expires
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries.lock().await.insert(
            key.to_string(),
            CacheEntry {
                value: CacheValue::Text(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> AuthResult<bool> {
        let mut entries = self.entries.lock().await;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| entry.is_live(Instant::now())))
    }

    async fn exists(&self, key: &str) -> AuthResult<bool> {
        let mut entries = self.entries.lock().await;
        Ok(live_entry(&mut entries, key).is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AuthResult<CompareAndDelete> {
        let mut entries = self.entries.lock().await;
        let outcome = match live_entry(&mut entries, key) {
            None => CompareAndDelete::Missing,
            Some(CacheEntry {
                value: CacheValue::Text(value),
                ..
            }) if value.as_str() == expected => CompareAndDelete::Deleted,
            Some(CacheEntry {
                value: CacheValue::Text(_),
                ..
            }) => CompareAndDelete::Mismatch,
            Some(_) => return Err(wrong_type(key)),
        };

        if outcome == CompareAndDelete::Deleted {
            entries.remove(key);
        }
        Ok(outcome)
    }

    async fn incr(&self, key: &str) -> AuthResult<i64> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            Some(CacheEntry {
                value: CacheValue::Text(value),
                ..
            }) => {
                let next = value
                    .parse::<i64>()
                    .map_err(|_| AuthError::Storage(format!("cache key {key} is not an integer")))?
                    + 1;
                *value = next.to_string();
                Ok(next)
            }
            Some(_) => Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value: CacheValue::Text("1".to_string()),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> AuthResult<bool> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            Some(CacheEntry {
                value: CacheValue::Set(members),
                ..
            }) => Ok(members.insert(member.to_string())),
            Some(_) => Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value: CacheValue::Set(BTreeSet::from([member.to_string()])),
                        expires_at: None,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn smembers(&self, key: &str) -> AuthResult<Vec<String>> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(Vec::new()),
            Some(CacheEntry {
                value: CacheValue::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }
}

// ============================================================================
// Session Repository
// ============================================================================

/// In-memory browser-session store
#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: Mutex<HashMap<Uuid, AuthSession>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Number of stored sessions of a user, expired ones included
    pub async fn count_for_user(&self, user_id: UserAuthId) -> usize {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .count()
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.sessions
            .lock()
            .await
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(&session_id)
            .filter(|s| !s.is_expired())
            .cloned())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.sessions.lock().await.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: UserAuthId) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

// ============================================================================
// Mailbox
// ============================================================================

/// A message accepted by [`MemoryMailbox`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Notification channel that keeps every message in memory
#[derive(Default)]
pub struct MemoryMailbox {
    sent: Mutex<Vec<SentMail>>,
    failing: bool,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mailbox that rejects every message
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    /// Most recent message addressed to `to`
    pub async fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

impl NotificationChannel for MemoryMailbox {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()> {
        if self.failing {
            return Err(AuthError::MailSend("mail relay unavailable".to_string()));
        }
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cache_entries_expire() {
        let cache = MemoryCacheStore::new();
        cache
            .set("k", "v", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
        assert!(!cache.del("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_oversized_ttl_keeps_entry() {
        let cache = MemoryCacheStore::new();
        cache
            .set("k", "v", Some(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_compare_and_delete() {
        let cache = MemoryCacheStore::new();
        assert_eq!(
            cache.compare_and_delete("k", "1").await.unwrap(),
            CompareAndDelete::Missing
        );

        cache.set("k", "1", None).await.unwrap();
        assert_eq!(
            cache.compare_and_delete("k", "2").await.unwrap(),
            CompareAndDelete::Mismatch
        );
        assert!(cache.exists("k").await.unwrap());
        assert_eq!(
            cache.compare_and_delete("k", "1").await.unwrap(),
            CompareAndDelete::Deleted
        );
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_and_sets() {
        let cache = MemoryCacheStore::new();
        assert_eq!(cache.incr("n").await.unwrap(), 1);
        assert_eq!(cache.incr("n").await.unwrap(), 2);
        assert_eq!(cache.get("n").await.unwrap().as_deref(), Some("2"));

        assert!(cache.sadd("s", "b").await.unwrap());
        assert!(cache.sadd("s", "a").await.unwrap());
        assert!(!cache.sadd("s", "a").await.unwrap());
        assert_eq!(cache.smembers("s").await.unwrap(), vec!["a", "b"]);
        assert!(cache.smembers("missing").await.unwrap().is_empty());

        assert!(matches!(cache.get("s").await, Err(AuthError::Storage(_))));
        assert!(matches!(cache.smembers("n").await, Err(AuthError::Storage(_))));
    }

    #[tokio::test]
    async fn test_seeded_roles() {
        let store = MemoryCredentialStore::seeded();
        let user = store.find_role_by_name("user").await.unwrap().unwrap();
        assert_eq!(user.id, RoleId::from_raw(2));
        assert!(store.find_role_by_name("guest").await.unwrap().is_none());
    }
}
