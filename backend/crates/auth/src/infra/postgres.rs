//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    AuthSession, LoginMetadata, NewUserAuth, Role, UserAuth, UserProfile,
};
use crate::domain::repository::{CredentialStore, SessionRepository};
use crate::domain::value_object::{
    ids::{RoleId, UserAuthId, UserProfileId},
    user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed credential and session store
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Credential Store Implementation
// ============================================================================

impl CredentialStore for PgAuthRepository {
    async fn find_user_auth_by_username(
        &self,
        username: &UserName,
    ) -> AuthResult<Option<UserAuth>> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r#"
            SELECT
                id,
                username,
                password_hash,
                login_type,
                ip_address,
                ip_source,
                last_login_at,
                profile_id,
                created_at,
                updated_at
            FROM user_auths
            WHERE username_canonical = $1
            "#,
        )
        .bind(username.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserAuthRow::into_user_auth).transpose()
    }

    async fn find_user_auth_by_id(&self, id: UserAuthId) -> AuthResult<Option<UserAuth>> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r#"
            SELECT
                id,
                username,
                password_hash,
                login_type,
                ip_address,
                ip_source,
                last_login_at,
                profile_id,
                created_at,
                updated_at
            FROM user_auths
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserAuthRow::into_user_auth).transpose()
    }

    async fn find_user_profile_by_id(
        &self,
        id: UserProfileId,
    ) -> AuthResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT
                id,
                nickname,
                avatar,
                intro,
                email,
                website,
                created_at,
                updated_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserProfileRow::into_profile))
    }

    async fn find_role_ids_by_user_id(&self, id: UserAuthId) -> AuthResult<Vec<RoleId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT role_id FROM user_auth_roles WHERE user_auth_id = $1 ORDER BY role_id",
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(RoleId::from_raw).collect())
    }

    async fn find_role_by_name(&self, name: &str) -> AuthResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name, label FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(RoleRow::into_role))
    }

    async fn create_user_auth(&self, new_user: &NewUserAuth) -> AuthResult<UserAuthId> {
        let mut tx = self.pool.begin().await?;

        let profile_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_profiles (nickname, avatar, intro, email, website)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&new_user.profile.nickname)
        .bind(&new_user.profile.avatar)
        .bind(&new_user.profile.intro)
        .bind(&new_user.profile.email)
        .bind(&new_user.profile.website)
        .fetch_one(&mut *tx)
        .await?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_auths (
                username,
                username_canonical,
                password_hash,
                login_type,
                ip_address,
                ip_source,
                profile_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(new_user.username.original())
        .bind(new_user.username.canonical())
        .bind(new_user.password.as_phc_string())
        .bind(new_user.login_type)
        .bind(&new_user.ip_address)
        .bind(&new_user.ip_source)
        .bind(profile_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::RegistrationFailed("username is already taken".to_string())
            } else {
                AuthError::from(e)
            }
        })?;

        sqlx::query("INSERT INTO user_auth_roles (user_auth_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(new_user.role_id.get())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(UserAuthId::from_raw(user_id))
    }

    async fn update_login_metadata(
        &self,
        id: UserAuthId,
        metadata: &LoginMetadata,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE user_auths SET
                ip_address = $2,
                ip_source = $3,
                last_login_at = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&metadata.ip_address)
        .bind(&metadata.ip_source)
        .bind(metadata.at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                expires_at_ms,
                client_ip,
                user_agent,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.get())
        .bind(session.expires_at_ms)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                expires_at_ms,
                client_ip,
                user_agent,
                created_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: UserAuthId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserAuthRow {
    id: i64,
    username: String,
    password_hash: String,
    login_type: i16,
    ip_address: Option<String>,
    ip_source: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    profile_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserAuthRow {
    fn into_user_auth(self) -> AuthResult<UserAuth> {
        Ok(UserAuth {
            id: UserAuthId::from_raw(self.id),
            username: UserName::from_db(self.username),
            password: UserPassword::from_phc_string(self.password_hash)?,
            login_type: self.login_type,
            ip_address: self.ip_address,
            ip_source: self.ip_source,
            last_login_at: self.last_login_at,
            profile_id: UserProfileId::from_raw(self.profile_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserProfileRow {
    id: i64,
    nickname: String,
    avatar: String,
    intro: String,
    email: String,
    website: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserProfileRow {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            id: UserProfileId::from_raw(self.id),
            nickname: self.nickname,
            avatar: self.avatar,
            intro: self.intro,
            email: self.email,
            website: self.website,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    label: String,
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role {
            id: RoleId::from_raw(self.id),
            name: self.name,
            label: self.label,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: i64,
    expires_at_ms: i64,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: self.session_id,
            user_id: UserAuthId::from_raw(self.user_id),
            expires_at_ms: self.expires_at_ms,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
        }
    }
}
