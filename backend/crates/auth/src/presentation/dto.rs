//! API DTOs (Data Transfer Objects)
//!
//! Field names are snake_case on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::login::AuthenticatedView;
use crate::domain::entity::Role;
use crate::domain::value_object::ids::{RoleId, UserAuthId};

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub id: UserAuthId,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
    pub email: String,
    pub website: String,
    pub login_type: i16,
    pub ip_address: Option<String>,
    pub ip_source: String,
    pub last_login_time: DateTime<Utc>,
    pub role_ids: Vec<RoleId>,
    pub article_like_set: Vec<String>,
    pub comment_like_set: Vec<String>,
    pub token: String,
}

impl From<AuthenticatedView> for LoginResponse {
    fn from(view: AuthenticatedView) -> Self {
        Self {
            id: view.user_id,
            username: view.username,
            nickname: view.nickname,
            avatar: view.avatar,
            intro: view.intro,
            email: view.email,
            website: view.website,
            login_type: view.login_type,
            ip_address: view.ip_address,
            ip_source: view.ip_source,
            last_login_time: view.last_login_at,
            role_ids: view.role_ids,
            article_like_set: view.article_like_set,
            comment_like_set: view.comment_like_set,
            token: view.token,
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// E-mail address the code was sent to
    pub username: String,
    pub password: String,
    pub code: String,
}

/// Role assigned at registration
#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub label: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            label: role.label,
        }
    }
}

// ============================================================================
// Verification Code
// ============================================================================

/// `GET /code` query
#[derive(Debug, Clone, Deserialize)]
pub struct CodeQuery {
    #[serde(alias = "username")]
    pub email: String,
}

// ============================================================================
// Status
// ============================================================================

/// Identity behind the current request
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserAuthId>,
    pub role_ids: Vec<RoleId>,
    /// Whether the online presence marker is set
    pub online: bool,
}

impl StatusResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user_id: None,
            role_ids: Vec::new(),
            online: false,
        }
    }
}
