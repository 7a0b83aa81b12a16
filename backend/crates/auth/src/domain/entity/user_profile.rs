//! User Profile Entity
//!
//! Public-facing profile, created together with its [`UserAuth`](super::UserAuth).

use chrono::{DateTime, Utc};

use crate::domain::value_object::ids::UserProfileId;

/// Stored user profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserProfileId,
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
    pub email: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields of an account being registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserProfile {
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
    pub email: String,
    pub website: String,
}
