//! User Auth Entity
//!
//! Identity record: login name, password hash and login metadata.
//! Always paired with exactly one [`UserProfile`](super::UserProfile).

use chrono::{DateTime, Utc};

use super::user_profile::NewUserProfile;
use crate::domain::value_object::{
    ids::{RoleId, UserAuthId, UserProfileId},
    user_name::UserName,
    user_password::UserPassword,
};

/// Login type of accounts registered with an email verification code
pub const LOGIN_TYPE_EMAIL: i16 = 1;

/// Stored identity record
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub id: UserAuthId,
    /// Globally unique login name
    pub username: UserName,
    pub password: UserPassword,
    pub login_type: i16,
    /// Last known client IP
    pub ip_address: Option<String>,
    /// Location label derived from `ip_address`
    pub ip_source: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub profile_id: UserProfileId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account being registered
///
/// The store creates the identity record, its profile and the role link
/// as one atomic unit.
#[derive(Debug, Clone)]
pub struct NewUserAuth {
    pub username: UserName,
    pub password: UserPassword,
    pub login_type: i16,
    pub ip_address: Option<String>,
    pub ip_source: Option<String>,
    pub profile: NewUserProfile,
    pub role_id: RoleId,
}

/// Login metadata written on every successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginMetadata {
    pub ip_address: Option<String>,
    pub ip_source: String,
    pub at: DateTime<Utc>,
}
