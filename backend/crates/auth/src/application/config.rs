//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::path::PathBuf;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::PasswordPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Bearer token settings
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HS256 signing secret
    pub secret: Vec<u8>,
    /// `iss` claim written and required
    pub issuer: String,
    /// Token lifetime
    pub expire: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: vec![0u8; 32],
            issuer: "blog-auth".to_string(),
            expire: Duration::from_secs(24 * 3600),
        }
    }
}

/// Profile values given to newly registered users
#[derive(Debug, Clone)]
pub struct ProfileDefaults {
    pub avatar: String,
    pub intro: String,
    pub website: String,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            avatar: "https://cdn.hahacode.cn/config/superadmin_avatar.jpg".to_string(),
            intro: "This user is lazy and left nothing behind".to_string(),
            website: "https://www.hahacode.cn".to_string(),
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Browser session lifetime
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Bearer token settings
    pub token: TokenConfig,
    /// Verification code lifetime in minutes
    pub code_expire_minutes: u64,
    /// Subject of the verification mail
    pub mail_subject: String,
    /// Verification mail template file; the embedded template when `None`
    pub email_template_path: Option<PathBuf>,
    /// Lifetime of the online presence marker
    pub online_ttl: Duration,
    /// Lifetime of the offline presence marker
    pub offline_ttl: Duration,
    /// Role assigned at registration, resolved by name
    pub default_role_name: String,
    pub profile_defaults: ProfileDefaults,
    /// Length bounds for passwords chosen at registration
    pub password_policy: PasswordPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "auth_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            token: TokenConfig::default(),
            code_expire_minutes: 5,
            mail_subject: "Register account".to_string(),
            email_template_path: None,
            online_ttl: Duration::from_secs(10 * 60),
            offline_ttl: Duration::from_secs(24 * 3600),
            default_role_name: "user".to_string(),
            profile_defaults: ProfileDefaults::default(),
            password_policy: PasswordPolicy::new(4, 20),
        }
    }
}

impl AuthConfig {
    /// Create config with random session and token secrets (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut session_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut session_secret);
        let mut token_secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut token_secret);
        Self {
            session_secret,
            token: TokenConfig {
                secret: token_secret,
                ..TokenConfig::default()
            },
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Verification code lifetime
    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_expire_minutes.saturating_mul(60))
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie settings of the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }
}
