//! Register Use Case
//!
//! Creates an account for the owner of a verified e-mail address.

use platform::client::coarse_location;

use crate::application::session_manager::{AuthSessionManager, ClientContext};
use crate::domain::entity::{NewUserAuth, NewUserProfile, Role, user_auth::LOGIN_TYPE_EMAIL};
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::domain::value_object::{
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    verification_code::VerificationCode,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    /// Login name; the address the verification code was sent to
    pub username: String,
    pub password: String,
    pub code: String,
}

impl<C, K, S, N> AuthSessionManager<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    /// Register a new account and return the role it was given
    ///
    /// The code is consumed before anything else is written. A failure
    /// after consumption requires a fresh code.
    pub async fn register(&self, input: RegisterInput, client: ClientContext) -> AuthResult<Role> {
        let username = UserName::new(&input.username)
            .map_err(|e| AuthError::InvalidRequest(e.to_string()))?;
        let password = RawPassword::new(input.password, &self.config.password_policy)?;
        let code = VerificationCode::parse(&input.code)?;

        self.codes.consume(&username, &code).await?;

        let password = UserPassword::from_raw(&password, self.config.pepper())
            .map_err(|e| AuthError::RegistrationFailed(format!("password hashing: {e}")))?;

        let ip_address = client.ip.map(|ip| ip.to_string());
        let ip_source = coarse_location(client.ip);

        let role = self
            .credentials
            .find_role_by_name(&self.config.default_role_name)
            .await
            .map_err(|e| AuthError::RegistrationFailed(format!("default role lookup: {e}")))?
            .ok_or_else(|| {
                AuthError::RegistrationFailed(format!(
                    "default role '{}' does not exist",
                    self.config.default_role_name
                ))
            })?;

        let defaults = &self.config.profile_defaults;
        let new_user = NewUserAuth {
            username: username.clone(),
            password,
            login_type: LOGIN_TYPE_EMAIL,
            ip_address,
            ip_source: Some(ip_source),
            profile: NewUserProfile {
                nickname: username.original().to_string(),
                avatar: defaults.avatar.clone(),
                intro: defaults.intro.clone(),
                email: username.canonical().to_string(),
                website: defaults.website.clone(),
            },
            role_id: role.id,
        };

        let user_id = self
            .credentials
            .create_user_auth(&new_user)
            .await
            .map_err(|e| match e {
                AuthError::RegistrationFailed(cause) => AuthError::RegistrationFailed(cause),
                other => AuthError::RegistrationFailed(other.to_string()),
            })?;

        tracing::info!(user_id = %user_id, username = %username, role = %role.name, "User registered");
        Ok(role)
    }
}
