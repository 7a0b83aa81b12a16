//! Verification Code Service
//!
//! Issues one-time numeric codes by mail and consumes them at registration.
//! At most one live code exists per target; sending again replaces it.

use std::sync::Arc;

use crate::application::cache_keys;
use crate::application::config::AuthConfig;
use crate::domain::repository::{CacheStore, CompareAndDelete, NotificationChannel};
use crate::domain::value_object::{
    email::Email, user_name::UserName, verification_code::VerificationCode,
};
use crate::error::{AuthError, AuthResult};

/// Embedded mail template
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/verification_code.html");

const CODE_PLACEHOLDER: &str = "{{code}}";
const MINUTES_PLACEHOLDER: &str = "{{minutes}}";

/// Fill the template placeholders
pub fn render_template(template: &str, code: &VerificationCode, minutes: u64) -> String {
    template
        .replace(CODE_PLACEHOLDER, code.as_str())
        .replace(MINUTES_PLACEHOLDER, &minutes.to_string())
}

/// Verification code service
pub struct VerificationCodeService<K, N>
where
    K: CacheStore,
    N: NotificationChannel,
{
    cache: Arc<K>,
    channel: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<K, N> VerificationCodeService<K, N>
where
    K: CacheStore,
    N: NotificationChannel,
{
    pub fn new(cache: Arc<K>, channel: Arc<N>, config: Arc<AuthConfig>) -> Self {
        Self {
            cache,
            channel,
            config,
        }
    }

    /// Generate a code, store it and mail it to `target`
    ///
    /// Any failure after input validation is reported as `MailSend`. The
    /// stored code is not rolled back when dispatch fails.
    pub async fn send_code(&self, target: &str) -> AuthResult<()> {
        let email = Email::new(target)?;
        let code = VerificationCode::generate();
        let minutes = self.config.code_expire_minutes;

        let template = self.resolve_template().await?;
        let body = render_template(&template, &code, minutes);

        self.cache
            .set(
                &cache_keys::verification_code(email.as_str()),
                code.as_str(),
                Some(self.config.code_ttl()),
            )
            .await
            .map_err(|e| AuthError::MailSend(format!("storing code failed: {e}")))?;

        self.channel
            .send(email.as_str(), &self.config.mail_subject, &body)
            .await
            .map_err(|e| match e {
                AuthError::MailSend(cause) => AuthError::MailSend(cause),
                other => AuthError::MailSend(other.to_string()),
            })?;

        tracing::info!(recipient = %email, expire_minutes = minutes, "Verification code sent");
        Ok(())
    }

    /// Consume the pending code of `target` if `submitted` matches it
    ///
    /// A match deletes the code atomically, so one code registers at most
    /// one account. A mismatch leaves it in place.
    pub async fn consume(&self, target: &UserName, submitted: &VerificationCode) -> AuthResult<()> {
        let key = cache_keys::verification_code(target.canonical());

        match self.cache.compare_and_delete(&key, submitted.as_str()).await? {
            CompareAndDelete::Deleted => Ok(()),
            CompareAndDelete::Missing => Err(AuthError::VerificationCodeExpired),
            CompareAndDelete::Mismatch => Err(AuthError::VerificationCodeMismatch),
        }
    }

    async fn resolve_template(&self) -> AuthResult<String> {
        let template = match &self.config.email_template_path {
            None => DEFAULT_TEMPLATE.to_string(),
            Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                AuthError::MailSend(format!(
                    "reading template {} failed: {e}",
                    path.display()
                ))
            })?,
        };

        if !template.contains(CODE_PLACEHOLDER) {
            return Err(AuthError::MailSend(format!(
                "template has no {CODE_PLACEHOLDER} placeholder"
            )));
        }
        Ok(template)
    }
}
