//! Mail delivery
//!
//! Verification mails go out through a transactional mail HTTP API. The
//! sender identity travels in an explicit [`MailConfig`] handed to the
//! channel at construction.

use std::time::Duration;

use serde::Serialize;

use crate::domain::repository::NotificationChannel;
use crate::error::{AuthError, AuthResult};

/// Default endpoint of the mail relay API
pub const DEFAULT_MAIL_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// Outbound mail settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Sender address
    pub from: String,
    /// Sender display name
    pub from_name: Option<String>,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_MAIL_API_URL.to_string(),
            api_key: None,
            from: String::new(),
            from_name: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl MailConfig {
    /// Whether real delivery is possible
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
            && !self.from.trim().is_empty()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailBody<'a> {
    sender: MailAddress<'a>,
    to: Vec<MailAddress<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

/// Mail channel posting JSON to the relay API
#[derive(Clone)]
pub struct HttpMailChannel {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailChannel {
    pub fn new(config: MailConfig) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("mail client: {e}")))?;

        Ok(Self { client, config })
    }
}

impl NotificationChannel for HttpMailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AuthError::MailSend("mail API key is not configured".to_string()))?;

        let body = SendMailBody {
            sender: MailAddress {
                email: &self.config.from,
                name: self.config.from_name.as_deref(),
            },
            to: vec![MailAddress {
                email: to,
                name: None,
            }],
            subject,
            html_content: html_body,
        };

        let resp = self
            .client
            .post(&self.config.api_url)
            .header("api-key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::MailSend(format!("mail relay request failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = resp.text().await.unwrap_or_default();
        Err(AuthError::MailSend(format!(
            "mail relay rejected message (status={status}): {detail}"
        )))
    }
}

/// Development channel: logs instead of sending
///
/// Only selected by debug builds. The body carries the live code and is
/// logged at `debug`.
#[derive(Debug, Clone, Default)]
pub struct LogMailChannel;

impl NotificationChannel for LogMailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()> {
        tracing::info!(
            recipient = %to,
            subject = %subject,
            "Mail delivery disabled, message not sent"
        );
        tracing::debug!(recipient = %to, body = %html_body, "Undelivered mail body");
        Ok(())
    }
}

/// Channel picked from configuration
#[derive(Clone)]
pub enum MailChannel {
    Http(HttpMailChannel),
    Log(LogMailChannel),
}

impl MailChannel {
    /// HTTP delivery when configured
    ///
    /// Debug builds fall back to logging; release builds require the relay.
    pub fn from_config(config: MailConfig) -> AuthResult<Self> {
        Self::select(config, cfg!(debug_assertions))
    }

    fn select(config: MailConfig, allow_log: bool) -> AuthResult<Self> {
        if config.is_configured() {
            return Ok(Self::Http(HttpMailChannel::new(config)?));
        }
        if !allow_log {
            return Err(AuthError::Internal(
                "mail relay is not configured (api key and sender required)".to_string(),
            ));
        }
        tracing::warn!("Mail relay not configured, verification mails will not be sent");
        Ok(Self::Log(LogMailChannel))
    }
}

impl NotificationChannel for MailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()> {
        match self {
            Self::Http(channel) => channel.send(to, subject, html_body).await,
            Self::Log(channel) => channel.send(to, subject, html_body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        let mut config = MailConfig::default();
        assert!(!config.is_configured());

        config.api_key = Some("key".to_string());
        assert!(!config.is_configured());

        config.from = "noreply@example.com".to_string();
        assert!(config.is_configured());
    }

    #[test]
    fn test_body_shape() {
        let body = SendMailBody {
            sender: MailAddress {
                email: "noreply@example.com",
                name: Some("Blog"),
            },
            to: vec![MailAddress {
                email: "a@x.com",
                name: None,
            }],
            subject: "Register account",
            html_content: "<b>123456</b>",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sender"]["name"], "Blog");
        assert_eq!(json["to"][0]["email"], "a@x.com");
        assert!(json["to"][0].get("name").is_none());
        assert_eq!(json["htmlContent"], "<b>123456</b>");
    }

    #[tokio::test]
    async fn test_log_fallback_only_when_allowed() {
        let channel = MailChannel::select(MailConfig::default(), true).unwrap();
        assert!(matches!(channel, MailChannel::Log(_)));
        channel.send("a@x.com", "s", "b").await.unwrap();

        let err = MailChannel::select(MailConfig::default(), false)
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn test_configured_relay_is_always_http() {
        let config = MailConfig {
            api_key: Some("key".to_string()),
            from: "noreply@example.com".to_string(),
            ..MailConfig::default()
        };
        assert!(matches!(
            MailChannel::select(config.clone(), false).unwrap(),
            MailChannel::Http(_)
        ));
        assert!(matches!(
            MailChannel::select(config, true).unwrap(),
            MailChannel::Http(_)
        ));
    }
}
