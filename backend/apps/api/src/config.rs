//! Server configuration from the environment

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::config::{AuthConfig, MailConfig, TokenConfig};
use axum::http::HeaderValue;
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

/// Everything the server needs at start-up
pub struct AppConfig {
    /// Postgres URL; in-memory backends when unset
    pub database_url: Option<String>,
    pub listen_addr: SocketAddr,
    pub frontend_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = var("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("LISTEN_ADDR is not a socket address")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        Ok(Self {
            database_url: var("DATABASE_URL"),
            listen_addr,
            frontend_origins,
            auth: auth_config()?,
            mail: mail_config()?,
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    // Debug builds fall back to random secrets; release builds require them
    let base = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    let session_secret = match secret("AUTH_SESSION_SECRET")? {
        Some(bytes) => <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| anyhow::anyhow!("AUTH_SESSION_SECRET must decode to 32 bytes"))?,
        None if cfg!(debug_assertions) => base.session_secret,
        None => bail!("AUTH_SESSION_SECRET must be set in production"),
    };

    let token_secret = match secret("AUTH_TOKEN_SECRET")? {
        Some(bytes) if bytes.len() < 32 => bail!("AUTH_TOKEN_SECRET must be at least 32 bytes"),
        Some(bytes) => bytes,
        None if cfg!(debug_assertions) => base.token.secret.clone(),
        None => bail!("AUTH_TOKEN_SECRET must be set in production"),
    };

    let token = TokenConfig {
        secret: token_secret,
        issuer: var("AUTH_TOKEN_ISSUER").unwrap_or_else(|| base.token.issuer.clone()),
        expire: match parsed::<u64>("AUTH_TOKEN_EXPIRE_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => base.token.expire,
        },
    };

    Ok(AuthConfig {
        session_secret,
        token,
        password_pepper: secret("AUTH_PASSWORD_PEPPER")?,
        code_expire_minutes: parsed("AUTH_CODE_EXPIRE_MINUTES")?
            .unwrap_or(base.code_expire_minutes),
        email_template_path: var("AUTH_EMAIL_TEMPLATE").map(PathBuf::from),
        ..base
    })
}

fn mail_config() -> anyhow::Result<MailConfig> {
    let base = MailConfig::default();
    let config = MailConfig {
        api_url: var("MAIL_API_URL").unwrap_or(base.api_url),
        api_key: var("MAIL_API_KEY"),
        from: var("MAIL_FROM").unwrap_or_default(),
        from_name: var("MAIL_FROM_NAME"),
        timeout: match parsed::<u64>("MAIL_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => base.timeout,
        },
    };

    // Debug builds may run without a relay; release builds must deliver
    if !config.is_configured() && !cfg!(debug_assertions) {
        bail!("MAIL_API_KEY and MAIL_FROM must be set in production");
    }
    Ok(config)
}

/// Non-empty, trimmed environment variable
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|v| v.parse::<T>())
        .transpose()
        .with_context(|| format!("{name} is not valid"))
}

/// Base64-encoded secret
fn secret(name: &str) -> anyhow::Result<Option<Vec<u8>>> {
    var(name)
        .map(|v| general_purpose::STANDARD.decode(v))
        .transpose()
        .with_context(|| format!("{name} is not valid base64"))
}
