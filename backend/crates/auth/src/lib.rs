//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, collaborator traits
//! - `application/` - Session manager, verification codes, tokens, presence
//! - `infra/` - Postgres and in-memory stores, mail delivery
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration with an e-mailed 6-digit verification code
//! - Login returning a signed bearer token and setting a session cookie
//! - Logout revoking every session and every earlier token of the user
//! - Online/offline presence markers in the cache
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Verification codes consumed with an atomic compare-and-delete
//! - Tokens carry the user's token generation; logout bumps it
//! - Session cookies are HMAC-signed session IDs

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, TokenConfig};
pub use application::session_manager::{AuthSessionManager, ClientContext, CurrentAuth};
pub use error::{AuthError, AuthResult};
pub use infra::mail::{MailChannel, MailConfig};
pub use infra::pg_cache::PgCacheStore;
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
    pub use crate::infra::mail::MailConfig;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::memory::{
        MemoryCacheStore, MemoryCredentialStore, MemoryMailbox, MemorySessionRepository,
    };
    pub use crate::infra::pg_cache::PgCacheStore;
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}
