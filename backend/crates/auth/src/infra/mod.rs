//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod mail;
pub mod memory;
pub mod pg_cache;
pub mod postgres;

pub use mail::{HttpMailChannel, LogMailChannel, MailChannel, MailConfig};
pub use memory::{
    MemoryCacheStore, MemoryCredentialStore, MemoryMailbox, MemorySessionRepository, SentMail,
};
pub use pg_cache::PgCacheStore;
pub use postgres::PgAuthRepository;
