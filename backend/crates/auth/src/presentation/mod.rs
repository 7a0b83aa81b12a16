//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, router, and middleware.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extractors::{ApiJson, ApiQuery, MaybeCurrentAuth};
pub use handlers::AuthAppState;
pub use middleware::{require_auth, resolve_current_auth};
pub use router::auth_router;
