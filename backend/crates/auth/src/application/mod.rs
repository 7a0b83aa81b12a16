//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod cache_keys;
pub mod config;
pub mod login;
pub mod logout;
pub mod presence;
pub mod register;
pub mod session_cookie;
pub mod session_manager;
pub mod token;
pub mod verification;

// Re-exports
pub use config::{AuthConfig, ProfileDefaults, TokenConfig};
pub use login::{AuthenticatedView, LoginInput, LoginOutput};
pub use presence::PresenceTracker;
pub use register::RegisterInput;
pub use session_manager::{AuthMethod, AuthSessionManager, ClientContext, CurrentAuth};
pub use token::{TokenClaims, TokenIssuer};
pub use verification::VerificationCodeService;
