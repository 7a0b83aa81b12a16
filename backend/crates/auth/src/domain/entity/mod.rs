//! Domain Entities

pub mod auth_session;
pub mod presence;
pub mod role;
pub mod user_auth;
pub mod user_profile;

pub use auth_session::AuthSession;
pub use presence::PresenceKind;
pub use role::Role;
pub use user_auth::{LoginMetadata, NewUserAuth, UserAuth};
pub use user_profile::{NewUserProfile, UserProfile};
