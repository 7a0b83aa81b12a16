//! Auth Router

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::session_manager::AuthSessionManager;
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::resolve_current_auth;

/// Create the Auth router for any set of backends
///
/// Every route runs behind [`resolve_current_auth`].
pub fn auth_router<C, K, S, N>(manager: Arc<AuthSessionManager<C, K, S, N>>) -> Router
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let state = AuthAppState { manager };

    Router::new()
        .route("/login", post(handlers::login::<C, K, S, N>))
        .route("/register", post(handlers::register::<C, K, S, N>))
        .route("/logout", post(handlers::logout::<C, K, S, N>))
        .route("/code", get(handlers::send_code::<C, K, S, N>))
        .route("/status", get(handlers::status::<C, K, S, N>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_current_auth::<C, K, S, N>,
        ))
        .with_state(state)
}
