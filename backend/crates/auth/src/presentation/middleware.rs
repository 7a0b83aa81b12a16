//! Auth Middleware
//!
//! `resolve_current_auth` attaches the caller's identity to every request;
//! `require_auth` guards routes that need one.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::client::extract_bearer_token;
use platform::cookie::extract_cookie;

use crate::application::session_manager::CurrentAuth;
use crate::domain::entity::PresenceKind;
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Resolve [`CurrentAuth`] from the bearer token or the session cookie
///
/// Never rejects. An authenticated request refreshes the online presence
/// marker.
pub async fn resolve_current_auth<C, K, S, N>(
    State(state): State<AuthAppState<C, K, S, N>>,
    mut req: Request,
    next: Next,
) -> Response
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let manager = &state.manager;
    let bearer = extract_bearer_token(req.headers());
    let cookie = extract_cookie(req.headers(), &manager.config().session_cookie_name);

    if let Some(auth) = manager
        .authenticate(bearer.as_deref(), cookie.as_deref())
        .await
    {
        if let Err(e) = manager.presence().set(PresenceKind::Online, auth.user_id).await {
            tracing::warn!(user_id = %auth.user_id, error = %e, "Failed to refresh online marker");
        }
        req.extensions_mut().insert(auth);
    }

    next.run(req).await
}

/// Reject requests without a resolved identity
///
/// Must run inside [`resolve_current_auth`].
pub async fn require_auth(req: Request, next: Next) -> Result<Response, AuthError> {
    if req.extensions().get::<CurrentAuth>().is_none() {
        return Err(AuthError::Unauthorized);
    }
    Ok(next.run(req).await)
}
