//! HTTP Handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse, Response};
use kernel::response::ApiResponse;
use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::session_manager::{AuthSessionManager, ClientContext};
use crate::application::{LoginInput, RegisterInput};
use crate::domain::entity::PresenceKind;
use crate::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CodeQuery, LoginRequest, LoginResponse, RegisterRequest, RoleResponse, StatusResponse,
};
use crate::presentation::extractors::{ApiJson, ApiQuery, MaybeCurrentAuth};

/// Shared state for auth handlers
pub struct AuthAppState<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    pub manager: Arc<AuthSessionManager<C, K, S, N>>,
}

// Derive would require the backends themselves to be Clone
impl<C, K, S, N> Clone for AuthAppState<C, K, S, N>
where
    C: CredentialStore,
    K: CacheStore,
    S: SessionRepository,
    N: NotificationChannel,
{
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/login
pub async fn login<C, K, S, N>(
    State(state): State<AuthAppState<C, K, S, N>>,
    client: ClientContext,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let input = LoginInput {
        username: req.username,
        password: req.password,
    };

    let output = state.manager.login(input, client).await?;

    let cookie = set_cookie_header(&state.manager.config().session_cookie(), &output.session_cookie)
        .ok_or_else(|| AuthError::Internal("session cookie is not a valid header".to_string()))?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::success(LoginResponse::from(output.view)),
    ))
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/register
pub async fn register<C, K, S, N>(
    State(state): State<AuthAppState<C, K, S, N>>,
    client: ClientContext,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AuthResult<ApiResponse<RoleResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let input = RegisterInput {
        username: req.username,
        password: req.password,
        code: req.code,
    };

    let role = state.manager.register(input, client).await?;

    Ok(ApiResponse::success(RoleResponse::from(role)))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/logout
///
/// The session cookie is cleared whatever the outcome.
pub async fn logout<C, K, S, N>(
    State(state): State<AuthAppState<C, K, S, N>>,
    MaybeCurrentAuth(current): MaybeCurrentAuth,
) -> Response
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let mut response = match state.manager.logout(current.as_ref()).await {
        Ok(()) => ApiResponse::ok().into_response(),
        Err(e) => e.into_response(),
    };

    if let Some(cookie) = delete_cookie_header(&state.manager.config().session_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

// ============================================================================
// Verification Code
// ============================================================================

/// GET /api/code?email=
pub async fn send_code<C, K, S, N>(
    State(state): State<AuthAppState<C, K, S, N>>,
    ApiQuery(query): ApiQuery<CodeQuery>,
) -> AuthResult<ApiResponse<()>>
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    state.manager.codes().send_code(&query.email).await?;

    Ok(ApiResponse::ok())
}

// ============================================================================
// Status
// ============================================================================

/// GET /api/status
pub async fn status<C, K, S, N>(
    State(state): State<AuthAppState<C, K, S, N>>,
    MaybeCurrentAuth(current): MaybeCurrentAuth,
) -> ApiResponse<StatusResponse>
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let Some(auth) = current else {
        return ApiResponse::success(StatusResponse::anonymous());
    };

    let online = state
        .manager
        .presence()
        .is_set(PresenceKind::Online, auth.user_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = %auth.user_id, error = %e, "Presence lookup failed");
            false
        });

    ApiResponse::success(StatusResponse {
        authenticated: true,
        user_id: Some(auth.user_id),
        role_ids: auth.role_ids,
        online,
    })
}
