//! Request extractors

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::request::Parts;
use platform::client::{extract_client_ip, extract_user_agent};

use crate::application::session_manager::{ClientContext, CurrentAuth};
use crate::error::AuthError;

/// JSON body whose rejection is an `InvalidRequest` envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection is an `InvalidRequest` envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AuthError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AuthError {
    fn from(rejection: QueryRejection) -> Self {
        AuthError::InvalidRequest(rejection.body_text())
    }
}

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Ok(ClientContext {
            ip: extract_client_ip(&parts.headers, direct_ip),
            user_agent: extract_user_agent(&parts.headers),
        })
    }
}

/// Identity resolved by [`resolve_current_auth`](super::middleware::resolve_current_auth), if any
#[derive(Debug, Clone)]
pub struct MaybeCurrentAuth(pub Option<CurrentAuth>);

impl<S> FromRequestParts<S> for MaybeCurrentAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentAuth>().cloned()))
    }
}
