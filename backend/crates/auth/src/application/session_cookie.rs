//! Session cookie value
//!
//! Format: `<session uuid>.<base64url(HMAC-SHA256(session uuid))>`

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Build the signed cookie value for a session
pub fn sign(secret: &[u8; 32], session_id: Uuid) -> AuthResult<String> {
    let session_id = session_id.to_string();

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::Internal(format!("HMAC key rejected: {e}")))?;
    mac.update(session_id.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{}.{}", session_id, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify a cookie value and recover the session ID
///
/// Returns `None` for any malformed or forged value.
pub fn verify(secret: &[u8; 32], token: &str) -> Option<Uuid> {
    let (session_id, signature_b64) = token.split_once('.')?;

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(session_id.as_bytes());
    mac.verify_slice(&signature).ok()?;

    session_id.parse().ok()
}
