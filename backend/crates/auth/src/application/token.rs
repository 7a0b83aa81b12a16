//! Bearer token issuing and verification
//!
//! HS256 JWT binding a user, its role set and the user's token generation.
//! Logout bumps the generation, which retires every earlier token.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::application::config::TokenConfig;
use crate::domain::value_object::ids::{RoleId, UserAuthId};
use crate::error::{AuthError, AuthResult};

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user auth ID)
    pub sub: String,
    pub role_ids: Vec<RoleId>,
    /// Token generation of the user at issue time
    #[serde(rename = "gen")]
    pub generation: i64,
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl TokenClaims {
    pub fn user_id(&self) -> AuthResult<UserAuthId> {
        self.sub
            .parse()
            .map_err(|_| AuthError::Unauthorized)
    }
}

/// Signs and verifies bearer tokens with a single static secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expire_secs: u64,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            issuer: config.issuer.clone(),
            expire_secs: config.expire.as_secs(),
        }
    }

    /// Issue a token for `user_id`
    pub fn issue(
        &self,
        user_id: UserAuthId,
        role_ids: &[RoleId],
        generation: i64,
    ) -> AuthResult<String> {
        let now = u64::try_from(chrono::Utc::now().timestamp())
            .map_err(|_| AuthError::TokenCreation("system clock before Unix epoch".to_string()))?;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            role_ids: role_ids.to_vec(),
            generation,
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.expire_secs),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verify signature, issuer and expiry (no leeway)
    pub fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                AuthError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn issuer(secret: &[u8]) -> TokenIssuer {
        TokenIssuer::new(&TokenConfig {
            secret: secret.to_vec(),
            issuer: "test-issuer".to_string(),
            expire: Duration::from_secs(3600),
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer(b"secret");
        let roles = [RoleId::from_raw(2), RoleId::from_raw(5)];
        let token = tokens.issue(UserAuthId::from_raw(9), &roles, 3).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserAuthId::from_raw(9));
        assert_eq!(claims.role_ids, roles.to_vec());
        assert_eq!(claims.generation, 3);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_rejects_wrong_secret_and_issuer() {
        let token = issuer(b"secret").issue(UserAuthId::from_raw(1), &[], 0).unwrap();
        assert!(matches!(
            issuer(b"other").verify(&token),
            Err(AuthError::Unauthorized)
        ));

        let foreign = TokenIssuer::new(&TokenConfig {
            secret: b"secret".to_vec(),
            issuer: "someone-else".to_string(),
            expire: Duration::from_secs(3600),
        });
        let token = foreign.issue(UserAuthId::from_raw(1), &[], 0).unwrap();
        assert!(issuer(b"secret").verify(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let tokens = issuer(b"secret");
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = TokenClaims {
            sub: "1".to_string(),
            role_ids: vec![],
            generation: 0,
            iss: "test-issuer".to_string(),
            iat: now - 120,
            exp: now - 60,
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &tokens.encoding_key).unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_oversized_expiry_saturates() {
        let tokens = TokenIssuer::new(&TokenConfig {
            secret: b"secret".to_vec(),
            issuer: "test-issuer".to_string(),
            expire: Duration::from_secs(u64::MAX),
        });
        let token = tokens.issue(UserAuthId::from_raw(1), &[], 0).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().exp, u64::MAX);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(issuer(b"secret").verify("not.a.jwt").is_err());
        assert!(issuer(b"secret").verify("").is_err());
    }

    #[test]
    fn test_claims_use_short_generation_name() {
        let claims = TokenClaims {
            sub: "1".to_string(),
            role_ids: vec![RoleId::from_raw(1)],
            generation: 4,
            iss: "i".to_string(),
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["gen"], 4);
        assert_eq!(json["role_ids"], serde_json::json!([1]));
    }
}
