//! Verification Code Value Object
//!
//! One-time numeric code proving control of an email address.

use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Number of digits in a verification code
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Exactly [`VERIFICATION_CODE_LENGTH`] ASCII digits
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Generate a fresh random code
    pub fn generate() -> Self {
        Self(platform::crypto::random_digits(VERIFICATION_CODE_LENGTH))
    }

    /// Parse a submitted code
    pub fn parse(input: &str) -> AuthResult<Self> {
        let input = input.trim();
        if input.len() != VERIFICATION_CODE_LENGTH || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::InvalidRequest(format!(
                "Verification code must be {VERIFICATION_CODE_LENGTH} digits"
            )));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are secrets while pending
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerificationCode").field(&"******").finish()
    }
}
