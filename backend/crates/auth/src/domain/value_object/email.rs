//! Email Value Object
//!
//! Represents a validated email address: the target of a verification code.
//! Format validation only; control of the address is proven by the code.

use super::user_name::USER_NAME_MAX_LENGTH;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum email length
///
/// The address becomes the user name on registration, so it shares that limit.
const EMAIL_MAX_LENGTH: usize = USER_NAME_MAX_LENGTH;

/// Maximum local part length (per RFC 5321)
const LOCAL_PART_MAX_LENGTH: usize = 64;

/// Email address value object (lower-cased)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl AsRef<str>) -> AppResult<Self> {
        let email = email.as_ref().trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Invalid email format"));
        }

        Ok(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty()
            || local.len() > LOCAL_PART_MAX_LENGTH
            || !local.chars().all(|c| c.is_ascii_graphic() && c != '@')
        {
            return false;
        }

        domain.contains('.')
            && domain
                .split('.')
                .all(|label| Self::is_valid_domain_label(label))
    }

    /// Domain labels: ASCII alphanumerics and inner hyphens
    fn is_valid_domain_label(label: &str) -> bool {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the domain part of the email
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, d)| d).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("a@x.com").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@mail-host.example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("userexample.com").is_err());
        assert!(Email::new("user@").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("user@@example.com").is_err());
        assert!(Email::new("user@example").is_err());
        assert!(Email::new("user@example..com").is_err());
        assert!(Email::new("user@-example.com").is_err());
        assert!(Email::new("us er@example.com").is_err());
        assert!(Email::new("ünï@example.com").is_err());
    }

    #[test]
    fn test_email_case_normalization() {
        let email = Email::new(" User@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_email_length_matches_user_name_limit() {
        let fits = format!("{}@x.com", "a".repeat(EMAIL_MAX_LENGTH - 6));
        assert!(Email::new(&fits).is_ok());
        assert!(crate::domain::value_object::user_name::UserName::new(&fits).is_ok());

        let too_long = format!("{}@x.com", "a".repeat(EMAIL_MAX_LENGTH - 5));
        assert!(Email::new(&too_long).is_err());
    }

    #[test]
    fn test_email_error_is_bad_request() {
        let err = Email::new("nope").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
