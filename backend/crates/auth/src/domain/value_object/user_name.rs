//! User Name Value Object
//!
//! ユーザー名はログイン ID であり、登録時には認証コードの送信先
//! （メールアドレス）と同じ値になる。
//!
//! ## 設計方針
//! - NFKC正規化 → trim → 検証 の順で処理
//! - 大文字入力は受け付けるが、canonical（正規形）は小文字
//! - canonical を一意性チェック・保存・認証コードのキーに使用
//!
//! ## 不変条件
//! - 長さ: 1〜50文字（正規化後）
//! - 空白・制御文字を含まない

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains whitespace
    ContainsWhitespace,

    /// User name contains a control character
    ControlCharacter { position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::ContainsWhitespace => write!(f, "User name cannot contain whitespace"),
            Self::ControlCharacter { position } => {
                write!(f, "User name contains a control character at position {position}")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated, normalized user name
///
/// # Storage
/// - `original`: The user's input (trimmed, NFKC normalized, preserves case)
/// - `canonical`: Lowercase form, the stored login name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        Self::validate(&original)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Create from a stored login name (assumes already validated)
    pub fn from_db(stored: impl Into<String>) -> Self {
        let original = stored.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    /// Get the original user name (preserves case)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Get the canonical (lowercase) user name
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Alias for canonical()
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    fn validate(normalized: &str) -> Result<(), UserNameError> {
        if normalized.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = normalized.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some(position) = normalized.chars().position(char::is_control) {
            return Err(UserNameError::ControlCharacter { position });
        }

        if normalized.chars().any(char::is_whitespace) {
            return Err(UserNameError::ContainsWhitespace);
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.canonical
    }
}

// ============================================================================
// Tests
// ============================================================================
