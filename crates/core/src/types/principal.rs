//! Caller identity type.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Principal`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    /// The input string is empty.
    #[error("principal cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("principal must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the textual encoding.
    #[error("principal contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// An opaque identity reference for an authenticated caller.
///
/// The sync layer never interprets a principal beyond comparing it and using
/// its textual form in cache keys.
///
/// ## Constraints
///
/// - Length: 1-63 characters
/// - ASCII alphanumerics and `-` only
///
/// ## Examples
///
/// ```
/// use recipe_box_core::Principal;
///
/// assert!(Principal::parse("2vxsx-fae").is_ok());
/// assert!(Principal::parse("").is_err());
/// assert!(Principal::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Maximum length of a textual principal.
    pub const MAX_LENGTH: usize = 63;

    /// Parse a `Principal` from its textual form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 63 characters, or
    /// contains anything but ASCII alphanumerics and `-`.
    pub fn parse(s: &str) -> Result<Self, PrincipalError> {
        if s.is_empty() {
            return Err(PrincipalError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PrincipalError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
            return Err(PrincipalError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
