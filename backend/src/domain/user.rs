//! User identity data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the identity value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was empty after trimming.
    EmptyUsername,
    /// Username shorter than the minimum length.
    UsernameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Username longer than the maximum length.
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Username contains characters outside the allowed set.
    UsernameInvalidCharacters,
    /// Email address failed structural validation.
    InvalidEmail,
    /// Email address longer than the maximum length.
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Role string did not match a known role.
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::UnknownRole => write!(f, "role must be user, moderator, or admin"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 50;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 100;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9._-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Structural check only; deliverability is not this layer's concern.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique account name used as the caller identity across the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = username.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }

        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact address, unique per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role controlling moderation capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account; may list books, request exchanges, and review.
    #[default]
    User,
    /// May approve reviews in addition to regular capabilities.
    Moderator,
    /// Full administrative access.
    Admin,
}

impl Role {
    /// Whether this role may moderate reviews.
    #[must_use]
    pub const fn can_moderate(self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }

    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Registered account.
///
/// ## Invariants
/// - `username` and `email` are unique across the identity store; uniqueness
///   is enforced by the store, not this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    username: Username,
    email: EmailAddress,
    role: Role,
    enabled: bool,
}

impl User {
    /// Build a user from validated components.
    #[must_use]
    pub const fn new(
        id: Uuid,
        username: Username,
        email: EmailAddress,
        role: Role,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            username,
            email,
            role,
            enabled,
        }
    }

    /// Stable account identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Unique account name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Moderation role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether the account may act at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("bob")]
    #[case("alice.smith")]
    #[case("user_42")]
    fn accepts_valid_usernames(#[case] raw: &str) {
        let username = Username::new(raw).expect("valid username");
        assert_eq!(username.as_ref(), raw);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("ab", UserValidationError::UsernameTooShort { min: USERNAME_MIN })]
    #[case("has space", UserValidationError::UsernameInvalidCharacters)]
    #[case("emoji🦀", UserValidationError::UsernameInvalidCharacters)]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
        let error = Username::new(raw).expect_err("invalid username");
        assert_eq!(error, expected);
    }

    #[rstest]
    #[case("alice@example.com")]
    #[case("a.b+tag@sub.example.org")]
    fn accepts_valid_emails(#[case] raw: &str) {
        assert!(EmailAddress::new(raw).is_ok());
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("missing@tld")]
    #[case("two@@example.com")]
    fn rejects_invalid_emails(#[case] raw: &str) {
        let error = EmailAddress::new(raw).expect_err("invalid email");
        assert_eq!(error, UserValidationError::InvalidEmail);
    }

    #[rstest]
    #[case(Role::User, false)]
    #[case(Role::Moderator, true)]
    #[case(Role::Admin, true)]
    fn moderation_follows_role(#[case] role: Role, #[case] expected: bool) {
        assert_eq!(role.can_moderate(), expected);
    }

    #[rstest]
    fn role_round_trips_through_storage_string() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            let parsed: Role = role.as_str().parse().expect("known role");
            assert_eq!(parsed, role);
        }
    }
}
