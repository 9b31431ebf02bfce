//! User identity model and credential validation.
//!
//! Users exist solely to gate mutating catalogue operations behind a bearer
//! token. Passwords never leave this layer unhashed: the accounts service
//! stores an Argon2id digest and discards the plaintext.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Minimum accepted username length (after trimming).
pub const USERNAME_MIN: usize = 3;
/// Minimum accepted password length at registration.
pub const PASSWORD_MIN: usize = 6;

/// Database-generated user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw database identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for user credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialValidationError {
    /// Username is empty after trimming whitespace.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username is shorter than [`USERNAME_MIN`] characters.
    #[error("username must be at least {USERNAME_MIN} characters")]
    UsernameTooShort,
    /// Password is empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN`] characters.
    #[error("password must be at least {PASSWORD_MIN} characters")]
    PasswordTooShort,
}

/// Unique account name: trimmed, at least [`USERNAME_MIN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`], trimming surrounding
    /// whitespace.
    pub fn new(username: impl AsRef<str>) -> Result<Self, CredentialValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CredentialValidationError::EmptyUsername);
        }
        if trimmed.chars().count() < USERNAME_MIN {
            return Err(CredentialValidationError::UsernameTooShort);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = CredentialValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A registered user as exposed by the API (no secret material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Database-generated identifier.
    #[schema(value_type = i32)]
    id: UserId,
    /// Unique account name.
    #[schema(value_type = String, example = "reader42")]
    username: Username,
}

impl User {
    /// Assemble a user from its identifier and username.
    pub fn new(id: UserId, username: Username) -> Self {
        Self { id, username }
    }

    /// The user's identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// The user's account name.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

/// Validated registration input: a username plus a plaintext password that
/// satisfies the length policy. Consumed by the accounts service, which
/// hashes the password immediately.
#[derive(Clone)]
pub struct SignupDraft {
    username: Username,
    password: String,
}

impl SignupDraft {
    /// Validate raw registration input.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort);
        }
        Ok(Self {
            username: Username::new(username)?,
            password: password.to_owned(),
        })
    }

    /// The validated username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The plaintext password. Only the accounts service should read this.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for SignupDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep the plaintext out of logs.
        f.debug_struct("SignupDraft")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw login input: non-empty username and password, no length policy.
/// Length rules apply at registration only.
#[derive(Clone)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Validate that both parts are present.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CredentialValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    /// The submitted username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The submitted password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("reader42", "reader42")]
    #[case("  reader42  ", "reader42")]
    fn username_trims_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Username::new(input).expect("valid username").as_str(), expected);
    }

    #[rstest]
    #[case("", CredentialValidationError::EmptyUsername)]
    #[case("ab", CredentialValidationError::UsernameTooShort)]
    fn username_rejects_invalid_input(
        #[case] input: &str,
        #[case] expected: CredentialValidationError,
    ) {
        assert_eq!(Username::new(input), Err(expected));
    }

    #[rstest]
    #[case("reader42", "", CredentialValidationError::EmptyPassword)]
    #[case("reader42", "short", CredentialValidationError::PasswordTooShort)]
    #[case("ab", "longenough", CredentialValidationError::UsernameTooShort)]
    fn signup_draft_rejects_invalid_input(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: CredentialValidationError,
    ) {
        let err = SignupDraft::try_from_parts(username, password).expect_err("should be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn debug_output_redacts_passwords() {
        let draft = SignupDraft::try_from_parts("reader42", "hunter22").expect("valid draft");
        assert!(!format!("{draft:?}").contains("hunter22"));
        let creds = LoginCredentials::try_from_parts("reader42", "hunter22").expect("valid creds");
        assert!(!format!("{creds:?}").contains("hunter22"));
    }
}
