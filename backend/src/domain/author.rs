//! Author data model.
//!
//! Authors have no endpoint of their own: rows are created implicitly the
//! first time a book names them, and they are never deleted: removing an
//! author's last book leaves the row behind as an orphan.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Database-generated author identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorId(i32);

impl AuthorId {
    /// Wrap a raw database identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors returned when constructing an [`AuthorName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorNameValidationError {
    /// Name is empty after trimming whitespace.
    #[error("author_name must not be empty")]
    Empty,
}

/// Author natural key: a non-empty, whitespace-trimmed name.
///
/// Names are globally unique; two books naming the same author share one
/// author row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorName(String);

impl AuthorName {
    /// Validate and construct an [`AuthorName`], trimming surrounding
    /// whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, AuthorNameValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AuthorNameValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AuthorName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<AuthorName> for String {
    fn from(value: AuthorName) -> Self {
        value.0
    }
}

impl TryFrom<String> for AuthorName {
    type Error = AuthorNameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An author as exposed in shaped book records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    /// Database-generated identifier.
    #[schema(value_type = i32)]
    id: AuthorId,
    /// Unique author name.
    #[schema(value_type = String, example = "Ursula K. Le Guin")]
    name: AuthorName,
}

impl Author {
    /// Assemble an author from its identifier and name.
    pub fn new(id: AuthorId, name: AuthorName) -> Self {
        Self { id, name }
    }

    /// The author's identifier.
    pub fn id(&self) -> AuthorId {
        self.id
    }

    /// The author's name.
    pub fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Jane Doe", "Jane Doe")]
    #[case("  Jane Doe  ", "Jane Doe")]
    fn author_name_trims_whitespace(#[case] input: &str, #[case] expected: &str) {
        let name = AuthorName::new(input).expect("valid author name");
        assert_eq!(name.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn author_name_rejects_blank_input(#[case] input: &str) {
        assert_eq!(
            AuthorName::new(input),
            Err(AuthorNameValidationError::Empty)
        );
    }

    #[test]
    fn author_serialises_with_id_and_name() {
        let author = Author::new(
            AuthorId::new(7),
            AuthorName::new("Jane Doe").expect("valid author name"),
        );
        let value = serde_json::to_value(&author).expect("serialise author");
        assert_eq!(value, serde_json::json!({ "id": 7, "name": "Jane Doe" }));
    }
}
