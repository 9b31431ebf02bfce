//! Book data model and validation rules.
//!
//! Serialisation contract: a book always travels with its author expanded to
//! a nested `{id, name}` object, never as a bare foreign key. Validation is
//! concentrated in the constructors here so every entry path (single create,
//! update, bulk import) enforces the same constraints.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::author::{Author, AuthorName, AuthorNameValidationError};

/// Earliest publication year accepted by the catalogue.
pub const PUBLISHED_YEAR_MIN: i32 = 1800;

/// Database-generated book identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(i32);

impl BookId {
    /// Wrap a raw database identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for book fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookValidationError {
    /// Title is empty after trimming whitespace.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Genre is not in the allowed set.
    #[error("genre must be one of: Fiction, Non-Fiction, Science, History")]
    UnknownGenre {
        /// The rejected genre value.
        value: String,
    },
    /// Publication year falls outside the accepted range.
    #[error("published_year must be between {PUBLISHED_YEAR_MIN} and {max}, got {year}")]
    YearOutOfRange {
        /// The rejected year.
        year: i32,
        /// Upper bound at validation time (the current UTC year).
        max: i32,
    },
    /// Author name failed validation.
    #[error(transparent)]
    AuthorName(#[from] AuthorNameValidationError),
}

/// Non-empty, whitespace-trimmed book title. Titles are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookTitle(String);

impl BookTitle {
    /// Validate and construct a [`BookTitle`], trimming surrounding
    /// whitespace.
    pub fn new(title: impl AsRef<str>) -> Result<Self, BookValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<BookTitle> for String {
    fn from(value: BookTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for BookTitle {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Closed set of genres the catalogue accepts.
///
/// Stored in the database as the display string, e.g. `"Non-Fiction"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Genre {
    Fiction,
    NonFiction,
    Science,
    History,
}

impl Genre {
    /// The canonical display form, matching the stored column value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fiction => "Fiction",
            Self::NonFiction => "Non-Fiction",
            Self::Science => "Science",
            Self::History => "History",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = BookValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Fiction" => Ok(Self::Fiction),
            "Non-Fiction" => Ok(Self::NonFiction),
            "Science" => Ok(Self::Science),
            "History" => Ok(Self::History),
            other => Err(BookValidationError::UnknownGenre {
                value: other.to_owned(),
            }),
        }
    }
}

impl From<Genre> for String {
    fn from(value: Genre) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for Genre {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Publication year constrained to `[1800, current UTC year]`.
///
/// The upper bound is evaluated at validation time, so the accepted range
/// widens as the clock rolls over; stored values never become invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct PublishedYear(i32);

impl PublishedYear {
    /// Validate and construct a [`PublishedYear`].
    pub fn try_new(year: i32) -> Result<Self, BookValidationError> {
        let max = Utc::now().year();
        if (PUBLISHED_YEAR_MIN..=max).contains(&year) {
            Ok(Self(year))
        } else {
            Err(BookValidationError::YearOutOfRange { year, max })
        }
    }

    /// The raw year value.
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PublishedYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PublishedYear> for i32 {
    fn from(value: PublishedYear) -> Self {
        value.0
    }
}

impl TryFrom<i32> for PublishedYear {
    type Error = BookValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

/// Validated input for creating a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    title: BookTitle,
    published_year: PublishedYear,
    genre: Genre,
    author_name: AuthorName,
}

impl BookDraft {
    /// Validate raw field values into a draft.
    pub fn new(
        title: &str,
        published_year: i32,
        genre: &str,
        author_name: &str,
    ) -> Result<Self, BookValidationError> {
        Ok(Self {
            title: BookTitle::new(title)?,
            published_year: PublishedYear::try_new(published_year)?,
            genre: genre.parse()?,
            author_name: AuthorName::new(author_name)?,
        })
    }

    /// The validated title.
    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    /// The validated publication year.
    pub fn published_year(&self) -> PublishedYear {
        self.published_year
    }

    /// The validated genre.
    pub fn genre(&self) -> Genre {
        self.genre
    }

    /// The validated author name.
    pub fn author_name(&self) -> &AuthorName {
        &self.author_name
    }
}

/// Partial update for a book: absent fields are left unchanged.
///
/// Blank and whitespace-only strings count as absent, mirroring the HTTP
/// contract where an empty field means "do not touch".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    /// Replacement title, if supplied.
    pub title: Option<BookTitle>,
    /// Replacement publication year, if supplied.
    pub published_year: Option<PublishedYear>,
    /// Replacement genre, if supplied.
    pub genre: Option<Genre>,
    /// Replacement author name, if supplied. Re-resolves (creating the
    /// author when needed) and reassigns the reference; never renames the
    /// current author.
    pub author_name: Option<AuthorName>,
}

impl BookPatch {
    /// Validate raw optional field values into a patch.
    pub fn from_parts(
        title: Option<&str>,
        published_year: Option<i32>,
        genre: Option<&str>,
        author_name: Option<&str>,
    ) -> Result<Self, BookValidationError> {
        Ok(Self {
            title: non_blank(title).map(BookTitle::new).transpose()?,
            published_year: published_year.map(PublishedYear::try_new).transpose()?,
            genre: non_blank(genre).map(str::parse).transpose()?,
            author_name: non_blank(author_name).map(AuthorName::new).transpose()?,
        })
    }

    /// True when no field is supplied; such a patch performs no write.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.published_year.is_none()
            && self.genre.is_none()
            && self.author_name.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Shaped book record: the externally visible representation, with the
/// author reference expanded to a nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Database-generated identifier.
    #[schema(value_type = i32)]
    id: BookId,
    /// Book title.
    #[schema(value_type = String, example = "The Dispossessed")]
    title: BookTitle,
    /// Publication year.
    #[schema(value_type = i32, example = 1974)]
    published_year: PublishedYear,
    /// Genre from the allowed set.
    #[schema(value_type = String, example = "Fiction")]
    genre: Genre,
    /// The referenced author, expanded.
    author: Author,
}

impl Book {
    /// Assemble a shaped record.
    pub fn new(
        id: BookId,
        title: BookTitle,
        published_year: PublishedYear,
        genre: Genre,
        author: Author,
    ) -> Self {
        Self {
            id,
            title,
            published_year,
            genre,
            author,
        }
    }

    /// The book's identifier.
    pub fn id(&self) -> BookId {
        self.id
    }

    /// The book's title.
    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    /// The publication year.
    pub fn published_year(&self) -> PublishedYear {
        self.published_year
    }

    /// The genre.
    pub fn genre(&self) -> Genre {
        self.genre
    }

    /// The expanded author.
    pub fn author(&self) -> &Author {
        &self.author
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::author::AuthorId;
    use rstest::rstest;

    #[rstest]
    #[case("Fiction", Genre::Fiction)]
    #[case("Non-Fiction", Genre::NonFiction)]
    #[case("Science", Genre::Science)]
    #[case("History", Genre::History)]
    #[case("  History  ", Genre::History)]
    fn genre_parses_allowed_values(#[case] input: &str, #[case] expected: Genre) {
        assert_eq!(input.parse::<Genre>().expect("valid genre"), expected);
    }

    #[rstest]
    #[case("Fantasy")]
    #[case("fiction")]
    #[case("")]
    fn genre_rejects_values_outside_the_allowed_set(#[case] input: &str) {
        let err = input.parse::<Genre>().expect_err("genre should be rejected");
        assert!(matches!(err, BookValidationError::UnknownGenre { .. }));
    }

    #[test]
    fn genre_display_round_trips() {
        for genre in [Genre::Fiction, Genre::NonFiction, Genre::Science, Genre::History] {
            assert_eq!(genre.as_str().parse::<Genre>().expect("round trip"), genre);
        }
    }

    #[test]
    fn published_year_accepts_bounds() {
        let current = Utc::now().year();
        assert!(PublishedYear::try_new(PUBLISHED_YEAR_MIN).is_ok());
        assert!(PublishedYear::try_new(current).is_ok());
    }

    #[rstest]
    #[case(1799)]
    #[case(0)]
    #[case(-50)]
    fn published_year_rejects_out_of_range_values(#[case] year: i32) {
        let err = PublishedYear::try_new(year).expect_err("year should be rejected");
        assert!(matches!(err, BookValidationError::YearOutOfRange { .. }));
    }

    #[test]
    fn published_year_rejects_the_future() {
        let next_year = Utc::now().year() + 1;
        assert!(PublishedYear::try_new(next_year).is_err());
    }

    #[test]
    fn draft_trims_title_and_author_name() {
        let draft = BookDraft::new("  The Left Hand of Darkness ", 1969, "Fiction", " Ursula K. Le Guin ")
            .expect("valid draft");
        assert_eq!(draft.title().as_str(), "The Left Hand of Darkness");
        assert_eq!(draft.author_name().as_str(), "Ursula K. Le Guin");
    }

    #[rstest]
    #[case("", 1969, "Fiction", "Ursula K. Le Guin")]
    #[case("A Title", 1969, "Fantasy", "Ursula K. Le Guin")]
    #[case("A Title", 1700, "Fiction", "Ursula K. Le Guin")]
    #[case("A Title", 1969, "Fiction", "  ")]
    fn draft_rejects_invalid_fields(
        #[case] title: &str,
        #[case] year: i32,
        #[case] genre: &str,
        #[case] author: &str,
    ) {
        assert!(BookDraft::new(title, year, genre, author).is_err());
    }

    #[test]
    fn patch_treats_blank_strings_as_absent() {
        let patch = BookPatch::from_parts(Some("   "), None, Some(""), None).expect("valid patch");
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_validates_supplied_fields() {
        assert!(BookPatch::from_parts(None, None, Some("Fantasy"), None).is_err());
        assert!(BookPatch::from_parts(None, Some(1799), None, None).is_err());
    }

    #[test]
    fn book_serialises_with_nested_author() {
        let book = Book::new(
            BookId::new(1),
            BookTitle::new("The Dispossessed").expect("valid title"),
            PublishedYear::try_new(1974).expect("valid year"),
            Genre::Fiction,
            Author::new(
                AuthorId::new(3),
                AuthorName::new("Ursula K. Le Guin").expect("valid author name"),
            ),
        );
        let value = serde_json::to_value(&book).expect("serialise book");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "title": "The Dispossessed",
                "published_year": 1974,
                "genre": "Fiction",
                "author": { "id": 3, "name": "Ursula K. Le Guin" }
            })
        );
    }
}
