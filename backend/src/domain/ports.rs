//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters,
//! here the relational store behind the catalogue and the user table. Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use super::author::{Author, AuthorId, AuthorName};
use super::book::{Book, BookId, BookTitle, Genre, PublishedYear};
use super::catalogue::BookQuery;
use super::user::{User, Username};

/// Errors surfaced by the author persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("author persistence connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or write failures that bubble up from the adapter.
    #[error("author persistence query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// The unique name constraint rejected an insert, typically a
    /// concurrent resolution of the same new name.
    #[error("author name already exists: {name}")]
    DuplicateName {
        /// The contested author name.
        name: String,
    },
}

impl AuthorPersistenceError {
    /// Helper for connection-related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-constraint violations on the name column.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }
}

/// Errors surfaced by the book persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("book persistence connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or write failures that bubble up from the adapter.
    #[error("book persistence query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl BookPersistenceError {
    /// Helper for connection-related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the user persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("user persistence connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or write failures that bubble up from the adapter.
    #[error("user persistence query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// The unique username constraint rejected an insert.
    #[error("username already exists: {username}")]
    DuplicateUsername {
        /// The contested username.
        username: String,
    },
}

impl UserPersistenceError {
    /// Helper for connection-related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-constraint violations on the username column.
    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername {
            username: username.into(),
        }
    }
}

/// Fully resolved insert payload for a book row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    /// Validated title.
    pub title: BookTitle,
    /// Validated publication year.
    pub published_year: PublishedYear,
    /// Validated genre.
    pub genre: Genre,
    /// Identifier of the already-resolved author row.
    pub author_id: AuthorId,
}

/// Fully resolved column changes for a book row; `None` leaves the column
/// untouched. Author names are resolved to an id before reaching the
/// adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    /// Replacement title, if any.
    pub title: Option<BookTitle>,
    /// Replacement publication year, if any.
    pub published_year: Option<PublishedYear>,
    /// Replacement genre, if any.
    pub genre: Option<Genre>,
    /// Replacement author reference, if any.
    pub author_id: Option<AuthorId>,
}

impl BookChanges {
    /// True when no column would change; adapters skip the write entirely.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.published_year.is_none()
            && self.genre.is_none()
            && self.author_id.is_none()
    }
}

/// A user row including its password digest, for credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    /// The public identity.
    pub user: User,
    /// Argon2id digest of the password.
    pub hashed_password: String,
}

/// Author lookup and creation, keyed by the unique name.
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Find an author by exact name match.
    async fn find_by_name(
        &self,
        name: &AuthorName,
    ) -> Result<Option<Author>, AuthorPersistenceError>;

    /// Insert a new author row. A concurrent insert of the same name must
    /// surface as [`AuthorPersistenceError::DuplicateName`], never retried
    /// inside the adapter.
    async fn insert(&self, name: &AuthorName) -> Result<Author, AuthorPersistenceError>;
}

/// Book row storage returning shaped records (author expanded).
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book row and return its generated identifier.
    async fn insert(&self, book: &NewBook) -> Result<BookId, BookPersistenceError>;

    /// Fetch a shaped record by id.
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookPersistenceError>;

    /// List shaped records matching the filter, sort, and page window.
    async fn list(&self, query: &BookQuery) -> Result<Vec<Book>, BookPersistenceError>;

    /// Apply column changes and return the updated shaped record, or `None`
    /// when the row does not exist. An empty change set reads without
    /// writing.
    async fn update(
        &self,
        id: BookId,
        changes: &BookChanges,
    ) -> Result<Option<Book>, BookPersistenceError>;

    /// Delete the row; `false` when it did not exist. The referenced author
    /// is left untouched.
    async fn delete(&self, id: BookId) -> Result<bool, BookPersistenceError>;
}

/// User account storage keyed by the unique username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with a pre-hashed password.
    async fn insert(
        &self,
        username: &Username,
        hashed_password: &str,
    ) -> Result<User, UserPersistenceError>;

    /// Fetch a user (with digest) by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError>;
}
