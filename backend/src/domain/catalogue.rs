//! Catalogue use-cases: author resolution and book CRUD.
//!
//! Every operation is a short sequence of repository calls: resolve the
//! author when a name is supplied, touch exactly one book row, and return
//! the shaped record. There is no caching and no retry; a failed write is
//! reported to the caller as-is.

use std::sync::Arc;

use super::author::{Author, AuthorName};
use super::book::{Book, BookDraft, BookId, BookPatch};
use super::error::Error;
use super::ports::{
    AuthorPersistenceError, AuthorRepository, BookChanges, BookPersistenceError, BookRepository,
    NewBook,
};

/// Page size applied when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Sort keys accepted by the list operation. Ascending only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Order by title.
    Title,
    /// Order by publication year.
    PublishedYear,
    /// Order by genre.
    Genre,
}

impl SortKey {
    /// Parse a sort parameter. Unrecognised keys yield `None` and the list
    /// falls back to storage-natural order. By contract this is silent,
    /// not an error.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "title" => Some(Self::Title),
            "published_year" => Some(Self::PublishedYear),
            "genre" => Some(Self::Genre),
            _ => None,
        }
    }
}

/// Filter, sort, and page window for the list operation.
///
/// Filters combine with logical AND. The genre filter matches the stored
/// string exactly; a value outside the allowed set simply matches nothing
/// rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    /// Case-insensitive substring match on the title.
    pub title_contains: Option<String>,
    /// Exact match on the stored genre string.
    pub genre: Option<String>,
    /// Inclusive lower bound on the publication year.
    pub published_year_from: Option<i32>,
    /// Inclusive upper bound on the publication year.
    pub published_year_to: Option<i32>,
    /// Requested ordering, if any.
    pub sort: Option<SortKey>,
    /// Rows to skip.
    pub offset: i64,
    /// Maximum rows to return.
    pub limit: i64,
}

impl BookQuery {
    /// A query returning the first page with default size and no filters.
    pub fn first_page() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            ..Self::default()
        }
    }
}

/// Catalogue service composing the author resolver with book storage.
#[derive(Clone)]
pub struct CatalogueService {
    authors: Arc<dyn AuthorRepository>,
    books: Arc<dyn BookRepository>,
}

fn map_author_error(error: AuthorPersistenceError) -> Error {
    match error {
        AuthorPersistenceError::Connection { message } => Error::service_unavailable(message),
        AuthorPersistenceError::Query { message } => Error::internal(message),
        AuthorPersistenceError::DuplicateName { name } => {
            Error::conflict(format!("author was created concurrently: {name}"))
        }
    }
}

fn map_book_error(error: BookPersistenceError) -> Error {
    match error {
        BookPersistenceError::Connection { message } => Error::service_unavailable(message),
        BookPersistenceError::Query { message } => Error::internal(message),
    }
}

fn book_not_found() -> Error {
    Error::not_found("book not found")
}

impl CatalogueService {
    /// Create a new service over the given repositories.
    pub fn new(authors: Arc<dyn AuthorRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self { authors, books }
    }

    /// Find an author by exact name, creating the row when absent.
    ///
    /// Not atomic with the caller's subsequent book write: two concurrent
    /// resolutions of the same new name race at the unique constraint, and
    /// the loser surfaces the violation as a conflict error rather than
    /// silently retrying the lookup.
    pub async fn resolve_author(&self, name: &AuthorName) -> Result<Author, Error> {
        if let Some(existing) = self
            .authors
            .find_by_name(name)
            .await
            .map_err(map_author_error)?
        {
            return Ok(existing);
        }
        self.authors.insert(name).await.map_err(map_author_error)
    }

    /// Create a book from a validated draft and return the shaped record.
    pub async fn create_book(&self, draft: BookDraft) -> Result<Book, Error> {
        let author = self.resolve_author(draft.author_name()).await?;
        let new_book = NewBook {
            title: draft.title().clone(),
            published_year: draft.published_year(),
            genre: draft.genre(),
            author_id: author.id(),
        };
        let id = self
            .books
            .insert(&new_book)
            .await
            .map_err(map_book_error)?;
        Ok(Book::new(
            id,
            new_book.title,
            new_book.published_year,
            new_book.genre,
            author,
        ))
    }

    /// Fetch a shaped record by id.
    pub async fn book(&self, id: BookId) -> Result<Book, Error> {
        self.books
            .find_by_id(id)
            .await
            .map_err(map_book_error)?
            .ok_or_else(book_not_found)
    }

    /// List shaped records matching the query.
    pub async fn list_books(&self, query: &BookQuery) -> Result<Vec<Book>, Error> {
        self.books.list(query).await.map_err(map_book_error)
    }

    /// Apply a partial update and return the refreshed shaped record.
    pub async fn update_book(&self, id: BookId, patch: BookPatch) -> Result<Book, Error> {
        // Confirm the row exists before resolving the author, so an update
        // of a missing book cannot leave an orphan author behind.
        if self
            .books
            .find_by_id(id)
            .await
            .map_err(map_book_error)?
            .is_none()
        {
            return Err(book_not_found());
        }

        let author_id = match &patch.author_name {
            Some(name) => Some(self.resolve_author(name).await?.id()),
            None => None,
        };
        let changes = BookChanges {
            title: patch.title,
            published_year: patch.published_year,
            genre: patch.genre,
            author_id,
        };
        self.books
            .update(id, &changes)
            .await
            .map_err(map_book_error)?
            .ok_or_else(book_not_found)
    }

    /// Delete a book. The referenced author persists, even when this was
    /// its last book.
    pub async fn delete_book(&self, id: BookId) -> Result<(), Error> {
        if self
            .books
            .delete(id)
            .await
            .map_err(map_book_error)?
        {
            Ok(())
        } else {
            Err(book_not_found())
        }
    }
}
