//! PostgreSQL-backed `BookRepository` implementation using Diesel.
//!
//! Reads always join the author row so the domain receives shaped records;
//! the bare foreign key never crosses the port boundary. Filters compose on
//! a boxed query, mirroring the AND semantics of the list contract.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::author::{Author, AuthorId, AuthorName};
use crate::domain::book::{Book, BookId, BookTitle, Genre, PublishedYear};
use crate::domain::catalogue::{BookQuery, SortKey};
use crate::domain::ports::{BookChanges, BookPersistenceError, BookRepository, NewBook};

use super::models::{AuthorRow, BookChangeset, BookRow, NewBookRow};
use super::pool::{DbPool, PoolError};
use super::schema::{authors, books};

/// Diesel-backed implementation of the `BookRepository` port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            BookPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> BookPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            BookPersistenceError::connection("database connection error")
        }
        _ => BookPersistenceError::query("database error"),
    }
}

fn shape(book: BookRow, author: AuthorRow) -> Result<Book, BookPersistenceError> {
    let invalid = |err: &dyn std::fmt::Display| {
        BookPersistenceError::query(format!("stored book row failed validation: {err}"))
    };
    let title = BookTitle::new(&book.title).map_err(|err| invalid(&err))?;
    let year = PublishedYear::try_new(book.published_year).map_err(|err| invalid(&err))?;
    let genre: Genre = book.genre.parse().map_err(|err| invalid(&err))?;
    let author_name = AuthorName::new(&author.name).map_err(|err| invalid(&err))?;
    Ok(Book::new(
        BookId::new(book.id),
        title,
        year,
        genre,
        Author::new(AuthorId::new(author.id), author_name),
    ))
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn insert(&self, book: &NewBook) -> Result<BookId, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = diesel::insert_into(books::table)
            .values(&NewBookRow {
                title: book.title.as_str(),
                published_year: book.published_year.as_i32(),
                genre: book.genre.as_str(),
                author_id: book.author_id.as_i32(),
            })
            .returning(books::id)
            .get_result::<i32>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(BookId::new(id))
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = books::table
            .inner_join(authors::table)
            .filter(books::id.eq(id.as_i32()))
            .select((BookRow::as_select(), AuthorRow::as_select()))
            .first::<(BookRow, AuthorRow)>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(book, author)| shape(book, author)).transpose()
    }

    async fn list(&self, query: &BookQuery) -> Result<Vec<Book>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut select = books::table
            .inner_join(authors::table)
            .select((BookRow::as_select(), AuthorRow::as_select()))
            .into_boxed();

        if let Some(needle) = &query.title_contains {
            select = select.filter(books::title.ilike(format!("%{needle}%")));
        }
        if let Some(genre) = &query.genre {
            select = select.filter(books::genre.eq(genre.clone()));
        }
        if let Some(from) = query.published_year_from {
            select = select.filter(books::published_year.ge(from));
        }
        if let Some(to) = query.published_year_to {
            select = select.filter(books::published_year.le(to));
        }
        select = match query.sort {
            Some(SortKey::Title) => select.order(books::title.asc()),
            Some(SortKey::PublishedYear) => select.order(books::published_year.asc()),
            Some(SortKey::Genre) => select.order(books::genre.asc()),
            None => select,
        };

        let rows = select
            .offset(query.offset)
            .limit(query.limit)
            .load::<(BookRow, AuthorRow)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(book, author)| shape(book, author))
            .collect()
    }

    async fn update(
        &self,
        id: BookId,
        changes: &BookChanges,
    ) -> Result<Option<Book>, BookPersistenceError> {
        // An empty changeset would be a query-builder error; reads suffice.
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let changeset = BookChangeset {
            title: changes.title.as_ref().map(BookTitle::as_str),
            published_year: changes.published_year.map(PublishedYear::as_i32),
            genre: changes.genre.map(Genre::as_str),
            author_id: changes.author_id.map(AuthorId::as_i32),
        };

        let updated_rows = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(books::table.find(id.as_i32()))
                .set(&changeset)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?
        };
        if updated_rows == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: BookId) -> Result<bool, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted_rows = diesel::delete(books::table.find(id.as_i32()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted_rows > 0)
    }
}
