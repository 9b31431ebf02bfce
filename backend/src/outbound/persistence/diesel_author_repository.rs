//! PostgreSQL-backed `AuthorRepository` implementation using Diesel.
//!
//! The unique index on `authors.name` is the arbiter of the find-or-create
//! race: a losing concurrent insert surfaces as a duplicate-name error and is
//! never retried here.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::author::{Author, AuthorId, AuthorName};
use crate::domain::ports::{AuthorPersistenceError, AuthorRepository};

use super::models::{AuthorRow, NewAuthorRow};
use super::pool::{DbPool, PoolError};
use super::schema::authors;

/// Diesel-backed implementation of the `AuthorRepository` port.
#[derive(Clone)]
pub struct DieselAuthorRepository {
    pool: DbPool,
}

impl DieselAuthorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthorPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AuthorPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AuthorPersistenceError {
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
            AuthorPersistenceError::connection("database connection error")
        }
        _ => AuthorPersistenceError::query("database error"),
    }
}

fn row_to_author(row: AuthorRow) -> Result<Author, AuthorPersistenceError> {
    let name = AuthorName::new(&row.name).map_err(|err| {
        AuthorPersistenceError::query(format!("stored author row failed validation: {err}"))
    })?;
    Ok(Author::new(AuthorId::new(row.id), name))
}

#[async_trait]
impl AuthorRepository for DieselAuthorRepository {
    async fn find_by_name(
        &self,
        name: &AuthorName,
    ) -> Result<Option<Author>, AuthorPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = authors::table
            .filter(authors::name.eq(name.as_str()))
            .select(AuthorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_author).transpose()
    }

    async fn insert(&self, name: &AuthorName) -> Result<Author, AuthorPersistenceError> {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(authors::table)
            .values(&NewAuthorRow {
                name: name.as_str(),
            })
            .returning(AuthorRow::as_returning())
            .get_result::<AuthorRow>(&mut conn)
            .await
            .map_err(|error| match error {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AuthorPersistenceError::duplicate_name(name.as_str())
                }
                other => map_diesel_error(other),
            })?;
        row_to_author(row)
    }
}
