//! In-memory adapters backing the repository ports.
//!
//! Used when no database is configured (local development and tests): the
//! server wiring falls back to a shared [`MemoryStore`] so every endpoint
//! stays exercisable without PostgreSQL. Behaviour mirrors the SQL adapters,
//! including unique-constraint rejection on author names and usernames.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::author::{Author, AuthorId, AuthorName};
use crate::domain::book::{Book, BookId, BookTitle, Genre, PublishedYear};
use crate::domain::catalogue::{BookQuery, SortKey};
use crate::domain::ports::{
    AuthorPersistenceError, AuthorRepository, BookChanges, BookPersistenceError, BookRepository,
    NewBook, StoredUser, UserPersistenceError, UserRepository,
};
use crate::domain::user::{User, UserId, Username};

#[derive(Debug, Clone)]
struct BookRow {
    id: BookId,
    title: BookTitle,
    published_year: PublishedYear,
    genre: Genre,
    author_id: AuthorId,
}

#[derive(Debug, Default)]
struct State {
    authors: Vec<Author>,
    books: Vec<BookRow>,
    users: Vec<StoredUser>,
    next_author_id: i32,
    next_book_id: i32,
    next_user_id: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Shared in-memory store implementing every repository port.
///
/// Clones share the same underlying state, so one store can be handed to the
/// catalogue, importer, and accounts services at once.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of author rows currently held.
    pub fn author_count(&self) -> usize {
        self.state().authors.len()
    }

    /// Number of book rows currently held.
    pub fn book_count(&self) -> usize {
        self.state().books.len()
    }
}

fn shape(state: &State, row: &BookRow) -> Result<Book, BookPersistenceError> {
    let author = state
        .authors
        .iter()
        .find(|author| author.id() == row.author_id)
        .cloned()
        .ok_or_else(|| BookPersistenceError::query("book references a missing author row"))?;
    Ok(Book::new(
        row.id,
        row.title.clone(),
        row.published_year,
        row.genre,
        author,
    ))
}

fn matches(row: &BookRow, query: &BookQuery) -> bool {
    if let Some(needle) = &query.title_contains {
        if !row
            .title
            .as_str()
            .to_lowercase()
            .contains(&needle.to_lowercase())
        {
            return false;
        }
    }
    if let Some(genre) = &query.genre {
        if row.genre.as_str() != genre {
            return false;
        }
    }
    if let Some(from) = query.published_year_from {
        if row.published_year.as_i32() < from {
            return false;
        }
    }
    if let Some(to) = query.published_year_to {
        if row.published_year.as_i32() > to {
            return false;
        }
    }
    true
}

#[async_trait]
impl AuthorRepository for MemoryStore {
    async fn find_by_name(
        &self,
        name: &AuthorName,
    ) -> Result<Option<Author>, AuthorPersistenceError> {
        let state = self.state();
        Ok(state
            .authors
            .iter()
            .find(|author| author.name() == name)
            .cloned())
    }

    async fn insert(&self, name: &AuthorName) -> Result<Author, AuthorPersistenceError> {
        let mut state = self.state();
        if state.authors.iter().any(|author| author.name() == name) {
            return Err(AuthorPersistenceError::duplicate_name(name.as_str()));
        }
        let id = AuthorId::new(next_id(&mut state.next_author_id));
        let author = Author::new(id, name.clone());
        state.authors.push(author.clone());
        Ok(author)
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn insert(&self, book: &NewBook) -> Result<BookId, BookPersistenceError> {
        let mut state = self.state();
        if !state
            .authors
            .iter()
            .any(|author| author.id() == book.author_id)
        {
            return Err(BookPersistenceError::query(
                "book insert references a missing author row",
            ));
        }
        let id = BookId::new(next_id(&mut state.next_book_id));
        state.books.push(BookRow {
            id,
            title: book.title.clone(),
            published_year: book.published_year,
            genre: book.genre,
            author_id: book.author_id,
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookPersistenceError> {
        let state = self.state();
        state
            .books
            .iter()
            .find(|row| row.id == id)
            .map(|row| shape(&state, row))
            .transpose()
    }

    async fn list(&self, query: &BookQuery) -> Result<Vec<Book>, BookPersistenceError> {
        let state = self.state();
        let mut rows: Vec<&BookRow> = state
            .books
            .iter()
            .filter(|row| matches(row, query))
            .collect();

        match query.sort {
            Some(SortKey::Title) => rows.sort_by(|a, b| a.title.as_str().cmp(b.title.as_str())),
            Some(SortKey::PublishedYear) => {
                rows.sort_by_key(|row| row.published_year.as_i32());
            }
            Some(SortKey::Genre) => rows.sort_by(|a, b| a.genre.as_str().cmp(b.genre.as_str())),
            None => {}
        }

        let offset = usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit.max(0)).unwrap_or(0);
        rows.into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| shape(&state, row))
            .collect()
    }

    async fn update(
        &self,
        id: BookId,
        changes: &BookChanges,
    ) -> Result<Option<Book>, BookPersistenceError> {
        let mut state = self.state();
        let Some(index) = state.books.iter().position(|row| row.id == id) else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            state.books[index].title = title.clone();
        }
        if let Some(year) = changes.published_year {
            state.books[index].published_year = year;
        }
        if let Some(genre) = changes.genre {
            state.books[index].genre = genre;
        }
        if let Some(author_id) = changes.author_id {
            if !state.authors.iter().any(|author| author.id() == author_id) {
                return Err(BookPersistenceError::query(
                    "book update references a missing author row",
                ));
            }
            state.books[index].author_id = author_id;
        }

        let row = state.books[index].clone();
        shape(&state, &row).map(Some)
    }

    async fn delete(&self, id: BookId) -> Result<bool, BookPersistenceError> {
        let mut state = self.state();
        let before = state.books.len();
        state.books.retain(|row| row.id != id);
        Ok(state.books.len() < before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(
        &self,
        username: &Username,
        hashed_password: &str,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.state();
        if state
            .users
            .iter()
            .any(|stored| stored.user.username() == username)
        {
            return Err(UserPersistenceError::duplicate_username(username.as_str()));
        }
        let id = UserId::new(next_id(&mut state.next_user_id));
        let user = User::new(id, username.clone());
        state.users.push(StoredUser {
            user: user.clone(),
            hashed_password: hashed_password.to_owned(),
        });
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let state = self.state();
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.username().as_str() == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_author_inserts_are_rejected_like_a_unique_constraint() {
        let store = MemoryStore::new();
        let name = AuthorName::new("Jane Doe").expect("valid name");
        AuthorRepository::insert(&store, &name)
            .await
            .expect("first insert");

        let err = AuthorRepository::insert(&store, &name)
            .await
            .expect_err("second insert should be rejected");
        assert!(matches!(err, AuthorPersistenceError::DuplicateName { .. }));
    }

    #[tokio::test]
    async fn duplicate_username_inserts_are_rejected_like_a_unique_constraint() {
        let store = MemoryStore::new();
        let username = Username::new("reader42").expect("valid username");
        UserRepository::insert(&store, &username, "digest")
            .await
            .expect("first insert");

        let err = UserRepository::insert(&store, &username, "digest")
            .await
            .expect_err("second insert should be rejected");
        assert!(matches!(
            err,
            UserPersistenceError::DuplicateUsername { .. }
        ));
    }

    #[tokio::test]
    async fn deleting_an_absent_book_reports_false() {
        let store = MemoryStore::new();
        let deleted = BookRepository::delete(&store, BookId::new(1))
            .await
            .expect("delete");
        assert!(!deleted);
    }
}
