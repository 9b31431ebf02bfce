//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation. Regenerate
//! with `diesel print-schema` after changing migrations.

diesel::table! {
    /// Authors, keyed implicitly by book operations.
    authors (id) {
        /// Primary key (serial).
        id -> Int4,
        /// Unique author name.
        name -> Varchar,
    }
}

diesel::table! {
    /// Book catalogue rows.
    books (id) {
        /// Primary key (serial).
        id -> Int4,
        /// Book title; not unique.
        title -> Varchar,
        /// Publication year.
        published_year -> Int4,
        /// Genre display string from the allowed set.
        genre -> Varchar,
        /// Foreign key into `authors`.
        author_id -> Int4,
    }
}

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key (serial).
        id -> Int4,
        /// Unique account name.
        username -> Varchar,
        /// Argon2id password digest.
        hashed_password -> Varchar,
    }
}

diesel::joinable!(books -> authors (author_id));

diesel::allow_tables_to_appear_in_same_query!(authors, books, users);
