//! Domain entities, validation, and use-case services.
//!
//! Purpose: define the strongly typed catalogue model shared by the HTTP and
//! persistence layers, and the services that compose repository ports into
//! the operations the API exposes. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.

pub mod accounts;
pub mod author;
pub mod book;
pub mod catalogue;
pub mod error;
pub mod import;
pub mod ports;
pub mod user;

pub use self::accounts::AccountService;
pub use self::author::{Author, AuthorId, AuthorName, AuthorNameValidationError};
pub use self::book::{
    Book, BookDraft, BookId, BookPatch, BookTitle, BookValidationError, Genre, PublishedYear,
};
pub use self::catalogue::{BookQuery, CatalogueService, DEFAULT_PAGE_SIZE, SortKey};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::import::{BookImporter, ImportOutcome};
pub use self::user::{
    CredentialValidationError, LoginCredentials, SignupDraft, User, UserId, Username,
};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
