//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the domain services and remain testable without I/O: tests assemble
//! the same state over the in-memory store.

use std::sync::Arc;

use crate::domain::{AccountService, BookImporter, CatalogueService};

use super::token::TokenCodec;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Book CRUD and author resolution.
    pub catalogue: Arc<CatalogueService>,
    /// Bulk file import.
    pub importer: Arc<BookImporter>,
    /// Registration and credential verification.
    pub accounts: Arc<AccountService>,
    /// Access-token issuance and validation.
    pub tokens: Arc<TokenCodec>,
}

impl HttpState {
    /// Bundle the services handlers need.
    pub fn new(
        catalogue: Arc<CatalogueService>,
        importer: Arc<BookImporter>,
        accounts: Arc<AccountService>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        Self {
            catalogue,
            importer,
            accounts,
            tokens,
        }
    }
}
