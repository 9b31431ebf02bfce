//! Bulk import of books from uploaded JSON or CSV payloads.
//!
//! Records are processed strictly in input order, one create per record, and
//! the first failure (parse, validation, or storage) aborts the request
//! with that single error. Earlier creates are already committed: the import
//! is not a batch transaction, so callers must treat "import failed" as
//! "partially applied" and reconcile by re-querying.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::{Book, BookDraft};
use super::catalogue::CatalogueService;
use super::error::Error;

/// Result of a successful bulk import.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportOutcome {
    /// Number of records created.
    pub imported: usize,
    /// The created records, shaped, in input order.
    pub books: Vec<Book>,
}

/// Raw record shape for JSON imports. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct JsonBookRecord {
    title: String,
    published_year: i32,
    genre: String,
    author_name: String,
}

/// Raw record shape for CSV imports. The year column arrives as text and is
/// parsed explicitly so a non-numeric value reads as a validation error, not
/// a decoder failure.
#[derive(Debug, Deserialize)]
struct CsvBookRecord {
    title: String,
    published_year: String,
    genre: String,
    author_name: String,
}

fn record_error(index: usize, error: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("record {}: {error}", index + 1))
}

/// Imports uploaded book files through the catalogue service.
#[derive(Clone)]
pub struct BookImporter {
    catalogue: Arc<CatalogueService>,
}

impl BookImporter {
    /// Create an importer delegating creation to the given catalogue.
    pub fn new(catalogue: Arc<CatalogueService>) -> Self {
        Self { catalogue }
    }

    /// Import a payload, dispatching on the uploaded filename's suffix.
    pub async fn import(&self, bytes: &[u8], filename: &str) -> Result<ImportOutcome, Error> {
        if filename.ends_with(".json") {
            self.import_json(bytes).await
        } else if filename.ends_with(".csv") {
            self.import_csv(bytes).await
        } else {
            Err(Error::invalid_request(
                "unsupported file type: upload a .json or .csv file",
            ))
        }
    }

    async fn import_json(&self, bytes: &[u8]) -> Result<ImportOutcome, Error> {
        let payload: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|error| Error::invalid_request(format!("invalid JSON payload: {error}")))?;
        let serde_json::Value::Array(records) = payload else {
            return Err(Error::invalid_request(
                "JSON payload must be an array of book records",
            ));
        };

        let mut books = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let raw: JsonBookRecord = serde_json::from_value(record)
                .map_err(|error| record_error(index, error))?;
            let draft =
                BookDraft::new(&raw.title, raw.published_year, &raw.genre, &raw.author_name)
                    .map_err(|error| record_error(index, error))?;
            books.push(self.catalogue.create_book(draft).await?);
        }
        Ok(ImportOutcome {
            imported: books.len(),
            books,
        })
    }

    async fn import_csv(&self, bytes: &[u8]) -> Result<ImportOutcome, Error> {
        let mut reader = csv::Reader::from_reader(bytes);
        let mut books = Vec::new();
        for (index, row) in reader.deserialize::<CsvBookRecord>().enumerate() {
            let raw = row.map_err(|error| record_error(index, error))?;
            let year: i32 = raw.published_year.trim().parse().map_err(|_| {
                record_error(index, "published_year must be an integer")
            })?;
            let draft = BookDraft::new(&raw.title, year, &raw.genre, &raw.author_name)
                .map_err(|error| record_error(index, error))?;
            books.push(self.catalogue.create_book(draft).await?);
        }
        Ok(ImportOutcome {
            imported: books.len(),
            books,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::outbound::memory::MemoryStore;

    fn importer() -> (BookImporter, MemoryStore) {
        let store = MemoryStore::new();
        let catalogue =
            CatalogueService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (BookImporter::new(Arc::new(catalogue)), store)
    }

    const TWO_VALID_RECORDS: &str = r#"[
        {"title": "The Dispossessed", "published_year": 1974, "genre": "Fiction", "author_name": "Ursula K. Le Guin"},
        {"title": "Cosmos", "published_year": 1980, "genre": "Science", "author_name": "Carl Sagan"}
    ]"#;

    #[tokio::test]
    async fn json_import_creates_every_record_in_order() {
        let (importer, store) = importer();
        let outcome = importer
            .import(TWO_VALID_RECORDS.as_bytes(), "books.json")
            .await
            .expect("import should succeed");

        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.books[0].title().as_str(), "The Dispossessed");
        assert_eq!(outcome.books[1].title().as_str(), "Cosmos");
        assert_eq!(store.book_count(), 2);
    }

    #[tokio::test]
    async fn json_import_rejects_a_non_array_payload() {
        let (importer, store) = importer();
        let err = importer
            .import(br#"{"title": "not a list"}"#, "books.json")
            .await
            .expect_err("object payload should be rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().contains("array"));
        assert_eq!(store.book_count(), 0);
    }

    #[tokio::test]
    async fn json_import_rejects_malformed_json() {
        let (importer, _store) = importer();
        let err = importer
            .import(b"[{", "books.json")
            .await
            .expect_err("broken JSON should be rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn json_import_aborts_on_the_first_invalid_record_keeping_prior_writes() {
        let (importer, store) = importer();
        let payload = r#"[
            {"title": "Dune", "published_year": 1965, "genre": "Fiction", "author_name": "Frank Herbert"},
            {"title": "Bad Genre", "published_year": 2000, "genre": "Fantasy", "author_name": "Nobody"},
            {"title": "Never Reached", "published_year": 2001, "genre": "Fiction", "author_name": "Nobody"}
        ]"#;

        let err = importer
            .import(payload.as_bytes(), "books.json")
            .await
            .expect_err("invalid record should fail the import");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().starts_with("record 2:"));
        // The first record's write is already committed; nothing is rolled
        // back and the third record is never attempted.
        assert_eq!(store.book_count(), 1);
    }

    #[tokio::test]
    async fn json_import_rejects_a_record_with_missing_fields() {
        let (importer, _store) = importer();
        let err = importer
            .import(br#"[{"title": "No Year", "genre": "Fiction", "author_name": "X Y"}]"#, "books.json")
            .await
            .expect_err("missing field should be rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn csv_import_creates_records_from_a_header_driven_table() {
        let (importer, store) = importer();
        let payload = "title,published_year,genre,author_name\n\
                       The Dispossessed,1974,Fiction,Ursula K. Le Guin\n\
                       Cosmos,1980,Science,Carl Sagan\n";
        let outcome = importer
            .import(payload.as_bytes(), "books.csv")
            .await
            .expect("import should succeed");

        assert_eq!(outcome.imported, 2);
        assert_eq!(store.book_count(), 2);
    }

    #[tokio::test]
    async fn csv_import_rejects_a_non_integer_year() {
        let (importer, store) = importer();
        let payload = "title,published_year,genre,author_name\n\
                       Cosmos,nineteen-eighty,Science,Carl Sagan\n";
        let err = importer
            .import(payload.as_bytes(), "books.csv")
            .await
            .expect_err("non-integer year should be rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().contains("integer"));
        assert_eq!(store.book_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_extensions_are_rejected() {
        let (importer, _store) = importer();
        let err = importer
            .import(b"whatever", "books.xlsx")
            .await
            .expect_err("unsupported extension should be rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
