//! Book API handlers.
//!
//! ```text
//! POST   /books/             create (bearer token required)
//! GET    /books/             list with filters, sort, pagination
//! GET    /books/{id}         fetch one
//! PUT    /books/{id}         partial update (bearer token required)
//! DELETE /books/{id}         delete (bearer token required)
//! POST   /books/bulk-import  multipart file upload (bearer token required)
//! ```

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Book, BookDraft, BookId, BookPatch, BookQuery, BookValidationError, DEFAULT_PAGE_SIZE, Error,
    ImportOutcome, SortKey,
};

use super::ApiResult;
use super::identity::Identity;
use super::state::HttpState;

/// Create request body: all fields required.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBookRequest {
    /// Book title.
    pub title: String,
    /// Publication year in `[1800, current year]`.
    pub published_year: i32,
    /// One of `Fiction`, `Non-Fiction`, `Science`, `History`.
    pub genre: String,
    /// Author name; the author row is created on first use.
    pub author_name: String,
}

/// Update request body: every field optional, blank strings ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBookRequest {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement publication year.
    pub published_year: Option<i32>,
    /// Replacement genre.
    pub genre: Option<String>,
    /// Replacement author name (reassigns, never renames).
    pub author_name: Option<String>,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListBooksQuery {
    /// Case-insensitive substring filter on the title.
    pub title: Option<String>,
    /// Exact genre filter.
    pub genre: Option<String>,
    /// Inclusive lower bound on the publication year.
    pub published_year_from: Option<i32>,
    /// Inclusive upper bound on the publication year.
    pub published_year_to: Option<i32>,
    /// One of `title`, `published_year`, `genre`; anything else is ignored.
    pub sort_by: Option<String>,
    /// 1-based page number, default 1.
    pub page: Option<i64>,
    /// Page size, default 10.
    pub page_size: Option<i64>,
}

fn map_validation_error(err: BookValidationError) -> Error {
    let field = match err {
        BookValidationError::EmptyTitle => "title",
        BookValidationError::UnknownGenre { .. } => "genre",
        BookValidationError::YearOutOfRange { .. } => "published_year",
        BookValidationError::AuthorName(_) => "author_name",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

impl TryFrom<CreateBookRequest> for BookDraft {
    type Error = Error;

    fn try_from(value: CreateBookRequest) -> Result<Self, Self::Error> {
        Self::new(
            &value.title,
            value.published_year,
            &value.genre,
            &value.author_name,
        )
        .map_err(map_validation_error)
    }
}

impl TryFrom<UpdateBookRequest> for BookPatch {
    type Error = Error;

    fn try_from(value: UpdateBookRequest) -> Result<Self, Self::Error> {
        Self::from_parts(
            value.title.as_deref(),
            value.published_year,
            value.genre.as_deref(),
            value.author_name.as_deref(),
        )
        .map_err(map_validation_error)
    }
}

impl TryFrom<ListBooksQuery> for BookQuery {
    type Error = Error;

    fn try_from(value: ListBooksQuery) -> Result<Self, Self::Error> {
        let page = value.page.unwrap_or(1);
        if page < 1 {
            return Err(Error::invalid_request("page must be at least 1"));
        }
        let page_size = value.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size < 1 {
            return Err(Error::invalid_request("page_size must be at least 1"));
        }

        Ok(Self {
            title_contains: value.title.filter(|t| !t.is_empty()),
            genre: value.genre.filter(|g| !g.is_empty()),
            published_year_from: value.published_year_from,
            published_year_to: value.published_year_to,
            sort: value.sort_by.as_deref().and_then(SortKey::parse),
            offset: (page - 1) * page_size,
            limit: page_size,
        })
    }
}

/// Create a book. The author is resolved by name, creating the row when
/// absent, before the book row is written.
#[utoipa::path(
    post,
    path = "/books/",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Created book, shaped", body = Book),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Author creation race lost", body = Error)
    ),
    security(("bearer_token" = [])),
    tags = ["books"],
    operation_id = "createBook"
)]
#[post("/")]
pub async fn create_book(
    _identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<CreateBookRequest>,
) -> ApiResult<web::Json<Book>> {
    let draft = BookDraft::try_from(payload.into_inner())?;
    let book = state.catalogue.create_book(draft).await?;
    Ok(web::Json(book))
}

/// List books with optional filters, ascending sort, and pagination.
///
/// No total count is returned; clients detect the last page by requesting
/// one past it.
#[utoipa::path(
    get,
    path = "/books/",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Matching books", body = [Book]),
        (status = 400, description = "Invalid pagination", body = Error)
    ),
    tags = ["books"],
    operation_id = "listBooks"
)]
#[get("/")]
pub async fn list_books(
    state: web::Data<HttpState>,
    query: web::Query<ListBooksQuery>,
) -> ApiResult<web::Json<Vec<Book>>> {
    let query = BookQuery::try_from(query.into_inner())?;
    let books = state.catalogue.list_books(&query).await?;
    Ok(web::Json(books))
}

/// Fetch a single book by id.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = i32, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book, shaped", body = Book),
        (status = 404, description = "No such book", body = Error)
    ),
    tags = ["books"],
    operation_id = "getBook"
)]
#[get("/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Book>> {
    let book = state.catalogue.book(BookId::new(path.into_inner())).await?;
    Ok(web::Json(book))
}

/// Partially update a book; absent or blank fields are left unchanged.
#[utoipa::path(
    put,
    path = "/books/{id}",
    params(("id" = i32, Path, description = "Book identifier")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated book, shaped", body = Book),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such book", body = Error)
    ),
    security(("bearer_token" = [])),
    tags = ["books"],
    operation_id = "updateBook"
)]
#[put("/{id}")]
pub async fn update_book(
    _identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateBookRequest>,
) -> ApiResult<web::Json<Book>> {
    let patch = BookPatch::try_from(payload.into_inner())?;
    let book = state
        .catalogue
        .update_book(BookId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(book))
}

/// Delete a book. The referenced author persists.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = i32, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Deletion confirmation"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such book", body = Error)
    ),
    security(("bearer_token" = [])),
    tags = ["books"],
    operation_id = "deleteBook"
)]
#[delete("/{id}")]
pub async fn delete_book(
    _identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<serde_json::Value>> {
    state
        .catalogue
        .delete_book(BookId::new(path.into_inner()))
        .await?;
    Ok(web::Json(json!({ "detail": "Book deleted successfully" })))
}

fn map_multipart_error(err: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("invalid multipart payload: {err}"))
}

async fn read_upload(mut payload: Multipart) -> Result<(String, Vec<u8>), Error> {
    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        if field.name() != Some("file") {
            // Drain unknown fields so the stream can continue.
            while field
                .try_next()
                .await
                .map_err(map_multipart_error)?
                .is_some()
            {}
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(ToOwned::to_owned)
            .ok_or_else(|| Error::invalid_request("uploaded file must have a filename"))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
            bytes.extend_from_slice(&chunk);
        }
        return Ok((filename, bytes));
    }
    Err(Error::invalid_request("multipart field 'file' is required"))
}

/// Import books in bulk from an uploaded `.json` or `.csv` file.
///
/// Records are created one at a time in input order; the first invalid
/// record fails the whole request, but earlier creates are already
/// committed. There is no batch rollback.
#[utoipa::path(
    post,
    path = "/books/bulk-import",
    responses(
        (status = 200, description = "Import outcome", body = ImportOutcome),
        (status = 400, description = "Unsupported file or invalid record", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    security(("bearer_token" = [])),
    tags = ["books"],
    operation_id = "bulkImportBooks"
)]
#[post("/bulk-import")]
pub async fn bulk_import(
    _identity: Identity,
    state: web::Data<HttpState>,
    payload: Multipart,
) -> ApiResult<web::Json<ImportOutcome>> {
    let (filename, bytes) = read_upload(payload).await?;
    let outcome = state.importer.import(&bytes, &filename).await?;
    Ok(web::Json(outcome))
}
