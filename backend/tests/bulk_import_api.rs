//! End-to-end coverage of the multipart bulk-import endpoint.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use support::{bearer, multipart_upload, obtain_token, test_app};

const JSON_RECORDS: &str = r#"[
    {"title": "The Dispossessed", "published_year": 1974, "genre": "Fiction", "author_name": "Ursula K. Le Guin"},
    {"title": "Cosmos", "published_year": 1980, "genre": "Science", "author_name": "Carl Sagan"}
]"#;

async fn upload(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    token: &str,
    filename: &str,
    content_type: &str,
    content: &str,
) -> actix_web::dev::ServiceResponse {
    let (header, body) = multipart_upload(filename, content_type, content);
    let req = test::TestRequest::post()
        .uri("/books/bulk-import")
        .insert_header(bearer(token))
        .insert_header(("content-type", header))
        .set_payload(body)
        .to_request();
    test::call_service(app, req).await
}

#[actix_web::test]
async fn json_uploads_import_every_record() {
    let app = test::init_service(test_app()).await;
    let token = obtain_token(&app).await;

    let res = upload(&app, &token, "books.json", "application/json", JSON_RECORDS).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["imported"], 2);
    assert_eq!(body["books"][0]["title"], "The Dispossessed");
    assert_eq!(body["books"][1]["author"]["name"], "Carl Sagan");

    let res = test::call_service(&app, test::TestRequest::get().uri("/books/").to_request()).await;
    let listed: Value = test::read_body_json(res).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn csv_uploads_import_every_row() {
    let app = test::init_service(test_app()).await;
    let token = obtain_token(&app).await;

    let csv = "title,published_year,genre,author_name\n\
               Sapiens,2011,History,Yuval Noah Harari\n\
               Dune,1965,Fiction,Frank Herbert\n";
    let res = upload(&app, &token, "books.csv", "text/csv", csv).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["imported"], 2);
}

#[actix_web::test]
async fn csv_with_a_non_integer_year_fails_the_whole_request() {
    let app = test::init_service(test_app()).await;
    let token = obtain_token(&app).await;

    let csv = "title,published_year,genre,author_name\n\
               Sapiens,twenty-eleven,History,Yuval Noah Harari\n";
    let res = upload(&app, &token, "books.csv", "text/csv", csv).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");

    let res = test::call_service(&app, test::TestRequest::get().uri("/books/").to_request()).await;
    let listed: Value = test::read_body_json(res).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn an_invalid_record_mid_file_leaves_earlier_rows_committed() {
    let app = test::init_service(test_app()).await;
    let token = obtain_token(&app).await;

    let payload = r#"[
        {"title": "Dune", "published_year": 1965, "genre": "Fiction", "author_name": "Frank Herbert"},
        {"title": "Bad", "published_year": 2000, "genre": "Fantasy", "author_name": "Nobody"}
    ]"#;
    let res = upload(&app, &token, "books.json", "application/json", payload).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // The import is not transactional: the first record stays applied even
    // though the request as a whole reported failure.
    let res = test::call_service(&app, test::TestRequest::get().uri("/books/").to_request()).await;
    let listed: Value = test::read_body_json(res).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["title"], "Dune");
}

#[actix_web::test]
async fn non_array_json_uploads_are_rejected() {
    let app = test::init_service(test_app()).await;
    let token = obtain_token(&app).await;

    let res = upload(
        &app,
        &token,
        "books.json",
        "application/json",
        r#"{"title": "not a list"}"#,
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unsupported_file_extensions_are_rejected() {
    let app = test::init_service(test_app()).await;
    let token = obtain_token(&app).await;

    let res = upload(&app, &token, "books.xml", "application/xml", "<books/>").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn bulk_import_requires_a_token() {
    let app = test::init_service(test_app()).await;

    let (header, body) = multipart_upload("books.json", "application/json", JSON_RECORDS);
    let req = test::TestRequest::post()
        .uri("/books/bulk-import")
        .insert_header(("content-type", header))
        .set_payload(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
