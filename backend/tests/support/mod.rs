//! Shared harness for HTTP integration tests.
//!
//! Builds the production routing table over the in-memory store so the full
//! request path, extractors through adapters, runs without PostgreSQL.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::Value;

use librarium::Trace;
use librarium::inbound::http::health::HealthState;
use librarium::inbound::http::state::HttpState;
use librarium::inbound::http::token::TokenCodec;
use librarium::server::{build_http_state, configure_api};

/// Secret shared by every test token.
pub const TEST_TOKEN_SECRET: &str = "integration-test-secret";

/// Assemble the production routes over the in-memory store.
pub fn test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let tokens = Arc::new(TokenCodec::new(
        TEST_TOKEN_SECRET,
        chrono::Duration::minutes(15),
    ));
    let state: HttpState = build_http_state(None, tokens);
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(HealthState::new()))
        .wrap(Trace)
        .configure(configure_api)
}

/// Sign up and log in a fixture user, returning a bearer token.
pub async fn obtain_token<S>(app: &S) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(serde_json::json!({ "username": "bookuser", "password": "bookpass" }))
        .to_request();
    let res = test::call_service(app, signup).await;
    assert!(res.status().is_success(), "signup failed: {}", res.status());

    let login = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", "bookuser"), ("password", "bookpass")])
        .to_request();
    let res = test::call_service(app, login).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    let body: Value = test::read_body_json(res).await;
    body["access_token"]
        .as_str()
        .expect("access_token present")
        .to_owned()
}

/// Authorisation header value for the given token.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

/// Create a book through the API and return the response payload.
pub async fn create_book<S>(app: &S, token: &str, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/books/")
        .insert_header(bearer(token))
        .set_json(body)
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "create failed: {}", res.status());
    test::read_body_json(res).await
}

/// Build a multipart body with a single `file` field.
pub fn multipart_upload(filename: &str, content_type: &str, content: &str) -> (String, Vec<u8>) {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    (
        format!("multipart/form-data; boundary={boundary}"),
        body.into_bytes(),
    )
}
