//! OpenAPI document assembly for Swagger UI and tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Aggregated OpenAPI description of the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librarium API",
        description = "Book catalogue management backend: token authentication, \
                       book CRUD, and bulk import."
    ),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::update_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::books::bulk_import,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        crate::domain::Author,
        crate::domain::Book,
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::ImportOutcome,
        crate::domain::User,
        crate::inbound::http::auth::LoginForm,
        crate::inbound::http::auth::SignupRequest,
        crate::inbound::http::auth::TokenResponse,
        crate::inbound::http::books::CreateBookRequest,
        crate::inbound::http::books::UpdateBookRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Catalogue CRUD and bulk import"),
        (name = "health", description = "Orchestration probes")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/auth/signup",
            "/auth/login",
            "/books/",
            "/books/{id}",
            "/books/bulk-import",
            "/healthz/live",
            "/healthz/ready",
        ] {
            assert!(paths.contains(&expected), "missing path: {expected}");
        }
    }
}
