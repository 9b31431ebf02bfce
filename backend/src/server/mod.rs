//! Server construction and wiring.
//!
//! Chooses between the Diesel adapters (when a database is configured) and
//! the in-memory store, assembles the domain services, and registers every
//! route. Tests reuse [`configure_api`] with their own state so the routing
//! table cannot drift from production.

mod config;

pub use config::AppConfig;

use std::io;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::ApiDoc;
use crate::domain::ports::{AuthorRepository, BookRepository, UserRepository};
use crate::domain::{AccountService, BookImporter, CatalogueService};
use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::TokenCodec;
use crate::inbound::http::{auth, books};
use crate::middleware::trace::Trace;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselAuthorRepository, DieselBookRepository, DieselUserRepository, PoolConfig,
};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn run_migrations(database_url: &str) -> io::Result<()> {
    use diesel::Connection;

    let mut conn = diesel::pg::PgConnection::establish(database_url)
        .map_err(|err| io::Error::other(format!("failed to connect for migrations: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| io::Error::other(format!("failed to run migrations: {err}")))?;
    Ok(())
}

fn assemble_state(
    authors: Arc<dyn AuthorRepository>,
    books: Arc<dyn BookRepository>,
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenCodec>,
) -> HttpState {
    let catalogue = Arc::new(CatalogueService::new(authors, books));
    let importer = Arc::new(BookImporter::new(catalogue.clone()));
    let accounts = Arc::new(AccountService::new(users));
    HttpState::new(catalogue, importer, accounts, tokens)
}

/// Build the handler state, preferring Diesel adapters when a pool is
/// available and falling back to the shared in-memory store otherwise.
pub fn build_http_state(pool: Option<DbPool>, tokens: Arc<TokenCodec>) -> HttpState {
    match pool {
        Some(pool) => assemble_state(
            Arc::new(DieselAuthorRepository::new(pool.clone())),
            Arc::new(DieselBookRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool)),
            tokens,
        ),
        None => {
            tracing::warn!("no database configured; catalogue lives in memory only");
            let store = MemoryStore::new();
            assemble_state(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Arc::new(store),
                tokens,
            )
        }
    }
}

/// Register every API route. Shared between the server and the test
/// harnesses.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::signup)
            .service(auth::login),
    )
    .service(
        web::scope("/books")
            .service(books::bulk_import)
            .service(books::create_book)
            .service(books::list_books)
            .service(books::get_book)
            .service(books::update_book)
            .service(books::delete_book),
    )
    .service(health::live)
    .service(health::ready);
}

/// Bind the HTTP server and return it ready to be awaited.
///
/// When a database URL is configured, pending migrations run first and a
/// connection pool is built; otherwise the in-memory store serves all
/// requests.
pub async fn run(config: AppConfig) -> io::Result<Server> {
    let pool = match &config.database_url {
        Some(url) => {
            run_migrations(url)?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|err| io::Error::other(err.to_string()))?;
            Some(pool)
        }
        None => None,
    };

    let tokens = Arc::new(TokenCodec::new(&config.token_secret, config.token_ttl));
    let state = build_http_state(pool, tokens);
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .configure(configure_api);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    Ok(server.run())
}
