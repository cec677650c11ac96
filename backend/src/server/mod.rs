//! Server assembly: session middleware, route registration, and startup.

mod config;
mod state_builders;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::Trace;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::{auth, books, exchanges, reviews};

pub use config::ServerConfig;
use state_builders::build_http_state;

/// Build the state, bind the listener, and serve until shutdown.
pub async fn run(config: ServerConfig) -> color_eyre::Result<()> {
    let state = web::Data::new(
        build_http_state(config.database_url.as_deref(), config.metadata_endpoint.clone())
            .await?,
    );
    let health_state = web::Data::new(HealthState::new());

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(same_site)
            .build();

        let api = web::scope("/api/v1")
            .wrap(session)
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(books::search_books)
            .service(books::create_book)
            .service(books::my_books)
            .service(books::lookup_book_metadata)
            .service(reviews::book_reviews)
            .service(reviews::create_review)
            .service(reviews::approve_review)
            .service(books::get_book)
            .service(books::update_book)
            .service(books::delete_book)
            .service(exchanges::create_exchange)
            .service(exchanges::approve_exchange)
            .service(exchanges::complete_exchange)
            .service(exchanges::reject_exchange)
            .service(exchanges::cancel_exchange)
            .service(exchanges::my_exchanges)
            .service(exchanges::incoming_exchanges)
            .service(exchanges::outgoing_exchanges);

        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    server.run().await?;
    Ok(())
}
