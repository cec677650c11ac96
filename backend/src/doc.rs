//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all HTTP endpoints from the inbound layer, the schema
//! wrappers for domain types, and the session-cookie security scheme. The
//! generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::auth::{LoginBody, RegisterBody, UserBody};
use crate::inbound::http::books::{
    BookBody, BookDetailBody, BookForm, BookListBody, BookMetadataBody, BookPageBody,
};
use crate::inbound::http::exchanges::{
    CreateExchangeBody, ExchangeBody, ExchangeListBody, ExchangePageBody,
};
use crate::inbound::http::reviews::{CreateReviewBody, ReviewBody, ReviewPageBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "BookSwap backend API",
        description = "HTTP interface for the book exchange marketplace: \
                       catalog, exchange workflow, reviews, and sessions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::books::search_books,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::my_books,
        crate::inbound::http::books::lookup_book_metadata,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::update_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::exchanges::create_exchange,
        crate::inbound::http::exchanges::approve_exchange,
        crate::inbound::http::exchanges::complete_exchange,
        crate::inbound::http::exchanges::reject_exchange,
        crate::inbound::http::exchanges::cancel_exchange,
        crate::inbound::http::exchanges::my_exchanges,
        crate::inbound::http::exchanges::incoming_exchanges,
        crate::inbound::http::exchanges::outgoing_exchanges,
        crate::inbound::http::reviews::book_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::approve_review,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterBody,
        LoginBody,
        UserBody,
        BookForm,
        BookBody,
        BookPageBody,
        BookDetailBody,
        BookListBody,
        BookMetadataBody,
        CreateExchangeBody,
        ExchangeBody,
        ExchangePageBody,
        ExchangeListBody,
        CreateReviewBody,
        ReviewBody,
        ReviewPageBody,
    )),
    tags(
        (name = "auth", description = "Registration, login, and sessions"),
        (name = "books", description = "Catalog listings and search"),
        (name = "exchanges", description = "The book exchange workflow"),
        (name = "reviews", description = "Moderated book reviews"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Sanity checks over the generated document.

    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_registers_the_exchange_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        assert!(paths.contains_key("/api/v1/exchanges"));
        assert!(paths.contains_key("/api/v1/exchanges/{exchange_id}/approve"));
        assert!(paths.contains_key("/api/v1/exchanges/{exchange_id}/complete"));
        assert!(paths.contains_key("/api/v1/exchanges/{exchange_id}/reject"));
        assert!(paths.contains_key("/api/v1/exchanges/{exchange_id}/cancel"));
    }

    #[test]
    fn document_registers_the_error_schema() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components registered");
        assert!(components.schemas.keys().any(|key| key.contains("Error")));
    }
}
