//! Builders wiring repository-backed services into the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;
use url::Url;

use backend::domain::ports::{
    BookMetadataSource, FixtureBookMetadataSource, FixtureCatalogCommand, FixtureCatalogQuery,
    FixtureExchangeCommand, FixtureExchangeQuery, FixtureIdentityCommand, FixtureIdentityQuery,
    FixtureLoginService, FixtureReviewCommand, FixtureReviewQuery,
};
use backend::domain::{
    CatalogCommandService, CatalogQueryService, ExchangeQueryService, ExchangeWorkflowService,
    IdentityService, ReviewService,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::metadata::HttpBookMetadataSource;
use backend::outbound::persistence::{
    DbPool, DieselBookRepository, DieselExchangeLedger, DieselReviewRepository,
    DieselUserRepository, PoolConfig,
};
use backend::outbound::security::Argon2CredentialHasher;

/// Build the metadata source, falling back to the fixture when the client
/// cannot be constructed.
fn build_metadata_source(endpoint: Url) -> Arc<dyn BookMetadataSource> {
    match HttpBookMetadataSource::new(endpoint) {
        Ok(source) => Arc::new(source),
        Err(error) => {
            warn!(%error, "metadata lookup client unavailable, using fixture");
            Arc::new(FixtureBookMetadataSource)
        }
    }
}

/// Ports backed entirely by fixtures, for local runs without a database.
fn fixture_ports(metadata: Arc<dyn BookMetadataSource>) -> HttpStatePorts {
    HttpStatePorts {
        identity: Arc::new(FixtureIdentityCommand),
        login: Arc::new(FixtureLoginService),
        profiles: Arc::new(FixtureIdentityQuery),
        catalog: Arc::new(FixtureCatalogCommand),
        catalog_query: Arc::new(FixtureCatalogQuery),
        exchanges: Arc::new(FixtureExchangeCommand),
        exchanges_query: Arc::new(FixtureExchangeQuery),
        reviews: Arc::new(FixtureReviewCommand),
        reviews_query: Arc::new(FixtureReviewQuery),
        metadata,
    }
}

/// Ports backed by Diesel repositories over the given pool.
fn pool_backed_ports(pool: &DbPool, metadata: Arc<dyn BookMetadataSource>) -> HttpStatePorts {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let books = Arc::new(DieselBookRepository::new(pool.clone()));
    let ledger = Arc::new(DieselExchangeLedger::new(pool.clone()));
    let reviews = Arc::new(DieselReviewRepository::new(pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let identity = Arc::new(IdentityService::new(
        users.clone(),
        Arc::new(Argon2CredentialHasher::new()),
    ));
    let workflow = Arc::new(ExchangeWorkflowService::new(
        ledger.clone(),
        books.clone(),
        users.clone(),
        clock.clone(),
    ));
    let exchange_query = Arc::new(ExchangeQueryService::new(ledger, users.clone()));
    let catalog = Arc::new(CatalogCommandService::new(books.clone(), users.clone()));
    let catalog_query = Arc::new(CatalogQueryService::new(
        books.clone(),
        reviews.clone(),
        users.clone(),
    ));
    let review_service = Arc::new(ReviewService::new(reviews, books, users, clock));

    HttpStatePorts {
        identity: identity.clone(),
        login: identity.clone(),
        profiles: identity,
        catalog,
        catalog_query,
        exchanges: workflow,
        exchanges_query: exchange_query,
        reviews: review_service.clone(),
        reviews_query: review_service,
        metadata,
    }
}

/// Build the HTTP state: pool-backed when a database URL is configured,
/// fixture-backed otherwise.
pub(crate) async fn build_http_state(
    database_url: Option<&str>,
    metadata_endpoint: Url,
) -> color_eyre::Result<HttpState> {
    let metadata = build_metadata_source(metadata_endpoint);

    let ports = match database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url)).await?;
            pool_backed_ports(&pool, metadata)
        }
        None => {
            warn!("no database configured; serving fixture state");
            fixture_ports(metadata)
        }
    };

    Ok(HttpState::new(ports))
}
