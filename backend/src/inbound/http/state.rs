//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BookMetadataSource, CatalogCommand, CatalogQuery, ExchangeCommand, ExchangeQuery,
    IdentityCommand, IdentityQuery, LoginService, ReviewCommand, ReviewQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Account registration.
    pub identity: Arc<dyn IdentityCommand>,
    /// Credential verification.
    pub login: Arc<dyn LoginService>,
    /// Profile reads.
    pub profiles: Arc<dyn IdentityQuery>,
    /// Catalog mutations.
    pub catalog: Arc<dyn CatalogCommand>,
    /// Catalog reads and search.
    pub catalog_query: Arc<dyn CatalogQuery>,
    /// Exchange workflow mutations.
    pub exchanges: Arc<dyn ExchangeCommand>,
    /// Exchange workflow reads.
    pub exchanges_query: Arc<dyn ExchangeQuery>,
    /// Review mutations.
    pub reviews: Arc<dyn ReviewCommand>,
    /// Review reads.
    pub reviews_query: Arc<dyn ReviewQuery>,
    /// External book metadata lookup.
    pub metadata: Arc<dyn BookMetadataSource>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account registration.
    pub identity: Arc<dyn IdentityCommand>,
    /// Credential verification.
    pub login: Arc<dyn LoginService>,
    /// Profile reads.
    pub profiles: Arc<dyn IdentityQuery>,
    /// Catalog mutations.
    pub catalog: Arc<dyn CatalogCommand>,
    /// Catalog reads and search.
    pub catalog_query: Arc<dyn CatalogQuery>,
    /// Exchange workflow mutations.
    pub exchanges: Arc<dyn ExchangeCommand>,
    /// Exchange workflow reads.
    pub exchanges_query: Arc<dyn ExchangeQuery>,
    /// Review mutations.
    pub reviews: Arc<dyn ReviewCommand>,
    /// Review reads.
    pub reviews_query: Arc<dyn ReviewQuery>,
    /// External book metadata lookup.
    pub metadata: Arc<dyn BookMetadataSource>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identity,
            login,
            profiles,
            catalog,
            catalog_query,
            exchanges,
            exchanges_query,
            reviews,
            reviews_query,
            metadata,
        } = ports;
        Self {
            identity,
            login,
            profiles,
            catalog,
            catalog_query,
            exchanges,
            exchanges_query,
            reviews,
            reviews_query,
            metadata,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
