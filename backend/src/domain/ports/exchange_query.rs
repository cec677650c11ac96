//! Driving port for exchange workflow reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest, SortDirection};

use crate::domain::{Error, Username};

use super::exchange_command::ExchangePayload;

/// Request to page through a user's exchanges, as owner or requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyExchangesRequest {
    /// Resolved identity of the caller.
    pub username: Username,
    /// Page window.
    pub page: PageRequest,
    /// Sort order over creation time.
    pub sort: SortDirection,
}

/// Response carrying one page of the caller's exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyExchangesResponse {
    /// The requested page, sorted by creation time.
    pub exchanges: Page<ExchangePayload>,
}

/// Request for pending exchanges awaiting the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequestsRequest {
    /// Resolved identity of the caller.
    pub username: Username,
}

/// Response carrying the caller's pending incoming requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequestsResponse {
    /// Pending exchanges where the caller owns the book.
    pub exchanges: Vec<ExchangePayload>,
}

/// Request for all exchanges the caller opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequestsRequest {
    /// Resolved identity of the caller.
    pub username: Username,
}

/// Response carrying the caller's outgoing requests, any status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequestsResponse {
    /// Exchanges where the caller is the requester.
    pub exchanges: Vec<ExchangePayload>,
}

/// Driving port for exchange workflow reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeQuery: Send + Sync {
    /// Page through exchanges where the caller is owner or requester.
    async fn my_exchanges(&self, request: MyExchangesRequest)
    -> Result<MyExchangesResponse, Error>;

    /// Pending exchanges awaiting the caller's decision.
    async fn incoming_requests(
        &self,
        request: IncomingRequestsRequest,
    ) -> Result<IncomingRequestsResponse, Error>;

    /// All exchanges the caller opened, any status.
    async fn outgoing_requests(
        &self,
        request: OutgoingRequestsRequest,
    ) -> Result<OutgoingRequestsResponse, Error>;
}

/// Fixture query port: a user with no exchange history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExchangeQuery;

#[async_trait]
impl ExchangeQuery for FixtureExchangeQuery {
    async fn my_exchanges(
        &self,
        request: MyExchangesRequest,
    ) -> Result<MyExchangesResponse, Error> {
        Ok(MyExchangesResponse {
            exchanges: Page::empty(&request.page),
        })
    }

    async fn incoming_requests(
        &self,
        _request: IncomingRequestsRequest,
    ) -> Result<IncomingRequestsResponse, Error> {
        Ok(IncomingRequestsResponse {
            exchanges: Vec::new(),
        })
    }

    async fn outgoing_requests(
        &self,
        _request: OutgoingRequestsRequest,
    ) -> Result<OutgoingRequestsResponse, Error> {
        Ok(OutgoingRequestsResponse {
            exchanges: Vec::new(),
        })
    }
}
