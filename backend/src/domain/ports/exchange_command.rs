//! Driving port for exchange workflow mutations.
//!
//! Every operation takes the caller's identity as an explicit parameter;
//! there is no ambient security context anywhere in the workflow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Exchange, ExchangeStatus, ExchangeType, Username};

/// Serializable exchange payload for driving ports and adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePayload {
    /// Stable exchange identifier.
    pub id: Uuid,
    /// The book this exchange is for.
    pub book_id: Uuid,
    /// The book's owner at creation time.
    pub owner_id: Uuid,
    /// The account requesting the book.
    pub requester_id: Uuid,
    /// Lifecycle state.
    pub status: ExchangeStatus,
    /// What the requester offers in return.
    pub exchange_type: ExchangeType,
    /// Owner's free-text response, set on rejection.
    pub owner_response: Option<String>,
    /// Handover timestamp, set on completion.
    pub exchange_date: Option<DateTime<Utc>>,
    /// True iff the exchange completed.
    pub completed: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest mutation.
    pub updated_at: DateTime<Utc>,
}

impl From<Exchange> for ExchangePayload {
    fn from(value: Exchange) -> Self {
        Self {
            id: value.id(),
            book_id: value.book_id(),
            owner_id: value.owner_id(),
            requester_id: value.requester_id(),
            status: value.status(),
            exchange_type: value.exchange_type(),
            owner_response: value.owner_response().map(str::to_owned),
            exchange_date: value.exchange_date(),
            completed: value.is_completed(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to open an exchange for a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateExchangeRequest {
    /// The book being requested.
    pub book_id: Uuid,
    /// Resolved identity of the requesting caller.
    pub requester: Username,
}

/// Response carrying the freshly persisted exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateExchangeResponse {
    /// The created exchange, including its assigned id.
    pub exchange: ExchangePayload,
}

/// Owner decision addressed at one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDecisionRequest {
    /// The targeted exchange.
    pub exchange_id: Uuid,
    /// Resolved identity of the caller; must be the exchange's owner.
    pub caller: Username,
}

/// Response carrying the updated exchange after a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDecisionResponse {
    /// The exchange after the transition.
    pub exchange: ExchangePayload,
}

/// Owner rejection with an optional free-text reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectExchangeRequest {
    /// The targeted exchange.
    pub exchange_id: Uuid,
    /// Resolved identity of the caller; must be the exchange's owner.
    pub caller: Username,
    /// Reason relayed to the requester, stored as the owner response.
    pub reason: Option<String>,
}

/// Requester withdrawal of their own request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelExchangeRequest {
    /// The targeted exchange.
    pub exchange_id: Uuid,
    /// Resolved identity of the caller; must be the exchange's requester.
    pub caller: Username,
}

/// Driving port for exchange workflow mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeCommand: Send + Sync {
    /// Open a pending exchange and reserve the book.
    async fn create_request(
        &self,
        request: CreateExchangeRequest,
    ) -> Result<CreateExchangeResponse, Error>;

    /// Owner approval: pending → accepted.
    async fn approve(
        &self,
        request: ExchangeDecisionRequest,
    ) -> Result<ExchangeDecisionResponse, Error>;

    /// Owner handover confirmation: accepted → completed.
    async fn complete(
        &self,
        request: ExchangeDecisionRequest,
    ) -> Result<ExchangeDecisionResponse, Error>;

    /// Owner rejection; the book returns to the catalog.
    async fn reject(&self, request: RejectExchangeRequest) -> Result<(), Error>;

    /// Requester withdrawal; the book returns to the catalog.
    async fn cancel(&self, request: CancelExchangeRequest) -> Result<(), Error>;
}

/// Fixture command port for adapter tests; every call fails not-found.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExchangeCommand;

#[async_trait]
impl ExchangeCommand for FixtureExchangeCommand {
    async fn create_request(
        &self,
        request: CreateExchangeRequest,
    ) -> Result<CreateExchangeResponse, Error> {
        Err(Error::not_found(format!(
            "book {} not found",
            request.book_id
        )))
    }

    async fn approve(
        &self,
        request: ExchangeDecisionRequest,
    ) -> Result<ExchangeDecisionResponse, Error> {
        Err(Error::not_found(format!(
            "exchange {} not found",
            request.exchange_id
        )))
    }

    async fn complete(
        &self,
        request: ExchangeDecisionRequest,
    ) -> Result<ExchangeDecisionResponse, Error> {
        Err(Error::not_found(format!(
            "exchange {} not found",
            request.exchange_id
        )))
    }

    async fn reject(&self, request: RejectExchangeRequest) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "exchange {} not found",
            request.exchange_id
        )))
    }

    async fn cancel(&self, request: CancelExchangeRequest) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "exchange {} not found",
            request.exchange_id
        )))
    }
}
