//! Exchange workflow engine.
//!
//! Drives exchange records through the state machine defined on
//! [`Exchange`] while keeping the referenced book's availability consistent.
//! Preconditions are validated against freshly loaded records, then the
//! two-record mutation is delegated to one atomic ledger operation; the
//! ledger re-checks the expected prior state inside its transaction, so a
//! concurrent winner makes the loser fail instead of double-applying.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    BookRepository, BookRepositoryError, CancelExchangeRequest, CreateExchangeRequest,
    CreateExchangeResponse, ExchangeCommand, ExchangeDecisionRequest, ExchangeDecisionResponse,
    ExchangeLedger, ExchangeLedgerError, ExchangeQuery, ExchangeTransition,
    IncomingRequestsRequest, IncomingRequestsResponse, MyExchangesRequest, MyExchangesResponse,
    OutgoingRequestsRequest, OutgoingRequestsResponse, RejectExchangeRequest, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Availability, Error, Exchange, ExchangeTransitionError, ExchangeType, User, Username,
};

fn map_ledger_error(error: ExchangeLedgerError) -> Error {
    match error {
        ExchangeLedgerError::Connection { message } => {
            Error::service_unavailable(format!("exchange ledger unavailable: {message}"))
        }
        ExchangeLedgerError::Query { message } => {
            Error::internal(format!("exchange ledger error: {message}"))
        }
        ExchangeLedgerError::BookUnavailable => {
            Error::conflict("book is not available for exchange")
        }
        ExchangeLedgerError::StateConflict => {
            Error::invalid_state("exchange was modified concurrently")
        }
    }
}

fn map_book_error(error: BookRepositoryError) -> Error {
    match error {
        BookRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalog unavailable: {message}"))
        }
        other => Error::internal(format!("catalog error: {other}")),
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("identity store unavailable: {message}"))
        }
        other => Error::internal(format!("identity store error: {other}")),
    }
}

fn map_transition_error(error: ExchangeTransitionError) -> Error {
    Error::invalid_state(error.to_string())
}

/// Workflow engine implementing the exchange command driving port.
#[derive(Clone)]
pub struct ExchangeWorkflowService<L, B, U> {
    ledger: Arc<L>,
    books: Arc<B>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<L, B, U> ExchangeWorkflowService<L, B, U> {
    /// Create a workflow engine over the ledger, catalog, and identity ports.
    pub fn new(ledger: Arc<L>, books: Arc<B>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            books,
            users,
            clock,
        }
    }
}

impl<L, B, U> ExchangeWorkflowService<L, B, U>
where
    L: ExchangeLedger,
    B: BookRepository,
    U: UserRepository,
{
    async fn load_exchange(&self, exchange_id: &Uuid) -> Result<Exchange, Error> {
        self.ledger
            .find_by_id(exchange_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("exchange {exchange_id} not found")))
    }

    /// Re-resolve a party of the exchange from the identity store. A missing
    /// record means the ledger's reference is dangling, which is an internal
    /// invariant breach rather than a caller error.
    async fn load_party(&self, user_id: Uuid, exchange_id: Uuid) -> Result<User, Error> {
        self.users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| {
                Error::internal(format!(
                    "user {user_id} referenced by exchange {exchange_id} does not exist"
                ))
            })
    }

    /// Load an exchange and verify the caller owns the book behind it.
    async fn load_owned_exchange(
        &self,
        exchange_id: &Uuid,
        caller: &Username,
    ) -> Result<Exchange, Error> {
        let exchange = self.load_exchange(exchange_id).await?;
        let owner = self.load_party(exchange.owner_id(), exchange.id()).await?;
        if owner.username() != caller {
            warn!(
                actor = %caller,
                exchange_id = %exchange.id(),
                "non-owner attempted an owner decision"
            );
            return Err(Error::forbidden(
                "only the book owner may decide on this exchange",
            ));
        }
        Ok(exchange)
    }
}

#[async_trait]
impl<L, B, U> ExchangeCommand for ExchangeWorkflowService<L, B, U>
where
    L: ExchangeLedger,
    B: BookRepository,
    U: UserRepository,
{
    async fn create_request(
        &self,
        request: CreateExchangeRequest,
    ) -> Result<CreateExchangeResponse, Error> {
        let book = self
            .books
            .find_by_id(&request.book_id)
            .await
            .map_err(map_book_error)?
            .ok_or_else(|| Error::not_found(format!("book {} not found", request.book_id)))?;

        let requester = self
            .users
            .find_by_username(&request.requester)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", request.requester)))?;

        if !book.is_available() {
            warn!(
                actor = %request.requester,
                book_id = %book.id(),
                availability = %book.availability(),
                "exchange request for unavailable book"
            );
            return Err(Error::conflict(format!(
                "book {} is not available for exchange",
                book.id()
            )));
        }

        if book.owner_id() == requester.id() {
            warn!(
                actor = %request.requester,
                book_id = %book.id(),
                "exchange request for own book"
            );
            return Err(Error::invalid_request(
                "cannot request an exchange for your own book",
            ));
        }

        let exchange = Exchange::request(
            book.id(),
            book.owner_id(),
            requester.id(),
            ExchangeType::BookForBook,
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.ledger
            .create_request(&exchange)
            .await
            .map_err(map_ledger_error)?;

        info!(
            actor = %request.requester,
            exchange_id = %exchange.id(),
            book_id = %exchange.book_id(),
            status = %exchange.status(),
            "exchange request created"
        );
        Ok(CreateExchangeResponse {
            exchange: exchange.into(),
        })
    }

    async fn approve(
        &self,
        request: ExchangeDecisionRequest,
    ) -> Result<ExchangeDecisionResponse, Error> {
        let exchange = self
            .load_owned_exchange(&request.exchange_id, &request.caller)
            .await?;
        let expected = exchange.status();
        let updated = exchange
            .approve(self.clock.utc())
            .map_err(map_transition_error)?;

        // The book stays reserved; only the exchange record moves.
        self.ledger
            .apply_transition(ExchangeTransition {
                exchange: updated.clone(),
                expected_status: expected,
                book_availability: None,
            })
            .await
            .map_err(map_ledger_error)?;

        info!(
            actor = %request.caller,
            exchange_id = %updated.id(),
            status = %updated.status(),
            "exchange approved"
        );
        Ok(ExchangeDecisionResponse {
            exchange: updated.into(),
        })
    }

    async fn complete(
        &self,
        request: ExchangeDecisionRequest,
    ) -> Result<ExchangeDecisionResponse, Error> {
        let exchange = self
            .load_owned_exchange(&request.exchange_id, &request.caller)
            .await?;
        let expected = exchange.status();
        let updated = exchange
            .complete(self.clock.utc())
            .map_err(map_transition_error)?;

        self.ledger
            .apply_transition(ExchangeTransition {
                exchange: updated.clone(),
                expected_status: expected,
                book_availability: Some(Availability::Exchanged),
            })
            .await
            .map_err(map_ledger_error)?;

        info!(
            actor = %request.caller,
            exchange_id = %updated.id(),
            status = %updated.status(),
            "exchange completed"
        );
        Ok(ExchangeDecisionResponse {
            exchange: updated.into(),
        })
    }

    async fn reject(&self, request: RejectExchangeRequest) -> Result<(), Error> {
        let exchange = self
            .load_owned_exchange(&request.exchange_id, &request.caller)
            .await?;
        let expected = exchange.status();
        let updated = exchange
            .reject(request.reason, self.clock.utc())
            .map_err(map_transition_error)?;

        // The book returns to the catalog whatever its current flag says.
        self.ledger
            .apply_transition(ExchangeTransition {
                exchange: updated.clone(),
                expected_status: expected,
                book_availability: Some(Availability::Available),
            })
            .await
            .map_err(map_ledger_error)?;

        info!(
            actor = %request.caller,
            exchange_id = %updated.id(),
            status = %updated.status(),
            "exchange rejected"
        );
        Ok(())
    }

    async fn cancel(&self, request: CancelExchangeRequest) -> Result<(), Error> {
        let exchange = self.load_exchange(&request.exchange_id).await?;
        let requester = self
            .load_party(exchange.requester_id(), exchange.id())
            .await?;
        if requester.username() != &request.caller {
            warn!(
                actor = %request.caller,
                exchange_id = %exchange.id(),
                "non-requester attempted a cancellation"
            );
            return Err(Error::forbidden(
                "only the requester may cancel this exchange",
            ));
        }

        let expected = exchange.status();
        let updated = exchange
            .cancel(self.clock.utc())
            .map_err(map_transition_error)?;

        self.ledger
            .apply_transition(ExchangeTransition {
                exchange: updated.clone(),
                expected_status: expected,
                book_availability: Some(Availability::Available),
            })
            .await
            .map_err(map_ledger_error)?;

        info!(
            actor = %request.caller,
            exchange_id = %updated.id(),
            status = %updated.status(),
            "exchange cancelled"
        );
        Ok(())
    }
}

/// Read-side service implementing the exchange query driving port.
#[derive(Clone)]
pub struct ExchangeQueryService<L, U> {
    ledger: Arc<L>,
    users: Arc<U>,
}

impl<L, U> ExchangeQueryService<L, U> {
    /// Create a query service over the ledger and identity ports.
    pub fn new(ledger: Arc<L>, users: Arc<U>) -> Self {
        Self { ledger, users }
    }
}

impl<L, U> ExchangeQueryService<L, U>
where
    L: ExchangeLedger,
    U: UserRepository,
{
    async fn resolve_user(&self, username: &Username) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {username} not found")))
    }
}

#[async_trait]
impl<L, U> ExchangeQuery for ExchangeQueryService<L, U>
where
    L: ExchangeLedger,
    U: UserRepository,
{
    async fn my_exchanges(
        &self,
        request: MyExchangesRequest,
    ) -> Result<MyExchangesResponse, Error> {
        let user = self.resolve_user(&request.username).await?;
        let page = self
            .ledger
            .list_for_user(&user.id(), &request.page, request.sort)
            .await
            .map_err(map_ledger_error)?;

        Ok(MyExchangesResponse {
            exchanges: page.map(Into::into),
        })
    }

    async fn incoming_requests(
        &self,
        request: IncomingRequestsRequest,
    ) -> Result<IncomingRequestsResponse, Error> {
        let user = self.resolve_user(&request.username).await?;
        let exchanges = self
            .ledger
            .list_pending_for_owner(&user.id())
            .await
            .map_err(map_ledger_error)?;

        Ok(IncomingRequestsResponse {
            exchanges: exchanges.into_iter().map(Into::into).collect(),
        })
    }

    async fn outgoing_requests(
        &self,
        request: OutgoingRequestsRequest,
    ) -> Result<OutgoingRequestsResponse, Error> {
        let user = self.resolve_user(&request.username).await?;
        let exchanges = self
            .ledger
            .list_by_requester(&user.id())
            .await
            .map_err(map_ledger_error)?;

        Ok(OutgoingRequestsResponse {
            exchanges: exchanges.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "exchange_service_tests.rs"]
mod tests;
