//! Workflow engine behaviour: preconditions, authorisation, transition
//! legality, and ledger error mapping.

use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockBookRepository, MockExchangeLedger, MockUserRepository};
use crate::domain::{
    Book, BookDraft, EmailAddress, ErrorCode, ExchangeStatus, Role,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
        .single()
        .expect("valid timestamp")
}

fn fixed_clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(fixed_now());
    Arc::new(clock)
}

fn user_named(name: &str) -> User {
    User::new(
        Uuid::new_v4(),
        Username::new(name).expect("valid username"),
        EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
        Role::User,
        true,
    )
}

fn book_owned_by(owner_id: Uuid, availability: Availability) -> Book {
    Book::new(BookDraft {
        id: Uuid::new_v4(),
        owner_id,
        title: "Dead Souls".to_owned(),
        isbn: None,
        description: None,
        authors: Some("Nikolai Gogol".to_owned()),
        genres: None,
        publisher: None,
        publication_year: Some(1842),
        page_count: None,
        language: "English".to_owned(),
        cover_image_url: None,
        availability,
    })
    .expect("valid book")
}

fn pending_exchange(owner_id: Uuid, requester_id: Uuid) -> Exchange {
    Exchange::request(
        Uuid::new_v4(),
        owner_id,
        requester_id,
        ExchangeType::BookForBook,
        fixed_now(),
    )
    .expect("distinct parties")
}

fn service(
    ledger: MockExchangeLedger,
    books: MockBookRepository,
    users: MockUserRepository,
) -> ExchangeWorkflowService<MockExchangeLedger, MockBookRepository, MockUserRepository> {
    ExchangeWorkflowService::new(
        Arc::new(ledger),
        Arc::new(books),
        Arc::new(users),
        fixed_clock(),
    )
}

mod create_request {
    use super::*;

    #[rstest]
    #[tokio::test]
    async fn reserves_available_book_as_pending() {
        let requester = user_named("alice");
        let book = book_owned_by(Uuid::new_v4(), Availability::Available);
        let book_id = book.id();

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let mut users = MockUserRepository::new();
        let requester_clone = requester.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(requester_clone.clone())));
        let mut ledger = MockExchangeLedger::new();
        ledger
            .expect_create_request()
            .times(1)
            .returning(|_| Ok(()));

        let response = service(ledger, books, users)
            .create_request(CreateExchangeRequest {
                book_id,
                requester: requester.username().clone(),
            })
            .await
            .expect("available book accepts a request");

        assert_eq!(response.exchange.status, ExchangeStatus::Pending);
        assert_eq!(response.exchange.book_id, book_id);
        assert_eq!(response.exchange.requester_id, requester.id());
        assert!(!response.exchange.completed);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_book_is_not_found() {
        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|_| Ok(None));
        let users = MockUserRepository::new();
        let ledger = MockExchangeLedger::new();

        let error = service(ledger, books, users)
            .create_request(CreateExchangeRequest {
                book_id: Uuid::new_v4(),
                requester: Username::new("alice").expect("valid username"),
            })
            .await
            .expect_err("missing book");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(Availability::Reserved)]
    #[case(Availability::Exchanged)]
    #[case(Availability::NotAvailable)]
    #[tokio::test]
    async fn unavailable_book_is_a_conflict(#[case] availability: Availability) {
        let requester = user_named("alice");
        let book = book_owned_by(Uuid::new_v4(), availability);
        let book_id = book.id();

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let mut users = MockUserRepository::new();
        let requester_clone = requester.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(requester_clone.clone())));
        // No ledger expectation: the precondition failure must not write.
        let ledger = MockExchangeLedger::new();

        let error = service(ledger, books, users)
            .create_request(CreateExchangeRequest {
                book_id,
                requester: requester.username().clone(),
            })
            .await
            .expect_err("unavailable book");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn own_book_is_an_invalid_request() {
        let owner = user_named("bob");
        let book = book_owned_by(owner.id(), Availability::Available);
        let book_id = book.id();

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let mut users = MockUserRepository::new();
        let owner_clone = owner.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(owner_clone.clone())));
        let ledger = MockExchangeLedger::new();

        let error = service(ledger, books, users)
            .create_request(CreateExchangeRequest {
                book_id,
                requester: owner.username().clone(),
            })
            .await
            .expect_err("own book");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn race_loser_maps_book_unavailable_to_conflict() {
        let requester = user_named("alice");
        let book = book_owned_by(Uuid::new_v4(), Availability::Available);
        let book_id = book.id();

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let mut users = MockUserRepository::new();
        let requester_clone = requester.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(requester_clone.clone())));
        let mut ledger = MockExchangeLedger::new();
        // The in-memory snapshot said available, but the transaction's
        // re-check saw the concurrent winner's reservation.
        ledger
            .expect_create_request()
            .returning(|_| Err(ExchangeLedgerError::book_unavailable()));

        let error = service(ledger, books, users)
            .create_request(CreateExchangeRequest {
                book_id,
                requester: requester.username().clone(),
            })
            .await
            .expect_err("race loser");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }
}

mod owner_decisions {
    use super::*;

    struct DecisionWorld {
        owner: User,
        exchange: Exchange,
    }

    fn world() -> DecisionWorld {
        let owner = user_named("bob");
        let requester = user_named("alice");
        let exchange = pending_exchange(owner.id(), requester.id());
        DecisionWorld { owner, exchange }
    }

    fn mocks_for(
        world: &DecisionWorld,
    ) -> (MockExchangeLedger, MockUserRepository) {
        let mut ledger = MockExchangeLedger::new();
        let exchange = world.exchange.clone();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exchange.clone())));
        let mut users = MockUserRepository::new();
        let owner = world.owner.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        (ledger, users)
    }

    #[rstest]
    #[tokio::test]
    async fn approve_moves_pending_to_accepted_and_leaves_book_alone() {
        let world = world();
        let (mut ledger, users) = mocks_for(&world);
        ledger
            .expect_apply_transition()
            .withf(|transition| {
                transition.exchange.status() == ExchangeStatus::Accepted
                    && transition.expected_status == ExchangeStatus::Pending
                    && transition.book_availability.is_none()
            })
            .times(1)
            .returning(|_| Ok(()));

        let response = service(ledger, MockBookRepository::new(), users)
            .approve(ExchangeDecisionRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
            })
            .await
            .expect("owner approves pending exchange");

        assert_eq!(response.exchange.status, ExchangeStatus::Accepted);
    }

    #[rstest]
    #[tokio::test]
    async fn non_owner_decisions_are_forbidden() {
        let world = world();
        let (ledger, users) = mocks_for(&world);

        let error = service(ledger, MockBookRepository::new(), users)
            .approve(ExchangeDecisionRequest {
                exchange_id: world.exchange.id(),
                caller: Username::new("mallory").expect("valid username"),
            })
            .await
            .expect_err("non-owner");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn approving_an_accepted_exchange_is_invalid_state() {
        let mut world = world();
        world.exchange = world
            .exchange
            .clone()
            .approve(fixed_now())
            .expect("pending approves");
        let (ledger, users) = mocks_for(&world);

        let error = service(ledger, MockBookRepository::new(), users)
            .approve(ExchangeDecisionRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
            })
            .await
            .expect_err("second approval");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[rstest]
    #[tokio::test]
    async fn complete_requires_prior_approval() {
        let world = world();
        let (ledger, users) = mocks_for(&world);

        let error = service(ledger, MockBookRepository::new(), users)
            .complete(ExchangeDecisionRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
            })
            .await
            .expect_err("pending cannot complete");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[rstest]
    #[tokio::test]
    async fn complete_marks_book_exchanged_and_stamps_date() {
        let mut world = world();
        world.exchange = world
            .exchange
            .clone()
            .approve(fixed_now())
            .expect("pending approves");
        let (mut ledger, users) = mocks_for(&world);
        ledger
            .expect_apply_transition()
            .withf(|transition| {
                transition.exchange.status() == ExchangeStatus::Completed
                    && transition.expected_status == ExchangeStatus::Accepted
                    && transition.book_availability == Some(Availability::Exchanged)
            })
            .times(1)
            .returning(|_| Ok(()));

        let response = service(ledger, MockBookRepository::new(), users)
            .complete(ExchangeDecisionRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
            })
            .await
            .expect("accepted exchange completes");

        assert!(response.exchange.completed);
        assert_eq!(response.exchange.exchange_date, Some(fixed_now()));
    }

    #[rstest]
    #[tokio::test]
    async fn reject_returns_book_to_catalog_with_reason() {
        let world = world();
        let (mut ledger, users) = mocks_for(&world);
        ledger
            .expect_apply_transition()
            .withf(|transition| {
                transition.exchange.status() == ExchangeStatus::Rejected
                    && transition.exchange.owner_response() == Some("keeping it")
                    && transition.book_availability == Some(Availability::Available)
            })
            .times(1)
            .returning(|_| Ok(()));

        service(ledger, MockBookRepository::new(), users)
            .reject(RejectExchangeRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
                reason: Some("keeping it".to_owned()),
            })
            .await
            .expect("owner rejects pending exchange");
    }

    #[rstest]
    #[tokio::test]
    async fn rejecting_a_completed_exchange_is_invalid_state() {
        let mut world = world();
        world.exchange = world
            .exchange
            .clone()
            .approve(fixed_now())
            .and_then(|e| e.complete(fixed_now()))
            .expect("legal path");
        let (ledger, users) = mocks_for(&world);

        let error = service(ledger, MockBookRepository::new(), users)
            .reject(RejectExchangeRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
                reason: None,
            })
            .await
            .expect_err("terminal exchange");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_transition_surfaces_as_invalid_state() {
        let world = world();
        let (mut ledger, users) = mocks_for(&world);
        ledger
            .expect_apply_transition()
            .returning(|_| Err(ExchangeLedgerError::state_conflict()));

        let error = service(ledger, MockBookRepository::new(), users)
            .approve(ExchangeDecisionRequest {
                exchange_id: world.exchange.id(),
                caller: world.owner.username().clone(),
            })
            .await
            .expect_err("lost the compare-and-set");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }
}

mod cancellation {
    use super::*;

    #[rstest]
    #[tokio::test]
    async fn requester_cancels_their_pending_request() {
        let owner = user_named("bob");
        let requester = user_named("alice");
        let exchange = pending_exchange(owner.id(), requester.id());

        let mut ledger = MockExchangeLedger::new();
        let exchange_clone = exchange.clone();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exchange_clone.clone())));
        ledger
            .expect_apply_transition()
            .withf(|transition| {
                transition.exchange.status() == ExchangeStatus::Cancelled
                    && transition.book_availability == Some(Availability::Available)
            })
            .times(1)
            .returning(|_| Ok(()));
        let mut users = MockUserRepository::new();
        let requester_clone = requester.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(requester_clone.clone())));

        service(ledger, MockBookRepository::new(), users)
            .cancel(CancelExchangeRequest {
                exchange_id: exchange.id(),
                caller: requester.username().clone(),
            })
            .await
            .expect("requester cancels");
    }

    #[rstest]
    #[tokio::test]
    async fn owner_cannot_cancel_for_the_requester() {
        let owner = user_named("bob");
        let requester = user_named("alice");
        let exchange = pending_exchange(owner.id(), requester.id());

        let mut ledger = MockExchangeLedger::new();
        let exchange_clone = exchange.clone();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exchange_clone.clone())));
        let mut users = MockUserRepository::new();
        let requester_clone = requester.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(requester_clone.clone())));

        let error = service(ledger, MockBookRepository::new(), users)
            .cancel(CancelExchangeRequest {
                exchange_id: exchange.id(),
                caller: owner.username().clone(),
            })
            .await
            .expect_err("owner is not the requester");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}

mod queries {
    use pagination::{PageRequest, SortDirection};

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn incoming_requests_resolve_the_owner_first() {
        let owner = user_named("bob");
        let requester = user_named("alice");
        let exchange = pending_exchange(owner.id(), requester.id());
        let owner_id = owner.id();

        let mut users = MockUserRepository::new();
        let owner_clone = owner.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(owner_clone.clone())));
        let mut ledger = MockExchangeLedger::new();
        let exchange_clone = exchange.clone();
        ledger
            .expect_list_pending_for_owner()
            .withf(move |id| *id == owner_id)
            .returning(move |_| Ok(vec![exchange_clone.clone()]));

        let response = ExchangeQueryService::new(Arc::new(ledger), Arc::new(users))
            .incoming_requests(IncomingRequestsRequest {
                username: owner.username().clone(),
            })
            .await
            .expect("owner lists incoming requests");

        assert_eq!(response.exchanges.len(), 1);
        assert_eq!(response.exchanges.first().map(|e| e.id), Some(exchange.id()));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_queries_are_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        let ledger = MockExchangeLedger::new();

        let error = ExchangeQueryService::new(Arc::new(ledger), Arc::new(users))
            .my_exchanges(MyExchangesRequest {
                username: Username::new("ghost").expect("valid username"),
                page: PageRequest::default(),
                sort: SortDirection::Desc,
            })
            .await
            .expect_err("unknown user");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
