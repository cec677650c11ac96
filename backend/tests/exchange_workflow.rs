//! End-to-end exchange workflow behaviour over in-memory adapters.
//!
//! The in-memory ledger reproduces the adapter contract: each mutation is
//! applied atomically under one lock, `create_request` re-checks book
//! availability inside that critical section, and transitions are guarded by
//! the expected prior status. This lets the whole state machine, including
//! the same-book race, run without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::DefaultClock;
use pagination::{Page, PageRequest, SortDirection};
use tokio::sync::Mutex;
use uuid::Uuid;

use backend::domain::ports::{
    BookRepository, BookRepositoryError, BookSearchFilter, CancelExchangeRequest,
    CreateExchangeRequest, ExchangeCommand, ExchangeDecisionRequest, ExchangeLedger,
    ExchangeLedgerError, ExchangeQuery, ExchangeTransition, IncomingRequestsRequest,
    OutgoingRequestsRequest, RejectExchangeRequest, StoredCredentials, UserRepository,
    UserRepositoryError,
};
use backend::domain::{
    Availability, Book, BookDraft, EmailAddress, ErrorCode, Exchange, ExchangeQueryService,
    ExchangeStatus, ExchangeWorkflowService, Role, User, Username,
};

#[derive(Default)]
struct WorldState {
    users: HashMap<Uuid, User>,
    books: HashMap<Uuid, Book>,
    exchanges: HashMap<Uuid, Exchange>,
}

/// Shared in-memory stand-in for the catalog, identity store, and ledger.
#[derive(Clone, Default)]
struct World {
    state: Arc<Mutex<WorldState>>,
}

fn with_availability(book: &Book, availability: Availability) -> Book {
    Book::new(BookDraft {
        id: book.id(),
        owner_id: book.owner_id(),
        title: book.title().to_owned(),
        isbn: book.isbn().map(str::to_owned),
        description: book.description().map(str::to_owned),
        authors: book.authors().map(str::to_owned),
        genres: book.genres().map(str::to_owned),
        publisher: book.publisher().map(str::to_owned),
        publication_year: book.publication_year(),
        page_count: book.page_count(),
        language: book.language().to_owned(),
        cover_image_url: book.cover_image_url().map(str::to_owned),
        availability,
    })
    .expect("rebuilding a valid book cannot fail")
}

impl World {
    async fn add_user(&self, name: &str) -> User {
        let user = User::new(
            Uuid::new_v4(),
            Username::new(name).expect("valid username"),
            EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
            Role::User,
            true,
        );
        self.state
            .lock()
            .await
            .users
            .insert(user.id(), user.clone());
        user
    }

    async fn add_book(&self, owner: &User, title: &str) -> Book {
        let book = Book::new(BookDraft {
            id: Uuid::new_v4(),
            owner_id: owner.id(),
            title: title.to_owned(),
            isbn: None,
            description: None,
            authors: None,
            genres: None,
            publisher: None,
            publication_year: None,
            page_count: None,
            language: "English".to_owned(),
            cover_image_url: None,
            availability: Availability::Available,
        })
        .expect("valid book");
        self.state
            .lock()
            .await
            .books
            .insert(book.id(), book.clone());
        book
    }

    async fn book(&self, book_id: Uuid) -> Book {
        self.state
            .lock()
            .await
            .books
            .get(&book_id)
            .cloned()
            .expect("book exists")
    }

    async fn exchanges_for_book(&self, book_id: Uuid) -> Vec<Exchange> {
        self.state
            .lock()
            .await
            .exchanges
            .values()
            .filter(|exchange| exchange.book_id() == book_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for World {
    async fn create(&self, user: &User, _password_hash: &str) -> Result<(), UserRepositoryError> {
        self.state
            .lock()
            .await
            .users
            .insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.state.lock().await.users.get(user_id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn find_credentials(
        &self,
        _username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        Ok(None)
    }
}

#[async_trait]
impl BookRepository for World {
    async fn create(&self, book: &Book) -> Result<(), BookRepositoryError> {
        self.state
            .lock()
            .await
            .books
            .insert(book.id(), book.clone());
        Ok(())
    }

    async fn find_by_id(&self, book_id: &Uuid) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self.state.lock().await.books.get(book_id).cloned())
    }

    async fn update(&self, book: &Book) -> Result<(), BookRepositoryError> {
        self.state
            .lock()
            .await
            .books
            .insert(book.id(), book.clone());
        Ok(())
    }

    async fn delete(&self, book_id: &Uuid) -> Result<bool, BookRepositoryError> {
        Ok(self.state.lock().await.books.remove(book_id).is_some())
    }

    async fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .books
            .values()
            .filter(|book| book.owner_id() == *owner_id)
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        _filter: &BookSearchFilter,
        page: &PageRequest,
    ) -> Result<Page<Book>, BookRepositoryError> {
        Ok(Page::empty(page))
    }
}

#[async_trait]
impl ExchangeLedger for World {
    async fn create_request(&self, exchange: &Exchange) -> Result<(), ExchangeLedgerError> {
        // One critical section covers the availability re-check and both
        // writes, mirroring the row-locked transaction of the SQL adapter.
        let mut state = self.state.lock().await;
        let book = state
            .books
            .get(&exchange.book_id())
            .cloned()
            .ok_or_else(|| ExchangeLedgerError::query("book no longer exists"))?;
        if !book.is_available() {
            return Err(ExchangeLedgerError::book_unavailable());
        }
        state
            .books
            .insert(book.id(), with_availability(&book, Availability::Reserved));
        state.exchanges.insert(exchange.id(), exchange.clone());
        Ok(())
    }

    async fn apply_transition(
        &self,
        transition: ExchangeTransition,
    ) -> Result<(), ExchangeLedgerError> {
        let mut state = self.state.lock().await;
        let stored = state
            .exchanges
            .get(&transition.exchange.id())
            .ok_or_else(|| ExchangeLedgerError::query("exchange disappeared"))?;
        if stored.status() != transition.expected_status {
            return Err(ExchangeLedgerError::state_conflict());
        }
        if let Some(availability) = transition.book_availability {
            let book = state
                .books
                .get(&transition.exchange.book_id())
                .cloned()
                .ok_or_else(|| ExchangeLedgerError::query("book no longer exists"))?;
            state
                .books
                .insert(book.id(), with_availability(&book, availability));
        }
        state
            .exchanges
            .insert(transition.exchange.id(), transition.exchange);
        Ok(())
    }

    async fn find_by_id(
        &self,
        exchange_id: &Uuid,
    ) -> Result<Option<Exchange>, ExchangeLedgerError> {
        Ok(self.state.lock().await.exchanges.get(exchange_id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &Uuid,
        page: &PageRequest,
        _sort: SortDirection,
    ) -> Result<Page<Exchange>, ExchangeLedgerError> {
        let found: Vec<Exchange> = self
            .state
            .lock()
            .await
            .exchanges
            .values()
            .filter(|e| e.owner_id() == *user_id || e.requester_id() == *user_id)
            .cloned()
            .collect();
        let total = found.len() as u64;
        Ok(Page::new(found, page, total))
    }

    async fn list_pending_for_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<Exchange>, ExchangeLedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .exchanges
            .values()
            .filter(|e| e.owner_id() == *owner_id && e.is_pending())
            .cloned()
            .collect())
    }

    async fn list_by_requester(
        &self,
        requester_id: &Uuid,
    ) -> Result<Vec<Exchange>, ExchangeLedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .exchanges
            .values()
            .filter(|e| e.requester_id() == *requester_id)
            .cloned()
            .collect())
    }
}

fn workflow(world: &World) -> ExchangeWorkflowService<World, World, World> {
    ExchangeWorkflowService::new(
        Arc::new(world.clone()),
        Arc::new(world.clone()),
        Arc::new(world.clone()),
        Arc::new(DefaultClock),
    )
}

fn queries(world: &World) -> ExchangeQueryService<World, World> {
    ExchangeQueryService::new(Arc::new(world.clone()), Arc::new(world.clone()))
}

#[tokio::test]
async fn full_round_trip_reaches_completed_and_marks_the_book_exchanged() {
    let world = World::default();
    let bob = world.add_user("bob").await;
    let alice = world.add_user("alice").await;
    let book = world.add_book(&bob, "Dead Souls").await;
    let service = workflow(&world);

    let created = service
        .create_request(CreateExchangeRequest {
            book_id: book.id(),
            requester: alice.username().clone(),
        })
        .await
        .expect("available book accepts a request");
    assert_eq!(created.exchange.status, ExchangeStatus::Pending);
    assert_eq!(
        world.book(book.id()).await.availability(),
        Availability::Reserved
    );

    let approved = service
        .approve(ExchangeDecisionRequest {
            exchange_id: created.exchange.id,
            caller: bob.username().clone(),
        })
        .await
        .expect("owner approves");
    assert_eq!(approved.exchange.status, ExchangeStatus::Accepted);
    assert_eq!(
        world.book(book.id()).await.availability(),
        Availability::Reserved
    );

    let completed = service
        .complete(ExchangeDecisionRequest {
            exchange_id: created.exchange.id,
            caller: bob.username().clone(),
        })
        .await
        .expect("owner completes");
    assert_eq!(completed.exchange.status, ExchangeStatus::Completed);
    assert!(completed.exchange.completed);
    assert!(completed.exchange.exchange_date.is_some());
    assert_eq!(
        world.book(book.id()).await.availability(),
        Availability::Exchanged
    );
}

#[tokio::test]
async fn racing_requests_on_one_book_admit_exactly_one_winner() {
    let world = World::default();
    let bob = world.add_user("bob").await;
    let alice = world.add_user("alice").await;
    let carol = world.add_user("carol").await;
    let book = world.add_book(&bob, "Oblomov").await;

    let service = Arc::new(workflow(&world));
    let first = {
        let service = Arc::clone(&service);
        let requester = alice.username().clone();
        let book_id = book.id();
        tokio::spawn(async move {
            service
                .create_request(CreateExchangeRequest { book_id, requester })
                .await
        })
    };
    let second = {
        let service = Arc::clone(&service);
        let requester = carol.username().clone();
        let book_id = book.id();
        tokio::spawn(async move {
            service
                .create_request(CreateExchangeRequest { book_id, requester })
                .await
        })
    };

    let outcomes = [
        first.await.expect("task completes"),
        second.await.expect("task completes"),
    ];
    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1, "exactly one request may reserve the book");

    let loser = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("one request lost the race");
    assert_eq!(loser.code(), ErrorCode::Conflict);

    let ledger_entries = world.exchanges_for_book(book.id()).await;
    assert_eq!(ledger_entries.len(), 1);
    assert!(ledger_entries.iter().all(Exchange::is_pending));
    assert_eq!(
        world.book(book.id()).await.availability(),
        Availability::Reserved
    );
}

#[tokio::test]
async fn reject_returns_the_book_and_keeps_the_audit_record() {
    let world = World::default();
    let bob = world.add_user("bob").await;
    let alice = world.add_user("alice").await;
    let book = world.add_book(&bob, "Fathers and Sons").await;
    let service = workflow(&world);

    let created = service
        .create_request(CreateExchangeRequest {
            book_id: book.id(),
            requester: alice.username().clone(),
        })
        .await
        .expect("available book accepts a request");

    service
        .reject(RejectExchangeRequest {
            exchange_id: created.exchange.id,
            caller: bob.username().clone(),
            reason: Some("keeping it after all".to_owned()),
        })
        .await
        .expect("owner rejects");

    assert_eq!(
        world.book(book.id()).await.availability(),
        Availability::Available
    );
    let entries = world.exchanges_for_book(book.id()).await;
    assert_eq!(entries.len(), 1, "rejected exchanges stay in the ledger");
    let entry = entries.first().expect("one ledger entry");
    assert_eq!(entry.status(), ExchangeStatus::Rejected);
    assert_eq!(entry.owner_response(), Some("keeping it after all"));

    // The freed book can be requested again.
    let again = service
        .create_request(CreateExchangeRequest {
            book_id: book.id(),
            requester: alice.username().clone(),
        })
        .await
        .expect("freed book accepts a new request");
    assert_eq!(again.exchange.status, ExchangeStatus::Pending);
}

#[tokio::test]
async fn cancellation_frees_the_book_for_other_requesters() {
    let world = World::default();
    let bob = world.add_user("bob").await;
    let alice = world.add_user("alice").await;
    let book = world.add_book(&bob, "The Overcoat").await;
    let service = workflow(&world);

    let created = service
        .create_request(CreateExchangeRequest {
            book_id: book.id(),
            requester: alice.username().clone(),
        })
        .await
        .expect("available book accepts a request");

    service
        .cancel(CancelExchangeRequest {
            exchange_id: created.exchange.id,
            caller: alice.username().clone(),
        })
        .await
        .expect("requester cancels");

    assert_eq!(
        world.book(book.id()).await.availability(),
        Availability::Available
    );
}

#[tokio::test]
async fn listings_track_both_sides_of_the_exchange() {
    let world = World::default();
    let bob = world.add_user("bob").await;
    let alice = world.add_user("alice").await;
    let book = world.add_book(&bob, "Dead Souls").await;
    let service = workflow(&world);
    let query_service = queries(&world);

    service
        .create_request(CreateExchangeRequest {
            book_id: book.id(),
            requester: alice.username().clone(),
        })
        .await
        .expect("available book accepts a request");

    let incoming = query_service
        .incoming_requests(IncomingRequestsRequest {
            username: bob.username().clone(),
        })
        .await
        .expect("owner lists incoming");
    assert_eq!(incoming.exchanges.len(), 1);

    let outgoing = query_service
        .outgoing_requests(OutgoingRequestsRequest {
            username: alice.username().clone(),
        })
        .await
        .expect("requester lists outgoing");
    assert_eq!(outgoing.exchanges.len(), 1);

    // The owner has no outgoing requests of their own.
    let owner_outgoing = query_service
        .outgoing_requests(OutgoingRequestsRequest {
            username: bob.username().clone(),
        })
        .await
        .expect("owner lists outgoing");
    assert!(owner_outgoing.exchanges.is_empty());
}
