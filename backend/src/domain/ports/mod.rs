//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod book_metadata_source;
mod book_repository;
mod catalog_command;
mod catalog_query;
mod credential_hasher;
mod exchange_command;
mod exchange_ledger;
mod exchange_query;
mod identity;
mod review_command;
mod review_query;
mod review_repository;
mod user_repository;

#[cfg(test)]
pub use book_metadata_source::MockBookMetadataSource;
pub use book_metadata_source::{
    BookMetadata, BookMetadataSource, BookMetadataSourceError, FixtureBookMetadataSource,
};
#[cfg(test)]
pub use book_repository::MockBookRepository;
pub use book_repository::{
    BookRepository, BookRepositoryError, BookSearchFilter, FixtureBookRepository,
};
#[cfg(test)]
pub use catalog_command::MockCatalogCommand;
pub use catalog_command::{
    BookAttributes, BookPayload, BookResponse, CatalogCommand, CreateBookRequest,
    DeleteBookRequest, FixtureCatalogCommand, UpdateBookRequest,
};
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::{
    CatalogQuery, FixtureCatalogQuery, GetBookRequest, GetBookResponse, MyBooksRequest,
    MyBooksResponse, SearchBooksRequest, SearchBooksResponse,
};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError, FixtureCredentialHasher};
#[cfg(test)]
pub use exchange_command::MockExchangeCommand;
pub use exchange_command::{
    CancelExchangeRequest, CreateExchangeRequest, CreateExchangeResponse, ExchangeCommand,
    ExchangeDecisionRequest, ExchangeDecisionResponse, ExchangePayload, FixtureExchangeCommand,
    RejectExchangeRequest,
};
#[cfg(test)]
pub use exchange_ledger::MockExchangeLedger;
pub use exchange_ledger::{
    ExchangeLedger, ExchangeLedgerError, ExchangeTransition, FixtureExchangeLedger,
};
#[cfg(test)]
pub use exchange_query::MockExchangeQuery;
pub use exchange_query::{
    ExchangeQuery, FixtureExchangeQuery, IncomingRequestsRequest, IncomingRequestsResponse,
    MyExchangesRequest, MyExchangesResponse, OutgoingRequestsRequest, OutgoingRequestsResponse,
};
#[cfg(test)]
pub use identity::{MockIdentityCommand, MockIdentityQuery, MockLoginService};
pub use identity::{
    FixtureIdentityCommand, FixtureIdentityQuery, FixtureLoginService, IdentityCommand,
    IdentityQuery, LoginRequest, LoginResponse, LoginService, ProfileRequest, ProfileResponse,
    RegisterRequest, RegisterResponse, UserPayload,
};
#[cfg(test)]
pub use review_command::MockReviewCommand;
pub use review_command::{
    ApproveReviewRequest, CreateReviewRequest, CreateReviewResponse, FixtureReviewCommand,
    ReviewCommand, ReviewPayload,
};
#[cfg(test)]
pub use review_query::MockReviewQuery;
pub use review_query::{
    BookReviewsRequest, BookReviewsResponse, FixtureReviewQuery, ReviewQuery,
};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{FixtureReviewRepository, ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, StoredCredentials, UserRepository, UserRepositoryError,
};
