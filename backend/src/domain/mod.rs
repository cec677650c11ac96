//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed entities of the marketplace (users,
//! books, exchanges, reviews), the ports adapters plug into, and the
//! services that drive the exchange workflow. Types are immutable; state
//! changes are expressed as consuming transitions so invariants hold by
//! construction.

pub mod book;
pub mod catalog_service;
pub mod error;
pub mod exchange;
pub mod exchange_service;
pub mod identity_service;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod trace_id;
pub mod user;

pub use self::book::{Availability, Book, BookDraft, BookValidationError};
pub use self::catalog_service::{CatalogCommandService, CatalogQueryService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::exchange::{
    Exchange, ExchangeRecord, ExchangeStatus, ExchangeTransitionError, ExchangeType,
    ExchangeValidationError, TransitionAction,
};
pub use self::exchange_service::{ExchangeQueryService, ExchangeWorkflowService};
pub use self::identity_service::IdentityService;
pub use self::review::{Rating, Review, ReviewDraft, ReviewValidationError};
pub use self::review_service::ReviewService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, Role, User, UserValidationError, Username};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
