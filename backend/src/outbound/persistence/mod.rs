//! Diesel persistence adapters for the catalog, identity, ledger, and
//! review ports.

mod diesel_book_repository;
mod diesel_error_mapping;
mod diesel_exchange_ledger;
mod diesel_review_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_book_repository::DieselBookRepository;
pub use diesel_exchange_ledger::DieselExchangeLedger;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
