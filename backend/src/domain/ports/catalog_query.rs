//! Driving port for catalog reads and search.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Error, Username};

use super::catalog_command::BookPayload;

/// Request for one book's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBookRequest {
    /// The targeted book.
    pub book_id: Uuid,
}

/// Response carrying a book together with its review aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct GetBookResponse {
    /// The stored listing.
    pub book: BookPayload,
    /// Mean approved rating, when any approved review exists.
    pub average_rating: Option<f64>,
}

/// Catalog search request. Criteria are conjunctive; only available books
/// are returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBooksRequest {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Case-insensitive author substring.
    pub author: Option<String>,
    /// Case-insensitive genre substring.
    pub genre: Option<String>,
    /// When set, books owned by this caller are excluded from the results.
    pub exclude_caller: Option<Username>,
    /// Page window.
    pub page: PageRequest,
}

/// Response carrying one page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBooksResponse {
    /// Matching available books, newest first.
    pub books: Page<BookPayload>,
}

/// Request for the caller's own shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyBooksRequest {
    /// Resolved identity of the caller.
    pub username: Username,
}

/// Response carrying the caller's listings, any availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyBooksResponse {
    /// The caller's listings, newest first.
    pub books: Vec<BookPayload>,
}

/// Driving port for catalog reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// One book's detail view with its review aggregate.
    async fn get_book(&self, request: GetBookRequest) -> Result<GetBookResponse, Error>;

    /// Search available books.
    async fn search_books(&self, request: SearchBooksRequest)
    -> Result<SearchBooksResponse, Error>;

    /// The caller's own listings, any availability.
    async fn my_books(&self, request: MyBooksRequest) -> Result<MyBooksResponse, Error>;
}

/// Fixture query port for adapter tests: an empty catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogQuery;

#[async_trait]
impl CatalogQuery for FixtureCatalogQuery {
    async fn get_book(&self, request: GetBookRequest) -> Result<GetBookResponse, Error> {
        Err(Error::not_found(format!(
            "book {} not found",
            request.book_id
        )))
    }

    async fn search_books(
        &self,
        request: SearchBooksRequest,
    ) -> Result<SearchBooksResponse, Error> {
        Ok(SearchBooksResponse {
            books: Page::empty(&request.page),
        })
    }

    async fn my_books(&self, _request: MyBooksRequest) -> Result<MyBooksResponse, Error> {
        Ok(MyBooksResponse { books: Vec::new() })
    }
}
