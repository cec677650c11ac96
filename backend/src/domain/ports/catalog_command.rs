//! Driving port for catalog mutations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Availability, Book, Error, Username};

/// Serializable book payload for driving ports and adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    /// Stable book identifier.
    pub id: Uuid,
    /// Owning user identifier.
    pub owner_id: Uuid,
    /// Book title.
    pub title: String,
    /// Optional ISBN.
    pub isbn: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Author display string.
    pub authors: Option<String>,
    /// Genre display string.
    pub genres: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Year of publication.
    pub publication_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Language the copy is printed in.
    pub language: String,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Exchange availability.
    pub availability: Availability,
}

impl From<Book> for BookPayload {
    fn from(value: Book) -> Self {
        Self {
            id: value.id(),
            owner_id: value.owner_id(),
            title: value.title().to_owned(),
            isbn: value.isbn().map(str::to_owned),
            description: value.description().map(str::to_owned),
            authors: value.authors().map(str::to_owned),
            genres: value.genres().map(str::to_owned),
            publisher: value.publisher().map(str::to_owned),
            publication_year: value.publication_year(),
            page_count: value.page_count(),
            language: value.language().to_owned(),
            cover_image_url: value.cover_image_url().map(str::to_owned),
            availability: value.availability(),
        }
    }
}

/// Attributes for a new or updated listing, minus identity and availability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookAttributes {
    /// Book title.
    pub title: String,
    /// Optional ISBN.
    pub isbn: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Author display string.
    pub authors: Option<String>,
    /// Genre display string.
    pub genres: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Year of publication.
    pub publication_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Language the copy is printed in; empty falls back to the default.
    pub language: Option<String>,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
}

/// Request to list a new book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookRequest {
    /// Resolved identity of the listing owner.
    pub owner: Username,
    /// The listing's attributes.
    pub attributes: BookAttributes,
}

/// Request to update an existing listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBookRequest {
    /// The targeted book.
    pub book_id: Uuid,
    /// Resolved identity of the caller; must be the book's owner.
    pub caller: Username,
    /// Replacement attributes.
    pub attributes: BookAttributes,
    /// Optional availability toggle; only available ↔ not_available is legal
    /// here, reservation states belong to the exchange workflow.
    pub availability: Option<Availability>,
}

/// Request to delete a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBookRequest {
    /// The targeted book.
    pub book_id: Uuid,
    /// Resolved identity of the caller; must be the book's owner.
    pub caller: Username,
}

/// Response carrying a stored listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookResponse {
    /// The listing after the mutation.
    pub book: BookPayload,
}

/// Driving port for catalog mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    /// List a new book owned by the caller.
    async fn create_book(&self, request: CreateBookRequest) -> Result<BookResponse, Error>;

    /// Update a listing the caller owns.
    async fn update_book(&self, request: UpdateBookRequest) -> Result<BookResponse, Error>;

    /// Delete a listing the caller owns.
    async fn delete_book(&self, request: DeleteBookRequest) -> Result<(), Error>;
}

/// Fixture command port for adapter tests; the catalog is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogCommand;

#[async_trait]
impl CatalogCommand for FixtureCatalogCommand {
    async fn create_book(&self, _request: CreateBookRequest) -> Result<BookResponse, Error> {
        Err(Error::service_unavailable("catalog not configured"))
    }

    async fn update_book(&self, request: UpdateBookRequest) -> Result<BookResponse, Error> {
        Err(Error::not_found(format!(
            "book {} not found",
            request.book_id
        )))
    }

    async fn delete_book(&self, request: DeleteBookRequest) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "book {} not found",
            request.book_id
        )))
    }
}
