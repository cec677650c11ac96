//! Driving port for review reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::Error;

use super::review_command::ReviewPayload;

/// Request for a book's approved reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReviewsRequest {
    /// The reviewed book.
    pub book_id: Uuid,
    /// Page window.
    pub page: PageRequest,
}

/// Response carrying one page of approved reviews plus the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct BookReviewsResponse {
    /// Approved reviews, newest first.
    pub reviews: Page<ReviewPayload>,
    /// Mean approved rating, when any approved review exists.
    pub average_rating: Option<f64>,
}

/// Driving port for review reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    /// Approved reviews for a book with the rating aggregate.
    async fn book_reviews(&self, request: BookReviewsRequest)
    -> Result<BookReviewsResponse, Error>;
}

/// Fixture query port for adapter tests: a book with no reviews.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewQuery;

#[async_trait]
impl ReviewQuery for FixtureReviewQuery {
    async fn book_reviews(
        &self,
        request: BookReviewsRequest,
    ) -> Result<BookReviewsResponse, Error> {
        Ok(BookReviewsResponse {
            reviews: Page::empty(&request.page),
            average_rating: None,
        })
    }
}
