//! Port for review store persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::Review;

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review repository query failed: {message}",
        /// The user has already reviewed this book.
        DuplicateReview =>
            "this book has already been reviewed by the user",
    }
}

/// Port for review storage, moderation, and aggregate reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Persist a new review.
    ///
    /// Adapters map the (user, book) unique-constraint violation to
    /// [`ReviewRepositoryError::DuplicateReview`].
    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Find a review by id.
    async fn find_by_id(&self, review_id: &Uuid)
    -> Result<Option<Review>, ReviewRepositoryError>;

    /// Mark a review approved; returns whether a record existed.
    async fn set_approved(&self, review_id: &Uuid) -> Result<bool, ReviewRepositoryError>;

    /// Approved reviews for a book, newest first.
    async fn list_approved_for_book(
        &self,
        book_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Page<Review>, ReviewRepositoryError>;

    /// Mean approved rating for a book, if any approved review exists.
    async fn average_rating(&self, book_id: &Uuid) -> Result<Option<f64>, ReviewRepositoryError>;
}

/// Fixture implementation for tests that do not exercise reviews.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewRepository;

#[async_trait]
impl ReviewRepository for FixtureReviewRepository {
    async fn create(&self, _review: &Review) -> Result<(), ReviewRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _review_id: &Uuid,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(None)
    }

    async fn set_approved(&self, _review_id: &Uuid) -> Result<bool, ReviewRepositoryError> {
        Ok(false)
    }

    async fn list_approved_for_book(
        &self,
        _book_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Page<Review>, ReviewRepositoryError> {
        Ok(Page::empty(page))
    }

    async fn average_rating(
        &self,
        _book_id: &Uuid,
    ) -> Result<Option<f64>, ReviewRepositoryError> {
        Ok(None)
    }
}
