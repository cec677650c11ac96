//! Review domain services: creation, moderation, and reads.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    ApproveReviewRequest, BookRepository, BookRepositoryError, BookReviewsRequest,
    BookReviewsResponse, CreateReviewRequest, CreateReviewResponse, ReviewCommand, ReviewQuery,
    ReviewRepository, ReviewRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, Rating, Review, ReviewDraft, User, Username};

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review store unavailable: {message}"))
        }
        ReviewRepositoryError::DuplicateReview => {
            Error::conflict("you have already reviewed this book")
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review store error: {message}"))
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

/// Review service implementing the command and query driving ports.
#[derive(Clone)]
pub struct ReviewService<R, B, U> {
    reviews: Arc<R>,
    books: Arc<B>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, B, U> ReviewService<R, B, U> {
    /// Create a review service over the review, catalog, and identity ports.
    pub fn new(reviews: Arc<R>, books: Arc<B>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reviews,
            books,
            users,
            clock,
        }
    }
}

impl<R, B, U> ReviewService<R, B, U>
where
    R: ReviewRepository,
    B: BookRepository,
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
impl<R, B, U> ReviewCommand for ReviewService<R, B, U>
where
    R: ReviewRepository,
    B: BookRepository,
    U: UserRepository,
{
    async fn create_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<CreateReviewResponse, Error> {
        let reviewer = self.resolve_user(&request.reviewer).await?;
        let book = self
            .books
            .find_by_id(&request.book_id)
            .await
            .map_err(map_book_error)?
            .ok_or_else(|| Error::not_found(format!("book {} not found", request.book_id)))?;

        let rating =
            Rating::new(request.rating).map_err(|err| Error::invalid_request(err.to_string()))?;
        let review = Review::new(ReviewDraft {
            id: Uuid::new_v4(),
            book_id: book.id(),
            user_id: reviewer.id(),
            rating,
            title: request.title,
            content: request.content,
            approved: false,
            created_at: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.reviews
            .create(&review)
            .await
            .map_err(map_review_error)?;

        info!(
            actor = %request.reviewer,
            review_id = %review.id(),
            book_id = %review.book_id(),
            "review submitted"
        );
        Ok(CreateReviewResponse {
            review: review.into(),
        })
    }

    async fn approve_review(&self, request: ApproveReviewRequest) -> Result<(), Error> {
        let caller = self.resolve_user(&request.caller).await?;
        if !caller.role().can_moderate() {
            return Err(Error::forbidden("only moderators may approve reviews"));
        }

        let approved = self
            .reviews
            .set_approved(&request.review_id)
            .await
            .map_err(map_review_error)?;
        if !approved {
            return Err(Error::not_found(format!(
                "review {} not found",
                request.review_id
            )));
        }

        info!(actor = %request.caller, review_id = %request.review_id, "review approved");
        Ok(())
    }
}

#[async_trait]
impl<R, B, U> ReviewQuery for ReviewService<R, B, U>
where
    R: ReviewRepository,
    B: BookRepository,
    U: UserRepository,
{
    async fn book_reviews(
        &self,
        request: BookReviewsRequest,
    ) -> Result<BookReviewsResponse, Error> {
        let reviews = self
            .reviews
            .list_approved_for_book(&request.book_id, &request.page)
            .await
            .map_err(map_review_error)?;
        let average_rating = self
            .reviews
            .average_rating(&request.book_id)
            .await
            .map_err(map_review_error)?;

        Ok(BookReviewsResponse {
            reviews: reviews.map(Into::into),
            average_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        MockBookRepository, MockReviewRepository, MockUserRepository,
    };
    use crate::domain::{
        Availability, Book, BookDraft, EmailAddress, ErrorCode, Role,
    };

    fn fixed_clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
                .single()
                .expect("valid timestamp"),
        );
        Arc::new(clock)
    }

    fn user_with_role(name: &str, role: Role) -> User {
        User::new(
            Uuid::new_v4(),
            Username::new(name).expect("valid username"),
            EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
            role,
            true,
        )
    }

    fn some_book() -> Book {
        Book::new(BookDraft {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Fathers and Sons".to_owned(),
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
        .expect("valid book")
    }

    #[rstest]
    #[tokio::test]
    async fn new_reviews_await_moderation() {
        let reviewer = user_with_role("alice", Role::User);
        let book = some_book();
        let book_id = book.id();

        let mut users = MockUserRepository::new();
        let reviewer_clone = reviewer.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(reviewer_clone.clone())));
        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_create()
            .withf(|review| !review.is_approved())
            .times(1)
            .returning(|_| Ok(()));

        let response = ReviewService::new(
            Arc::new(reviews),
            Arc::new(books),
            Arc::new(users),
            fixed_clock(),
        )
        .create_review(CreateReviewRequest {
            book_id,
            reviewer: reviewer.username().clone(),
            rating: 4,
            title: None,
            content: Some("Finished it in one sitting.".to_owned()),
        })
        .await
        .expect("valid review");

        assert!(!response.review.approved);
        assert_eq!(response.review.rating, 4);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[tokio::test]
    async fn out_of_range_ratings_are_invalid(#[case] rating: i16) {
        let reviewer = user_with_role("alice", Role::User);
        let book = some_book();
        let book_id = book.id();

        let mut users = MockUserRepository::new();
        let reviewer_clone = reviewer.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(reviewer_clone.clone())));
        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let reviews = MockReviewRepository::new();

        let error = ReviewService::new(
            Arc::new(reviews),
            Arc::new(books),
            Arc::new(users),
            fixed_clock(),
        )
        .create_review(CreateReviewRequest {
            book_id,
            reviewer: reviewer.username().clone(),
            rating,
            title: None,
            content: None,
        })
        .await
        .expect_err("rating out of range");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn second_review_per_book_is_a_conflict() {
        let reviewer = user_with_role("alice", Role::User);
        let book = some_book();
        let book_id = book.id();

        let mut users = MockUserRepository::new();
        let reviewer_clone = reviewer.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(reviewer_clone.clone())));
        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_create()
            .returning(|_| Err(ReviewRepositoryError::duplicate_review()));

        let error = ReviewService::new(
            Arc::new(reviews),
            Arc::new(books),
            Arc::new(users),
            fixed_clock(),
        )
        .create_review(CreateReviewRequest {
            book_id,
            reviewer: reviewer.username().clone(),
            rating: 5,
            title: None,
            content: None,
        })
        .await
        .expect_err("duplicate review");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn regular_users_cannot_moderate() {
        let caller = user_with_role("alice", Role::User);
        let mut users = MockUserRepository::new();
        let caller_clone = caller.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(caller_clone.clone())));
        let reviews = MockReviewRepository::new();

        let error = ReviewService::new(
            Arc::new(reviews),
            Arc::new(MockBookRepository::new()),
            Arc::new(users),
            fixed_clock(),
        )
        .approve_review(ApproveReviewRequest {
            review_id: Uuid::new_v4(),
            caller: caller.username().clone(),
        })
        .await
        .expect_err("not a moderator");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn moderators_approve_existing_reviews() {
        let caller = user_with_role("mods", Role::Moderator);
        let mut users = MockUserRepository::new();
        let caller_clone = caller.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(caller_clone.clone())));
        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_set_approved()
            .times(1)
            .returning(|_| Ok(true));

        ReviewService::new(
            Arc::new(reviews),
            Arc::new(MockBookRepository::new()),
            Arc::new(users),
            fixed_clock(),
        )
        .approve_review(ApproveReviewRequest {
            review_id: Uuid::new_v4(),
            caller: caller.username().clone(),
        })
        .await
        .expect("moderator approves");
    }
}
