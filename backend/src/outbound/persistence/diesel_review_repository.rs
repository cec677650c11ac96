//! PostgreSQL-backed `ReviewRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{Rating, Review, ReviewDraft};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    if unique_violation_constraint(&error).is_some() {
        return ReviewRepositoryError::duplicate_review();
    }
    map_basic_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

/// Convert a review row into a validated domain review.
fn row_to_review(row: ReviewRow) -> Result<Review, ReviewRepositoryError> {
    let rating = Rating::new(row.rating)
        .map_err(|err| ReviewRepositoryError::query(format!("stored rating invalid: {err}")))?;

    Review::new(ReviewDraft {
        id: row.id,
        book_id: row.book_id,
        user_id: row.user_id,
        rating,
        title: row.title,
        content: row.content,
        approved: row.is_approved,
        created_at: row.created_at,
    })
    .map_err(|err| ReviewRepositoryError::query(err.to_string()))
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewReviewRow {
            id: review.id(),
            book_id: review.book_id(),
            user_id: review.user_id(),
            rating: review.rating().value(),
            title: review.title(),
            content: review.content(),
            is_approved: review.is_approved(),
            created_at: review.created_at(),
        };

        diesel::insert_into(reviews::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        review_id: &Uuid,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = reviews::table
            .filter(reviews::id.eq(review_id))
            .select(ReviewRow::as_select())
            .first::<ReviewRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_review).transpose()
    }

    async fn set_approved(&self, review_id: &Uuid) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(reviews::table.filter(reviews::id.eq(review_id)))
            .set((
                reviews::is_approved.eq(true),
                reviews::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn list_approved_for_book(
        &self,
        book_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Page<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = reviews::table
            .filter(reviews::book_id.eq(book_id).and(reviews::is_approved.eq(true)))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::book_id.eq(book_id).and(reviews::is_approved.eq(true)))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .offset(page.offset())
            .limit(page.limit())
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let found = rows
            .into_iter()
            .map(row_to_review)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(found, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn average_rating(
        &self,
        book_id: &Uuid,
    ) -> Result<Option<f64>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Cast to float8 so the aggregate maps onto f64 without a numeric
        // intermediary.
        reviews::table
            .filter(reviews::book_id.eq(book_id).and(reviews::is_approved.eq(true)))
            .select(diesel::dsl::sql::<diesel::sql_types::Nullable<diesel::sql_types::Double>>(
                "avg(rating)::float8",
            ))
            .first::<Option<f64>>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
