//! Review HTTP handlers.
//!
//! ```text
//! GET  /api/v1/books/{id}/reviews
//! POST /api/v1/books/{id}/reviews
//! PUT  /api/v1/reviews/{id}/approve
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    ApproveReviewRequest, BookReviewsRequest, CreateReviewRequest, ReviewPayload,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_page_request, parse_uuid};

/// Request payload for submitting a review.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewBody {
    /// Star rating, 1..=5.
    pub rating: i16,
    /// Optional headline.
    pub title: Option<String>,
    /// Optional review body.
    pub content: Option<String>,
}

/// One review as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    /// Review identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// The reviewed book.
    #[schema(format = "uuid")]
    pub book_id: String,
    /// The reviewing account.
    #[schema(format = "uuid")]
    pub user_id: String,
    /// Star rating.
    pub rating: i16,
    /// Optional headline.
    pub title: Option<String>,
    /// Optional review body.
    pub content: Option<String>,
    /// Whether a moderator has approved the review.
    pub approved: bool,
    /// Record creation timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<ReviewPayload> for ReviewBody {
    fn from(value: ReviewPayload) -> Self {
        Self {
            id: value.id.to_string(),
            book_id: value.book_id.to_string(),
            user_id: value.user_id.to_string(),
            rating: value.rating,
            title: value.title,
            content: value.content,
            approved: value.approved,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// A page of approved reviews with the rating aggregate.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPageBody {
    /// Reviews on this page.
    pub items: Vec<ReviewBody>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total approved reviews.
    pub total_items: u64,
    /// Total pages.
    pub total_pages: u64,
    /// Mean approved rating, when any approved review exists.
    pub average_rating: Option<f64>,
}

impl ReviewPageBody {
    fn new(reviews: Page<ReviewPayload>, average_rating: Option<f64>) -> Self {
        let page = reviews.page();
        let per_page = reviews.per_page();
        let total_items = reviews.total_items();
        let total_pages = reviews.total_pages();
        Self {
            items: reviews.into_items().into_iter().map(Into::into).collect(),
            page,
            per_page,
            total_items,
            total_pages,
            average_rating,
        }
    }
}

/// Query parameters for the review listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Approved reviews for a book.
#[utoipa::path(
    get,
    path = "/api/v1/books/{book_id}/reviews",
    params(
        ("book_id" = String, Path, description = "Book identifier"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("perPage" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Approved reviews", body = ReviewPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "bookReviews"
)]
#[get("/books/{book_id}/reviews")]
pub async fn book_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ReviewsQuery>,
) -> ApiResult<web::Json<ReviewPageBody>> {
    let book_id = parse_uuid(&path.into_inner(), FieldName::new("bookId"))?;
    let query = query.into_inner();
    let page = parse_page_request(query.page, query.per_page)?;

    let response = state
        .reviews_query
        .book_reviews(BookReviewsRequest { book_id, page })
        .await?;

    Ok(web::Json(ReviewPageBody::new(
        response.reviews,
        response.average_rating,
    )))
}

/// Submit a review for a book.
#[utoipa::path(
    post,
    path = "/api/v1/books/{book_id}/reviews",
    params(("book_id" = String, Path, description = "Book identifier")),
    request_body = CreateReviewBody,
    responses(
        (status = 200, description = "Review submitted, awaiting moderation", body = ReviewBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema),
        (status = 409, description = "Already reviewed by the caller", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview",
    security(("SessionCookie" = []))
)]
#[post("/books/{book_id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateReviewBody>,
) -> ApiResult<web::Json<ReviewBody>> {
    let reviewer = session.require_username()?;
    let book_id = parse_uuid(&path.into_inner(), FieldName::new("bookId"))?;
    let body = payload.into_inner();

    let response = state
        .reviews
        .create_review(CreateReviewRequest {
            book_id,
            reviewer,
            rating: body.rating,
            title: body.title,
            content: body.content,
        })
        .await?;

    Ok(web::Json(response.review.into()))
}

/// Approve a review (moderators only).
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{review_id}/approve",
    params(("review_id" = String, Path, description = "Review identifier")),
    responses(
        (status = 204, description = "Review approved"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller may not moderate", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "approveReview",
    security(("SessionCookie" = []))
)]
#[put("/reviews/{review_id}/approve")]
pub async fn approve_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_username()?;
    let review_id = parse_uuid(&path.into_inner(), FieldName::new("reviewId"))?;

    state
        .reviews
        .approve_review(ApproveReviewRequest { review_id, caller })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
