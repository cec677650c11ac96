//! Driving port for review mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Review, Username};

/// Serializable review payload for driving ports and adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    /// Stable review identifier.
    pub id: Uuid,
    /// The reviewed book.
    pub book_id: Uuid,
    /// The reviewing account.
    pub user_id: Uuid,
    /// Star rating, 1..=5.
    pub rating: i16,
    /// Optional headline.
    pub title: Option<String>,
    /// Optional review body.
    pub content: Option<String>,
    /// Whether a moderator has approved the review.
    pub approved: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewPayload {
    fn from(value: Review) -> Self {
        Self {
            id: value.id(),
            book_id: value.book_id(),
            user_id: value.user_id(),
            rating: value.rating().value(),
            title: value.title().map(str::to_owned),
            content: value.content().map(str::to_owned),
            approved: value.is_approved(),
            created_at: value.created_at(),
        }
    }
}

/// Request to review a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewRequest {
    /// The reviewed book.
    pub book_id: Uuid,
    /// Resolved identity of the reviewer.
    pub reviewer: Username,
    /// Star rating, 1..=5.
    pub rating: i16,
    /// Optional headline.
    pub title: Option<String>,
    /// Optional review body.
    pub content: Option<String>,
}

/// Response carrying the stored (not yet approved) review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewResponse {
    /// The created review.
    pub review: ReviewPayload,
}

/// Moderator approval of a pending review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveReviewRequest {
    /// The targeted review.
    pub review_id: Uuid,
    /// Resolved identity of the caller; must hold a moderating role.
    pub caller: Username,
}

/// Driving port for review mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Store a new, unapproved review.
    async fn create_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<CreateReviewResponse, Error>;

    /// Approve a review so it becomes publicly visible.
    async fn approve_review(&self, request: ApproveReviewRequest) -> Result<(), Error>;
}

/// Fixture command port for adapter tests; knows no books or reviews.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewCommand;

#[async_trait]
impl ReviewCommand for FixtureReviewCommand {
    async fn create_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<CreateReviewResponse, Error> {
        Err(Error::not_found(format!(
            "book {} not found",
            request.book_id
        )))
    }

    async fn approve_review(&self, request: ApproveReviewRequest) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "review {} not found",
            request.review_id
        )))
    }
}
