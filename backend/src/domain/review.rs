//! Book review data model.
//!
//! Reviews are independent of the exchange core: anyone may review a book
//! they do not own, one review per user and book. New reviews start
//! unapproved and become visible once a moderator approves them.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum review title length.
pub const REVIEW_TITLE_MAX: usize = 100;
/// Maximum review body length.
pub const REVIEW_CONTENT_MAX: usize = 2000;

/// Validation errors raised by [`Rating::new`] and [`Review::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    /// Rating outside 1..=5.
    RatingOutOfRange,
    /// A text field exceeded its maximum length.
    FieldTooLong {
        /// Field name, stable for error details.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for ReviewValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RatingOutOfRange => write!(f, "rating must be between 1 and 5"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ReviewValidationError {}

/// Star rating in the closed range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(i16);

impl Rating {
    /// Validate and construct a rating.
    pub const fn new(value: i16) -> Result<Self, ReviewValidationError> {
        if value < 1 || value > 5 {
            return Err(ReviewValidationError::RatingOutOfRange);
        }
        Ok(Self(value))
    }

    /// The numeric rating value.
    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input payload for [`Review::new`].
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    /// Stable review identifier.
    pub id: Uuid,
    /// The reviewed book.
    pub book_id: Uuid,
    /// The reviewing account.
    pub user_id: Uuid,
    /// Star rating.
    pub rating: Rating,
    /// Optional headline.
    pub title: Option<String>,
    /// Optional review body.
    pub content: Option<String>,
    /// Whether a moderator has approved the review.
    pub approved: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A moderated book review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    rating: Rating,
    title: Option<String>,
    content: Option<String>,
    approved: bool,
    created_at: DateTime<Utc>,
}

impl Review {
    /// Creates a validated review.
    pub fn new(draft: ReviewDraft) -> Result<Self, ReviewValidationError> {
        if matches!(draft.title.as_deref(), Some(t) if t.chars().count() > REVIEW_TITLE_MAX) {
            return Err(ReviewValidationError::FieldTooLong {
                field: "title",
                max: REVIEW_TITLE_MAX,
            });
        }
        if matches!(draft.content.as_deref(), Some(c) if c.chars().count() > REVIEW_CONTENT_MAX) {
            return Err(ReviewValidationError::FieldTooLong {
                field: "content",
                max: REVIEW_CONTENT_MAX,
            });
        }
        Ok(Self {
            id: draft.id,
            book_id: draft.book_id,
            user_id: draft.user_id,
            rating: draft.rating,
            title: draft.title,
            content: draft.content,
            approved: draft.approved,
            created_at: draft.created_at,
        })
    }

    /// Stable review identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The reviewed book.
    #[must_use]
    pub const fn book_id(&self) -> Uuid {
        self.book_id
    }

    /// The reviewing account.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Star rating.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }

    /// Optional headline.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Optional review body.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Whether a moderator has approved the review.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approved
    }

    /// Record creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn accepts_in_range_ratings(#[case] value: i16) {
        assert_eq!(Rating::new(value).expect("in range").value(), value);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    fn rejects_out_of_range_ratings(#[case] value: i16) {
        assert_eq!(
            Rating::new(value).expect_err("out of range"),
            ReviewValidationError::RatingOutOfRange
        );
    }

    #[rstest]
    fn rejects_oversized_content() {
        let draft = ReviewDraft {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: Rating::new(4).expect("in range"),
            title: None,
            content: Some("x".repeat(REVIEW_CONTENT_MAX + 1)),
            approved: false,
            created_at: Utc::now(),
        };
        assert!(matches!(
            Review::new(draft).expect_err("oversized"),
            ReviewValidationError::FieldTooLong {
                field: "content",
                ..
            }
        ));
    }

    #[rstest]
    fn new_reviews_default_to_unapproved() {
        let draft = ReviewDraft {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: Rating::new(5).expect("in range"),
            title: Some("A favourite".to_owned()),
            content: None,
            approved: false,
            created_at: Utc::now(),
        };
        let review = Review::new(draft).expect("valid draft");
        assert!(!review.is_approved());
    }
}
