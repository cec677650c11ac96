//! Row models mediating between Diesel and the domain entities.
//!
//! Rows carry storage-shaped data (enums as text, audit timestamps);
//! conversion back to domain types goes through the validated constructors
//! so corrupt rows fail loudly instead of leaking invalid state.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{book_exchanges, books, reviews, users};

/// Read model for the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Unique account name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Password hash in PHC string format.
    pub password_hash: String,
    /// Moderation role as its storage string.
    pub role: String,
    /// Whether the account may act.
    pub enabled: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for the `users` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Unique account name.
    pub username: &'a str,
    /// Unique contact address.
    pub email: &'a str,
    /// Password hash in PHC string format.
    pub password_hash: &'a str,
    /// Moderation role as its storage string.
    pub role: &'a str,
    /// Whether the account may act.
    pub enabled: bool,
}

/// Read model for the `books` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning account.
    pub owner_id: Uuid,
    /// Title.
    pub title: String,
    /// ISBN when catalogued.
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
    /// Language of the copy.
    pub language: String,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Availability as its storage string.
    pub availability: String,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for the `books` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = books)]
pub struct NewBookRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Owning account.
    pub owner_id: Uuid,
    /// Title.
    pub title: &'a str,
    /// ISBN when catalogued.
    pub isbn: Option<&'a str>,
    /// Free-text description.
    pub description: Option<&'a str>,
    /// Author display string.
    pub authors: Option<&'a str>,
    /// Genre display string.
    pub genres: Option<&'a str>,
    /// Publisher name.
    pub publisher: Option<&'a str>,
    /// Year of publication.
    pub publication_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Language of the copy.
    pub language: &'a str,
    /// Cover image URL.
    pub cover_image_url: Option<&'a str>,
    /// Availability as its storage string.
    pub availability: &'a str,
}

/// Update model replacing a book's mutable columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = books)]
#[diesel(treat_none_as_null = true)]
pub struct BookChangeset<'a> {
    /// Title.
    pub title: &'a str,
    /// ISBN when catalogued.
    pub isbn: Option<&'a str>,
    /// Free-text description.
    pub description: Option<&'a str>,
    /// Author display string.
    pub authors: Option<&'a str>,
    /// Genre display string.
    pub genres: Option<&'a str>,
    /// Publisher name.
    pub publisher: Option<&'a str>,
    /// Year of publication.
    pub publication_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Language of the copy.
    pub language: &'a str,
    /// Cover image URL.
    pub cover_image_url: Option<&'a str>,
    /// Availability as its storage string.
    pub availability: &'a str,
}

/// Read model for the `book_exchanges` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = book_exchanges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExchangeRow {
    /// Primary key.
    pub id: Uuid,
    /// The requested book.
    pub book_id: Uuid,
    /// The book's owner at creation time.
    pub owner_id: Uuid,
    /// The requesting account.
    pub requester_id: Uuid,
    /// Lifecycle state as its storage string.
    pub status: String,
    /// Offer kind as its storage string.
    pub exchange_type: String,
    /// Owner's free-text response.
    pub owner_response: Option<String>,
    /// Handover timestamp.
    pub exchange_date: Option<DateTime<Utc>>,
    /// True iff status is completed.
    pub is_completed: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest transition.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for the `book_exchanges` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = book_exchanges)]
pub struct NewExchangeRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// The requested book.
    pub book_id: Uuid,
    /// The book's owner at creation time.
    pub owner_id: Uuid,
    /// The requesting account.
    pub requester_id: Uuid,
    /// Lifecycle state as its storage string.
    pub status: &'a str,
    /// Offer kind as its storage string.
    pub exchange_type: &'a str,
    /// Owner's free-text response.
    pub owner_response: Option<&'a str>,
    /// Handover timestamp.
    pub exchange_date: Option<DateTime<Utc>>,
    /// True iff status is completed.
    pub is_completed: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest transition.
    pub updated_at: DateTime<Utc>,
}

/// Update model applying one guarded exchange transition.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = book_exchanges)]
#[diesel(treat_none_as_null = true)]
pub struct ExchangeTransitionChangeset<'a> {
    /// New lifecycle state as its storage string.
    pub status: &'a str,
    /// Owner's free-text response.
    pub owner_response: Option<&'a str>,
    /// Handover timestamp.
    pub exchange_date: Option<DateTime<Utc>>,
    /// True iff status is completed.
    pub is_completed: bool,
    /// Timestamp of this transition.
    pub updated_at: DateTime<Utc>,
}

/// Read model for the `reviews` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    /// Primary key.
    pub id: Uuid,
    /// The reviewed book.
    pub book_id: Uuid,
    /// The reviewing account.
    pub user_id: Uuid,
    /// Star rating.
    pub rating: i16,
    /// Optional headline.
    pub title: Option<String>,
    /// Optional review body.
    pub content: Option<String>,
    /// Whether a moderator has approved the review.
    pub is_approved: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for the `reviews` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// The reviewed book.
    pub book_id: Uuid,
    /// The reviewing account.
    pub user_id: Uuid,
    /// Star rating.
    pub rating: i16,
    /// Optional headline.
    pub title: Option<&'a str>,
    /// Optional review body.
    pub content: Option<&'a str>,
    /// Whether a moderator has approved the review.
    pub is_approved: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}
