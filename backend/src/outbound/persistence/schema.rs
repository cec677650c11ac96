//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations/`
//! exactly; Diesel uses them for compile-time query validation. Regenerate
//! with `diesel print-schema` after a migration changes the layout.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique account name (max 50 characters).
        username -> Varchar,
        /// Unique contact address (max 100 characters).
        email -> Varchar,
        /// Password hash in PHC string format.
        password_hash -> Text,
        /// Moderation role: user, moderator, or admin.
        role -> Varchar,
        /// Whether the account may act.
        enabled -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogued books with ownership and exchange availability.
    books (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account.
        owner_id -> Uuid,
        /// Title (max 255 characters).
        title -> Varchar,
        /// Unique ISBN when catalogued (max 20 characters).
        isbn -> Nullable<Varchar>,
        /// Free-text description.
        description -> Nullable<Text>,
        /// Author display string.
        authors -> Nullable<Text>,
        /// Genre display string.
        genres -> Nullable<Text>,
        /// Publisher name (max 100 characters).
        publisher -> Nullable<Varchar>,
        /// Year of publication.
        publication_year -> Nullable<Int4>,
        /// Page count, positive when present.
        page_count -> Nullable<Int4>,
        /// Language of the copy (max 50 characters).
        language -> Varchar,
        /// Cover image URL.
        cover_image_url -> Nullable<Text>,
        /// Exchange availability: available, reserved, exchanged, not_available.
        availability -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Exchange ledger: one row per request, never deleted.
    book_exchanges (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The requested book.
        book_id -> Uuid,
        /// The book's owner at creation time.
        owner_id -> Uuid,
        /// The requesting account.
        requester_id -> Uuid,
        /// Lifecycle state: pending, accepted, rejected, completed, cancelled.
        status -> Varchar,
        /// Offer kind: book_for_book, book_for_money, free_gift.
        exchange_type -> Varchar,
        /// Owner's free-text response, set on rejection.
        owner_response -> Nullable<Text>,
        /// Handover timestamp, set on completion.
        exchange_date -> Nullable<Timestamptz>,
        /// True iff status is completed.
        is_completed -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Timestamp of the latest transition.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Moderated book reviews, unique per (user, book).
    reviews (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The reviewed book.
        book_id -> Uuid,
        /// The reviewing account.
        user_id -> Uuid,
        /// Star rating in 1..=5.
        rating -> Int2,
        /// Optional headline (max 100 characters).
        title -> Nullable<Varchar>,
        /// Optional review body.
        content -> Nullable<Text>,
        /// Whether a moderator has approved the review.
        is_approved -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(books -> users (owner_id));
diesel::joinable!(reviews -> books (book_id));

diesel::allow_tables_to_appear_in_same_query!(users, books, book_exchanges, reviews);
