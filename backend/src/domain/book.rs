//! Catalog book data model.
//!
//! A book is owned by exactly one user and carries an availability flag the
//! exchange workflow engine keeps consistent with the exchange ledger: a
//! `Reserved` book has exactly one active exchange request, an `Available`
//! book has none.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum title length accepted by the catalog.
pub const TITLE_MAX: usize = 255;
/// Maximum ISBN length accepted by the catalog.
pub const ISBN_MAX: usize = 20;
/// Maximum publisher length accepted by the catalog.
pub const PUBLISHER_MAX: usize = 100;
/// Maximum language length accepted by the catalog.
pub const LANGUAGE_MAX: usize = 50;

/// Availability of a book for exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Open for new exchange requests.
    #[default]
    Available,
    /// Held by an active (pending or accepted) exchange request.
    Reserved,
    /// Handed over through a completed exchange.
    Exchanged,
    /// Withdrawn from exchange by the owner.
    NotAvailable,
}

impl Availability {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Exchanged => "exchanged",
            Self::NotAvailable => "not_available",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Availability {
    type Err = BookValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "exchanged" => Ok(Self::Exchanged),
            "not_available" => Ok(Self::NotAvailable),
            _ => Err(BookValidationError::UnknownAvailability),
        }
    }
}

/// Validation errors raised by [`Book::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// Title was empty after trimming.
    EmptyTitle,
    /// A text field exceeded its maximum length.
    FieldTooLong {
        /// Field name, stable for error details.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
    /// Page count must be positive when present.
    NonPositivePageCount,
    /// Availability string did not match a known state.
    UnknownAvailability,
}

impl fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::NonPositivePageCount => write!(f, "page count must be positive"),
            Self::UnknownAvailability => write!(
                f,
                "availability must be available, reserved, exchanged, or not_available",
            ),
        }
    }
}

impl std::error::Error for BookValidationError {}

/// Input payload for [`Book::new`].
#[derive(Debug, Clone)]
pub struct BookDraft {
    /// Stable book identifier.
    pub id: Uuid,
    /// Owning user identifier, resolved through the identity store.
    pub owner_id: Uuid,
    /// Book title.
    pub title: String,
    /// Optional ISBN, unique when present.
    pub isbn: Option<String>,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Display string of author names, comma separated.
    pub authors: Option<String>,
    /// Display string of genre names, comma separated.
    pub genres: Option<String>,
    /// Optional publisher name.
    pub publisher: Option<String>,
    /// Optional year of publication.
    pub publication_year: Option<i32>,
    /// Optional page count, positive when present.
    pub page_count: Option<i32>,
    /// Language the copy is printed in.
    pub language: String,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Exchange availability.
    pub availability: Availability,
}

fn check_length(
    value: Option<&str>,
    field: &'static str,
    max: usize,
) -> Result<(), BookValidationError> {
    match value {
        Some(text) if text.chars().count() > max => {
            Err(BookValidationError::FieldTooLong { field, max })
        }
        _ => Ok(()),
    }
}

/// A catalog book with ownership and exchange availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    isbn: Option<String>,
    description: Option<String>,
    authors: Option<String>,
    genres: Option<String>,
    publisher: Option<String>,
    publication_year: Option<i32>,
    page_count: Option<i32>,
    language: String,
    cover_image_url: Option<String>,
    availability: Availability,
}

impl Book {
    /// Creates a validated book.
    pub fn new(draft: BookDraft) -> Result<Self, BookValidationError> {
        if draft.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        check_length(Some(draft.title.as_str()), "title", TITLE_MAX)?;
        check_length(draft.isbn.as_deref(), "isbn", ISBN_MAX)?;
        check_length(draft.publisher.as_deref(), "publisher", PUBLISHER_MAX)?;
        check_length(Some(draft.language.as_str()), "language", LANGUAGE_MAX)?;
        if matches!(draft.page_count, Some(count) if count <= 0) {
            return Err(BookValidationError::NonPositivePageCount);
        }

        Ok(Self {
            id: draft.id,
            owner_id: draft.owner_id,
            title: draft.title,
            isbn: draft.isbn,
            description: draft.description,
            authors: draft.authors,
            genres: draft.genres,
            publisher: draft.publisher,
            publication_year: draft.publication_year,
            page_count: draft.page_count,
            language: draft.language,
            cover_image_url: draft.cover_image_url,
            availability: draft.availability,
        })
    }

    /// Stable book identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user identifier.
    #[must_use]
    pub const fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Book title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// ISBN, when catalogued.
    #[must_use]
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Author display string.
    #[must_use]
    pub fn authors(&self) -> Option<&str> {
        self.authors.as_deref()
    }

    /// Genre display string.
    #[must_use]
    pub fn genres(&self) -> Option<&str> {
        self.genres.as_deref()
    }

    /// Publisher name.
    #[must_use]
    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    /// Year of publication.
    #[must_use]
    pub const fn publication_year(&self) -> Option<i32> {
        self.publication_year
    }

    /// Page count.
    #[must_use]
    pub const fn page_count(&self) -> Option<i32> {
        self.page_count
    }

    /// Language the copy is printed in.
    #[must_use]
    pub fn language(&self) -> &str {
        self.language.as_str()
    }

    /// Cover image URL.
    #[must_use]
    pub fn cover_image_url(&self) -> Option<&str> {
        self.cover_image_url.as_deref()
    }

    /// Exchange availability.
    #[must_use]
    pub const fn availability(&self) -> Availability {
        self.availability
    }

    /// Whether new exchange requests may target this book.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.availability, Availability::Available)
    }
}
