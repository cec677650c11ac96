//! PostgreSQL-backed `BookRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{BookRepository, BookRepositoryError, BookSearchFilter};
use crate::domain::{Availability, Book, BookDraft};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{BookChangeset, BookRow, NewBookRow};
use super::pool::{DbPool, PoolError};
use super::schema::books;

/// Diesel-backed implementation of the book repository port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookRepositoryError {
    map_basic_pool_error(error, BookRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookRepositoryError {
    if unique_violation_constraint(&error).is_some() {
        return BookRepositoryError::duplicate_isbn();
    }
    map_basic_diesel_error(
        error,
        BookRepositoryError::query,
        BookRepositoryError::connection,
    )
}

/// Convert a catalog row into a validated domain book.
fn row_to_book(row: BookRow) -> Result<Book, BookRepositoryError> {
    let availability: Availability = row.availability.parse().map_err(|_| {
        BookRepositoryError::query(format!("unknown availability: {}", row.availability))
    })?;

    Book::new(BookDraft {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        isbn: row.isbn,
        description: row.description,
        authors: row.authors,
        genres: row.genres,
        publisher: row.publisher,
        publication_year: row.publication_year,
        page_count: row.page_count,
        language: row.language,
        cover_image_url: row.cover_image_url,
        availability,
    })
    .map_err(|err| BookRepositoryError::query(err.to_string()))
}

/// Substring pattern for a case-insensitive ILIKE match.
fn contains_pattern(needle: &str) -> String {
    format!("%{needle}%")
}

macro_rules! search_filtered {
    ($filter:expr) => {{
        let mut query = books::table
            .filter(books::availability.eq(Availability::Available.as_str()))
            .into_boxed();
        if let Some(title) = $filter.title.as_deref() {
            query = query.filter(books::title.ilike(contains_pattern(title)));
        }
        if let Some(author) = $filter.author.as_deref() {
            query = query.filter(books::authors.ilike(contains_pattern(author)));
        }
        if let Some(genre) = $filter.genre.as_deref() {
            query = query.filter(books::genres.ilike(contains_pattern(genre)));
        }
        if let Some(owner) = $filter.exclude_owner {
            query = query.filter(books::owner_id.ne(owner));
        }
        query
    }};
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn create(&self, book: &Book) -> Result<(), BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewBookRow {
            id: book.id(),
            owner_id: book.owner_id(),
            title: book.title(),
            isbn: book.isbn(),
            description: book.description(),
            authors: book.authors(),
            genres: book.genres(),
            publisher: book.publisher(),
            publication_year: book.publication_year(),
            page_count: book.page_count(),
            language: book.language(),
            cover_image_url: book.cover_image_url(),
            availability: book.availability().as_str(),
        };

        diesel::insert_into(books::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, book_id: &Uuid) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = books::table
            .filter(books::id.eq(book_id))
            .select(BookRow::as_select())
            .first::<BookRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_book).transpose()
    }

    async fn update(&self, book: &Book) -> Result<(), BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = BookChangeset {
            title: book.title(),
            isbn: book.isbn(),
            description: book.description(),
            authors: book.authors(),
            genres: book.genres(),
            publisher: book.publisher(),
            publication_year: book.publication_year(),
            page_count: book.page_count(),
            language: book.language(),
            cover_image_url: book.cover_image_url(),
            availability: book.availability().as_str(),
        };

        diesel::update(books::table.filter(books::id.eq(book.id())))
            .set((&changeset, books::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, book_id: &Uuid) -> Result<bool, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(books::table.filter(books::id.eq(book_id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BookRow> = books::table
            .filter(books::owner_id.eq(owner_id))
            .order((books::created_at.desc(), books::id.desc()))
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_book).collect()
    }

    async fn search(
        &self,
        filter: &BookSearchFilter,
        page: &PageRequest,
    ) -> Result<Page<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = search_filtered!(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<BookRow> = search_filtered!(filter)
            .order((books::created_at.desc(), books::id.desc()))
            .offset(page.offset())
            .limit(page.limit())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let found = rows
            .into_iter()
            .map(row_to_book)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(found, page, u64::try_from(total).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> BookRow {
        let now = Utc::now();
        BookRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "War and Peace".to_owned(),
            isbn: Some("9780140447934".to_owned()),
            description: None,
            authors: Some("Leo Tolstoy".to_owned()),
            genres: Some("Fiction".to_owned()),
            publisher: None,
            publication_year: Some(1869),
            page_count: Some(1392),
            language: "English".to_owned(),
            cover_image_url: None,
            availability: "available".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_conversion_round_trips_valid_rows(valid_row: BookRow) {
        let book = row_to_book(valid_row.clone()).expect("valid row");
        assert_eq!(book.id(), valid_row.id);
        assert!(book.is_available());
    }

    #[rstest]
    fn row_conversion_rejects_unknown_availability(mut valid_row: BookRow) {
        valid_row.availability = "on_loan".to_owned();

        let error = row_to_book(valid_row).expect_err("unknown availability");
        assert!(matches!(error, BookRepositoryError::Query { .. }));
    }

    #[rstest]
    fn contains_pattern_wraps_with_wildcards() {
        assert_eq!(contains_pattern("tolstoy"), "%tolstoy%");
    }
}
