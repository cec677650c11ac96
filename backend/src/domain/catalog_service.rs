//! Catalog domain services.
//!
//! Thin orchestration over the book repository: ownership checks, validation
//! mapping, and the guard that keeps reservation states out of the catalog's
//! reach (those belong to the exchange workflow).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    BookAttributes, BookRepository, BookRepositoryError, BookResponse, BookSearchFilter,
    CatalogCommand, CatalogQuery, CreateBookRequest, DeleteBookRequest, GetBookRequest,
    GetBookResponse, MyBooksRequest, MyBooksResponse, ReviewRepository, ReviewRepositoryError,
    SearchBooksRequest, SearchBooksResponse, UpdateBookRequest, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Availability, Book, BookDraft, Error, User, Username};

/// Fallback language applied when a listing does not name one.
const DEFAULT_LANGUAGE: &str = "English";

fn map_book_error(error: BookRepositoryError) -> Error {
    match error {
        BookRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalog unavailable: {message}"))
        }
        BookRepositoryError::DuplicateIsbn => {
            Error::conflict("a book with this ISBN is already catalogued")
        }
        BookRepositoryError::Query { message } => {
            Error::internal(format!("catalog error: {message}"))
        }
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

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review store unavailable: {message}"))
        }
        other => Error::internal(format!("review store error: {other}")),
    }
}

fn draft_from_attributes(
    id: Uuid,
    owner_id: Uuid,
    attributes: BookAttributes,
    availability: Availability,
) -> BookDraft {
    BookDraft {
        id,
        owner_id,
        title: attributes.title,
        isbn: attributes.isbn,
        description: attributes.description,
        authors: attributes.authors,
        genres: attributes.genres,
        publisher: attributes.publisher,
        publication_year: attributes.publication_year,
        page_count: attributes.page_count,
        language: attributes
            .language
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
        cover_image_url: attributes.cover_image_url,
        availability,
    }
}

/// Catalog service implementing the command driving port.
#[derive(Clone)]
pub struct CatalogCommandService<B, U> {
    books: Arc<B>,
    users: Arc<U>,
}

impl<B, U> CatalogCommandService<B, U> {
    /// Create a command service over the catalog and identity ports.
    pub fn new(books: Arc<B>, users: Arc<U>) -> Self {
        Self { books, users }
    }
}

impl<B, U> CatalogCommandService<B, U>
where
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

    async fn load_owned_book(&self, book_id: &Uuid, caller: &Username) -> Result<Book, Error> {
        let book = self
            .books
            .find_by_id(book_id)
            .await
            .map_err(map_book_error)?
            .ok_or_else(|| Error::not_found(format!("book {book_id} not found")))?;
        let caller_user = self.resolve_user(caller).await?;
        if book.owner_id() != caller_user.id() {
            return Err(Error::forbidden("only the owner may modify this listing"));
        }
        Ok(book)
    }
}

#[async_trait]
impl<B, U> CatalogCommand for CatalogCommandService<B, U>
where
    B: BookRepository,
    U: UserRepository,
{
    async fn create_book(&self, request: CreateBookRequest) -> Result<BookResponse, Error> {
        let owner = self.resolve_user(&request.owner).await?;
        let book = Book::new(draft_from_attributes(
            Uuid::new_v4(),
            owner.id(),
            request.attributes,
            Availability::Available,
        ))
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.books.create(&book).await.map_err(map_book_error)?;

        info!(actor = %request.owner, book_id = %book.id(), "book listed");
        Ok(BookResponse { book: book.into() })
    }

    async fn update_book(&self, request: UpdateBookRequest) -> Result<BookResponse, Error> {
        let current = self.load_owned_book(&request.book_id, &request.caller).await?;

        let availability = match request.availability {
            None => current.availability(),
            Some(requested) => {
                // Reservation states are workflow-owned; the catalog only
                // toggles between listed and withdrawn.
                if !matches!(
                    requested,
                    Availability::Available | Availability::NotAvailable
                ) {
                    return Err(Error::invalid_request(
                        "availability may only be set to available or not_available",
                    ));
                }
                if matches!(
                    current.availability(),
                    Availability::Reserved | Availability::Exchanged
                ) {
                    return Err(Error::conflict(
                        "availability is managed by an active exchange",
                    ));
                }
                requested
            }
        };

        let updated = Book::new(draft_from_attributes(
            current.id(),
            current.owner_id(),
            request.attributes,
            availability,
        ))
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.books.update(&updated).await.map_err(map_book_error)?;

        info!(actor = %request.caller, book_id = %updated.id(), "book updated");
        Ok(BookResponse {
            book: updated.into(),
        })
    }

    async fn delete_book(&self, request: DeleteBookRequest) -> Result<(), Error> {
        let book = self.load_owned_book(&request.book_id, &request.caller).await?;
        if matches!(book.availability(), Availability::Reserved) {
            return Err(Error::conflict(
                "cannot delete a book with an active exchange",
            ));
        }

        let deleted = self
            .books
            .delete(&book.id())
            .await
            .map_err(map_book_error)?;
        if !deleted {
            return Err(Error::not_found(format!("book {} not found", book.id())));
        }

        info!(actor = %request.caller, book_id = %book.id(), "book deleted");
        Ok(())
    }
}

/// Catalog service implementing the query driving port.
#[derive(Clone)]
pub struct CatalogQueryService<B, R, U> {
    books: Arc<B>,
    reviews: Arc<R>,
    users: Arc<U>,
}

impl<B, R, U> CatalogQueryService<B, R, U> {
    /// Create a query service over the catalog, review, and identity ports.
    pub fn new(books: Arc<B>, reviews: Arc<R>, users: Arc<U>) -> Self {
        Self {
            books,
            reviews,
            users,
        }
    }
}

#[async_trait]
impl<B, R, U> CatalogQuery for CatalogQueryService<B, R, U>
where
    B: BookRepository,
    R: ReviewRepository,
    U: UserRepository,
{
    async fn get_book(&self, request: GetBookRequest) -> Result<GetBookResponse, Error> {
        let book = self
            .books
            .find_by_id(&request.book_id)
            .await
            .map_err(map_book_error)?
            .ok_or_else(|| Error::not_found(format!("book {} not found", request.book_id)))?;

        let average_rating = self
            .reviews
            .average_rating(&book.id())
            .await
            .map_err(map_review_error)?;

        Ok(GetBookResponse {
            book: book.into(),
            average_rating,
        })
    }

    async fn search_books(
        &self,
        request: SearchBooksRequest,
    ) -> Result<SearchBooksResponse, Error> {
        // An unknown caller just means no own-shelf exclusion.
        let exclude_owner = match request.exclude_caller {
            Some(username) => self
                .users
                .find_by_username(&username)
                .await
                .map_err(map_user_error)?
                .map(|user| user.id()),
            None => None,
        };

        let filter = BookSearchFilter {
            title: request.title,
            author: request.author,
            genre: request.genre,
            exclude_owner,
        };
        let books = self
            .books
            .search(&filter, &request.page)
            .await
            .map_err(map_book_error)?;

        Ok(SearchBooksResponse {
            books: books.map(Into::into),
        })
    }

    async fn my_books(&self, request: MyBooksRequest) -> Result<MyBooksResponse, Error> {
        let user = self
            .users
            .find_by_username(&request.username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", request.username)))?;

        let books = self
            .books
            .list_by_owner(&user.id())
            .await
            .map_err(map_book_error)?;

        Ok(MyBooksResponse {
            books: books.into_iter().map(Into::into).collect(),
        })
    }
}
