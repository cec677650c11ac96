//! Catalog HTTP handlers.
//!
//! ```text
//! GET    /api/v1/books
//! POST   /api/v1/books
//! GET    /api/v1/books/mine
//! GET    /api/v1/books/metadata/{isbn}
//! GET    /api/v1/books/{id}
//! PUT    /api/v1/books/{id}
//! DELETE /api/v1/books/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Availability, Error};
use crate::domain::ports::{
    BookAttributes, BookMetadata, BookPayload, CreateBookRequest, DeleteBookRequest,
    GetBookRequest, MyBooksRequest, SearchBooksRequest, UpdateBookRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_page_request, parse_uuid};

/// Request payload for listing or updating a book.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    /// Book title.
    pub title: String,
    /// Optional ISBN.
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
    pub language: Option<String>,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Availability toggle on update: `available` or `not_available`.
    pub availability: Option<String>,
}

impl BookForm {
    fn into_parts(self) -> Result<(BookAttributes, Option<Availability>), Error> {
        let availability = self
            .availability
            .as_deref()
            .map(|value| value.parse::<Availability>())
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok((
            BookAttributes {
                title: self.title,
                isbn: self.isbn,
                description: self.description,
                authors: self.authors,
                genres: self.genres,
                publisher: self.publisher,
                publication_year: self.publication_year,
                page_count: self.page_count,
                language: self.language,
                cover_image_url: self.cover_image_url,
            },
            availability,
        ))
    }
}

/// One book as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
    /// Book identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Owning account.
    #[schema(format = "uuid")]
    pub owner_id: String,
    /// Book title.
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
    /// Exchange availability.
    pub availability: String,
}

impl From<BookPayload> for BookBody {
    fn from(value: BookPayload) -> Self {
        Self {
            id: value.id.to_string(),
            owner_id: value.owner_id.to_string(),
            title: value.title,
            isbn: value.isbn,
            description: value.description,
            authors: value.authors,
            genres: value.genres,
            publisher: value.publisher,
            publication_year: value.publication_year,
            page_count: value.page_count,
            language: value.language,
            cover_image_url: value.cover_image_url,
            availability: value.availability.to_string(),
        }
    }
}

/// A page of catalog search results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPageBody {
    /// Books on this page.
    pub items: Vec<BookBody>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total matching books.
    pub total_items: u64,
    /// Total pages.
    pub total_pages: u64,
}

impl From<Page<BookPayload>> for BookPageBody {
    fn from(value: Page<BookPayload>) -> Self {
        let page = value.page();
        let per_page = value.per_page();
        let total_items = value.total_items();
        let total_pages = value.total_pages();
        Self {
            items: value.into_items().into_iter().map(Into::into).collect(),
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}

/// A book detail view with its review aggregate.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailBody {
    /// The listing.
    pub book: BookBody,
    /// Mean approved rating, when any approved review exists.
    pub average_rating: Option<f64>,
}

/// The caller's own listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookListBody {
    /// The listings, newest first.
    pub books: Vec<BookBody>,
}

/// Bibliographic metadata returned by the external lookup.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadataBody {
    /// Volume title.
    pub title: String,
    /// Author names joined with ", ".
    pub authors: Option<String>,
    /// Category names joined with ", ".
    pub categories: Option<String>,
    /// Volume description.
    pub description: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Year extracted from the published date.
    pub publication_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Language code.
    pub language: Option<String>,
    /// Thumbnail cover URL.
    pub cover_image_url: Option<String>,
}

impl From<BookMetadata> for BookMetadataBody {
    fn from(value: BookMetadata) -> Self {
        Self {
            title: value.title,
            authors: value.authors,
            categories: value.categories,
            description: value.description,
            publisher: value.publisher,
            publication_year: value.publication_year,
            page_count: value.page_count,
            language: value.language,
            cover_image_url: value.cover_image_url,
        }
    }
}

/// Query parameters for catalog search.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Case-insensitive author substring.
    pub author: Option<String>,
    /// Case-insensitive genre substring.
    pub genre: Option<String>,
    /// When true and a session exists, the caller's own books are excluded.
    pub exclude_mine: Option<bool>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Search available books.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(
        ("title" = Option<String>, Query, description = "Title substring"),
        ("author" = Option<String>, Query, description = "Author substring"),
        ("genre" = Option<String>, Query, description = "Genre substring"),
        ("excludeMine" = Option<bool>, Query, description = "Exclude the caller's own books"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("perPage" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Matching available books", body = BookPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "searchBooks"
)]
#[get("/books")]
pub async fn search_books(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<BookPageBody>> {
    let query = query.into_inner();
    let page = parse_page_request(query.page, query.per_page)?;
    let exclude_caller = if query.exclude_mine.unwrap_or(false) {
        session.username()?
    } else {
        None
    };

    let response = state
        .catalog_query
        .search_books(SearchBooksRequest {
            title: query.title,
            author: query.author,
            genre: query.genre,
            exclude_caller,
            page,
        })
        .await?;

    Ok(web::Json(response.books.into()))
}

/// List a new book owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = BookForm,
    responses(
        (status = 200, description = "Book listed", body = BookBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "ISBN already catalogued", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "createBook",
    security(("SessionCookie" = []))
)]
#[post("/books")]
pub async fn create_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookForm>,
) -> ApiResult<web::Json<BookBody>> {
    let owner = session.require_username()?;
    let (attributes, availability) = payload.into_inner().into_parts()?;
    if availability.is_some() {
        return Err(Error::invalid_request(
            "availability cannot be set when listing a book",
        ));
    }

    let response = state
        .catalog
        .create_book(CreateBookRequest { owner, attributes })
        .await?;

    Ok(web::Json(response.book.into()))
}

/// The caller's own listings.
#[utoipa::path(
    get,
    path = "/api/v1/books/mine",
    responses(
        (status = 200, description = "The caller's listings", body = BookListBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "myBooks",
    security(("SessionCookie" = []))
)]
#[get("/books/mine")]
pub async fn my_books(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<BookListBody>> {
    let username = session.require_username()?;

    let response = state
        .catalog_query
        .my_books(MyBooksRequest { username })
        .await?;

    Ok(web::Json(BookListBody {
        books: response.books.into_iter().map(Into::into).collect(),
    }))
}

/// Look up bibliographic metadata for an ISBN.
#[utoipa::path(
    get,
    path = "/api/v1/books/metadata/{isbn}",
    params(("isbn" = String, Path, description = "ISBN to look up")),
    responses(
        (status = 200, description = "Metadata found", body = BookMetadataBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No volume for this ISBN", body = ErrorSchema),
        (status = 503, description = "Lookup service unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "lookupBookMetadata",
    security(("SessionCookie" = []))
)]
#[get("/books/metadata/{isbn}")]
pub async fn lookup_book_metadata(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookMetadataBody>> {
    let _ = session.require_username()?;
    let isbn = path.into_inner();

    let metadata = state
        .metadata
        .lookup_isbn(&isbn)
        .await
        .map_err(|err| Error::service_unavailable(err.to_string()))?
        .ok_or_else(|| Error::not_found(format!("no volume found for isbn {isbn}")))?;

    Ok(web::Json(metadata.into()))
}

/// One book's detail view.
#[utoipa::path(
    get,
    path = "/api/v1/books/{book_id}",
    params(("book_id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book detail", body = BookDetailBody),
        (status = 404, description = "Book not found", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBook"
)]
#[get("/books/{book_id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookDetailBody>> {
    let book_id = parse_uuid(&path.into_inner(), FieldName::new("bookId"))?;

    let response = state.catalog_query.get_book(GetBookRequest { book_id }).await?;

    Ok(web::Json(BookDetailBody {
        book: response.book.into(),
        average_rating: response.average_rating,
    }))
}

/// Update a listing the caller owns.
#[utoipa::path(
    put,
    path = "/api/v1/books/{book_id}",
    params(("book_id" = String, Path, description = "Book identifier")),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = BookBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not the owner", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema),
        (status = 409, description = "Availability managed by an exchange", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "updateBook",
    security(("SessionCookie" = []))
)]
#[put("/books/{book_id}")]
pub async fn update_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BookForm>,
) -> ApiResult<web::Json<BookBody>> {
    let caller = session.require_username()?;
    let book_id = parse_uuid(&path.into_inner(), FieldName::new("bookId"))?;
    let (attributes, availability) = payload.into_inner().into_parts()?;

    let response = state
        .catalog
        .update_book(UpdateBookRequest {
            book_id,
            caller,
            attributes,
            availability,
        })
        .await?;

    Ok(web::Json(response.book.into()))
}

/// Delete a listing the caller owns.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{book_id}",
    params(("book_id" = String, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not the owner", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema),
        (status = 409, description = "Book has an active exchange", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "deleteBook",
    security(("SessionCookie" = []))
)]
#[delete("/books/{book_id}")]
pub async fn delete_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_username()?;
    let book_id = parse_uuid(&path.into_inner(), FieldName::new("bookId"))?;

    state
        .catalog
        .delete_book(DeleteBookRequest { book_id, caller })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
