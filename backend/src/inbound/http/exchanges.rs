//! Exchange workflow HTTP handlers.
//!
//! ```text
//! POST /api/v1/exchanges
//! PUT  /api/v1/exchanges/{id}/approve
//! PUT  /api/v1/exchanges/{id}/complete
//! PUT  /api/v1/exchanges/{id}/reject
//! PUT  /api/v1/exchanges/{id}/cancel
//! GET  /api/v1/exchanges/my
//! GET  /api/v1/exchanges/incoming
//! GET  /api/v1/exchanges/outgoing
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CancelExchangeRequest, CreateExchangeRequest, ExchangeDecisionRequest, ExchangePayload,
    IncomingRequestsRequest, MyExchangesRequest, OutgoingRequestsRequest, RejectExchangeRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_page_request, parse_sort, parse_uuid,
};

/// Request payload for opening an exchange.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExchangeBody {
    /// The requested book's identifier.
    #[schema(format = "uuid")]
    pub book_id: String,
}

/// One exchange as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeBody {
    /// Exchange identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// The requested book.
    #[schema(format = "uuid")]
    pub book_id: String,
    /// The book's owner.
    #[schema(format = "uuid")]
    pub owner_id: String,
    /// The requesting account.
    #[schema(format = "uuid")]
    pub requester_id: String,
    /// Lifecycle state.
    pub status: String,
    /// Offer kind.
    pub exchange_type: String,
    /// Owner's response, set on rejection.
    pub owner_response: Option<String>,
    /// Handover timestamp, set on completion.
    #[schema(format = "date-time")]
    pub exchange_date: Option<String>,
    /// True iff the exchange completed.
    pub completed: bool,
    /// Record creation timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
    /// Timestamp of the latest transition.
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<ExchangePayload> for ExchangeBody {
    fn from(value: ExchangePayload) -> Self {
        Self {
            id: value.id.to_string(),
            book_id: value.book_id.to_string(),
            owner_id: value.owner_id.to_string(),
            requester_id: value.requester_id.to_string(),
            status: value.status.to_string(),
            exchange_type: value.exchange_type.to_string(),
            owner_response: value.owner_response,
            exchange_date: value.exchange_date.map(|date| date.to_rfc3339()),
            completed: value.completed,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// A page of exchanges.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePageBody {
    /// Exchanges on this page.
    pub items: Vec<ExchangeBody>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total matching exchanges.
    pub total_items: u64,
    /// Total pages.
    pub total_pages: u64,
}

impl From<Page<ExchangePayload>> for ExchangePageBody {
    fn from(value: Page<ExchangePayload>) -> Self {
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

/// A flat list of exchanges.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeListBody {
    /// The exchanges, newest first.
    pub exchanges: Vec<ExchangeBody>,
}

impl From<Vec<ExchangePayload>> for ExchangeListBody {
    fn from(value: Vec<ExchangePayload>) -> Self {
        Self {
            exchanges: value.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters for the paginated "my exchanges" listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyExchangesQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Sort order over creation time: `asc` or `desc`.
    pub sort: Option<String>,
}

/// Query parameters for rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectQuery {
    /// Optional reason relayed to the requester.
    pub reason: Option<String>,
}

/// Open an exchange request for a book.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges",
    request_body = CreateExchangeBody,
    responses(
        (status = 200, description = "Exchange request created", body = ExchangeBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema),
        (status = 409, description = "Book not available", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "createExchange",
    security(("SessionCookie" = []))
)]
#[post("/exchanges")]
pub async fn create_exchange(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateExchangeBody>,
) -> ApiResult<web::Json<ExchangeBody>> {
    let requester = session.require_username()?;
    let book_id = parse_uuid(&payload.book_id, FieldName::new("bookId"))?;

    let response = state
        .exchanges
        .create_request(CreateExchangeRequest { book_id, requester })
        .await?;

    Ok(web::Json(response.exchange.into()))
}

/// Approve a pending exchange (book owner only).
#[utoipa::path(
    put,
    path = "/api/v1/exchanges/{exchange_id}/approve",
    params(("exchange_id" = String, Path, description = "Exchange identifier")),
    responses(
        (status = 200, description = "Exchange approved", body = ExchangeBody),
        (status = 400, description = "Not in an approvable state", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not the owner", body = ErrorSchema),
        (status = 404, description = "Exchange not found", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "approveExchange",
    security(("SessionCookie" = []))
)]
#[put("/exchanges/{exchange_id}/approve")]
pub async fn approve_exchange(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExchangeBody>> {
    let caller = session.require_username()?;
    let exchange_id = parse_uuid(&path.into_inner(), FieldName::new("exchangeId"))?;

    let response = state
        .exchanges
        .approve(ExchangeDecisionRequest { exchange_id, caller })
        .await?;

    Ok(web::Json(response.exchange.into()))
}

/// Complete an accepted exchange (book owner only).
#[utoipa::path(
    put,
    path = "/api/v1/exchanges/{exchange_id}/complete",
    params(("exchange_id" = String, Path, description = "Exchange identifier")),
    responses(
        (status = 200, description = "Exchange completed", body = ExchangeBody),
        (status = 400, description = "Not in a completable state", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not the owner", body = ErrorSchema),
        (status = 404, description = "Exchange not found", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "completeExchange",
    security(("SessionCookie" = []))
)]
#[put("/exchanges/{exchange_id}/complete")]
pub async fn complete_exchange(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExchangeBody>> {
    let caller = session.require_username()?;
    let exchange_id = parse_uuid(&path.into_inner(), FieldName::new("exchangeId"))?;

    let response = state
        .exchanges
        .complete(ExchangeDecisionRequest { exchange_id, caller })
        .await?;

    Ok(web::Json(response.exchange.into()))
}

/// Reject an exchange with an optional reason (book owner only).
#[utoipa::path(
    put,
    path = "/api/v1/exchanges/{exchange_id}/reject",
    params(
        ("exchange_id" = String, Path, description = "Exchange identifier"),
        ("reason" = Option<String>, Query, description = "Reason relayed to the requester")
    ),
    responses(
        (status = 204, description = "Exchange rejected"),
        (status = 400, description = "Not in a rejectable state", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not the owner", body = ErrorSchema),
        (status = 404, description = "Exchange not found", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "rejectExchange",
    security(("SessionCookie" = []))
)]
#[put("/exchanges/{exchange_id}/reject")]
pub async fn reject_exchange(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<RejectQuery>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_username()?;
    let exchange_id = parse_uuid(&path.into_inner(), FieldName::new("exchangeId"))?;

    state
        .exchanges
        .reject(RejectExchangeRequest {
            exchange_id,
            caller,
            reason: query.into_inner().reason,
        })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Cancel an exchange (requester only).
#[utoipa::path(
    put,
    path = "/api/v1/exchanges/{exchange_id}/cancel",
    params(("exchange_id" = String, Path, description = "Exchange identifier")),
    responses(
        (status = 204, description = "Exchange cancelled"),
        (status = 400, description = "Not in a cancellable state", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not the requester", body = ErrorSchema),
        (status = 404, description = "Exchange not found", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "cancelExchange",
    security(("SessionCookie" = []))
)]
#[put("/exchanges/{exchange_id}/cancel")]
pub async fn cancel_exchange(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_username()?;
    let exchange_id = parse_uuid(&path.into_inner(), FieldName::new("exchangeId"))?;

    state
        .exchanges
        .cancel(CancelExchangeRequest { exchange_id, caller })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Page through the caller's exchanges, as owner or requester.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges/my",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("perPage" = Option<u32>, Query, description = "Page size"),
        ("sort" = Option<String>, Query, description = "asc or desc over creation time")
    ),
    responses(
        (status = 200, description = "One page of the caller's exchanges", body = ExchangePageBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "myExchanges",
    security(("SessionCookie" = []))
)]
#[get("/exchanges/my")]
pub async fn my_exchanges(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MyExchangesQuery>,
) -> ApiResult<web::Json<ExchangePageBody>> {
    let username = session.require_username()?;
    let query = query.into_inner();
    let page = parse_page_request(query.page, query.per_page)?;
    let sort = parse_sort(query.sort.as_deref())?;

    let response = state
        .exchanges_query
        .my_exchanges(MyExchangesRequest {
            username,
            page,
            sort,
        })
        .await?;

    Ok(web::Json(response.exchanges.into()))
}

/// Pending requests awaiting the caller's decision.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges/incoming",
    responses(
        (status = 200, description = "Pending incoming requests", body = ExchangeListBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "incomingExchanges",
    security(("SessionCookie" = []))
)]
#[get("/exchanges/incoming")]
pub async fn incoming_exchanges(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ExchangeListBody>> {
    let username = session.require_username()?;

    let response = state
        .exchanges_query
        .incoming_requests(IncomingRequestsRequest { username })
        .await?;

    Ok(web::Json(response.exchanges.into()))
}

/// All requests the caller opened, any status.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges/outgoing",
    responses(
        (status = 200, description = "Outgoing requests", body = ExchangeListBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["exchanges"],
    operation_id = "outgoingExchanges",
    security(("SessionCookie" = []))
)]
#[get("/exchanges/outgoing")]
pub async fn outgoing_exchanges(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ExchangeListBody>> {
    let username = session.require_username()?;

    let response = state
        .exchanges_query
        .outgoing_requests(OutgoingRequestsRequest { username })
        .await?;

    Ok(web::Json(response.exchanges.into()))
}

#[cfg(test)]
#[path = "exchanges_tests.rs"]
mod tests;
