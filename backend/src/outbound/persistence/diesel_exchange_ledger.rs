//! PostgreSQL-backed `ExchangeLedger` implementation using Diesel.
//!
//! The two mutating operations are the concurrency-critical part of the
//! whole service:
//!
//! - `create_request` locks the book row with `SELECT ... FOR UPDATE`,
//!   re-checks availability under the lock, and applies both writes in one
//!   transaction. Two racing requests for the same book serialise on the
//!   row lock; the loser re-reads `reserved` and fails.
//! - `apply_transition` updates the exchange row guarded by
//!   `WHERE status = <expected>`; zero affected rows means a concurrent
//!   transition won and the caller's write is refused, never retried.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest, SortDirection};
use uuid::Uuid;

use crate::domain::ports::{ExchangeLedger, ExchangeLedgerError, ExchangeTransition};
use crate::domain::{
    Availability, Exchange, ExchangeRecord, ExchangeStatus, ExchangeType,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ExchangeRow, ExchangeTransitionChangeset, NewExchangeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{book_exchanges, books};

/// Diesel-backed implementation of the exchange ledger port.
#[derive(Clone)]
pub struct DieselExchangeLedger {
    pool: DbPool,
}

impl DieselExchangeLedger {
    /// Create a new ledger adapter with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ExchangeLedgerError {
    map_basic_pool_error(error, ExchangeLedgerError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ExchangeLedgerError {
    map_basic_diesel_error(
        error,
        ExchangeLedgerError::query,
        ExchangeLedgerError::connection,
    )
}

/// Convert a ledger row into a validated domain exchange.
fn row_to_exchange(row: ExchangeRow) -> Result<Exchange, ExchangeLedgerError> {
    let status: ExchangeStatus = row
        .status
        .parse()
        .map_err(|_| ExchangeLedgerError::query(format!("unknown status: {}", row.status)))?;
    let exchange_type: ExchangeType = row.exchange_type.parse().map_err(|_| {
        ExchangeLedgerError::query(format!("unknown exchange type: {}", row.exchange_type))
    })?;

    Exchange::from_parts(ExchangeRecord {
        id: row.id,
        book_id: row.book_id,
        owner_id: row.owner_id,
        requester_id: row.requester_id,
        status,
        exchange_type,
        owner_response: row.owner_response,
        exchange_date: row.exchange_date,
        completed: row.is_completed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| ExchangeLedgerError::query(err.to_string()))
}

enum CreateOutcome {
    Created,
    BookTaken,
    BookMissing,
}

enum TransitionOutcome {
    Applied,
    Conflict,
}

#[async_trait]
impl ExchangeLedger for DieselExchangeLedger {
    async fn create_request(&self, exchange: &Exchange) -> Result<(), ExchangeLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewExchangeRow {
            id: exchange.id(),
            book_id: exchange.book_id(),
            owner_id: exchange.owner_id(),
            requester_id: exchange.requester_id(),
            status: exchange.status().as_str(),
            exchange_type: exchange.exchange_type().as_str(),
            owner_response: exchange.owner_response(),
            exchange_date: exchange.exchange_date(),
            is_completed: exchange.is_completed(),
            created_at: exchange.created_at(),
            updated_at: exchange.updated_at(),
        };
        let book_id = exchange.book_id();

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let availability = books::table
                        .filter(books::id.eq(book_id))
                        .select(books::availability)
                        .for_update()
                        .first::<String>(conn)
                        .await
                        .optional()?;
                    let Some(availability) = availability else {
                        return Ok(CreateOutcome::BookMissing);
                    };
                    if availability != Availability::Available.as_str() {
                        return Ok(CreateOutcome::BookTaken);
                    }

                    diesel::insert_into(book_exchanges::table)
                        .values(&new_row)
                        .execute(conn)
                        .await?;
                    diesel::update(books::table.filter(books::id.eq(book_id)))
                        .set((
                            books::availability.eq(Availability::Reserved.as_str()),
                            books::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;
                    Ok(CreateOutcome::Created)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            CreateOutcome::Created => Ok(()),
            CreateOutcome::BookTaken => Err(ExchangeLedgerError::book_unavailable()),
            CreateOutcome::BookMissing => {
                Err(ExchangeLedgerError::query("book no longer exists"))
            }
        }
    }

    async fn apply_transition(
        &self,
        transition: ExchangeTransition,
    ) -> Result<(), ExchangeLedgerError> {
        let ExchangeTransition {
            exchange,
            expected_status,
            book_availability,
        } = transition;
        let changeset = ExchangeTransitionChangeset {
            status: exchange.status().as_str(),
            owner_response: exchange.owner_response(),
            exchange_date: exchange.exchange_date(),
            is_completed: exchange.is_completed(),
            updated_at: exchange.updated_at(),
        };
        let exchange_id = exchange.id();
        let book_id = exchange.book_id();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let affected = diesel::update(
                        book_exchanges::table.filter(
                            book_exchanges::id
                                .eq(exchange_id)
                                .and(book_exchanges::status.eq(expected_status.as_str())),
                        ),
                    )
                    .set(&changeset)
                    .execute(conn)
                    .await?;
                    if affected == 0 {
                        return Ok(TransitionOutcome::Conflict);
                    }

                    if let Some(availability) = book_availability {
                        diesel::update(books::table.filter(books::id.eq(book_id)))
                            .set((
                                books::availability.eq(availability.as_str()),
                                books::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    Ok(TransitionOutcome::Applied)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            TransitionOutcome::Applied => Ok(()),
            TransitionOutcome::Conflict => Err(ExchangeLedgerError::state_conflict()),
        }
    }

    async fn find_by_id(
        &self,
        exchange_id: &Uuid,
    ) -> Result<Option<Exchange>, ExchangeLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = book_exchanges::table
            .filter(book_exchanges::id.eq(exchange_id))
            .select(ExchangeRow::as_select())
            .first::<ExchangeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_exchange).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &Uuid,
        page: &PageRequest,
        sort: SortDirection,
    ) -> Result<Page<Exchange>, ExchangeLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = book_exchanges::table
            .filter(
                book_exchanges::owner_id
                    .eq(user_id)
                    .or(book_exchanges::requester_id.eq(user_id)),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut query = book_exchanges::table
            .filter(
                book_exchanges::owner_id
                    .eq(user_id)
                    .or(book_exchanges::requester_id.eq(user_id)),
            )
            .select(ExchangeRow::as_select())
            .into_boxed();
        query = match sort {
            SortDirection::Asc => query.order((
                book_exchanges::created_at.asc(),
                book_exchanges::id.asc(),
            )),
            SortDirection::Desc => query.order((
                book_exchanges::created_at.desc(),
                book_exchanges::id.desc(),
            )),
        };
        let rows: Vec<ExchangeRow> = query
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let exchanges = rows
            .into_iter()
            .map(row_to_exchange)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(
            exchanges,
            page,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn list_pending_for_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<Exchange>, ExchangeLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ExchangeRow> = book_exchanges::table
            .filter(
                book_exchanges::owner_id
                    .eq(owner_id)
                    .and(book_exchanges::status.eq(ExchangeStatus::Pending.as_str())),
            )
            .order((
                book_exchanges::created_at.desc(),
                book_exchanges::id.desc(),
            ))
            .select(ExchangeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_exchange).collect()
    }

    async fn list_by_requester(
        &self,
        requester_id: &Uuid,
    ) -> Result<Vec<Exchange>, ExchangeLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ExchangeRow> = book_exchanges::table
            .filter(book_exchanges::requester_id.eq(requester_id))
            .order((
                book_exchanges::created_at.desc(),
                book_exchanges::id.desc(),
            ))
            .select(ExchangeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_exchange).collect()
    }
}
