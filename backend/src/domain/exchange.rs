//! Exchange ledger entity and its state machine.
//!
//! An exchange is one user's request to receive another user's book. It is
//! created in `Pending`, moves through the transitions below, and is never
//! physically deleted: terminal records stay in the ledger as an audit
//! trail.
//!
//! ```text
//! (none) ──request──▶ Pending ──approve──▶ Accepted ──complete──▶ Completed*
//!                        │                    │
//!                        ├──reject──▶ Rejected*
//!                        └──cancel──▶ Cancelled*   (also from Accepted)
//! ```
//!
//! Transitions are expressed as consuming methods returning the updated
//! record, so an illegal transition can never leave a half-mutated exchange
//! behind. Persisting a transition atomically together with the book
//! availability flip is the ledger adapter's job.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the owner's rejection response.
pub const OWNER_RESPONSE_MAX: usize = 1000;

/// Lifecycle state of an exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStatus {
    /// Waiting for the book owner's decision.
    Pending,
    /// Approved by the owner; the handover has not happened yet.
    Accepted,
    /// Declined by the owner. Terminal.
    Rejected,
    /// Handover confirmed by the owner. Terminal.
    Completed,
    /// Withdrawn by the requester. Terminal.
    Cancelled,
}

impl ExchangeStatus {
    /// Whether no further transition is defined out of this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExchangeStatus {
    type Err = ExchangeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ExchangeValidationError::UnknownStatus),
        }
    }
}

/// What the requester offers in return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeType {
    /// A book of the requester's for the owner's book.
    #[default]
    BookForBook,
    /// A purchase.
    BookForMoney,
    /// A gift from the owner.
    FreeGift,
}

impl ExchangeType {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookForBook => "book_for_book",
            Self::BookForMoney => "book_for_money",
            Self::FreeGift => "free_gift",
        }
    }
}

impl fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExchangeType {
    type Err = ExchangeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book_for_book" => Ok(Self::BookForBook),
            "book_for_money" => Ok(Self::BookForMoney),
            "free_gift" => Ok(Self::FreeGift),
            _ => Err(ExchangeValidationError::UnknownType),
        }
    }
}

/// Validation errors raised when constructing an exchange from raw parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeValidationError {
    /// Requester and owner are the same account.
    SelfRequest,
    /// Owner response exceeds [`OWNER_RESPONSE_MAX`].
    OwnerResponseTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Status string did not match a known state.
    UnknownStatus,
    /// Exchange type string did not match a known type.
    UnknownType,
    /// The completed flag disagrees with the status.
    CompletedFlagMismatch,
}

impl fmt::Display for ExchangeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfRequest => write!(f, "cannot request an exchange for your own book"),
            Self::OwnerResponseTooLong { max } => {
                write!(f, "owner response must be at most {max} characters")
            }
            Self::UnknownStatus => write!(
                f,
                "status must be pending, accepted, rejected, completed, or cancelled",
            ),
            Self::UnknownType => write!(
                f,
                "exchange type must be book_for_book, book_for_money, or free_gift",
            ),
            Self::CompletedFlagMismatch => {
                write!(f, "completed flag must be set exactly for completed status")
            }
        }
    }
}

impl std::error::Error for ExchangeValidationError {}

/// The transition an illegal state change was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Owner approval of a pending request.
    Approve,
    /// Owner confirmation of the handover.
    Complete,
    /// Owner declining a request.
    Reject,
    /// Requester withdrawing a request.
    Cancel,
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Approve => "approve",
            Self::Complete => "complete",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Raised when a transition is attempted from a state that does not permit it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} exchange in status {from}")]
pub struct ExchangeTransitionError {
    /// The state the exchange was in.
    pub from: ExchangeStatus,
    /// The attempted transition.
    pub action: TransitionAction,
}

/// Input payload for [`Exchange::from_parts`], used by persistence adapters
/// to rehydrate a ledger record.
#[derive(Debug, Clone)]
pub struct ExchangeRecord {
    /// Stable exchange identifier.
    pub id: Uuid,
    /// The book this exchange is for. Immutable after creation.
    pub book_id: Uuid,
    /// The book's owner at creation time. Immutable.
    pub owner_id: Uuid,
    /// The account requesting the book. Immutable.
    pub requester_id: Uuid,
    /// Lifecycle state.
    pub status: ExchangeStatus,
    /// What the requester offers in return.
    pub exchange_type: ExchangeType,
    /// Owner's free-text response, set on rejection.
    pub owner_response: Option<String>,
    /// Handover timestamp, set on completion.
    pub exchange_date: Option<DateTime<Utc>>,
    /// True iff `status == Completed`.
    pub completed: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest mutation.
    pub updated_at: DateTime<Utc>,
}

/// A ledger record tracking one exchange request.
///
/// ## Invariants
/// - `requester_id != owner_id`.
/// - `completed` is true exactly when `status == Completed`.
/// - `book_id`, `owner_id`, and `requester_id` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    id: Uuid,
    book_id: Uuid,
    owner_id: Uuid,
    requester_id: Uuid,
    status: ExchangeStatus,
    exchange_type: ExchangeType,
    owner_response: Option<String>,
    exchange_date: Option<DateTime<Utc>>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Exchange {
    /// Open a new pending request for `book_id`, owned by `owner_id`, on
    /// behalf of `requester_id`.
    pub fn request(
        book_id: Uuid,
        owner_id: Uuid,
        requester_id: Uuid,
        exchange_type: ExchangeType,
        now: DateTime<Utc>,
    ) -> Result<Self, ExchangeValidationError> {
        if requester_id == owner_id {
            return Err(ExchangeValidationError::SelfRequest);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            book_id,
            owner_id,
            requester_id,
            status: ExchangeStatus::Pending,
            exchange_type,
            owner_response: None,
            exchange_date: None,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a persisted record, re-checking the cross-field invariants.
    pub fn from_parts(record: ExchangeRecord) -> Result<Self, ExchangeValidationError> {
        if record.requester_id == record.owner_id {
            return Err(ExchangeValidationError::SelfRequest);
        }
        if record.completed != matches!(record.status, ExchangeStatus::Completed) {
            return Err(ExchangeValidationError::CompletedFlagMismatch);
        }
        if let Some(response) = record.owner_response.as_deref()
            && response.chars().count() > OWNER_RESPONSE_MAX
        {
            return Err(ExchangeValidationError::OwnerResponseTooLong {
                max: OWNER_RESPONSE_MAX,
            });
        }
        Ok(Self {
            id: record.id,
            book_id: record.book_id,
            owner_id: record.owner_id,
            requester_id: record.requester_id,
            status: record.status,
            exchange_type: record.exchange_type,
            owner_response: record.owner_response,
            exchange_date: record.exchange_date,
            completed: record.completed,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Owner approval: `Pending → Accepted`.
    pub fn approve(self, now: DateTime<Utc>) -> Result<Self, ExchangeTransitionError> {
        if !self.can_be_accepted() {
            return Err(ExchangeTransitionError {
                from: self.status,
                action: TransitionAction::Approve,
            });
        }
        Ok(Self {
            status: ExchangeStatus::Accepted,
            updated_at: now,
            ..self
        })
    }

    /// Owner confirmation of the handover: `Accepted → Completed`.
    ///
    /// Stamps `exchange_date` and the `completed` flag.
    pub fn complete(self, now: DateTime<Utc>) -> Result<Self, ExchangeTransitionError> {
        if !self.is_accepted() {
            return Err(ExchangeTransitionError {
                from: self.status,
                action: TransitionAction::Complete,
            });
        }
        Ok(Self {
            status: ExchangeStatus::Completed,
            completed: true,
            exchange_date: Some(now),
            updated_at: now,
            ..self
        })
    }

    /// Owner declining: `Pending | Accepted → Rejected`.
    ///
    /// Terminal states stay terminal: rejecting a completed exchange would
    /// flip an already-handed-over book back to available, so it is refused.
    pub fn reject(
        self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ExchangeTransitionError> {
        if self.status.is_terminal() {
            return Err(ExchangeTransitionError {
                from: self.status,
                action: TransitionAction::Reject,
            });
        }
        Ok(Self {
            status: ExchangeStatus::Rejected,
            owner_response: reason.or(self.owner_response),
            updated_at: now,
            ..self
        })
    }

    /// Requester withdrawal: `Pending | Accepted → Cancelled`.
    pub fn cancel(self, now: DateTime<Utc>) -> Result<Self, ExchangeTransitionError> {
        if !self.can_be_cancelled() {
            return Err(ExchangeTransitionError {
                from: self.status,
                action: TransitionAction::Cancel,
            });
        }
        Ok(Self {
            status: ExchangeStatus::Cancelled,
            updated_at: now,
            ..self
        })
    }

    /// Stable exchange identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The book this exchange is for.
    #[must_use]
    pub const fn book_id(&self) -> Uuid {
        self.book_id
    }

    /// The book's owner at creation time.
    #[must_use]
    pub const fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// The account requesting the book.
    #[must_use]
    pub const fn requester_id(&self) -> Uuid {
        self.requester_id
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> ExchangeStatus {
        self.status
    }

    /// What the requester offers in return.
    #[must_use]
    pub const fn exchange_type(&self) -> ExchangeType {
        self.exchange_type
    }

    /// Owner's free-text response, set on rejection.
    #[must_use]
    pub fn owner_response(&self) -> Option<&str> {
        self.owner_response.as_deref()
    }

    /// Handover timestamp, set on completion.
    #[must_use]
    pub const fn exchange_date(&self) -> Option<DateTime<Utc>> {
        self.exchange_date
    }

    /// True iff the exchange completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Record creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the latest mutation.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the owner's decision is still outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, ExchangeStatus::Pending)
    }

    /// Whether the request was approved but not yet completed.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.status, ExchangeStatus::Accepted)
    }

    /// Whether the owner may still approve the request.
    #[must_use]
    pub const fn can_be_accepted(&self) -> bool {
        self.is_pending()
    }

    /// Whether the requester may still withdraw the request.
    #[must_use]
    pub const fn can_be_cancelled(&self) -> bool {
        matches!(
            self.status,
            ExchangeStatus::Pending | ExchangeStatus::Accepted
        )
    }
}

#[cfg(test)]
mod tests {
    //! State machine coverage: every legal transition and a representative
    //! set of illegal ones.

    use rstest::rstest;

    use super::*;

    fn pending() -> Exchange {
        Exchange::request(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            ExchangeType::BookForBook,
            Utc::now(),
        )
        .expect("distinct parties")
    }

    #[rstest]
    fn request_rejects_self_exchange() {
        let owner = Uuid::new_v4();
        let error = Exchange::request(
            Uuid::new_v4(),
            owner,
            owner,
            ExchangeType::BookForBook,
            Utc::now(),
        )
        .expect_err("self request");
        assert_eq!(error, ExchangeValidationError::SelfRequest);
    }

    #[rstest]
    fn new_request_is_pending_and_incomplete() {
        let exchange = pending();
        assert!(exchange.is_pending());
        assert!(!exchange.is_completed());
        assert!(exchange.exchange_date().is_none());
        assert_eq!(exchange.exchange_type(), ExchangeType::BookForBook);
    }

    #[rstest]
    fn approve_moves_pending_to_accepted() {
        let exchange = pending().approve(Utc::now()).expect("pending approves");
        assert!(exchange.is_accepted());
    }

    #[rstest]
    fn approve_twice_fails() {
        let accepted = pending().approve(Utc::now()).expect("pending approves");
        let error = accepted.approve(Utc::now()).expect_err("already accepted");
        assert_eq!(error.from, ExchangeStatus::Accepted);
        assert_eq!(error.action, TransitionAction::Approve);
    }

    #[rstest]
    fn complete_requires_accepted() {
        let error = pending().complete(Utc::now()).expect_err("not accepted");
        assert_eq!(error.from, ExchangeStatus::Pending);
        assert_eq!(error.action, TransitionAction::Complete);
    }

    #[rstest]
    fn complete_stamps_date_and_flag() {
        let now = Utc::now();
        let exchange = pending()
            .approve(now)
            .and_then(|e| e.complete(now))
            .expect("legal path");
        assert_eq!(exchange.status(), ExchangeStatus::Completed);
        assert!(exchange.is_completed());
        assert_eq!(exchange.exchange_date(), Some(now));
    }

    #[rstest]
    fn reject_keeps_reason() {
        let exchange = pending()
            .reject(Some("already promised".to_owned()), Utc::now())
            .expect("pending rejects");
        assert_eq!(exchange.status(), ExchangeStatus::Rejected);
        assert_eq!(exchange.owner_response(), Some("already promised"));
    }

    #[rstest]
    fn reject_without_reason_leaves_response_empty() {
        let exchange = pending().reject(None, Utc::now()).expect("pending rejects");
        assert!(exchange.owner_response().is_none());
    }

    #[rstest]
    fn reject_refuses_terminal_states() {
        let completed = pending()
            .approve(Utc::now())
            .and_then(|e| e.complete(Utc::now()))
            .expect("legal path");
        let error = completed
            .reject(None, Utc::now())
            .expect_err("terminal state");
        assert_eq!(error.from, ExchangeStatus::Completed);
        assert_eq!(error.action, TransitionAction::Reject);
    }

    #[rstest]
    fn cancel_is_legal_from_pending_and_accepted() {
        assert!(pending().cancel(Utc::now()).is_ok());
        let accepted = pending().approve(Utc::now()).expect("pending approves");
        assert!(accepted.cancel(Utc::now()).is_ok());
    }

    #[rstest]
    fn cancel_refuses_rejected() {
        let rejected = pending().reject(None, Utc::now()).expect("pending rejects");
        let error = rejected.cancel(Utc::now()).expect_err("terminal state");
        assert_eq!(error.from, ExchangeStatus::Rejected);
    }

    #[rstest]
    fn from_parts_rejects_completed_flag_mismatch() {
        let exchange = pending();
        let mut record = ExchangeRecord {
            id: exchange.id(),
            book_id: exchange.book_id(),
            owner_id: exchange.owner_id(),
            requester_id: exchange.requester_id(),
            status: ExchangeStatus::Pending,
            exchange_type: ExchangeType::BookForBook,
            owner_response: None,
            exchange_date: None,
            completed: true,
            created_at: exchange.created_at(),
            updated_at: exchange.updated_at(),
        };
        assert_eq!(
            Exchange::from_parts(record.clone()).expect_err("mismatch"),
            ExchangeValidationError::CompletedFlagMismatch
        );

        record.completed = false;
        assert!(Exchange::from_parts(record).is_ok());
    }

    #[rstest]
    fn status_round_trips_through_storage_string() {
        for status in [
            ExchangeStatus::Pending,
            ExchangeStatus::Accepted,
            ExchangeStatus::Rejected,
            ExchangeStatus::Completed,
            ExchangeStatus::Cancelled,
        ] {
            let parsed: ExchangeStatus = status.as_str().parse().expect("known status");
            assert_eq!(parsed, status);
        }
    }
}
