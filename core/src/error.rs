//! Error taxonomy for ticketing operations.

use crate::ticket::TicketStatus;
use crate::types::TicketCategory;
use thiserror::Error;

/// Result type alias for ticketing operations.
pub type Result<T> = std::result::Result<T, TicketingError>;

/// Every way a purchase, resale or waitlist operation can fail.
///
/// Each variant is a machine-readable kind; the `Display` output is the
/// human-readable message surfaced to callers. Failures are local to a
/// single operation and leave no partial mutation visible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketingError {
    // ═══════════════════════════════════════════════════════════
    // Input validation
    // ═══════════════════════════════════════════════════════════
    /// Missing or malformed required input.
    #[error("Invalid request: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// Referenced entity does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Entity kind ("event", "ticket", "user", "waitlist entry").
        resource: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Purchase failures
    // ═══════════════════════════════════════════════════════════
    /// Requested quantity exceeds the remaining category count.
    #[error("Only {remaining} {category} tickets available")]
    InsufficientInventory {
        /// Requested category.
        category: TicketCategory,
        /// Exact remaining count at the time of the check.
        remaining: u32,
    },

    /// Wallet balance below the required cost.
    #[error("Insufficient wallet balance: {required} required, {available} available")]
    InsufficientFunds {
        /// Total cost of the operation.
        required: u64,
        /// Balance at the time of the check.
        available: u64,
    },

    /// Unrecognized payment method token.
    #[error("Invalid payment method: {method}")]
    InvalidPaymentMethod {
        /// The rejected token.
        method: String,
    },

    // ═══════════════════════════════════════════════════════════
    // State conflicts
    // ═══════════════════════════════════════════════════════════
    /// Ticket is not in a state that permits the requested resale
    /// transition.
    #[error("Ticket is not eligible for resale (status: {status})")]
    NotEligibleForResale {
        /// Status the ticket was actually in.
        status: TicketStatus,
    },

    /// A waitlist entry already exists for this (event, user, category)
    /// tuple.
    #[error("Already joined the waitlist for this category")]
    DuplicateWaitlistEntry,

    /// Caller does not own the ticket being mutated.
    #[error("Ticket is not owned by the requesting user")]
    NotOwner,

    /// Ticket category does not match the waitlist entry's category.
    #[error("Category mismatch: ticket is {ticket}, waitlist entry is {requested}")]
    CategoryMismatch {
        /// Category on the ticket.
        ticket: TicketCategory,
        /// Category on the waitlist entry.
        requested: TicketCategory,
    },

    /// An atomic inventory or state transition lost a race. The whole
    /// operation may safely be retried once.
    #[error("Concurrent modification detected, please retry")]
    ConcurrencyConflict,

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════
    /// Underlying store failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TicketingError {
    /// Convenience constructor for validation failures.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for missing entities.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidPaymentMethod { .. } => "INVALID_PAYMENT_METHOD",
            Self::NotEligibleForResale { .. } => "NOT_ELIGIBLE_FOR_RESALE",
            Self::DuplicateWaitlistEntry => "DUPLICATE_WAITLIST_ENTRY",
            Self::NotOwner => "NOT_OWNER",
            Self::CategoryMismatch { .. } => "CATEGORY_MISMATCH",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}
