//! Ticket entity and its resale state machine.
//!
//! The source system tracked two overlapping fields (`status` and
//! `resaleStatus`) with inconsistent semantics across code paths. Here both
//! dimensions collapse into a single [`TicketStatus`] enum with one
//! validated transition function, so an illegal move is unrepresentable
//! rather than merely unlikely.

use crate::error::{Result, TicketingError};
use crate::types::{EventId, TicketCategory, TicketId, TicketNumber, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified lifecycle state of a ticket.
///
/// ```text
/// Active --list--> ListedForResale --assign/purchase--> Resold
///            ^          |
///            +--cancel--+
/// ```
///
/// `Resold` is terminal: the ticket has been consumed by its final owner
/// and can never be listed or assigned again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Valid and held by its owner; may be listed for resale.
    Active,
    /// Offered on the resale market at the owner's chosen price.
    ListedForResale,
    /// Transferred to a new owner through resale purchase or admin
    /// assignment. Terminal.
    Resold,
}

impl TicketStatus {
    /// Canonical label, used in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ListedForResale => "listed_for_resale",
            Self::Resold => "resold",
        }
    }

    /// Parses the canonical label back into a status.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "listed_for_resale" => Some(Self::ListedForResale),
            "resold" => Some(Self::Resold),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resale offer details, present while a ticket is listed and kept on the
/// record after it resells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleListing {
    /// Asking price chosen by the seller.
    pub price: u64,
    /// Seller's stated reason for reselling.
    pub reason: Option<String>,
    /// When the listing was created.
    pub listed_at: DateTime<Utc>,
}

/// An individual ticket record, one row per purchased unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket id.
    pub id: TicketId,
    /// Sequential, monotonically assigned ticket number.
    pub number: TicketNumber,
    /// Event this ticket admits to.
    pub event_id: EventId,
    /// Current owner. Transfers on resale.
    pub owner_id: UserId,
    /// Tier the ticket was purchased in.
    pub category: TicketCategory,
    /// Deterministic per-event seat label, e.g. `VIP-3`.
    pub seat_label: String,
    /// Price paid at primary purchase.
    pub price_paid: u64,
    /// When the primary purchase happened.
    pub purchased_at: DateTime<Utc>,
    /// Unified lifecycle state.
    pub status: TicketStatus,
    /// Resale offer details, if the ticket was ever listed.
    pub resale: Option<ResaleListing>,
    /// Buyer who received the ticket through resale, once resold.
    pub buyer_id: Option<UserId>,
}

impl Ticket {
    /// Transitions the ticket onto the resale market.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::NotEligibleForResale`] unless the ticket
    /// is currently `Active`.
    pub fn list_for_resale(
        &mut self,
        price: u64,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.status != TicketStatus::Active {
            return Err(TicketingError::NotEligibleForResale {
                status: self.status,
            });
        }
        self.status = TicketStatus::ListedForResale;
        self.resale = Some(ResaleListing {
            price,
            reason,
            listed_at: now,
        });
        Ok(())
    }

    /// Withdraws a resale listing, returning the ticket to `Active`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::NotEligibleForResale`] unless the ticket
    /// is currently `ListedForResale`.
    pub fn cancel_listing(&mut self) -> Result<()> {
        if self.status != TicketStatus::ListedForResale {
            return Err(TicketingError::NotEligibleForResale {
                status: self.status,
            });
        }
        self.status = TicketStatus::Active;
        self.resale = None;
        Ok(())
    }

    /// Completes a resale, transferring ownership to `buyer`.
    ///
    /// Used by both the buyer-side resale purchase and the admin waitlist
    /// assignment; the ticket ends in the terminal `Resold` state.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::NotEligibleForResale`] unless the ticket
    /// is currently `ListedForResale`.
    pub fn complete_resale(&mut self, buyer: UserId) -> Result<()> {
        if self.status != TicketStatus::ListedForResale {
            return Err(TicketingError::NotEligibleForResale {
                status: self.status,
            });
        }
        self.status = TicketStatus::Resold;
        self.buyer_id = Some(buyer);
        self.owner_id = buyer;
        Ok(())
    }

    /// Asking price of the current listing, if any.
    #[must_use]
    pub fn resale_price(&self) -> Option<u64> {
        self.resale.as_ref().map(|listing| listing.price)
    }
}
