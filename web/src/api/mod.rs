//! HTTP API handlers, organized by domain:
//! - Tickets: purchase, resale lifecycle, admin assignment
//! - Waitlist: joining and listing
//! - Events: availability queries and admin inventory edits

pub mod events;
pub mod tickets;
pub mod waitlist;

use chrono::{DateTime, Utc};
use eventease_core::ticket::Ticket;
use serde::Serialize;
use uuid::Uuid;

/// Wire representation of a ticket.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    /// Ticket id.
    pub id: Uuid,
    /// Sequential ticket number.
    pub number: u64,
    /// Event the ticket admits to.
    pub event_id: Uuid,
    /// Current owner.
    pub owner_id: Uuid,
    /// Tier.
    pub category: String,
    /// Seat label, e.g. `VIP-3`.
    pub seat_label: String,
    /// Price paid at primary purchase.
    pub price_paid: u64,
    /// Primary purchase timestamp.
    pub purchased_at: DateTime<Utc>,
    /// Unified lifecycle status.
    pub status: String,
    /// Asking price while listed (and after resale).
    pub resale_price: Option<u64>,
    /// Seller's stated resale reason.
    pub resale_reason: Option<String>,
    /// When the resale listing was created.
    pub resale_listed_at: Option<DateTime<Utc>>,
    /// Buyer who received the ticket through resale.
    pub buyer_id: Option<Uuid>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: *ticket.id.as_uuid(),
            number: ticket.number.0,
            event_id: *ticket.event_id.as_uuid(),
            owner_id: *ticket.owner_id.as_uuid(),
            category: ticket.category.as_str().to_string(),
            seat_label: ticket.seat_label,
            price_paid: ticket.price_paid,
            purchased_at: ticket.purchased_at,
            status: ticket.status.as_str().to_string(),
            resale_price: ticket.resale.as_ref().map(|listing| listing.price),
            resale_reason: ticket
                .resale
                .as_ref()
                .and_then(|listing| listing.reason.clone()),
            resale_listed_at: ticket.resale.as_ref().map(|listing| listing.listed_at),
            buyer_id: ticket.buyer_id.map(|id| *id.as_uuid()),
        }
    }
}
