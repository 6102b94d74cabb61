//! Resale listing, cancellation and buyer-side resale purchase.

use crate::error::{Result, TicketingError};
use crate::store::TicketingRepository;
use crate::ticket::{Ticket, TicketStatus};
use crate::types::{TicketId, UserId};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Moves tickets through the resale market and reconciles wallets.
///
/// All state transitions go through the repository's guarded update, so of
/// two racing calls against the same ticket exactly one succeeds and the
/// other observes `ConcurrencyConflict`.
#[derive(Clone)]
pub struct ResaleEngine {
    repository: Arc<dyn TicketingRepository>,
}

impl ResaleEngine {
    /// Creates an engine over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TicketingRepository>) -> Self {
        Self { repository }
    }

    /// Lists a ticket for resale at `price`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ticket does not exist.
    /// - `NotOwner` if `seller_id` does not own the ticket.
    /// - `NotEligibleForResale` unless the ticket is `Active`.
    /// - `ConcurrencyConflict` if a racing transition wins first.
    pub async fn list_for_resale(
        &self,
        ticket_id: TicketId,
        price: u64,
        reason: Option<String>,
        seller_id: UserId,
    ) -> Result<Ticket> {
        let mut ticket = self.repository.get_ticket(ticket_id).await?;
        if ticket.owner_id != seller_id {
            return Err(TicketingError::NotOwner);
        }

        ticket.list_for_resale(price, reason, Utc::now())?;
        self.repository
            .update_ticket_guarded(&ticket, TicketStatus::Active)
            .await?;

        info!(ticket = %ticket_id, seller = %seller_id, price, "ticket listed for resale");
        Ok(ticket)
    }

    /// Withdraws a resale listing, returning the ticket to `Active`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ticket does not exist.
    /// - `NotOwner` if `seller_id` does not own the ticket.
    /// - `NotEligibleForResale` unless the ticket is `ListedForResale`.
    /// - `ConcurrencyConflict` if a racing transition wins first.
    pub async fn cancel_listing(&self, ticket_id: TicketId, seller_id: UserId) -> Result<Ticket> {
        let mut ticket = self.repository.get_ticket(ticket_id).await?;
        if ticket.owner_id != seller_id {
            return Err(TicketingError::NotOwner);
        }

        ticket.cancel_listing()?;
        self.repository
            .update_ticket_guarded(&ticket, TicketStatus::ListedForResale)
            .await?;

        info!(ticket = %ticket_id, seller = %seller_id, "resale listing cancelled");
        Ok(ticket)
    }

    /// Buys a listed ticket: debits the buyer by the resale price, credits
    /// the seller with the full amount, transfers ownership and removes
    /// the buyer's waitlist entries for the event.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ticket or buyer does not exist.
    /// - `Validation` if the buyer already owns the ticket.
    /// - `NotEligibleForResale` unless the ticket is `ListedForResale`.
    /// - `InsufficientFunds` if the buyer's wallet cannot cover the price.
    /// - `ConcurrencyConflict` if a racing transition wins first (the
    ///   debit is refunded).
    pub async fn purchase_resale_ticket(
        &self,
        ticket_id: TicketId,
        buyer_id: UserId,
    ) -> Result<Ticket> {
        let ticket = self.repository.get_ticket(ticket_id).await?;
        let buyer = self.repository.get_user(buyer_id).await?;
        if ticket.owner_id == buyer.id {
            return Err(TicketingError::validation(
                "cannot purchase your own resale listing",
            ));
        }

        let seller_id = ticket.owner_id;
        let mut updated = ticket.clone();
        updated.complete_resale(buyer.id)?;

        // The listing is guaranteed present once complete_resale succeeds.
        let price = ticket.resale_price().ok_or_else(|| {
            TicketingError::NotEligibleForResale {
                status: ticket.status,
            }
        })?;

        self.repository.debit_wallet(buyer.id, price).await?;

        if let Err(err) = self
            .repository
            .update_ticket_guarded(&updated, TicketStatus::ListedForResale)
            .await
        {
            if let Err(refund_err) = self.repository.credit_wallet(buyer.id, price).await {
                warn!(buyer = %buyer_id, price, %refund_err, "failed to refund buyer after lost resale race");
            }
            return Err(err);
        }

        // The transfer is committed once the guarded update lands; the
        // bookkeeping below must not turn a completed resale into an error.
        if let Err(err) = self.repository.credit_wallet(seller_id, price).await {
            warn!(seller = %seller_id, price, %err, "failed to credit seller after resale");
        }
        if let Err(err) = self.repository.detach_ticket(seller_id, ticket_id).await {
            warn!(seller = %seller_id, ticket = %ticket_id, %err, "failed to detach ticket from seller after resale");
        }
        if let Err(err) = self
            .repository
            .attach_tickets(buyer.id, &[ticket_id])
            .await
        {
            warn!(buyer = %buyer_id, ticket = %ticket_id, %err, "failed to attach ticket to buyer after resale");
        }

        let removed = match self
            .repository
            .delete_waitlist_entries_for(buyer.id, ticket.event_id)
            .await
        {
            Ok(removed) => removed,
            Err(err) => {
                warn!(buyer = %buyer_id, event = %ticket.event_id, %err, "failed to clear buyer waitlist entries after resale");
                0
            }
        };

        info!(
            ticket = %ticket_id,
            seller = %seller_id,
            buyer = %buyer_id,
            price,
            waitlist_entries_removed = removed,
            "resale ticket purchased"
        );
        Ok(updated)
    }

    /// All tickets currently listed for resale (admin view).
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store read fails.
    pub async fn list_resale_tickets(&self) -> Result<Vec<Ticket>> {
        self.repository.list_resale_tickets().await
    }
}
