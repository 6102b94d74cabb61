//! Waitlist membership and admin-mediated ticket assignment.

use crate::error::{Result, TicketingError};
use crate::store::TicketingRepository;
use crate::ticket::{Ticket, TicketStatus};
use crate::types::{EventId, TicketCategory, TicketId, UserId, WaitlistEntryId};
use crate::waitlist::WaitlistEntry;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Records category-scoped waitlist entries and reassigns resold tickets
/// to waitlisted users.
#[derive(Clone)]
pub struct WaitlistEngine {
    repository: Arc<dyn TicketingRepository>,
}

impl WaitlistEngine {
    /// Creates an engine over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TicketingRepository>) -> Self {
        Self { repository }
    }

    /// Joins `user_id` to the waitlist for `(event_id, category)`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the event or user does not exist.
    /// - `DuplicateWaitlistEntry` if the user already joined this
    ///   category's waitlist.
    pub async fn join_waitlist(
        &self,
        event_id: EventId,
        category: TicketCategory,
        user_id: UserId,
    ) -> Result<WaitlistEntry> {
        let event = self.repository.get_event(event_id).await?;
        let user = self.repository.get_user(user_id).await?;

        let entry = WaitlistEntry::new(event.id, user.id, category, Utc::now());
        self.repository.insert_waitlist_entry(&entry).await?;

        info!(event = %event_id, user = %user_id, %category, "joined waitlist");
        Ok(entry)
    }

    /// All waitlist entries for an event, join time ascending (FIFO). The
    /// admin picks one entry per assignment call; fairness is choosing
    /// from the front of this list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist.
    pub async fn list_waitlist_for_event(&self, event_id: EventId) -> Result<Vec<WaitlistEntry>> {
        self.repository.get_event(event_id).await?;
        self.repository.list_waitlist_for_event(event_id).await
    }

    /// The entries a user currently holds, join time ascending.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store read fails.
    pub async fn list_waitlist_for_user(&self, user_id: UserId) -> Result<Vec<WaitlistEntry>> {
        self.repository.list_waitlist_for_user(user_id).await
    }

    /// Assigns a listed resale ticket to the user behind a waitlist entry
    /// (admin action): ownership transfers, the ticket becomes `Resold`,
    /// and the entry is deleted.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ticket, the entry, or the entry's user does not
    ///   resolve.
    /// - `Validation` if the entry is for a different event.
    /// - `CategoryMismatch` if the ticket's category differs from the
    ///   entry's.
    /// - `NotEligibleForResale` unless the ticket is `ListedForResale`.
    /// - `ConcurrencyConflict` if a racing transition wins first.
    pub async fn assign_resale_ticket(
        &self,
        ticket_id: TicketId,
        entry_id: WaitlistEntryId,
    ) -> Result<Ticket> {
        let ticket = self.repository.get_ticket(ticket_id).await?;
        let entry = self.repository.get_waitlist_entry(entry_id).await?;
        let recipient = self.repository.get_user(entry.user_id).await?;

        if entry.event_id != ticket.event_id {
            return Err(TicketingError::validation(
                "waitlist entry is for a different event",
            ));
        }
        if entry.category != ticket.category {
            return Err(TicketingError::CategoryMismatch {
                ticket: ticket.category,
                requested: entry.category,
            });
        }

        let seller_id = ticket.owner_id;
        let mut updated = ticket.clone();
        updated.complete_resale(recipient.id)?;

        self.repository
            .update_ticket_guarded(&updated, TicketStatus::ListedForResale)
            .await?;

        // The assignment is committed once the guarded update lands; the
        // bookkeeping below must not turn it into an error.
        if let Err(err) = self.repository.detach_ticket(seller_id, ticket_id).await {
            warn!(seller = %seller_id, ticket = %ticket_id, %err, "failed to detach ticket from seller after assignment");
        }
        if let Err(err) = self
            .repository
            .attach_tickets(recipient.id, &[ticket_id])
            .await
        {
            warn!(recipient = %recipient.id, ticket = %ticket_id, %err, "failed to attach ticket to recipient after assignment");
        }
        if let Err(err) = self.repository.delete_waitlist_entry(entry.id).await {
            warn!(entry = %entry.id, %err, "failed to delete waitlist entry after assignment");
        }

        info!(
            ticket = %ticket_id,
            entry = %entry_id,
            recipient = %recipient.id,
            "resale ticket assigned to waitlist user"
        );
        Ok(updated)
    }
}
